//! Collapses the loosely-typed submission payload into a [`SubmissionRequest`].
//!
//! Clients send either English or legacy German field names. For each field
//! the first name present with a non-null value wins, so an explicit empty
//! string is kept rather than falling through to the alias.

use serde_json::{Map, Value};

use crate::models::{RecipientInput, SenderProfile, SubmissionRequest};

fn pick<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn text(map: &Map<String, Value>, keys: &[&str]) -> String {
    pick(map, keys).map(as_text).unwrap_or_default()
}

/// Accepts `true`, `"true"`, `"on"`, `"1"`, `"yes"` and `1`, case-insensitively.
pub fn to_bool(value: &Value) -> bool {
    matches!(
        as_text(value).trim().to_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

fn flag(map: &Map<String, Value>, keys: &[&str]) -> bool {
    pick(map, keys).is_some_and(to_bool)
}

/// First non-blank value among `keys`, in order.
fn first_filled(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .map(as_text)
        .find(|v| !v.trim().is_empty())
}

fn recipient(value: &Value) -> Option<RecipientInput> {
    let map = value.as_object()?;
    Some(RecipientInput {
        name: first_filled(map, &["mdb_name", "name"]),
        address: first_filled(map, &["bundestag_address", "address"]),
        affiliation: first_filled(map, &["fraktion", "party", "affiliation"]),
        salutation: first_filled(map, &["anrede", "salutation"]),
        region: first_filled(map, &["bundesland", "region"]),
    })
}

/// Builds the request from a JSON payload. Anything that is not an object
/// becomes an empty request, which then fails validation.
pub fn from_payload(payload: &Value) -> SubmissionRequest {
    let empty = Map::new();
    let map = payload.as_object().unwrap_or(&empty);

    let lookup_zip = text(map, &["zip", "plz"]);
    let lookup_city = text(map, &["city", "ort"]);
    let mut sender_zip = text(map, &["sender_zip", "plz_abs"]);
    if sender_zip.trim().is_empty() {
        sender_zip = lookup_zip.clone();
    }
    let mut sender_city = text(map, &["sender_city", "ort_abs"]);
    if sender_city.trim().is_empty() {
        sender_city = lookup_city.clone();
    }

    SubmissionRequest {
        sender: SenderProfile {
            first_name: text(map, &["first_name", "vorname"]),
            last_name: text(map, &["last_name", "nachname"]),
            email: text(map, &["email"]),
            street: text(map, &["street", "strasse"]),
            zip: sender_zip,
            city: sender_city,
        },
        subject: text(map, &["subject"]),
        message: text(map, &["message"]),
        copy_to_self: flag(map, &["copy_to_self", "copy"]),
        consent_print: flag(map, &["consent_print", "postversand"]),
        primary_recipient: map.get("primary_recipient").and_then(recipient),
        extra_recipients: map
            .get("extra_recipients")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(recipient).collect())
            .unwrap_or_default(),
        mp_name: text(map, &["mp_name", "abgeordneter"]),
        lookup_zip,
        lookup_city,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_german_aliases_are_collapsed() {
        let request = from_payload(&json!({
            "vorname": "Max",
            "nachname": "Mustermann",
            "email": "max@example.org",
            "strasse": "Hauptstraße 1",
            "plz_abs": "10115",
            "ort_abs": "Berlin",
            "abgeordneter": "Julia Schmidt",
            "postversand": "on",
            "copy": 1,
            "subject": "Energy Policy",
            "message": "Hallo"
        }));
        assert_eq!(request.sender.first_name, "Max");
        assert_eq!(request.sender.street, "Hauptstraße 1");
        assert_eq!(request.sender.zip, "10115");
        assert_eq!(request.mp_name, "Julia Schmidt");
        assert!(request.consent_print);
        assert!(request.copy_to_self);
        assert!(request.missing_fields().is_empty());
    }

    #[test]
    fn test_english_name_wins_over_alias() {
        let request = from_payload(&json!({ "first_name": "Anna", "vorname": "Max" }));
        assert_eq!(request.sender.first_name, "Anna");
    }

    #[test]
    fn test_null_falls_through_to_alias() {
        let request = from_payload(&json!({ "first_name": null, "vorname": "Max" }));
        assert_eq!(request.sender.first_name, "Max");
    }

    #[test]
    fn test_sender_locality_defaults_to_lookup_values() {
        let request = from_payload(&json!({ "plz": 10115, "ort": "Berlin", "sender_zip": "" }));
        assert_eq!(request.sender.zip, "10115");
        assert_eq!(request.sender.city, "Berlin");
        assert_eq!(request.lookup_zip, "10115");
    }

    #[test]
    fn test_flags() {
        for yes in [json!(true), json!("true"), json!("ON"), json!("1"), json!("yes"), json!(1)] {
            assert!(to_bool(&yes), "{yes} should be true");
        }
        for no in [json!(false), json!("no"), json!(0), json!(""), json!(null), json!({})] {
            assert!(!to_bool(&no), "{no} should be false");
        }
    }

    #[test]
    fn test_recipients_are_parsed_and_junk_ignored() {
        let request = from_payload(&json!({
            "primary_recipient": { "mdb_name": "Julia Schmidt", "fraktion": "SPD" },
            "extra_recipients": [ { "name": "Hans Meier" }, "junk", 42 ]
        }));
        assert_eq!(
            request.primary_recipient.and_then(|r| r.name).as_deref(),
            Some("Julia Schmidt")
        );
        assert_eq!(request.extra_recipients.len(), 1);
    }

    #[test]
    fn test_recipient_german_name_wins_when_both_present() {
        let request = from_payload(&json!({
            "primary_recipient": { "mdb_name": "Julia Schmidt", "name": "J. Schmidt", "party": "SPD" }
        }));
        let primary = request.primary_recipient.unwrap();
        assert_eq!(primary.name.as_deref(), Some("Julia Schmidt"));
        assert_eq!(primary.affiliation.as_deref(), Some("SPD"));
    }

    #[test]
    fn test_non_object_payload_is_empty_request() {
        let request = from_payload(&json!("hello"));
        assert_eq!(request.missing_fields().len(), 8);
        assert!(!request.consent_print);
    }
}
