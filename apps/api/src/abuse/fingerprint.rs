//! Duplicate-submission fingerprint.
//!
//! SHA-256 over a JSON object `{email, subject, message, recipients}` with the
//! fields in that order. Text fields are normalized so cosmetic edits (case,
//! spacing, non-breaking spaces) do not defeat duplicate detection, and
//! sender/recipient placeholders are removed from the message so the same
//! campaign letter sent twice hashes the same.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::personalization::identity_tokens;
use crate::recipients::ResolvedRecipientList;

#[derive(Serialize)]
struct FingerprintPayload<'a> {
    email: String,
    subject: String,
    message: String,
    recipients: &'a str,
}

/// NBSP → space, whitespace runs collapsed, trimmed, lowercased.
pub fn normalize_text(s: &str) -> String {
    s.replace('\u{00A0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Sorted `name|address` pairs joined with `;`.
pub fn recipients_signature(recipients: &ResolvedRecipientList) -> String {
    let mut items: Vec<String> = recipients.iter().map(|r| r.signature()).collect();
    items.sort();
    items.join(";")
}

fn strip_identity_tokens(message: &str) -> String {
    identity_tokens().fold(message.to_string(), |text, token| text.replace(token, ""))
}

/// Lowercase hex SHA-256 fingerprint of one submission.
pub fn submission_fingerprint(
    email: &str,
    subject: &str,
    message: &str,
    recipients: &ResolvedRecipientList,
) -> Result<String, serde_json::Error> {
    let signature = recipients_signature(recipients);
    let payload = FingerprintPayload {
        email: normalize_text(email),
        subject: normalize_text(subject),
        message: normalize_text(&strip_identity_tokens(message)),
        recipients: &signature,
    };
    let json = serde_json::to_vec(&payload)?;
    Ok(hex::encode(Sha256::digest(&json)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LetterLocale;
    use crate::models::RecipientInput;
    use crate::recipients::{resolve_recipients, RecipientPolicy};

    fn recipients(names: &[&str]) -> ResolvedRecipientList {
        let inputs: Vec<RecipientInput> = names
            .iter()
            .map(|n| RecipientInput {
                name: Some(n.to_string()),
                ..Default::default()
            })
            .collect();
        resolve_recipients(
            None,
            &inputs,
            "",
            &RecipientPolicy::default(),
            LetterLocale::german(),
        )
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hallo\u{00A0}\u{00A0}WELT \n x "), "hallo welt x");
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fp = submission_fingerprint("a@b.de", "S", "M", &recipients(&["A"])).unwrap();
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_ignores_cosmetic_differences() {
        let r = recipients(&["A"]);
        let a = submission_fingerprint("Max@Example.org", "Energy  Policy", "Hallo {Vorname}!", &r).unwrap();
        let b = submission_fingerprint(" max@example.org", "energy\u{00A0}policy", "hallo !", &r).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_ignores_recipient_order() {
        let a = submission_fingerprint("e", "s", "m", &recipients(&["A", "B"])).unwrap();
        let b = submission_fingerprint("e", "s", "m", &recipients(&["B", "A"])).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let r = recipients(&["A"]);
        let a = submission_fingerprint("e", "s", "first letter", &r).unwrap();
        let b = submission_fingerprint("e", "s", "second letter", &r).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_keeps_salutation_token() {
        let r = recipients(&["A"]);
        let a = submission_fingerprint("e", "s", "{Anrede} text", &r).unwrap();
        let b = submission_fingerprint("e", "s", "text", &r).unwrap();
        assert_ne!(a, b);
    }
}
