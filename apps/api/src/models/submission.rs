use serde::{Deserialize, Serialize};

use crate::models::recipient::RecipientInput;

/// The person sending the letter. Every field is required by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub zip: String,
    pub city: String,
}

impl SenderProfile {
    /// "First Last", trimmed so a missing half does not leave a stray space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Postal code and city on one line.
    pub fn locality(&self) -> String {
        format!("{} {}", self.zip.trim(), self.city.trim())
            .trim()
            .to_string()
    }

    /// Compact one-line return address printed above the recipient in the envelope window.
    pub fn summary_line(&self) -> String {
        [self.full_name(), self.street.trim().to_string(), self.locality()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

/// A submission after the transport has collapsed field aliases.
///
/// Immutable once constructed; lives for one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub sender: SenderProfile,
    pub subject: String,
    /// Letter body template. May contain placeholder tokens.
    pub message: String,
    pub copy_to_self: bool,
    pub consent_print: bool,
    pub primary_recipient: Option<RecipientInput>,
    pub extra_recipients: Vec<RecipientInput>,
    /// Bare representative name typed by the sender, used only for the fallback recipient.
    pub mp_name: String,
    /// Postal code and city used for the representative lookup.
    pub lookup_zip: String,
    pub lookup_city: String,
}

impl SubmissionRequest {
    /// Names of required fields that are missing or blank, in a stable order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let checks: [(&'static str, &str); 8] = [
            ("first_name", &self.sender.first_name),
            ("last_name", &self.sender.last_name),
            ("email", &self.sender.email),
            ("street", &self.sender.street),
            ("sender_zip", &self.sender.zip),
            ("sender_city", &self.sender.city),
            ("subject", &self.subject),
            ("message", &self.message),
        ];
        checks
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_sender() -> SenderProfile {
        SenderProfile {
            first_name: "Max".to_string(),
            last_name: "Mustermann".to_string(),
            email: "max@example.org".to_string(),
            street: "Hauptstraße 1".to_string(),
            zip: "10115".to_string(),
            city: "Berlin".to_string(),
        }
    }

    #[test]
    fn test_summary_line_joins_with_middle_dot() {
        assert_eq!(
            make_sender().summary_line(),
            "Max Mustermann · Hauptstraße 1 · 10115 Berlin"
        );
    }

    #[test]
    fn test_summary_line_skips_blank_parts() {
        let sender = SenderProfile {
            street: "  ".to_string(),
            ..make_sender()
        };
        assert_eq!(sender.summary_line(), "Max Mustermann · 10115 Berlin");
    }

    #[test]
    fn test_missing_fields_reports_blank_values() {
        let request = SubmissionRequest {
            sender: SenderProfile {
                street: "   ".to_string(),
                ..make_sender()
            },
            subject: "Energy Policy".to_string(),
            message: String::new(),
            ..Default::default()
        };
        assert_eq!(request.missing_fields(), vec!["street", "message"]);
    }

    #[test]
    fn test_missing_fields_empty_for_complete_request() {
        let request = SubmissionRequest {
            sender: make_sender(),
            subject: "Energy Policy".to_string(),
            message: "Hello".to_string(),
            ..Default::default()
        };
        assert!(request.missing_fields().is_empty());
    }
}
