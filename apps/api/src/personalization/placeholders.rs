//! Placeholder substitution for letter templates.
//!
//! Every slot accepts the historical German token and an English alias.
//! Unknown `{...}` tokens are left exactly as written.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::{RecipientProfile, SenderProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Salutation,
    RecipientName,
    FirstName,
    LastName,
    Street,
    Zip,
    City,
    RecipientBlock,
}

const TOKENS: &[(&str, Slot)] = &[
    ("{Anrede}", Slot::Salutation),
    ("{salutation}", Slot::Salutation),
    ("{Anrede_Name}", Slot::RecipientName),
    ("{recipient_name}", Slot::RecipientName),
    ("{Vorname}", Slot::FirstName),
    ("{first_name}", Slot::FirstName),
    ("{Nachname}", Slot::LastName),
    ("{last_name}", Slot::LastName),
    ("{Straße}", Slot::Street),
    ("{Strasse}", Slot::Street),
    ("{street}", Slot::Street),
    ("{PLZ}", Slot::Zip),
    ("{zip}", Slot::Zip),
    ("{Ort}", Slot::City),
    ("{city}", Slot::City),
    ("{MdB_Name_und_Adresse}", Slot::RecipientBlock),
    ("{MdB_Adresse}", Slot::RecipientBlock),
    ("{recipient_block}", Slot::RecipientBlock),
];

/// Tokens that depend on the sender or the recipient rather than on the letter's content.
///
/// Used by the duplicate fingerprint, which must not change when only the
/// addressee or the sender's address changes.
pub fn identity_tokens() -> impl Iterator<Item = &'static str> {
    TOKENS
        .iter()
        .filter(|(_, slot)| !matches!(slot, Slot::Salutation | Slot::RecipientName))
        .map(|(token, _)| *token)
}

/// Any brace-delimited token. Unrecognised ones are written back unchanged.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}\n]+\}").expect("Invalid token regex"));

/// Replaces every recognised token in `template` in a single pass, so
/// substituted values are never scanned for tokens again.
pub fn personalize(
    template: &str,
    sender: &SenderProfile,
    recipient: &RecipientProfile,
    salutation: &str,
) -> String {
    let recipient_block = recipient.name_and_address();
    TOKEN_PATTERN
        .replace_all(template, |caps: &Captures| {
            let token = &caps[0];
            let Some((_, slot)) = TOKENS.iter().find(|(t, _)| *t == token) else {
                return token.to_string();
            };
            let value: &str = match slot {
                Slot::Salutation => salutation,
                Slot::RecipientName => &recipient.name,
                Slot::FirstName => &sender.first_name,
                Slot::LastName => &sender.last_name,
                Slot::Street => &sender.street,
                Slot::Zip => &sender.zip,
                Slot::City => &sender.city,
                Slot::RecipientBlock => &recipient_block,
            };
            value.to_string()
        })
        .into_owned()
}
