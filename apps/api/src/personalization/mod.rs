// Personalization: salutation inference and placeholder substitution.
// Pure and deterministic; no I/O.

pub mod placeholders;
pub mod salutation;

pub use placeholders::{identity_tokens, personalize};
pub use salutation::resolve_salutation;

use crate::locale::LetterLocale;
use crate::models::{RecipientProfile, SenderProfile};

/// The per-recipient text handed to the layout renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalizedLetter {
    pub salutation: String,
    pub body: String,
}

/// Resolves the recipient's salutation and substitutes it, together with the
/// sender and recipient fields, into `template`.
pub fn personalize_for(
    template: &str,
    sender: &SenderProfile,
    recipient: &RecipientProfile,
    locale: &LetterLocale,
) -> PersonalizedLetter {
    let salutation = resolve_salutation(recipient, locale);
    let body = personalize(template, sender, recipient, &salutation);
    PersonalizedLetter { salutation, body }
}
