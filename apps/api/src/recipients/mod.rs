//! Recipient resolution: fallbacks, affiliation filter, deduplication.
//!
//! [`ResolvedRecipientList`] can only be built by [`resolve_recipients`], which
//! always yields at least one recipient.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::locale::LetterLocale;
use crate::models::{RecipientInput, RecipientProfile};

/// Affiliations excluded by default.
pub const DEFAULT_EXCLUDED_AFFILIATIONS: [&str; 2] = ["AfD", "WerteUnion"];

// ────────────────────────────────────────────────────────────────────────────
// Policy
// ────────────────────────────────────────────────────────────────────────────

/// Case-insensitive set of affiliations that never receive letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientPolicy {
    excluded: HashSet<String>,
}

impl RecipientPolicy {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RecipientPolicy {
            excluded: excluded
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Exact match on the trimmed label, ignoring case.
    pub fn is_excluded(&self, affiliation: &str) -> bool {
        let key = affiliation.trim().to_lowercase();
        !key.is_empty() && self.excluded.contains(&key)
    }
}

impl Default for RecipientPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_AFFILIATIONS)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resolved list
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRecipientList(Vec<RecipientProfile>);

impl ResolvedRecipientList {
    pub fn iter(&self) -> std::slice::Iter<'_, RecipientProfile> {
        self.0.iter()
    }

    /// Always at least 1.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResolvedRecipientList {
    type Item = &'a RecipientProfile;
    type IntoIter = std::slice::Iter<'a, RecipientProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resolution
// ────────────────────────────────────────────────────────────────────────────

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Fills name/address fallbacks. `None` if the affiliation is excluded.
fn to_profile(
    input: &RecipientInput,
    policy: &RecipientPolicy,
    locale: &LetterLocale,
) -> Option<RecipientProfile> {
    let affiliation = non_blank(&input.affiliation);
    if affiliation.is_some_and(|a| policy.is_excluded(a)) {
        debug!(affiliation = ?affiliation, "Recipient dropped by affiliation policy");
        return None;
    }
    Some(RecipientProfile {
        name: non_blank(&input.name)
            .unwrap_or(locale.generic_recipient)
            .to_string(),
        address: non_blank(&input.address)
            .unwrap_or(locale.default_address)
            .to_string(),
        affiliation: affiliation.map(str::to_string),
        salutation: non_blank(&input.salutation).map(str::to_string),
        region: non_blank(&input.region).map(str::to_string),
    })
}

/// Builds the ordered, deduplicated recipient list: primary first, then extras
/// in input order. Falls back to one generic recipient named after `mp_name`.
pub fn resolve_recipients(
    primary: Option<&RecipientInput>,
    extras: &[RecipientInput],
    mp_name: &str,
    policy: &RecipientPolicy,
    locale: &LetterLocale,
) -> ResolvedRecipientList {
    let mut seen = HashSet::new();
    let mut recipients: Vec<RecipientProfile> = primary
        .into_iter()
        .chain(extras)
        .filter_map(|input| to_profile(input, policy, locale))
        .filter(|profile| seen.insert(profile.signature()))
        .collect();

    if recipients.is_empty() {
        let name = mp_name.trim();
        recipients.push(RecipientProfile {
            name: if name.is_empty() {
                locale.generic_recipient.to_string()
            } else {
                name.to_string()
            },
            address: locale.default_address.to_string(),
            affiliation: None,
            salutation: None,
            region: None,
        });
    }

    ResolvedRecipientList(recipients)
}
