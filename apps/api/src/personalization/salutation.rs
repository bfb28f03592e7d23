//! Salutation inference from a recipient's display name.
//!
//! Explicit salutations always win. Otherwise the given name is looked up in two
//! curated sets; anything unrecognised gets the locale's neutral greeting.

use std::sync::LazyLock;

use regex::Regex;

use crate::locale::LetterLocale;
use crate::models::RecipientProfile;

const FEMALE_NAMES: &[&str] = &[
    "anna", "sabine", "ursula", "katrin", "claudia", "renate", "petra", "britta", "heike",
    "stefanie", "julia", "christine", "lisa", "marie", "monika", "andrea", "martina", "sandra",
    "nicole", "angelika", "eva", "kathrin", "karin", "bettina", "svenja", "ricarda", "elisabeth",
    "maria", "linda", "sarah",
];

const MALE_NAMES: &[&str] = &[
    "hans", "peter", "wolfgang", "thomas", "michael", "stefan", "andreas", "markus", "martin",
    "frank", "jürgen", "juergen", "klaus", "christian", "alexander", "lars", "tobias",
    "sebastian", "uwe", "ulrich", "paul", "max", "jan", "georg", "rolf", "rainer", "christoph",
    "bernd",
];

/// Academic and parliamentary titles that precede or follow a name ("Dr.", "Prof.", "MdB", "Dr.-Ing.").
static TITLE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:dr|prof|dipl|mdb|mdl|mep|med|rer|nat|phil|jur)\.?(?:-[a-z]+\.?)?,?$")
        .expect("Invalid title token regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub given: String,
    pub surname: String,
}

/// Strips titles, then treats the first token as the given name and the last as the surname.
///
/// A single-token name yields the same value for both.
pub fn split_name(full: &str) -> ParsedName {
    let tokens: Vec<&str> = full
        .split_whitespace()
        .filter(|t| !TITLE_TOKEN.is_match(t))
        .collect();

    ParsedName {
        given: tokens.first().map(|t| t.to_string()).unwrap_or_default(),
        surname: tokens.last().map(|t| t.to_string()).unwrap_or_default(),
    }
}

/// Case-insensitive lookup. Hyphenated given names fall back to their first part.
pub fn guess_gender(given: &str) -> Option<Gender> {
    let lower = given.trim().to_lowercase();
    let lookup = |name: &str| {
        if FEMALE_NAMES.contains(&name) {
            Some(Gender::Female)
        } else if MALE_NAMES.contains(&name) {
            Some(Gender::Male)
        } else {
            None
        }
    };

    lookup(&lower).or_else(|| {
        lower
            .split_once('-')
            .and_then(|(first, _)| lookup(first))
    })
}

pub fn ensure_trailing_comma(s: &str) -> String {
    let trimmed = s.trim_end();
    if trimmed.ends_with(',') {
        trimmed.to_string()
    } else {
        format!("{trimmed},")
    }
}

/// Builds a gendered greeting when the given name is recognised, else the neutral one.
pub fn polite_salutation(name: &str, locale: &LetterLocale) -> String {
    let parsed = split_name(name);
    let addressed = if parsed.surname.is_empty() {
        parsed.given.as_str()
    } else {
        parsed.surname.as_str()
    };

    match guess_gender(&parsed.given) {
        Some(Gender::Female) => {
            ensure_trailing_comma(&format!("{} {addressed}", locale.female_greeting))
        }
        Some(Gender::Male) => ensure_trailing_comma(&format!("{} {addressed}", locale.male_greeting)),
        None => ensure_trailing_comma(locale.neutral_greeting),
    }
}

/// The salutation used for one recipient's letter.
pub fn resolve_salutation(recipient: &RecipientProfile, locale: &LetterLocale) -> String {
    match recipient.salutation.as_deref().map(str::trim) {
        Some(explicit) if !explicit.is_empty() => ensure_trailing_comma(explicit),
        _ => polite_salutation(&recipient.name, locale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_recipient(name: &str, salutation: Option<&str>) -> RecipientProfile {
        RecipientProfile {
            name: name.to_string(),
            address: "Platz der Republik 1\n11011 Berlin".to_string(),
            affiliation: None,
            salutation: salutation.map(str::to_string),
            region: None,
        }
    }

    #[test]
    fn test_split_name_strips_titles() {
        let parsed = split_name("Prof. Dr. Julia Schmidt MdB");
        assert_eq!(parsed.given, "Julia");
        assert_eq!(parsed.surname, "Schmidt");
    }

    #[test]
    fn test_split_name_strips_compound_title() {
        let parsed = split_name("Dr.-Ing. Peter Meier");
        assert_eq!(parsed.given, "Peter");
        assert_eq!(parsed.surname, "Meier");
    }

    #[test]
    fn test_split_name_single_token() {
        let parsed = split_name("Ricarda");
        assert_eq!(parsed.given, "Ricarda");
        assert_eq!(parsed.surname, "Ricarda");
    }

    #[test]
    fn test_split_name_empty() {
        let parsed = split_name("   ");
        assert!(parsed.given.is_empty());
        assert!(parsed.surname.is_empty());
    }

    #[test]
    fn test_guess_gender_case_insensitive() {
        assert_eq!(guess_gender("JULIA"), Some(Gender::Female));
        assert_eq!(guess_gender("Jürgen"), Some(Gender::Male));
        assert_eq!(guess_gender("Erika"), None);
    }

    #[test]
    fn test_guess_gender_hyphenated_name() {
        assert_eq!(guess_gender("Anna-Lena"), Some(Gender::Female));
    }

    #[test]
    fn test_female_salutation_uses_surname_german() {
        assert_eq!(
            polite_salutation("Julia Schmidt", LetterLocale::german()),
            "Sehr geehrte Frau Schmidt,"
        );
    }

    #[test]
    fn test_female_salutation_uses_surname_english() {
        assert_eq!(
            polite_salutation("Julia Schmidt", LetterLocale::english()),
            "Dear Ms. Schmidt,"
        );
    }

    #[test]
    fn test_male_salutation_ignores_titles() {
        assert_eq!(
            polite_salutation("Dr. Thomas Müller", LetterLocale::german()),
            "Sehr geehrter Herr Müller,"
        );
    }

    #[test]
    fn test_unknown_name_gets_neutral_greeting() {
        let sal = polite_salutation("Erika Beispiel", LetterLocale::german());
        assert_eq!(sal, "Sehr geehrte Damen und Herren,");
        assert!(sal.ends_with(','));

        let sal = polite_salutation("Xyz Unknown", LetterLocale::english());
        assert_eq!(sal, "Dear Sir or Madam,");
    }

    #[test]
    fn test_explicit_salutation_gets_comma_appended() {
        let recipient = make_recipient("Erika Beispiel", Some("Liebe Frau Beispiel"));
        assert_eq!(
            resolve_salutation(&recipient, LetterLocale::german()),
            "Liebe Frau Beispiel,"
        );
    }

    #[test]
    fn test_explicit_salutation_keeps_existing_comma() {
        let recipient = make_recipient("Erika Beispiel", Some("Sehr geehrte Frau Beispiel, "));
        assert_eq!(
            resolve_salutation(&recipient, LetterLocale::german()),
            "Sehr geehrte Frau Beispiel,"
        );
    }

    #[test]
    fn test_blank_explicit_salutation_falls_back_to_inference() {
        let recipient = make_recipient("Julia Schmidt", Some("   "));
        assert_eq!(
            resolve_salutation(&recipient, LetterLocale::german()),
            "Sehr geehrte Frau Schmidt,"
        );
    }
}
