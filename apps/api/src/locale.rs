//! Letter phrasing per language.
//!
//! The institutional header and default address stay German in every locale:
//! they are the postal address of the parliament, not prose.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleCode {
    De,
    En,
}

impl FromStr for LocaleCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "de" | "de-de" | "german" => Ok(LocaleCode::De),
            "en" | "en-gb" | "en-us" | "english" => Ok(LocaleCode::En),
            other => Err(format!("unsupported letter locale '{other}'")),
        }
    }
}

/// Phrases and constants used when composing a letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterLocale {
    pub code: LocaleCode,
    /// Greeting prefix for a recognised female given name, e.g. "Sehr geehrte Frau".
    pub female_greeting: &'static str,
    /// Greeting prefix for a recognised male given name, e.g. "Sehr geehrter Herr".
    pub male_greeting: &'static str,
    /// Gender-neutral formal greeting, always comma-terminated.
    pub neutral_greeting: &'static str,
    /// Lowercase openers that mark a line as a salutation.
    pub salutation_openers: &'static [&'static str],
    pub closing: &'static str,
    pub process_id_label: &'static str,
    pub page_label: &'static str,
    months: [&'static str; 12],
    day_suffix: &'static str,
    pub institution_header: &'static str,
    pub default_address: &'static str,
    pub generic_recipient: &'static str,
    pub archive_prefix: &'static str,
    pub document_prefix: &'static str,
}

static GERMAN: LetterLocale = LetterLocale {
    code: LocaleCode::De,
    female_greeting: "Sehr geehrte Frau",
    male_greeting: "Sehr geehrter Herr",
    neutral_greeting: "Sehr geehrte Damen und Herren,",
    salutation_openers: &["sehr geehrte"],
    closing: "Mit freundlichen Grüßen",
    process_id_label: "Vorgangs-ID",
    page_label: "Seite",
    months: [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ],
    day_suffix: ".",
    institution_header: "Deutscher Bundestag",
    default_address: "Platz der Republik 1\n11011 Berlin",
    generic_recipient: "Mitglied des Deutschen Bundestages",
    archive_prefix: "Briefe",
    document_prefix: "Brief",
};

static ENGLISH: LetterLocale = LetterLocale {
    code: LocaleCode::En,
    female_greeting: "Dear Ms.",
    male_greeting: "Dear Mr.",
    neutral_greeting: "Dear Sir or Madam,",
    salutation_openers: &["dear "],
    closing: "Yours sincerely",
    process_id_label: "Process ID",
    page_label: "Page",
    months: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    day_suffix: "",
    institution_header: "Deutscher Bundestag",
    default_address: "Platz der Republik 1\n11011 Berlin",
    generic_recipient: "Member of Parliament",
    archive_prefix: "Letters",
    document_prefix: "Letter",
};

impl LetterLocale {
    pub fn for_code(code: LocaleCode) -> &'static LetterLocale {
        match code {
            LocaleCode::De => &GERMAN,
            LocaleCode::En => &ENGLISH,
        }
    }

    pub fn german() -> &'static LetterLocale {
        &GERMAN
    }

    pub fn english() -> &'static LetterLocale {
        &ENGLISH
    }

    /// Long-form date, e.g. "18. Oktober 2026" or "18 October 2026".
    pub fn format_date(&self, date: NaiveDate) -> String {
        format!(
            "{}{} {} {}",
            date.day(),
            self.day_suffix,
            self.months[date.month0() as usize],
            date.year()
        )
    }

    /// True if `line` opens with one of the locale's salutation phrases.
    pub fn is_salutation_line(&self, line: &str) -> bool {
        let normalized = line
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        self.salutation_openers
            .iter()
            .any(|opener| normalized.starts_with(opener))
    }
}
