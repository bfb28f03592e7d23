//! Address normalization and body clean-up heuristics.
//!
//! Senders often paste the recipient's address and a salutation into the letter
//! text. The renderer places both itself, so these functions remove the pasted
//! copies and canonicalize the postal block. Everything here is pure text sniffing.

use std::sync::LazyLock;

use regex::Regex;

use crate::locale::LetterLocale;

/// Street of the parliament's default postal address.
const INSTITUTION_STREET: &str = "platz der republik";

/// Five-digit postal code followed by the capital.
static CAPITAL_POSTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{5}\s+Berlin\b").expect("Invalid capital postcode regex")
});

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n\s*").expect("Invalid paragraph break regex"));

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("Invalid blank line regex"));

pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Canonical postal block: trimmed non-empty lines, the institutional header first
/// and exactly once, immediate repeats collapsed.
pub fn normalize_address(raw: &str, header: &str) -> Vec<String> {
    let lines: Vec<String> = normalize_newlines(raw)
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect();

    let header_lower = header.to_lowercase();
    let is_exact_header = |l: &String| l.to_lowercase() == header_lower;

    let mut ordered: Vec<String> = Vec::with_capacity(lines.len() + 1);
    if lines.iter().any(is_exact_header) {
        ordered.push(header.to_string());
        ordered.extend(lines.into_iter().filter(|l| !is_exact_header(l)));
    } else if let Some(pos) = lines
        .iter()
        .position(|l| l.to_lowercase().contains(&header_lower))
    {
        // Header embedded in a longer line, e.g. "Deutscher Bundestag, Büro Schmidt".
        let mut rest = lines;
        let embedded = rest.remove(pos);
        ordered.push(embedded);
        ordered.extend(rest);
    } else {
        ordered.push(header.to_string());
        ordered.extend(lines);
    }

    ordered.dedup_by(|next, prev| next.eq_ignore_ascii_case(prev));
    ordered
}

/// Longest line still accepted as part of a postal block.
const MAX_ADDRESS_LINE: usize = 60;
const MAX_ADDRESS_LINES: usize = 8;

/// A few short lines, none ending like a sentence.
fn is_address_shaped(paragraph: &str) -> bool {
    let lines: Vec<&str> = paragraph
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    !lines.is_empty()
        && lines.len() <= MAX_ADDRESS_LINES
        && lines.iter().all(|l| {
            l.chars().count() <= MAX_ADDRESS_LINE
                && !l.ends_with(['.', '!', '?', ',', ':', ';'])
        })
}

/// True if a paragraph reads like a pasted recipient address.
pub fn looks_like_address(paragraph: &str, header: &str) -> bool {
    let lower = paragraph.to_lowercase();
    let mentions_institution = lower.contains(&header.to_lowercase())
        || lower.contains(INSTITUTION_STREET)
        || CAPITAL_POSTCODE.is_match(paragraph);
    mentions_institution && is_address_shaped(paragraph)
}

/// Drops a leading paragraph that looks like a pasted address. The first
/// paragraph is only ever removed when letter text follows it.
pub fn strip_recipient_paragraph(body: &str, header: &str) -> String {
    let text = normalize_newlines(body);
    let trimmed = text.trim();
    let mut paragraphs: Vec<&str> = PARAGRAPH_BREAK.split(trimmed).collect();
    match paragraphs.first() {
        Some(first) if paragraphs.len() > 1 && looks_like_address(first, header) => {
            paragraphs.remove(0);
            paragraphs.join("\n\n").trim().to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// True if the first non-blank line is a salutation in `locale`.
pub fn starts_with_salutation(body: &str, locale: &LetterLocale) -> bool {
    body.lines()
        .find(|l| !l.trim().is_empty())
        .is_some_and(|l| locale.is_salutation_line(l))
}

/// Drops a leading salutation line and the blank lines after it.
pub fn strip_leading_salutation(body: &str, locale: &LetterLocale) -> String {
    let text = normalize_newlines(body);
    let trimmed = text.trim_start();
    let (first, rest) = trimmed.split_once('\n').unwrap_or((trimmed, ""));
    if locale.is_salutation_line(first) {
        rest.trim_start().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Reduces any run of blank lines to a single blank line.
pub fn collapse_blank_lines(body: &str) -> String {
    EXCESS_BLANK_LINES.replace_all(body, "\n\n").into_owned()
}

/// Final body text for the renderer: pasted address and salutation removed,
/// then exactly one salutation paragraph in front.
///
/// `salutation` is the caller's resolved greeting; a blank value falls back to
/// the locale's neutral greeting.
pub fn compose_letter_body(body: &str, salutation: &str, locale: &LetterLocale) -> String {
    let cleaned = strip_recipient_paragraph(body, locale.institution_header);
    let cleaned = strip_leading_salutation(&cleaned, locale);
    let cleaned = collapse_blank_lines(cleaned.trim_end());

    let composed = if starts_with_salutation(&cleaned, locale) {
        cleaned
    } else {
        let greeting = if salutation.trim().is_empty() {
            locale.neutral_greeting
        } else {
            salutation.trim()
        };
        if cleaned.is_empty() {
            greeting.to_string()
        } else {
            format!("{greeting}\n\n{cleaned}")
        }
    };
    collapse_blank_lines(&composed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Deutscher Bundestag";

    fn de() -> &'static LetterLocale {
        LetterLocale::german()
    }

    // ── normalize_address ──────────────────────────────────────────────────

    #[test]
    fn test_normalize_address_inserts_missing_header() {
        let lines = normalize_address("Platz der Republik 1\n11011 Berlin", HEADER);
        assert_eq!(
            lines,
            vec!["Deutscher Bundestag", "Platz der Republik 1", "11011 Berlin"]
        );
    }

    #[test]
    fn test_normalize_address_does_not_duplicate_header() {
        let lines = normalize_address(
            "deutscher bundestag\nPlatz der Republik 1\n11011 Berlin",
            HEADER,
        );
        assert_eq!(lines.iter().filter(|l| l.eq_ignore_ascii_case(HEADER)).count(), 1);
        assert_eq!(lines[0], HEADER);
    }

    #[test]
    fn test_normalize_address_moves_header_to_top() {
        let lines = normalize_address("Platz der Republik 1\nDeutscher Bundestag\n11011 Berlin", HEADER);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_normalize_address_keeps_embedded_header_line() {
        let lines = normalize_address("Platz der Republik 1\nDeutscher Bundestag, Büro 12", HEADER);
        assert_eq!(lines[0], "Deutscher Bundestag, Büro 12");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_normalize_address_collapses_repeats_and_blanks() {
        let lines = normalize_address(
            "  Platz der Republik 1 \r\n\r\nPlatz der Republik 1\n11011   Berlin\n",
            HEADER,
        );
        assert_eq!(
            lines,
            vec!["Deutscher Bundestag", "Platz der Republik 1", "11011 Berlin"]
        );
    }

    #[test]
    fn test_normalize_address_empty_input_is_header_only() {
        assert_eq!(normalize_address("", HEADER), vec![HEADER]);
    }

    // ── strip_recipient_paragraph ──────────────────────────────────────────

    #[test]
    fn test_strip_recipient_paragraph_removes_pasted_address() {
        let body = "Erika Beispiel\nDeutscher Bundestag\nPlatz der Republik 1\n11011 Berlin\n\nSehr geehrte Frau Beispiel,\n\nText.";
        assert_eq!(
            strip_recipient_paragraph(body, HEADER),
            "Sehr geehrte Frau Beispiel,\n\nText."
        );
    }

    #[test]
    fn test_strip_recipient_paragraph_detects_postcode_pattern() {
        let body = "Frau Beispiel\n11011 Berlin\n\nText.";
        assert_eq!(strip_recipient_paragraph(body, HEADER), "Text.");
    }

    #[test]
    fn test_strip_recipient_paragraph_keeps_ordinary_text() {
        let body = "I live in 10115 Hamburg.\n\nText.";
        assert_eq!(strip_recipient_paragraph(body, HEADER), body);
    }

    #[test]
    fn test_strip_recipient_paragraph_without_paragraph_breaks() {
        // A single paragraph is the letter itself and always survives.
        let body = "Deutscher Bundestag\nPlatz der Republik 1";
        assert_eq!(strip_recipient_paragraph(body, HEADER), body);
        assert_eq!(strip_recipient_paragraph("Just one line.", HEADER), "Just one line.");
    }

    #[test]
    fn test_strip_recipient_paragraph_keeps_prose_mentioning_the_capital() {
        let body = "Ich wohne in 10115 Berlin und bitte Sie, das Solarpaket zu unterstützen.\n\nDanke.";
        assert_eq!(strip_recipient_paragraph(body, HEADER), body);
    }

    #[test]
    fn test_compose_keeps_one_paragraph_letter_intact() {
        let body = "Sehr geehrte Frau Schmidt,\nich wohne in 10115 Berlin und bitte Sie, das Solarpaket zu unterstützen.\nMit freundlichen Grüßen";
        let out = compose_letter_body(body, "Sehr geehrte Frau Schmidt,", de());
        assert!(out.contains("Solarpaket"), "body lost: {out}");
        assert!(out.contains("Mit freundlichen Grüßen"));
        assert!(out.starts_with("Sehr geehrte Frau Schmidt,"));
    }

    #[test]
    fn test_strip_recipient_paragraph_empty_body() {
        assert_eq!(strip_recipient_paragraph("", HEADER), "");
    }

    // ── salutation handling ────────────────────────────────────────────────

    #[test]
    fn test_strip_leading_salutation_removes_line_and_blank() {
        let body = "Sehr geehrte Damen und Herren,\n\n\nText folgt.";
        assert_eq!(strip_leading_salutation(body, de()), "Text folgt.");
    }

    #[test]
    fn test_strip_leading_salutation_without_trailing_text() {
        assert_eq!(strip_leading_salutation("Sehr geehrte Frau X,", de()), "");
    }

    #[test]
    fn test_strip_leading_salutation_leaves_other_text() {
        assert_eq!(strip_leading_salutation("Hallo,\n\nText", de()), "Hallo,\n\nText");
    }

    #[test]
    fn test_starts_with_salutation_skips_blank_lines() {
        assert!(starts_with_salutation("\n\n  Sehr geehrte Frau X,\nText", de()));
        assert!(!starts_with_salutation("Text", de()));
        assert!(!starts_with_salutation("", de()));
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\n \n\nc"), "a\n\nb\n\nc");
        assert_eq!(collapse_blank_lines("a\nb"), "a\nb");
    }

    // ── compose_letter_body ────────────────────────────────────────────────

    #[test]
    fn test_compose_inserts_salutation_when_missing() {
        let out = compose_letter_body("Bitte handeln Sie.", "Sehr geehrte Frau Schmidt,", de());
        assert_eq!(out, "Sehr geehrte Frau Schmidt,\n\nBitte handeln Sie.");
    }

    #[test]
    fn test_compose_replaces_existing_salutation() {
        let out = compose_letter_body(
            "Sehr geehrte Damen und Herren,\n\nBitte handeln Sie.",
            "Sehr geehrte Frau Schmidt,",
            de(),
        );
        assert_eq!(out, "Sehr geehrte Frau Schmidt,\n\nBitte handeln Sie.");
    }

    #[test]
    fn test_compose_keeps_single_salutation_when_already_correct() {
        let body = "Sehr geehrte Frau Schmidt,\n\nBitte handeln Sie.";
        let out = compose_letter_body(body, "Sehr geehrte Frau Schmidt,", de());
        assert_eq!(out, body);
        assert_eq!(out.matches("Sehr geehrte").count(), 1);
    }

    #[test]
    fn test_compose_falls_back_to_neutral_greeting() {
        let out = compose_letter_body("Text.", "  ", de());
        assert_eq!(out, "Sehr geehrte Damen und Herren,\n\nText.");
    }

    #[test]
    fn test_compose_empty_body_is_salutation_only() {
        assert_eq!(compose_letter_body("", "Dear Sir or Madam,", LetterLocale::english()), "Dear Sir or Madam,");
    }

    #[test]
    fn test_compose_strips_address_then_salutation() {
        let body = "Deutscher Bundestag\nPlatz der Republik 1\n11011 Berlin\n\nSehr geehrte Damen und Herren,\n\n\n\nText.";
        let out = compose_letter_body(body, "Sehr geehrter Herr Müller,", de());
        assert_eq!(out, "Sehr geehrter Herr Müller,\n\nText.");
    }
}
