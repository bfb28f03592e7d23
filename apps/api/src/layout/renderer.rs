//! Letter layout — places every text run of one letter on A4 pages.
//!
//! # Architecture
//! - `layout_letter` is a pure, synchronous pass that returns a [`LetterLayout`]
//!   (pages of positioned text items plus a [`RenderReport`]).
//! - `pdf::write_pdf` serializes that plan; the two halves share only the metric tables.
//! - `render_letter` chains both and is what callers run inside `spawn_blocking`.
//!
//! # Pass order
//! sender header → window sender line → recipient block → subject → body
//! (fit-to-page, then continuation pages) → closing + signature → footers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::{compose_letter_body, normalize_address};
use crate::layout::fit::{choose_body_fit, FitPolicy, FitVerdict};
use crate::layout::font_metrics::StandardFont;
use crate::layout::geometry::PageGeometry;
use crate::layout::pdf::write_pdf;
use crate::layout::wrap::{line_height, truncate_with_ellipsis, wrap_text};
use crate::locale::LetterLocale;
use crate::models::{RecipientProfile, SenderProfile};

/// Distance from a line's top to its baseline, as a fraction of the font size.
const ASCENT_RATIO: f32 = 0.683;
/// `#555` as a grey level.
const MUTED_GRAY: f32 = 0.333;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("letter layout produced no pages")]
    NoPages,
}

/// Everything needed to lay out one recipient's letter.
#[derive(Debug, Clone)]
pub struct LetterContent {
    pub queue_id: String,
    pub date: NaiveDate,
    pub sender: SenderProfile,
    pub recipient: RecipientProfile,
    pub subject: String,
    /// Personalized body text, before address/salutation clean-up.
    pub body: String,
    /// Resolved salutation for this recipient; blank falls back to the neutral greeting.
    pub salutation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextRole {
    Header,
    SenderLine,
    Address,
    Subject,
    Body,
    Closing,
    Footer,
}

/// One positioned run of text. `baseline` is measured from the top of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub x: f32,
    pub baseline: f32,
    pub text: String,
    pub font: StandardFont,
    pub size: f32,
    /// Fill grey level, 0.0 = black.
    pub gray: f32,
    pub role: TextRole,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub items: Vec<TextItem>,
}

/// What the fit-to-page step decided, for callers and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderReport {
    pub font_size: f32,
    pub line_gap: f32,
    pub pages: usize,
    pub verdict: FitVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterLayout {
    pub pages: Vec<PageLayout>,
    /// Body after clean-up and salutation insertion, exactly as placed.
    pub body_text: String,
    pub report: RenderReport,
}

impl LetterLayout {
    #[cfg(test)]
    pub fn items_with_role(&self, role: TextRole) -> impl Iterator<Item = &TextItem> {
        self.pages
            .iter()
            .flat_map(|p| p.items.iter())
            .filter(move |item| item.role == role)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry points
// ────────────────────────────────────────────────────────────────────────────

/// Lays out and serializes one letter. Returns the PDF bytes and the fit report.
///
/// CPU-bound: async callers should run this inside `tokio::task::spawn_blocking`.
pub fn render_letter(
    content: &LetterContent,
    locale: &LetterLocale,
) -> Result<(Vec<u8>, RenderReport), RenderError> {
    let geometry = PageGeometry::a4();
    let layout = layout_letter(content, locale, &geometry, &FitPolicy::default());
    if layout.pages.is_empty() {
        return Err(RenderError::NoPages);
    }
    let bytes = write_pdf(&layout, &geometry);
    debug!(
        queue_id = %content.queue_id,
        pages = layout.report.pages,
        font_size = layout.report.font_size,
        bytes = bytes.len(),
        "Letter rendered"
    );
    Ok((bytes, layout.report))
}

/// Computes the full page plan for one letter.
pub fn layout_letter(
    content: &LetterContent,
    locale: &LetterLocale,
    geometry: &PageGeometry,
    policy: &FitPolicy,
) -> LetterLayout {
    let mut cursor = PageCursor::new(geometry);
    let body_size = policy.baseline_size;

    // 1. Sender block, right-aligned at the top of the first page.
    let process_line = format!("{}: {}", locale.process_id_label, content.queue_id);
    let header_lines = [
        content.sender.full_name(),
        content.sender.street.trim().to_string(),
        content.sender.locality(),
        String::new(),
        locale.format_date(content.date),
        process_line,
    ];
    let header_lh = line_height(geometry.header_size, 0.0);
    let mut y = geometry.header_top;
    for line in &header_lines {
        for wrapped in wrap_text(line, StandardFont::TimesRoman, geometry.header_size, geometry.usable_width()) {
            if !wrapped.is_empty() {
                let width = StandardFont::TimesRoman
                    .metrics()
                    .width_pt(&wrapped, geometry.header_size);
                cursor.push(TextItem {
                    x: geometry.usable_right() - width,
                    baseline: y + geometry.header_size * ASCENT_RATIO,
                    text: wrapped,
                    font: StandardFont::TimesRoman,
                    size: geometry.header_size,
                    gray: 0.0,
                    role: TextRole::Header,
                });
            }
            y += header_lh;
        }
    }

    // 2. One-line return address inside the envelope window.
    let window_text_width = geometry.window.width - 2.0 * geometry.window_padding_x;
    let sender_line = truncate_with_ellipsis(
        &content.sender.summary_line(),
        StandardFont::TimesRoman,
        geometry.sender_line_size,
        window_text_width,
    );
    if !sender_line.is_empty() {
        cursor.push(TextItem {
            x: geometry.window.left + geometry.window_padding_x,
            baseline: geometry.window.top
                + geometry.window_padding_y
                + geometry.sender_line_size * ASCENT_RATIO,
            text: sender_line,
            font: StandardFont::TimesRoman,
            size: geometry.sender_line_size,
            gray: MUTED_GRAY,
            role: TextRole::SenderLine,
        });
    }

    // 3. Recipient block.
    let mut address_lines = Vec::new();
    let recipient_name = content.recipient.name.trim();
    if !recipient_name.is_empty() {
        address_lines.push(recipient_name.to_string());
    }
    address_lines.extend(normalize_address(
        &content.recipient.address,
        locale.institution_header,
    ));
    let address_lh = line_height(body_size, 0.0);
    let mut y = geometry.address_top;
    for line in &address_lines {
        for wrapped in wrap_text(line, StandardFont::TimesRoman, body_size, geometry.address_width) {
            cursor.push(TextItem {
                x: geometry.usable_left(),
                baseline: y + body_size * ASCENT_RATIO,
                text: wrapped,
                font: StandardFont::TimesRoman,
                size: body_size,
                gray: 0.0,
                role: TextRole::Address,
            });
            y += address_lh;
        }
    }

    // 4. Subject.
    let mut y = y + geometry.subject_gap;
    let subject = content.subject.trim();
    if !subject.is_empty() {
        for wrapped in wrap_text(subject, StandardFont::TimesBold, body_size, geometry.usable_width()) {
            cursor.push(TextItem {
                x: geometry.usable_left(),
                baseline: y + body_size * ASCENT_RATIO,
                text: wrapped,
                font: StandardFont::TimesBold,
                size: body_size,
                gray: 0.0,
                role: TextRole::Subject,
            });
            y += address_lh;
        }
        y += geometry.body_gap;
    }

    // 5. Body clean-up.
    let body_text = compose_letter_body(&content.body, &content.salutation, locale);

    // 6. Fit the body into what is left of page one, then flow.
    let available = geometry.content_bottom() - y;
    let decision = choose_body_fit(&body_text, geometry.usable_width(), available, 0.0, policy);
    let size = decision.font_size;
    let lh = line_height(size, decision.line_gap);
    cursor.y = y;
    for line in wrap_text(&body_text, StandardFont::TimesRoman, size, geometry.usable_width()) {
        if cursor.y + lh > geometry.content_bottom() {
            cursor.new_page();
            if line.is_empty() {
                continue;
            }
        }
        if !line.is_empty() {
            let baseline = cursor.y + size * ASCENT_RATIO;
            cursor.push(TextItem {
                x: geometry.usable_left(),
                baseline,
                text: line,
                font: StandardFont::TimesRoman,
                size,
                gray: 0.0,
                role: TextRole::Body,
            });
        }
        cursor.y += lh;
    }

    // 7. Closing and signature, kept together on one page.
    let signature = [
        String::new(),
        locale.closing.to_string(),
        String::new(),
        String::new(),
        content.sender.full_name(),
        content.sender.street.trim().to_string(),
        content.sender.locality(),
    ];
    let block_height = signature.len() as f32 * lh;
    if cursor.y + block_height > geometry.content_bottom() {
        cursor.new_page();
    }
    for line in signature {
        if !line.is_empty() {
            cursor.push(TextItem {
                x: geometry.usable_left(),
                baseline: cursor.y + size * ASCENT_RATIO,
                text: line,
                font: StandardFont::TimesRoman,
                size,
                gray: 0.0,
                role: TextRole::Closing,
            });
        }
        cursor.y += lh;
    }

    // 8. Footer stamp once the page count is known.
    let mut pages = cursor.finish();
    let total = pages.len();
    let footer_font = StandardFont::TimesRoman;
    for (i, page) in pages.iter_mut().enumerate() {
        let text = format!(
            "{}: {} · {} {}/{}",
            locale.process_id_label,
            content.queue_id,
            locale.page_label,
            i + 1,
            total
        );
        let width = footer_font.metrics().width_pt(&text, geometry.footer_size);
        page.items.push(TextItem {
            x: geometry.usable_left() + (geometry.usable_width() - width) / 2.0,
            baseline: geometry.footer_baseline,
            text,
            font: footer_font,
            size: geometry.footer_size,
            gray: MUTED_GRAY,
            role: TextRole::Footer,
        });
    }

    LetterLayout {
        report: RenderReport {
            font_size: decision.font_size,
            line_gap: decision.line_gap,
            pages: total,
            verdict: decision.verdict,
        },
        pages,
        body_text,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Tracks the page being filled and the vertical write position on it.
struct PageCursor {
    pages: Vec<PageLayout>,
    y: f32,
    top: f32,
}

impl PageCursor {
    fn new(geometry: &PageGeometry) -> Self {
        PageCursor {
            pages: vec![PageLayout::default()],
            y: geometry.margin_top,
            top: geometry.margin_top,
        }
    }

    fn push(&mut self, item: TextItem) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.y = self.top;
    }

    fn finish(self) -> Vec<PageLayout> {
        self.pages
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

    fn make_recipient() -> RecipientProfile {
        RecipientProfile {
            name: "Erika Beispiel".to_string(),
            address: "Platz der Republik 1\n11011 Berlin".to_string(),
            affiliation: None,
            salutation: None,
            region: None,
        }
    }

    fn make_content(body: &str, salutation: &str) -> LetterContent {
        LetterContent {
            queue_id: "AB12CD".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            sender: make_sender(),
            recipient: make_recipient(),
            subject: "Energy Policy".to_string(),
            body: body.to_string(),
            salutation: salutation.to_string(),
        }
    }

    fn layout(content: &LetterContent, locale: &LetterLocale) -> LetterLayout {
        layout_letter(content, locale, &PageGeometry::a4(), &FitPolicy::default())
    }

    fn strip_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn body_chars(layout: &LetterLayout) -> String {
        layout
            .items_with_role(TextRole::Body)
            .map(|i| strip_ws(&i.text))
            .collect()
    }

    #[test]
    fn test_energy_policy_example_body_starts_with_neutral_greeting() {
        let content = make_content(
            "Dear Sir or Madam,\n\nPlease support renewable incentives.",
            "Dear Sir or Madam,",
        );
        let out = layout(&content, LetterLocale::english());
        assert!(out
            .body_text
            .starts_with("Dear Sir or Madam,\n\nPlease support renewable incentives."));

        let body: Vec<&TextItem> = out.items_with_role(TextRole::Body).collect();
        assert_eq!(body[0].text, "Dear Sir or Madam,");
        assert_eq!(body[1].text, "Please support renewable incentives.");
        let lh = line_height(out.report.font_size, out.report.line_gap);
        assert!((body[1].baseline - body[0].baseline - 2.0 * lh).abs() < 1e-3);

        assert_eq!(out.report.pages, 1);
        assert_eq!(out.report.verdict, FitVerdict::FitsAtBaseline);
        assert_eq!(out.report.font_size, 11.0);
    }

    #[test]
    fn test_header_block_is_right_aligned_with_date_and_process_id() {
        let out = layout(&make_content("Text.", ""), LetterLocale::german());
        let header: Vec<&TextItem> = out.items_with_role(TextRole::Header).collect();
        let texts: Vec<&str> = header.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Max Mustermann",
                "Hauptstraße 1",
                "10115 Berlin",
                "5. März 2026",
                "Vorgangs-ID: AB12CD"
            ]
        );
        let right = PageGeometry::a4().usable_right();
        for item in header {
            let end = item.x + item.font.metrics().width_pt(&item.text, item.size);
            assert!((end - right).abs() < 1e-2);
        }
    }

    #[test]
    fn test_address_block_starts_with_name_then_header() {
        let out = layout(&make_content("Text.", ""), LetterLocale::german());
        let lines: Vec<&str> = out
            .items_with_role(TextRole::Address)
            .map(|i| i.text.as_str())
            .collect();
        assert_eq!(
            lines,
            vec![
                "Erika Beispiel",
                "Deutscher Bundestag",
                "Platz der Republik 1",
                "11011 Berlin"
            ]
        );
    }

    #[test]
    fn test_sender_line_sits_inside_window() {
        let g = PageGeometry::a4();
        let mut content = make_content("Text.", "");
        content.sender.street = "Eine außerordentlich lange Straßenbezeichnung mit Zusatz 12a".to_string();
        let out = layout(&content, LetterLocale::german());
        let item = out
            .items_with_role(TextRole::SenderLine)
            .next()
            .expect("sender line present");
        let end = item.x + item.font.metrics().width_pt(&item.text, item.size);
        assert!(item.x >= g.window.left && end <= g.window.right());
        assert!(item.baseline > g.window.top && item.baseline < g.window.bottom());
        assert!(item.text.ends_with('…'));
    }

    #[test]
    fn test_long_body_shrinks_below_baseline_but_not_below_floor() {
        let lines: Vec<String> = (1..=36).map(|i| format!("Zeile {i}")).collect();
        let content = make_content(&lines.join("\n"), "Sehr geehrte Frau Beispiel,");
        let out = layout(&content, LetterLocale::german());
        assert_eq!(out.report.verdict, FitVerdict::Shrunk);
        assert!(out.report.font_size < 11.0);
        assert!(out.report.font_size >= 9.0);
        assert_eq!(body_chars(&out), strip_ws(&out.body_text));
    }

    #[test]
    fn test_overflow_flows_to_new_pages_without_dropping_text() {
        let paragraph = "Die Energiewende braucht verlässliche Rahmenbedingungen für Bürgerinnen und Bürger. ";
        let body = vec![paragraph.repeat(4); 30].join("\n\n");
        let out = layout(&make_content(&body, ""), LetterLocale::german());

        assert_eq!(out.report.verdict, FitVerdict::Overflow);
        assert_eq!(out.report.font_size, 9.0);
        assert!(out.report.pages > 1);
        assert_eq!(body_chars(&out), strip_ws(&out.body_text));

        let bottom = PageGeometry::a4().content_bottom();
        for item in out.items_with_role(TextRole::Body) {
            assert!(item.baseline < bottom);
        }
    }

    #[test]
    fn test_closing_block_stays_on_one_page() {
        let paragraph = "Bitte unterstützen Sie das Vorhaben. ".repeat(6);
        let body = vec![paragraph; 24].join("\n\n");
        let out = layout(&make_content(&body, ""), LetterLocale::german());
        let pages_with_closing: Vec<usize> = out
            .pages
            .iter()
            .enumerate()
            .filter(|(_, p)| p.items.iter().any(|i| i.role == TextRole::Closing))
            .map(|(n, _)| n)
            .collect();
        assert_eq!(pages_with_closing.len(), 1);
        let closing: Vec<&str> = out
            .items_with_role(TextRole::Closing)
            .map(|i| i.text.as_str())
            .collect();
        assert_eq!(
            closing,
            vec!["Mit freundlichen Grüßen", "Max Mustermann", "Hauptstraße 1", "10115 Berlin"]
        );
    }

    #[test]
    fn test_every_page_has_numbered_footer() {
        let body = vec!["Absatz mit etwas Text."; 150].join("\n\n");
        let out = layout(&make_content(&body, ""), LetterLocale::german());
        let total = out.pages.len();
        assert!(total > 1);
        for (i, page) in out.pages.iter().enumerate() {
            let footer = page
                .items
                .iter()
                .find(|item| item.role == TextRole::Footer)
                .expect("footer present");
            assert_eq!(
                footer.text,
                format!("Vorgangs-ID: AB12CD · Seite {}/{}", i + 1, total)
            );
        }
    }

    #[test]
    fn test_render_letter_produces_pdf_bytes() {
        let (bytes, report) =
            render_letter(&make_content("Text.", ""), LetterLocale::german()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(report.pages, 1);
    }
}
