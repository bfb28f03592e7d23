//! Greedy word wrap against the static metric tables.
//!
//! Hard line breaks in the source are kept; an empty source line becomes an
//! empty output line. Words wider than the line are split between characters
//! rather than clipped, so wrapping never drops text.

use crate::layout::font_metrics::StandardFont;

/// Line advance for a given size and extra gap, in points.
pub const LEADING_RATIO: f32 = 1.15;

pub fn line_height(size_pt: f32, line_gap: f32) -> f32 {
    size_pt * LEADING_RATIO + line_gap
}

/// Wraps `text` to `max_width` points. Returns one string per printed line.
pub fn wrap_text(text: &str, font: StandardFont, size_pt: f32, max_width: f32) -> Vec<String> {
    let metrics = font.metrics();
    let space_w = metrics.space_width * size_pt;
    let mut lines = Vec::new();

    for source_line in text.split('\n') {
        let words: Vec<&str> = source_line.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in words {
            let word_w = metrics.width_pt(word, size_pt);

            if word_w > max_width {
                // Flush what we have, then hard-split the oversized word.
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                let mut chunks = split_word(word, font, size_pt, max_width);
                if let Some(last) = chunks.pop() {
                    lines.extend(chunks);
                    current_width = metrics.width_pt(&last, size_pt);
                    current = last;
                }
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_width = word_w;
            } else if current_width + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_width += space_w + word_w;
            }
        }
        lines.push(current);
    }

    lines
}

/// Splits a single word into chunks that each fit `max_width`. At least one char per chunk.
fn split_word(word: &str, font: StandardFont, size_pt: f32, max_width: f32) -> Vec<String> {
    let metrics = font.metrics();
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut width = 0.0_f32;

    for c in word.chars() {
        let cw = metrics.char_width(c) * size_pt;
        if !chunk.is_empty() && width + cw > max_width {
            chunks.push(std::mem::take(&mut chunk));
            width = 0.0;
        }
        chunk.push(c);
        width += cw;
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}

/// Height of `text` once wrapped, in points.
pub fn measure_height(
    text: &str,
    font: StandardFont,
    size_pt: f32,
    line_gap: f32,
    max_width: f32,
) -> f32 {
    wrap_text(text, font, size_pt, max_width).len() as f32 * line_height(size_pt, line_gap)
}

/// Shortens `text` with a trailing ellipsis until it fits `max_width`.
pub fn truncate_with_ellipsis(text: &str, font: StandardFont, size_pt: f32, max_width: f32) -> String {
    let metrics = font.metrics();
    if metrics.width_pt(text, size_pt) <= max_width {
        return text.to_string();
    }

    let ellipsis_w = metrics.width_pt("…", size_pt);
    let mut kept = String::new();
    let mut width = 0.0_f32;
    for c in text.chars() {
        let cw = metrics.char_width(c) * size_pt;
        if width + cw + ellipsis_w > max_width {
            break;
        }
        kept.push(c);
        width += cw;
    }
    format!("{}…", kept.trim_end())
}
