//! Serializes a [`LetterLayout`] into PDF bytes with `pdf-writer`.
//!
//! Only the two standard Type1 Times fonts are referenced, with WinAnsi
//! encoding, so no font program is embedded. Coordinates in the layout are
//! measured from the top of the page and flipped here.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

use crate::layout::font_metrics::{latin_base, StandardFont};
use crate::layout::geometry::PageGeometry;
use crate::layout::renderer::LetterLayout;

const FONTS: [StandardFont; 2] = [StandardFont::TimesRoman, StandardFont::TimesBold];

pub fn write_pdf(layout: &LetterLayout, geometry: &PageGeometry) -> Vec<u8> {
    let mut next_id = 1;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let font_ids: Vec<Ref> = FONTS.iter().map(|_| alloc()).collect();
    let page_ids: Vec<Ref> = layout.pages.iter().map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = layout.pages.iter().map(|_| alloc()).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    for (font, id) in FONTS.iter().zip(&font_ids) {
        pdf.type1_font(*id)
            .base_font(Name(font.base_font().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (i, page_layout) in layout.pages.iter().enumerate() {
        {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, geometry.page_width, geometry.page_height))
                .parent(pages_id)
                .contents(content_ids[i]);
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            for (font, id) in FONTS.iter().zip(&font_ids) {
                fonts.pair(Name(font.resource_name().as_bytes()), *id);
            }
        }

        let mut content = Content::new();
        for item in &page_layout.items {
            let bytes = to_winansi(&item.text);
            content.set_fill_gray(item.gray);
            content
                .begin_text()
                .set_font(Name(item.font.resource_name().as_bytes()), item.size)
                .next_line(item.x, geometry.page_height - item.baseline)
                .show(Str(&bytes))
                .end_text();
        }
        pdf.stream(content_ids[i], &content.finish());
    }

    pdf.finish()
}

/// Encodes text as WinAnsi (CP-1252). Accented letters WinAnsi lacks are
/// written as their base letter; anything else becomes `?`.
pub fn to_winansi(text: &str) -> Vec<u8> {
    text.chars().map(winansi_byte).collect()
}

fn winansi_byte(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7E}' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => latin_base(c).map_or(b'?', |base| base as u8),
    }
}
