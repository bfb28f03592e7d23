//! Static glyph-width tables for the two standard PDF fonts the letters use.
//!
//! Widths are the Adobe core-font metrics in em units (1/1000 text space).
//! Because the fonts are the PDF standard 14, no font program is embedded and
//! these tables are the only measurement source, so layout and output agree.
//! Tables cover ASCII 0x20..=0x7E; index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Fonts
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardFont {
    TimesRoman,
    TimesBold,
}

impl StandardFont {
    /// PostScript name written into the PDF font dictionary.
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
        }
    }

    /// Resource name used in page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "F1",
            StandardFont::TimesBold => "F2",
        }
    }

    pub fn metrics(self) -> &'static FontMetricTable {
        match self {
            StandardFont::TimesRoman => &TIMES_ROMAN_TABLE,
            StandardFont::TimesBold => &TIMES_BOLD_TABLE,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Metric table
// ────────────────────────────────────────────────────────────────────────────

pub struct FontMetricTable {
    pub font: StandardFont,
    widths: [f32; 95],
    /// Fallback for characters with no table entry and no Latin-1 base letter.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of a single character in em units.
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            return self.widths[code - 32];
        }
        match c {
            '\u{00A0}' => self.space_width,
            '·' | '‚' | '’' | '‘' | '‹' | '›' | 'ˆ' | '˜' => 0.333,
            '„' | '“' | '”' => 0.444,
            '–' | '€' | 'ß' | '†' | '‡' | 'ƒ' => 0.5,
            'œ' => 0.722,
            'Œ' => 0.889,
            '™' => 0.98,
            '—' | '…' | '‰' => 1.0,
            _ => latin_base(c)
                .map(|base| self.char_width(base))
                .unwrap_or(self.average_char_width),
        }
    }

    /// Measures a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Measures a string in points at `size_pt`.
    pub fn width_pt(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_str(s) * size_pt
    }
}

/// Maps accented Latin letters (Latin-1 and Latin Extended-A) to their base
/// letter. Used for advance widths and to transliterate letters WinAnsi lacks.
pub fn latin_base(c: char) -> Option<char> {
    let base = match c {
        'À'..='Å' | 'Ā' | 'Ă' | 'Ą' => 'A',
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'Ç' | 'Ć' | 'Ĉ' | 'Ċ' | 'Č' => 'C',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'Ď' | 'Đ' => 'D',
        'ď' | 'đ' => 'd',
        'È'..='Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => 'E',
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => 'G',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'Ĥ' | 'Ħ' => 'H',
        'ĥ' | 'ħ' => 'h',
        'Ì'..='Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => 'I',
        'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'Ĵ' => 'J',
        'ĵ' => 'j',
        'Ķ' => 'K',
        'ķ' => 'k',
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => 'L',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' => 'N',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'Ò'..='Ö' | 'Ø' | 'Ō' | 'Ŏ' | 'Ő' => 'O',
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'Ŕ' | 'Ŗ' | 'Ř' => 'R',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'Ś' | 'Ŝ' | 'Ş' | 'Š' | 'Ș' => 'S',
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => 's',
        'Ţ' | 'Ť' | 'Ŧ' | 'Ț' => 'T',
        'ţ' | 'ť' | 'ŧ' | 'ț' => 't',
        'Ù'..='Ü' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => 'U',
        'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'Ŵ' => 'W',
        'ŵ' => 'w',
        'Ý' | 'Ŷ' | 'Ÿ' => 'Y',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'Ź' | 'Ż' | 'Ž' => 'Z',
        'ź' | 'ż' | 'ž' => 'z',
        _ => return None,
    };
    Some(base)
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables
// ────────────────────────────────────────────────────────────────────────────

static TIMES_ROMAN_TABLE: FontMetricTable = FontMetricTable {
    font: StandardFont::TimesRoman,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.250, 0.333, 0.408, 0.500, 0.500, 0.833, 0.778, 0.333, 0.333, 0.333, 0.500, 0.564, 0.250, 0.333, 0.250, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.564, 0.564, 0.564, 0.444, 0.921,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.667, 0.667, 0.722, 0.611, 0.556, 0.722, 0.722, 0.333, 0.389, 0.722, 0.611, 0.889,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.722, 0.556, 0.722, 0.667, 0.556, 0.611, 0.722, 0.722, 0.944, 0.722, 0.722, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.469, 0.500, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.444, 0.500, 0.444, 0.500, 0.444, 0.333, 0.500, 0.500, 0.278, 0.278, 0.500, 0.278, 0.778,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.500, 0.500, 0.500, 0.500, 0.333, 0.389, 0.278, 0.500, 0.500, 0.722, 0.500, 0.500, 0.444,
        // {      |      }      ~
        0.480, 0.200, 0.480, 0.541,
    ],
    average_char_width: 0.46,
    space_width: 0.250,
};

static TIMES_BOLD_TABLE: FontMetricTable = FontMetricTable {
    font: StandardFont::TimesBold,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.250, 0.333, 0.555, 0.500, 0.500, 1.000, 0.833, 0.333, 0.333, 0.333, 0.500, 0.570, 0.250, 0.333, 0.250, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.570, 0.570, 0.570, 0.500, 0.930,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.778, 0.389, 0.500, 0.778, 0.667, 0.944,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.611, 0.778, 0.722, 0.556, 0.667, 0.722, 0.722, 1.000, 0.722, 0.722, 0.667,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.581, 0.500, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.500, 0.556, 0.444, 0.556, 0.444, 0.333, 0.500, 0.556, 0.278, 0.333, 0.556, 0.278, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.500, 0.556, 0.556, 0.444, 0.389, 0.333, 0.556, 0.500, 0.722, 0.500, 0.500, 0.444,
        // {      |      }      ~
        0.394, 0.220, 0.394, 0.520,
    ],
    average_char_width: 0.49,
    space_width: 0.250,
};
