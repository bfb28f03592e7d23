//! Page geometry for DIN A4 letters with a DIN 5008 style address window.
//!
//! Every constant is specified in millimetres and converted with [`mm`] only,
//! so the window, margins and content positions share one conversion.

/// Millimetres to PDF points (1/72 inch).
pub fn mm(x: f32) -> f32 {
    x * 72.0 / 25.4
}

/// A rectangle in points, measured from the page's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    /// Top of the right-aligned sender block.
    pub header_top: f32,
    /// Envelope window.
    pub window: Frame,
    /// Inner padding of the one-line sender summary inside the window.
    pub window_padding_x: f32,
    pub window_padding_y: f32,
    /// Recipient block origin and width.
    pub address_top: f32,
    pub address_width: f32,
    /// Gap between the address block and the subject.
    pub subject_gap: f32,
    /// Gap between the subject and the body.
    pub body_gap: f32,
    /// Baseline of the footer stamp, from the top.
    pub footer_baseline: f32,
    pub header_size: f32,
    pub sender_line_size: f32,
    pub footer_size: f32,
}

impl PageGeometry {
    pub fn a4() -> Self {
        PageGeometry {
            page_width: mm(210.0),
            page_height: mm(297.0),
            margin_top: mm(18.0),
            margin_left: mm(20.0),
            margin_right: mm(20.0),
            margin_bottom: mm(18.0),
            header_top: mm(15.0),
            window: Frame {
                left: mm(20.0),
                top: mm(45.0),
                width: mm(90.0),
                height: mm(45.0),
            },
            window_padding_x: mm(2.0),
            window_padding_y: mm(1.5),
            address_top: mm(52.0),
            address_width: mm(85.0),
            subject_gap: mm(10.0),
            body_gap: mm(8.0),
            footer_baseline: mm(297.0 - 10.0),
            header_size: 12.0,
            sender_line_size: 7.5,
            footer_size: 8.0,
        }
    }

    pub fn usable_left(&self) -> f32 {
        self.margin_left
    }

    pub fn usable_right(&self) -> f32 {
        self.page_width - self.margin_right
    }

    pub fn usable_width(&self) -> f32 {
        self.usable_right() - self.usable_left()
    }

    /// Lowest y (from the top) that body text may reach.
    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.margin_bottom
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}
