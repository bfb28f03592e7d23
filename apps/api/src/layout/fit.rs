//! Fit-to-page decision for the letter body.
//!
//! The body first tries the baseline size. If it does not fit the space left on
//! the first page, the size drops in fixed steps to the floor, then the line gap
//! tightens to its minimum. The first combination that fits wins. When nothing
//! fits the smallest setting is used and the renderer continues on new pages.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::StandardFont;
use crate::layout::wrap::measure_height;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitPolicy {
    pub baseline_size: f32,
    pub floor_size: f32,
    pub size_step: f32,
    pub baseline_gap: f32,
    pub floor_gap: f32,
    pub gap_step: f32,
}

impl Default for FitPolicy {
    fn default() -> Self {
        FitPolicy {
            baseline_size: 11.0,
            floor_size: 9.0,
            size_step: 0.5,
            baseline_gap: 2.0,
            floor_gap: 1.0,
            gap_step: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitVerdict {
    /// Body fits at the baseline size and gap.
    FitsAtBaseline,
    /// Body fits after shrinking the size and/or the gap.
    Shrunk,
    /// Body does not fit even at the floor and continues on further pages.
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDecision {
    pub font_size: f32,
    pub line_gap: f32,
    /// Height the body needs at the chosen setting, in points.
    pub body_height: f32,
    pub available_height: f32,
    pub verdict: FitVerdict,
}

// ────────────────────────────────────────────────────────────────────────────
// Core
// ────────────────────────────────────────────────────────────────────────────

impl FitPolicy {
    /// Font sizes to try, largest first, ending exactly on the floor.
    fn sizes(&self) -> Vec<f32> {
        descending_steps(self.baseline_size, self.floor_size, self.size_step)
    }

    /// Line gaps to try at the floor size, after the baseline gap.
    fn tightened_gaps(&self) -> Vec<f32> {
        descending_steps(self.baseline_gap, self.floor_gap, self.gap_step)
            .into_iter()
            .skip(1)
            .collect()
    }
}

fn descending_steps(start: f32, floor: f32, step: f32) -> Vec<f32> {
    let mut values = Vec::new();
    let mut i = 0u32;
    loop {
        let v = start - step * i as f32;
        if v <= floor + f32::EPSILON || step <= 0.0 {
            values.push(floor);
            break;
        }
        values.push(v);
        i += 1;
    }
    values
}

/// Picks the largest font size, then the largest line gap, at which `reserved`
/// plus the wrapped body fits into `available_height`.
///
/// `reserved` is extra height that must share the same page (for example the
/// closing block when the caller wants them together); pass `0.0` for none.
pub fn choose_body_fit(
    body: &str,
    max_width: f32,
    available_height: f32,
    reserved: f32,
    policy: &FitPolicy,
) -> FitDecision {
    let font = StandardFont::TimesRoman;
    let measure = |size: f32, gap: f32| measure_height(body, font, size, gap, max_width);

    for size in policy.sizes() {
        let height = measure(size, policy.baseline_gap);
        if height + reserved <= available_height {
            let verdict = if size == policy.baseline_size {
                FitVerdict::FitsAtBaseline
            } else {
                FitVerdict::Shrunk
            };
            return FitDecision {
                font_size: size,
                line_gap: policy.baseline_gap,
                body_height: height,
                available_height,
                verdict,
            };
        }
    }

    for gap in policy.tightened_gaps() {
        let height = measure(policy.floor_size, gap);
        if height + reserved <= available_height {
            return FitDecision {
                font_size: policy.floor_size,
                line_gap: gap,
                body_height: height,
                available_height,
                verdict: FitVerdict::Shrunk,
            };
        }
    }

    FitDecision {
        font_size: policy.floor_size,
        line_gap: policy.floor_gap,
        body_height: measure(policy.floor_size, policy.floor_gap),
        available_height,
        verdict: FitVerdict::Overflow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::wrap::line_height;

    #[test]
    fn test_sizes_step_from_baseline_to_floor() {
        let policy = FitPolicy::default();
        assert_eq!(policy.sizes(), vec![11.0, 10.5, 10.0, 9.5, 9.0]);
        assert_eq!(policy.tightened_gaps(), vec![1.5, 1.0]);
    }

    #[test]
    fn test_short_body_fits_at_baseline() {
        let d = choose_body_fit("Kurzer Text.", 450.0, 400.0, 0.0, &FitPolicy::default());
        assert_eq!(d.verdict, FitVerdict::FitsAtBaseline);
        assert_eq!(d.font_size, 11.0);
        assert_eq!(d.line_gap, 2.0);
    }

    #[test]
    fn test_body_shrinks_until_it_fits() {
        // Ten short lines: at 11pt/2gap = 10 * 14.65 = 146.5pt; at 10pt/2gap = 135pt.
        let body = vec!["Zeile"; 10].join("\n");
        let available = 10.0 * line_height(10.0, 2.0) + 0.5;
        let d = choose_body_fit(&body, 450.0, available, 0.0, &FitPolicy::default());
        assert_eq!(d.verdict, FitVerdict::Shrunk);
        assert_eq!(d.font_size, 10.0);
        assert_eq!(d.line_gap, 2.0);
    }

    #[test]
    fn test_gap_tightens_after_floor() {
        let body = vec!["Zeile"; 10].join("\n");
        let available = 10.0 * line_height(9.0, 1.5) + 0.1;
        let d = choose_body_fit(&body, 450.0, available, 0.0, &FitPolicy::default());
        assert_eq!(d.font_size, 9.0);
        assert_eq!(d.line_gap, 1.5);
        assert_eq!(d.verdict, FitVerdict::Shrunk);
    }

    #[test]
    fn test_overflow_never_goes_below_floor() {
        let body = vec!["Zeile"; 200].join("\n");
        let d = choose_body_fit(&body, 450.0, 300.0, 0.0, &FitPolicy::default());
        assert_eq!(d.verdict, FitVerdict::Overflow);
        assert_eq!(d.font_size, 9.0);
        assert_eq!(d.line_gap, 1.0);
        assert!(d.body_height > d.available_height);
    }

    #[test]
    fn test_reserved_height_counts_against_space() {
        let body = "Zeile";
        let available = line_height(11.0, 2.0) + 1.0;
        let fits = choose_body_fit(body, 450.0, available, 0.0, &FitPolicy::default());
        assert_eq!(fits.verdict, FitVerdict::FitsAtBaseline);
        let shrunk = choose_body_fit(body, 450.0, available, 2.0, &FitPolicy::default());
        assert_eq!(shrunk.verdict, FitVerdict::Shrunk);
    }
}
