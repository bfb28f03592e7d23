// Letter layout: metric tables, word wrap, fit-to-page, page plan, PDF output.
// Everything here is synchronous and CPU-bound; async callers must use
// tokio::task::spawn_blocking.

pub mod fit;
pub mod font_metrics;
pub mod geometry;
pub mod pdf;
pub mod renderer;
pub mod wrap;

pub use renderer::{render_letter, LetterContent, RenderError};
