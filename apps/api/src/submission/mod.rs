pub mod coordinator;
pub mod handlers;
pub mod payload;
pub mod stats;

pub use coordinator::{CopyPolicy, SubmissionService, SubmissionSettings};
