pub mod recipient;
pub mod submission;

pub use recipient::{RecipientInput, RecipientProfile};
pub use submission::{SenderProfile, SubmissionRequest};
