use crate::submission::SubmissionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Submission pipeline; owns the counter store and the delivery channel.
    pub submissions: SubmissionService,
}
