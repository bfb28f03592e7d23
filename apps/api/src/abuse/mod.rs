// Abuse control: per-sender and per-origin rate limits plus duplicate suppression.
// All state lives in the injected CounterStore. Store faults never block a submission.

pub mod fingerprint;
pub mod redis_store;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::recipients::ResolvedRecipientList;

pub use fingerprint::submission_fingerprint;
pub use redis_store::RedisCounterStore;
pub use store::{CounterStore, InMemoryCounterStore, StoreError};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbuseLimits {
    pub email_max: i64,
    pub ip_max: i64,
    pub rate_window: Duration,
    pub duplicate_window: Duration,
}

impl Default for AbuseLimits {
    fn default() -> Self {
        AbuseLimits {
            email_max: 3,
            ip_max: 10,
            rate_window: Duration::from_secs(3600),
            duplicate_window: Duration::from_secs(600),
        }
    }
}

/// Why a submission was turned away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Rejection {
    RateLimitedEmail { retry_after_seconds: u64 },
    RateLimitedIp { retry_after_seconds: u64 },
    DuplicateRecent { retry_after_seconds: u64 },
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::RateLimitedEmail { .. } => "rate_limited_email",
            Rejection::RateLimitedIp { .. } => "rate_limited_ip",
            Rejection::DuplicateRecent { .. } => "duplicate_recent",
        }
    }

    pub fn retry_after_seconds(&self) -> u64 {
        match self {
            Rejection::RateLimitedEmail { retry_after_seconds }
            | Rejection::RateLimitedIp { retry_after_seconds }
            | Rejection::DuplicateRecent { retry_after_seconds } => *retry_after_seconds,
        }
    }
}

/// The fields of a submission abuse control looks at.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionIdentity<'a> {
    pub email: &'a str,
    /// Caller's network origin; empty when unknown.
    pub origin: &'a str,
    pub subject: &'a str,
    pub message: &'a str,
    pub recipients: &'a ResolvedRecipientList,
}

#[derive(Debug, Error)]
enum GuardFault {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("fingerprint encoding failed: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Guard
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AbuseGuard {
    store: Arc<dyn CounterStore>,
    limits: AbuseLimits,
}

impl AbuseGuard {
    pub fn new(store: Arc<dyn CounterStore>, limits: AbuseLimits) -> Self {
        Self { store, limits }
    }

    /// Runs the three checks in order, stopping at the first rejection.
    ///
    /// Fails open: if the store is unreachable the submission is allowed and the
    /// fault is logged.
    pub async fn check(&self, identity: SubmissionIdentity<'_>) -> Result<(), Rejection> {
        match self.evaluate(&identity).await {
            Ok(None) => Ok(()),
            Ok(Some(rejection)) => {
                warn!(
                    email = %identity.email,
                    origin = %identity.origin,
                    reason = rejection.code(),
                    "Submission rejected by abuse control"
                );
                Err(rejection)
            }
            Err(fault) => {
                error!(error = %fault, "Abuse control store failed, allowing submission");
                Ok(())
            }
        }
    }

    async fn evaluate(
        &self,
        identity: &SubmissionIdentity<'_>,
    ) -> Result<Option<Rejection>, GuardFault> {
        let window_secs = self.limits.rate_window.as_secs();

        let email_key = format!("rl:email:{}", identity.email.trim().to_lowercase());
        if self.hit(&email_key).await? > self.limits.email_max {
            return Ok(Some(Rejection::RateLimitedEmail {
                retry_after_seconds: window_secs,
            }));
        }

        let origin = identity.origin.trim();
        if !origin.is_empty() {
            let ip_key = format!("rl:ip:{}", origin.to_lowercase());
            if self.hit(&ip_key).await? > self.limits.ip_max {
                return Ok(Some(Rejection::RateLimitedIp {
                    retry_after_seconds: window_secs,
                }));
            }
        }

        let fingerprint = submission_fingerprint(
            identity.email,
            identity.subject,
            identity.message,
            identity.recipients,
        )?;
        let created = self
            .store
            .create_if_absent(
                &format!("dupe:{fingerprint}"),
                "1",
                self.limits.duplicate_window,
            )
            .await?;
        if !created {
            return Ok(Some(Rejection::DuplicateRecent {
                retry_after_seconds: self.limits.duplicate_window.as_secs(),
            }));
        }

        Ok(None)
    }

    /// Counts one hit on a fixed window. The first hit starts the window.
    async fn hit(&self, key: &str) -> Result<i64, StoreError> {
        let count = self.store.increment(key).await?;
        if count == 1 {
            self.store.set_expiry(key, self.limits.rate_window).await?;
        }
        Ok(count)
    }
}
