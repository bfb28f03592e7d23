//! Submission statistics kept in the counter store.
//!
//! Updated only after the team mail went out. Failures are logged and
//! swallowed: statistics never affect a submission's outcome.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::error;

use crate::abuse::{CounterStore, StoreError};

pub const PDFS_GENERATED: &str = "pdfs_generated";
pub const ZIPS_GENERATED: &str = "zips_generated";
pub const EMAILS_SENT: &str = "emails_sent";
pub const RECIPIENTS_TOTAL: &str = "recipients_total";
pub const STATS_UPDATED_AT: &str = "stats_updated_at";
pub const LAST_UPDATE: &str = "last_update";

/// What one successful submission adds to the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTally {
    pub documents: i64,
    pub archives: i64,
    pub emails: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub ok: bool,
    pub emails_sent: i64,
    pub pdfs_generated: i64,
    pub zips_generated: i64,
    pub recipients_total: i64,
    pub updated_at: Option<String>,
}

async fn apply(store: &dyn CounterStore, tally: SubmissionTally) -> Result<(), StoreError> {
    store.increment_by(PDFS_GENERATED, tally.documents).await?;
    store.increment_by(RECIPIENTS_TOTAL, tally.documents).await?;
    store.increment_by(EMAILS_SENT, tally.emails).await?;
    if tally.archives > 0 {
        store.increment_by(ZIPS_GENERATED, tally.archives).await?;
    }
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    store.set(STATS_UPDATED_AT, &now).await?;
    store.set(LAST_UPDATE, &now).await?;
    Ok(())
}

pub async fn record_submission(store: &dyn CounterStore, tally: SubmissionTally) {
    if let Err(e) = apply(store, tally).await {
        error!(error = %e, "Statistics update failed (non-blocking)");
    }
}

/// Counts the sender's copy once it went out.
pub async fn record_copy(store: &dyn CounterStore) {
    if let Err(e) = store.increment(EMAILS_SENT).await {
        error!(error = %e, "Statistics update failed (non-blocking)");
    }
}

/// Reads a counter; missing, unparsable or negative values read as zero.
async fn read_count(store: &dyn CounterStore, key: &str) -> i64 {
    match store.get(key).await {
        Ok(Some(v)) => v.trim().parse::<i64>().ok().filter(|n| *n >= 0).unwrap_or(0),
        Ok(None) => 0,
        Err(e) => {
            error!(error = %e, key, "Statistics read failed");
            0
        }
    }
}

pub async fn read_stats(store: &dyn CounterStore) -> StatsSnapshot {
    let (emails_sent, pdfs_generated, zips_generated, recipients_total) = tokio::join!(
        read_count(store, EMAILS_SENT),
        read_count(store, PDFS_GENERATED),
        read_count(store, ZIPS_GENERATED),
        read_count(store, RECIPIENTS_TOTAL),
    );
    let updated_at = store.get(STATS_UPDATED_AT).await.ok().flatten();
    StatsSnapshot {
        ok: true,
        emails_sent,
        pdfs_generated,
        zips_generated,
        recipients_total,
        updated_at,
    }
}
