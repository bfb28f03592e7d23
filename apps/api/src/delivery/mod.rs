// Delivery channel: hands the packaged letters to a transactional-email provider.
// One attempt per mail; retries are the caller's concern and currently not made.

pub mod brevo;
pub mod templates;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use brevo::BrevoClient;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery transport failed: {0}")]
    Transport(String),

    #[error("delivery provider rejected the mail (status {status}): {detail}")]
    Rejected { status: u16, detail: String },
}

impl DeliveryError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DeliveryError::Transport(_) => None,
            DeliveryError::Rejected { status, .. } => Some(*status),
        }
    }

    pub fn detail(&self) -> String {
        match self {
            DeliveryError::Transport(detail) | DeliveryError::Rejected { detail, .. } => {
                detail.clone()
            }
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        DeliveryError::Transport(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub email: String,
    pub name: Option<String>,
}

impl Mailbox {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn named(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub content: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub from: Mailbox,
    pub to: Vec<Mailbox>,
    pub reply_to: Option<Mailbox>,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(&self, mail: &OutboundMail) -> Result<(), DeliveryError>;
}

/// In-memory channel that records every mail. Optionally fails the n-th send.
#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingChannel {
        pub sent: Mutex<Vec<OutboundMail>>,
        /// 0-based index of the send call that should fail with a 502.
        pub fail_on: Option<usize>,
        calls: Mutex<usize>,
    }

    impl RecordingChannel {
        pub fn failing_on(call: usize) -> Self {
            Self {
                fail_on: Some(call),
                ..Default::default()
            }
        }

        pub fn sent(&self) -> Vec<OutboundMail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DeliveryChannel for RecordingChannel {
        async fn send(&self, mail: &OutboundMail) -> Result<(), DeliveryError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                let current = *calls;
                *calls += 1;
                current
            };
            if self.fail_on == Some(call) {
                return Err(DeliveryError::Rejected {
                    status: 502,
                    detail: "upstream unavailable".to_string(),
                });
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }
}
