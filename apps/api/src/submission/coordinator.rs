//! Submission pipeline.
//!
//! validate → consent → resolve recipients → abuse control → generate one PDF
//! per recipient (blocking pool, in recipient order) → package → team mail →
//! statistics → optional copy to the sender → receipt.
//!
//! Nothing is persisted when delivery fails; the abuse-control counters are the
//! only state a failed submission leaves behind.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::abuse::{AbuseGuard, CounterStore, SubmissionIdentity};
use crate::delivery::{templates, Attachment, DeliveryChannel, Mailbox, OutboundMail};
use crate::errors::AppError;
use crate::layout::{render_letter, LetterContent, RenderError};
use crate::locale::LetterLocale;
use crate::models::SubmissionRequest;
use crate::packaging::{
    archive_name, document_name, new_process_id, package, DeliverableArtifact, LetterDocument,
};
use crate::personalization::personalize_for;
use crate::recipients::{resolve_recipients, RecipientPolicy, ResolvedRecipientList};
use crate::submission::stats::{record_copy, record_submission, SubmissionTally};

// ────────────────────────────────────────────────────────────────────────────
// Settings
// ────────────────────────────────────────────────────────────────────────────

/// What the sender's copy carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CopyPolicy {
    /// Only the first recipient's letter.
    #[default]
    FirstDocument,
    /// The same attachment as the team mail (PDF or ZIP).
    FullArtifact,
}

impl FromStr for CopyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first_document" => Ok(CopyPolicy::FirstDocument),
            "all" | "full" | "full_artifact" => Ok(CopyPolicy::FullArtifact),
            other => Err(format!("unsupported copy policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    pub team_inbox: String,
    pub from_email: String,
    pub copy_policy: CopyPolicy,
    pub recipient_policy: RecipientPolicy,
    pub locale: &'static LetterLocale,
}

/// Returned to the client on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub ok: bool,
    pub queue_id: String,
    pub recipients: usize,
    pub documents: Vec<String>,
    pub copy_sent: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn CounterStore>,
    guard: AbuseGuard,
    channel: Arc<dyn DeliveryChannel>,
    settings: Arc<SubmissionSettings>,
}

impl SubmissionService {
    pub fn new(
        store: Arc<dyn CounterStore>,
        guard: AbuseGuard,
        channel: Arc<dyn DeliveryChannel>,
        settings: SubmissionSettings,
    ) -> Self {
        Self {
            store,
            guard,
            channel,
            settings: Arc::new(settings),
        }
    }

    pub fn store(&self) -> &dyn CounterStore {
        self.store.as_ref()
    }

    /// Runs one submission end to end. `origin` is the caller's network
    /// address, empty when unknown.
    pub async fn process(
        &self,
        request: SubmissionRequest,
        origin: &str,
    ) -> Result<SubmissionReceipt, AppError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }
        if !request.consent_print {
            return Err(AppError::ConsentRequired);
        }

        let locale = self.settings.locale;
        let recipients = resolve_recipients(
            request.primary_recipient.as_ref(),
            &request.extra_recipients,
            &request.mp_name,
            &self.settings.recipient_policy,
            locale,
        );

        self.guard
            .check(SubmissionIdentity {
                email: &request.sender.email,
                origin,
                subject: &request.subject,
                message: &request.message,
                recipients: &recipients,
            })
            .await
            .map_err(AppError::Rejected)?;

        let queue_id = new_process_id();
        let date = Local::now().date_naive();
        let request = Arc::new(request);

        let documents = {
            let request = Arc::clone(&request);
            let recipients = recipients.clone();
            let queue_id = queue_id.clone();
            // CPU-bound: keep it off the async workers.
            tokio::task::spawn_blocking(move || {
                generate_documents(&request, &recipients, &queue_id, date, locale)
            })
            .await
            .context("Document generation task failed")??
        };
        let document_names: Vec<String> = documents.iter().map(|d| d.name.clone()).collect();
        let first_document = documents.first().cloned();

        let artifact = package(documents, archive_name(locale, &queue_id))?;

        // Team mail with the artifact; reply goes to the sender.
        let sender = &request.sender;
        let team_mail = OutboundMail {
            from: Mailbox::named(
                &self.settings.from_email,
                templates::team_sender_name(locale),
            ),
            to: vec![Mailbox::new(&self.settings.team_inbox)],
            reply_to: Some(Mailbox::named(&sender.email, sender.full_name())),
            subject: templates::team_subject(locale, &queue_id),
            html: templates::team_html(
                locale,
                &queue_id,
                date,
                sender,
                &recipients,
                &request.subject,
            ),
            attachments: vec![attachment_for(&artifact)],
        };
        self.channel.send(&team_mail).await?;

        record_submission(
            self.store.as_ref(),
            SubmissionTally {
                documents: recipients.len() as i64,
                archives: matches!(artifact, DeliverableArtifact::Archive { .. }) as i64,
                emails: 1,
            },
        )
        .await;

        let mut copy_sent = false;
        if request.copy_to_self {
            let (attachment, all_documents) = match (self.settings.copy_policy, first_document) {
                (CopyPolicy::FirstDocument, Some(doc)) => (
                    Attachment {
                        name: doc.name,
                        content: doc.bytes,
                    },
                    recipients.len() == 1,
                ),
                _ => (attachment_for(&artifact), true),
            };
            let copy_mail = OutboundMail {
                from: Mailbox::named(
                    &self.settings.from_email,
                    templates::copy_sender_name(locale),
                ),
                to: vec![Mailbox::new(&sender.email)],
                reply_to: None,
                subject: templates::copy_subject(locale, &queue_id),
                html: templates::copy_html(locale, &queue_id, &request.subject, all_documents),
                attachments: vec![attachment],
            };
            self.channel.send(&copy_mail).await?;
            record_copy(self.store.as_ref()).await;
            copy_sent = true;
        }

        info!(
            queue_id = %queue_id,
            recipients = recipients.len(),
            documents = document_names.len(),
            copy_sent,
            "Submission delivered"
        );

        Ok(SubmissionReceipt {
            ok: true,
            queue_id,
            recipients: recipients.len(),
            documents: document_names,
            copy_sent,
        })
    }
}

fn attachment_for(artifact: &DeliverableArtifact) -> Attachment {
    Attachment {
        name: artifact.file_name().to_string(),
        content: artifact.bytes().clone(),
    }
}

/// Renders one letter per recipient, in recipient order.
fn generate_documents(
    request: &SubmissionRequest,
    recipients: &ResolvedRecipientList,
    queue_id: &str,
    date: NaiveDate,
    locale: &LetterLocale,
) -> Result<Vec<LetterDocument>, RenderError> {
    let total = recipients.len();
    let mut documents = Vec::with_capacity(total);

    for (i, recipient) in recipients.iter().enumerate() {
        let letter = personalize_for(&request.message, &request.sender, recipient, locale);
        let content = LetterContent {
            queue_id: queue_id.to_string(),
            date,
            sender: request.sender.clone(),
            recipient: recipient.clone(),
            subject: request.subject.clone(),
            body: letter.body,
            salutation: letter.salutation,
        };
        let (bytes, report) = render_letter(&content, locale)?;
        debug!(
            queue_id,
            index = i,
            pages = report.pages,
            font_size = report.font_size,
            verdict = ?report.verdict,
            "Document generated"
        );
        documents.push(LetterDocument {
            name: document_name(locale, queue_id, i, total),
            bytes: Bytes::from(bytes),
        });
    }

    Ok(documents)
}
