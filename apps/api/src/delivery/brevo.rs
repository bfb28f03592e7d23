/// Brevo transactional-email client.
///
/// Single attempt per mail: a failed send surfaces as [`DeliveryError`] and is
/// reported to the submitter, never retried here.
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::delivery::{DeliveryChannel, DeliveryError, Mailbox, OutboundMail};

pub const BREVO_API_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoRequest<'a> {
    sender: BrevoContact<'a>,
    to: Vec<BrevoContact<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<BrevoContact<'a>>,
    subject: &'a str,
    html_content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachment: Vec<BrevoAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct BrevoContact<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct BrevoAttachment<'a> {
    name: &'a str,
    /// Base64 of the file bytes.
    content: String,
}

impl<'a> From<&'a Mailbox> for BrevoContact<'a> {
    fn from(m: &'a Mailbox) -> Self {
        BrevoContact {
            email: &m.email,
            name: m.name.as_deref(),
        }
    }
}

fn build_request(mail: &OutboundMail) -> BrevoRequest<'_> {
    BrevoRequest {
        sender: (&mail.from).into(),
        to: mail.to.iter().map(Into::into).collect(),
        reply_to: mail.reply_to.as_ref().map(Into::into),
        subject: &mail.subject,
        html_content: &mail.html,
        attachment: mail
            .attachments
            .iter()
            .map(|a| BrevoAttachment {
                name: &a.name,
                content: BASE64.encode(&a.content),
            })
            .collect(),
    }
}

#[derive(Clone)]
pub struct BrevoClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl BrevoClient {
    pub fn new(api_key: String, api_url: Option<String>) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_key,
            api_url: api_url.unwrap_or_else(|| BREVO_API_URL.to_string()),
        })
    }
}

#[async_trait]
impl DeliveryChannel for BrevoClient {
    async fn send(&self, mail: &OutboundMail) -> Result<(), DeliveryError> {
        let request_body = build_request(mail);

        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header("accept", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Brevo API returned {}: {}", status, detail);
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        debug!(
            subject = %mail.subject,
            attachments = mail.attachments.len(),
            "Brevo mail accepted"
        );
        Ok(())
    }
}
