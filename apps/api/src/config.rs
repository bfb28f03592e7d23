use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::abuse::AbuseLimits;
use crate::locale::{LetterLocale, LocaleCode};
use crate::recipients::{RecipientPolicy, DEFAULT_EXCLUDED_AFFILIATIONS};
use crate::submission::{CopyPolicy, SubmissionSettings};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub brevo_api_key: String,
    /// Overrides the Brevo endpoint, e.g. for a local mock.
    pub brevo_api_url: Option<String>,
    pub team_inbox: String,
    pub from_email: String,
    /// Counters live in memory when unset.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub locale: LocaleCode,
    pub limits: AbuseLimits,
    pub excluded_affiliations: Vec<String>,
    pub copy_policy: CopyPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_source(|key| std::env::var(key).ok())
    }

    fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| -> Result<String> {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let optional = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let defaults = AbuseLimits::default();
        let limits = AbuseLimits {
            email_max: parse_or(&optional, "RATE_LIMIT_EMAIL_MAX", defaults.email_max)?,
            ip_max: parse_or(&optional, "RATE_LIMIT_IP_MAX", defaults.ip_max)?,
            rate_window: Duration::from_secs(parse_or(
                &optional,
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_window.as_secs(),
            )?),
            duplicate_window: Duration::from_secs(parse_or(
                &optional,
                "DUPLICATE_WINDOW_SECS",
                defaults.duplicate_window.as_secs(),
            )?),
        };

        let excluded_affiliations = match optional("EXCLUDED_AFFILIATIONS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_EXCLUDED_AFFILIATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        Ok(Config {
            brevo_api_key: require("BREVO_API_KEY")?,
            brevo_api_url: optional("BREVO_API_URL"),
            team_inbox: require("TEAM_INBOX")?,
            from_email: require("FROM_EMAIL")?,
            redis_url: optional("REDIS_URL"),
            port: parse_or(&optional, "PORT", 8080u16)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            locale: match optional("LETTER_LOCALE") {
                Some(v) => v.parse::<LocaleCode>().map_err(|e| anyhow!(e))?,
                None => LocaleCode::De,
            },
            limits,
            excluded_affiliations,
            copy_policy: match optional("COPY_POLICY") {
                Some(v) => v.parse::<CopyPolicy>().map_err(|e| anyhow!(e))?,
                None => CopyPolicy::default(),
            },
        })
    }

    pub fn recipient_policy(&self) -> RecipientPolicy {
        RecipientPolicy::new(&self.excluded_affiliations)
    }

    pub fn submission_settings(&self) -> SubmissionSettings {
        SubmissionSettings {
            team_inbox: self.team_inbox.clone(),
            from_email: self.from_email.clone(),
            copy_policy: self.copy_policy,
            recipient_policy: self.recipient_policy(),
            locale: LetterLocale::for_code(self.locale),
        }
    }
}

fn parse_or<T>(optional: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number")),
        None => Ok(default),
    }
}
