//! Newsletter subscription via the provider's contacts API.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::i18n::{Language, LanguageStrings};
use crate::retry::{with_retry_if, RetryConfig};

/// Provider error code for a contact that already exists.
const DUPLICATE_CONTACT_CODE: &str = "duplicate_parameter";

#[derive(Debug, thiserror::Error)]
pub enum NewsletterError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Newsletter integration is not configured")]
    NotConfigured,

    #[error("Newsletter request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Newsletter provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Newsletter provider error ({status}): {body}")]
    Provider { status: u16, body: String },
}

impl NewsletterError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            NewsletterError::Transport(_) | NewsletterError::Provider { .. }
        )
    }

    /// Message shown to the visitor.
    pub fn user_message(&self, language: Language) -> &'static str {
        let strings = LanguageStrings::for_language(language);
        match self {
            NewsletterError::InvalidEmail => strings.newsletter_invalid_email,
            NewsletterError::NotConfigured => strings.newsletter_unavailable,
            _ => strings.newsletter_failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

impl SubscribeOutcome {
    pub fn user_message(&self, language: Language) -> &'static str {
        let strings = LanguageStrings::for_language(language);
        match self {
            SubscribeOutcome::Subscribed => strings.newsletter_success,
            SubscribeOutcome::AlreadySubscribed => strings.newsletter_already_subscribed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateContactRequest<'a> {
    email: &'a str,
    list_ids: [u64; 1],
    update_enabled: bool,
    attributes: ContactAttributes,
}

#[derive(Debug, Serialize)]
struct ContactAttributes {
    #[serde(rename = "LANGUAGE")]
    language: &'static str,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    code: String,
}

/// Loose syntactic check: something@something.tld with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
        .is_match(email)
}

#[derive(Debug, Clone)]
pub struct NewsletterClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    list_id: u64,
    retry: RetryConfig,
}

impl NewsletterClient {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>, list_id: u64) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key,
            list_id,
            retry: RetryConfig::newsletter(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.newsletter_api_url.clone(),
            config.newsletter_api_key.clone(),
            config.newsletter_list_id,
        )
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Add `email` to the newsletter list, tagged with the visitor's language.
    pub async fn subscribe(
        &self,
        email: &str,
        language: Language,
    ) -> Result<SubscribeOutcome, NewsletterError> {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(NewsletterError::InvalidEmail);
        }
        let api_key = self.api_key.as_deref().ok_or(NewsletterError::NotConfigured)?;

        let outcome = with_retry_if(
            &self.retry,
            "Newsletter subscribe",
            || self.create_contact(api_key, &email, language),
            NewsletterError::is_retryable,
        )
        .await?;

        info!(language = %language, ?outcome, "Newsletter subscription processed");
        Ok(outcome)
    }

    async fn create_contact(
        &self,
        api_key: &str,
        email: &str,
        language: Language,
    ) -> Result<SubscribeOutcome, NewsletterError> {
        let response = self
            .http
            .post(format!("{}/contacts", self.api_url))
            .header("api-key", api_key)
            .header("accept", "application/json")
            .json(&CreateContactRequest {
                email,
                list_ids: [self.list_id],
                update_enabled: false,
                attributes: ContactAttributes {
                    language: language.code(),
                },
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(SubscribeOutcome::Subscribed);
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            let duplicate = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.code == DUPLICATE_CONTACT_CODE)
                .unwrap_or(false);
            if duplicate {
                return Ok(SubscribeOutcome::AlreadySubscribed);
            }
            warn!("Newsletter provider rejected subscription ({}): {}", status, body);
            return Err(NewsletterError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Err(NewsletterError::Provider {
            status: status.as_u16(),
            body,
        })
    }
}
