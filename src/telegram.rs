//! Outbound chat replies through the Telegram Bot API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::model::SendMessage;

const PARSE_MODE: &str = "Markdown";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("telegram http: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL embeds the bot token.
        NotifyError::Http(e.without_url())
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), NotifyError>;
}

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    endpoint: String,
}

pub fn send_message_url(api_base: &str, token: &str) -> String {
    format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), token)
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: send_message_url(api_base, token),
        })
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: PARSE_MODE,
        };
        self.http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Best-effort reply: failures are logged and dropped, never retried.
pub async fn notify(notifier: &dyn Notifier, chat_id: i64, text: &str) {
    match notifier.send_message(chat_id, text).await {
        Ok(()) => tracing::debug!(chat_id, "reply sent"),
        Err(e) => tracing::warn!(chat_id, error = %e, "reply not delivered"),
    }
}
