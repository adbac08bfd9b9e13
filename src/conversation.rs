//! Two-step link creation over chat.
//!
//! A sender first posts a URL, then the key to publish it under:
//!
//! ```text
//! Idle --(valid URL)--> AwaitingKey { url } --(any text)--> Idle
//! Idle --(other text)--> Idle
//! ```
//!
//! `AwaitingKey` lives in the store under `TSTATE_{userId}` with a 300 s TTL,
//! so an abandoned dialog falls back to `Idle` without any cleanup.

use std::time::Duration;

use serde::Deserialize;

use crate::store::{KvStore, PutOptions, StoreError};
use crate::util::valid_url;

pub const STATE_TTL: Duration = Duration::from_secs(300);
const STATE_KEY_PREFIX: &str = "TSTATE_";

pub const NOT_AUTHORIZED: &str = "Sorry, you are not authorized to use this bot.";
pub const ASK_FOR_KEY: &str = "Got it. Now, what key would you like to use for this link?";
pub const GREETING: &str = "Hi! Please send me a valid URL to start.";

pub fn state_key(user_id: &str) -> String {
    format!("{STATE_KEY_PREFIX}{user_id}")
}

/// Store key for a link created over chat.
pub fn link_key(key: &str) -> String {
    format!("/{key}")
}

pub fn link_created(base_url: &str, key: &str) -> String {
    format!("✅ Link created!\n\n{base_url}/{key}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingKey { url: String },
}

/// Persisted form; `Idle` is the absence of a record.
#[derive(Debug, Deserialize)]
#[serde(tag = "status")]
enum StateRecord {
    #[serde(rename = "AWAITING_KEY")]
    AwaitingKey { url: String },
}

impl ConversationState {
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Idle;
        };
        match serde_json::from_str::<StateRecord>(raw) {
            Ok(StateRecord::AwaitingKey { url }) => Self::AwaitingKey { url },
            Err(e) => {
                tracing::warn!(error = %e, "unreadable conversation state, starting over");
                Self::Idle
            }
        }
    }

    /// Record stored under the sender's state key while a key is pending.
    pub fn awaiting_record(url: &str) -> String {
        serde_json::json!({ "status": "AWAITING_KEY", "url": url }).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    AskForKey { url: String },
    Greet,
    CreateLink { key: String, url: String },
}

pub fn next_step(state: ConversationState, text: &str) -> Step {
    match state {
        ConversationState::AwaitingKey { url } => Step::CreateLink {
            key: text.trim().to_string(),
            url,
        },
        ConversationState::Idle if valid_url(text) => Step::AskForKey {
            url: text.to_string(),
        },
        ConversationState::Idle => Step::Greet,
    }
}

/// Feeds one message from an authorized sender through the dialog, applies
/// the store effects and returns the reply to send.
pub async fn advance(
    store: &dyn KvStore,
    user_id: &str,
    text: &str,
    base_url: &str,
) -> Result<String, StoreError> {
    let skey = state_key(user_id);
    let raw = store.get(&skey).await?;
    let state = ConversationState::decode(raw.as_deref());

    match next_step(state, text) {
        Step::AskForKey { url } => {
            let record = ConversationState::awaiting_record(&url);
            store
                .put(&skey, &record, PutOptions::expiring(STATE_TTL))
                .await?;
            tracing::info!(user_id, "waiting for link key");
            Ok(ASK_FOR_KEY.to_string())
        }
        Step::Greet => Ok(GREETING.to_string()),
        Step::CreateLink { key, url } => {
            store
                .put(&link_key(&key), &url, PutOptions::default())
                .await?;
            store.delete(&skey).await?;
            tracing::info!(user_id, key = %key, "link created over chat");
            Ok(link_created(base_url, &key))
        }
    }
}
