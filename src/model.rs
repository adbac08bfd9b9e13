use serde::{Deserialize, Serialize};

/// Inbound Telegram update. Only the fields the bot reads are modelled;
/// everything is optional on the wire.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Message {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub chat: Option<Chat>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Chat {
    pub id: i64,
}

/// Body of the Bot API `sendMessage` call.
#[derive(Debug, Serialize, Clone)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub parse_mode: &'a str,
}

/// A short-link mapping as shown in the admin listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub key: String,
    pub value: String,
}
