//! Runtime configuration, read from the Lambda environment at cold start.

use std::fmt;
use std::time::Duration;

use crate::auth::AllowList;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    /// Webhook path segment, without the leading `/`.
    pub secret_path: String,
    pub bot_token: String,
    pub allow_list: AllowList,
    /// Public origin for generated links, without a trailing `/`.
    pub base_url: String,
    pub admin_user: String,
    pub admin_pass: String,
    /// DynamoDB table; `None` runs against an in-process store.
    pub table_name: Option<String>,
    pub telegram_api_base: String,
    pub notify_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret_path", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("allow_list", &self.allow_list.len())
            .field("base_url", &self.base_url)
            .field("admin_user", &self.admin_user)
            .field("admin_pass", &"<redacted>")
            .field("table_name", &self.table_name)
            .field("telegram_api_base", &self.telegram_api_base)
            .field("notify_timeout", &self.notify_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let secret_path = required("BOT_SECRET_PATH")?
            .trim_start_matches('/')
            .to_string();
        if secret_path.is_empty() {
            return Err(ConfigError::Invalid {
                name: "BOT_SECRET_PATH",
                reason: "must contain more than slashes".into(),
            });
        }

        let base_url = required("BASE_URL")?.trim_end_matches('/').to_string();

        let notify_timeout = match optional("NOTIFY_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: "NOTIFY_TIMEOUT_SECS",
                    reason: e.to_string(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        };

        Ok(Self {
            secret_path,
            bot_token: required("BOT_TOKEN")?,
            allow_list: AllowList::parse(&lookup("WHITELIST").unwrap_or_default()),
            base_url,
            admin_user: required("ADMIN_USER")?,
            admin_pass: required("ADMIN_PASS")?,
            table_name: optional("TABLE_NAME"),
            telegram_api_base: optional("TELEGRAM_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            notify_timeout,
        })
    }

    pub fn is_allowed_sender(&self, sender_id: &str) -> bool {
        self.allow_list.contains(sender_id)
    }
}
