use std::sync::Arc;

use lambda_http::{Body, Error, Request, Response};

use crate::config::Config;
use crate::store::{DynamoStore, KvStore, MemoryStore};
use crate::telegram::{Notifier, TelegramClient};
use crate::{admin, webhook};

/// Per-process handles shared by every invocation. Cheap to clone.
#[derive(Clone)]
pub struct Ctx {
    pub config: Arc<Config>,
    pub store: Arc<dyn KvStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Ctx {
    pub fn new(config: Config, store: Arc<dyn KvStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            notifier,
        }
    }

    pub async fn from_config(config: Config) -> Result<Self, Error> {
        let store: Arc<dyn KvStore> = match &config.table_name {
            Some(table) => {
                tracing::info!(table = %table, "using dynamodb store");
                Arc::new(DynamoStore::connect(table.clone()).await)
            }
            None => {
                tracing::warn!("TABLE_NAME not set, entries live only in this process");
                Arc::new(MemoryStore::new())
            }
        };
        let notifier = TelegramClient::new(
            &config.telegram_api_base,
            &config.bot_token,
            config.notify_timeout,
        )?;
        Ok(Self::new(config, store, Arc::new(notifier)))
    }
}

fn is_webhook_path(path: &str, secret: &str) -> bool {
    path.strip_prefix('/') == Some(secret)
}

pub async fn router(req: Request, ctx: &Ctx) -> Result<Response<Body>, Error> {
    let method = req.method().as_str();
    let path = req.uri().path();

    match (method, path) {
        ("POST", p) if is_webhook_path(p, &ctx.config.secret_path) => {
            webhook::handle_webhook(req, ctx).await
        }
        _ => admin::handle_admin(req, ctx).await,
    }
}
