//! Key-value storage behind the admin UI and the bot.
//!
//! Handlers only see [`KvStore`]. Production uses [`DynamoStore`]; local runs
//! without a table and the tests use [`MemoryStore`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb as ddb;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use ddb::types::AttributeValue as Av;
use tokio::time::Instant;

use crate::util::epoch_now;

const KEY_ATTR: &str = "k";
const VALUE_ATTR: &str = "v";
/// DynamoDB TTL attribute (epoch seconds).
const EXPIRES_ATTR: &str = "expires_at";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("ddb {op}: {message}")]
    Backend { op: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PutOptions {
    pub expire_after: Option<Duration>,
}

impl PutOptions {
    pub fn expiring(after: Duration) -> Self {
        Self {
            expire_after: Some(after),
        }
    }
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, key: &str, value: &str, opts: PutOptions) -> Result<(), StoreError>;
    /// Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
    /// Live keys in lexicographic order.
    async fn list(&self) -> Result<Vec<String>, StoreError>;
}

// ----------------- DynamoDB -----------------

#[derive(Clone)]
pub struct DynamoStore {
    ddb: ddb::Client,
    table: String,
}

fn map_ddb_err<E>(op: &'static str) -> impl FnOnce(E) -> StoreError
where
    E: std::error::Error,
{
    move |e| StoreError::Backend {
        op,
        message: DisplayErrorContext(&e).to_string(),
    }
}

/// TTL deletion is lazy, so an item may outlive its `expires_at`.
fn expired(item: &HashMap<String, Av>, now: u64) -> bool {
    item.get(EXPIRES_ATTR)
        .and_then(|v| v.as_n().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .is_some_and(|ttl| now >= ttl)
}

impl DynamoStore {
    pub fn new(ddb: ddb::Client, table: impl Into<String>) -> Self {
        Self {
            ddb,
            table: table.into(),
        }
    }

    pub async fn connect(table: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(ddb::Client::new(&config), table)
    }
}

#[async_trait]
impl KvStore for DynamoStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let r = self
            .ddb
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTR, Av::S(key.to_string()))
            .send()
            .await
            .map_err(map_ddb_err("get"))?;

        let Some(item) = r.item else {
            return Ok(None);
        };
        if expired(&item, epoch_now()) {
            return Ok(None);
        }
        Ok(item.get(VALUE_ATTR).and_then(|v| v.as_s().ok()).cloned())
    }

    async fn put(&self, key: &str, value: &str, opts: PutOptions) -> Result<(), StoreError> {
        let mut put = self
            .ddb
            .put_item()
            .table_name(&self.table)
            .item(KEY_ATTR, Av::S(key.to_string()))
            .item(VALUE_ATTR, Av::S(value.to_string()));
        if let Some(after) = opts.expire_after {
            let ttl = epoch_now() + after.as_secs();
            put = put.item(EXPIRES_ATTR, Av::N(ttl.to_string()));
        }
        put.send().await.map_err(map_ddb_err("put"))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.ddb
            .delete_item()
            .table_name(&self.table)
            .key(KEY_ATTR, Av::S(key.to_string()))
            .send()
            .await
            .map_err(map_ddb_err("delete"))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let now = epoch_now();
        let mut keys = Vec::new();
        let mut start: Option<HashMap<String, Av>> = None;

        loop {
            let resp = self
                .ddb
                .scan()
                .table_name(&self.table)
                .projection_expression("#k, #e")
                .expression_attribute_names("#k", KEY_ATTR)
                .expression_attribute_names("#e", EXPIRES_ATTR)
                .set_exclusive_start_key(start.take())
                .send()
                .await
                .map_err(map_ddb_err("scan"))?;

            for item in resp.items() {
                if expired(item, now) {
                    continue;
                }
                if let Some(k) = item.get(KEY_ATTR).and_then(|v| v.as_s().ok()) {
                    keys.push(k.clone());
                }
            }

            match resp.last_evaluated_key {
                Some(lek) if !lek.is_empty() => start = Some(lek),
                _ => break,
            }
        }

        keys.sort();
        Ok(keys)
    }
}

// ----------------- In-process -----------------

#[derive(Debug)]
struct Record {
    value: String,
    deadline: Option<Instant>,
}

impl Record {
    fn live(&self, now: Instant) -> bool {
        self.deadline.map_or(true, |d| now < d)
    }
}

/// Map-backed store. Deadlines use the tokio clock, so a paused runtime can
/// step past a TTL.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<BTreeMap<String, Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_map<T>(&self, f: impl FnOnce(&mut BTreeMap<String, Record>) -> T) -> T {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut map)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        Ok(self.with_map(|map| {
            if map.get(key).is_some_and(|r| !r.live(now)) {
                map.remove(key);
            }
            map.get(key).map(|r| r.value.clone())
        }))
    }

    async fn put(&self, key: &str, value: &str, opts: PutOptions) -> Result<(), StoreError> {
        let deadline = opts.expire_after.map(|after| Instant::now() + after);
        self.with_map(|map| {
            map.insert(
                key.to_string(),
                Record {
                    value: value.to_string(),
                    deadline,
                },
            );
        });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.with_map(|map| {
            map.remove(key);
        });
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let now = Instant::now();
        Ok(self.with_map(|map| {
            map.retain(|_, r| r.live(now));
            map.keys().cloned().collect()
        }))
    }
}
