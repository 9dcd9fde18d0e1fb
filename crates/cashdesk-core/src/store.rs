//! Local backend: cash register records loaded from a YAML file
//!
//! ```yaml
//! context:
//!   uid: 7
//! collections:
//!   petty.cash:
//!     - { id: 1, responsible: 7, status: open }
//! ```
//!
//! A collection missing from the file behaves like a module that is not
//! installed: counting it fails with [`CoreError::CollectionUnavailable`].

use async_trait::async_trait;
use cashdesk_config::SessionConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::models::{Condition, Filter, FilterField, Identity};
use crate::services::{RecordQueryService, SessionService};
use crate::types::RecordStatus;

type JsonMap = serde_json::Map<String, serde_json::Value>;

/// One cash register record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashRecord {
    pub id: u64,
    /// Responsible user, numeric or textual
    #[serde(default)]
    pub responsible: serde_json::Value,
    #[serde(default)]
    pub status: RecordStatus,
}

impl CashRecord {
    pub fn new(id: u64, responsible: Option<&str>, status: RecordStatus) -> Self {
        Self {
            id,
            responsible: responsible
                .map(|r| serde_json::Value::String(r.to_string()))
                .unwrap_or(serde_json::Value::Null),
            status,
        }
    }

    fn satisfies(&self, condition: &Condition) -> bool {
        match condition.field {
            FilterField::Responsible => Identity::from_json(&self.responsible)
                .map_or(false, |id| id.as_str() == condition.value),
            FilterField::Status => self.status.to_string() == condition.value,
        }
    }

    pub fn matches(&self, filter: &Filter) -> bool {
        filter.conditions.iter().all(|c| self.satisfies(c))
    }
}

/// Layout of the records file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RecordsFile {
    /// Answer of the remote "current context" lookup
    #[serde(default)]
    pub context: Option<JsonMap>,
    #[serde(default)]
    pub collections: HashMap<String, Vec<CashRecord>>,
}

/// In-memory record store
#[derive(Debug, Default)]
pub struct MemoryStore {
    context: Option<JsonMap>,
    collections: HashMap<String, Vec<CashRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a records file
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let file: RecordsFile = serde_yaml::from_str(content)
            .map_err(|e| CoreError::InvalidFormat { message: e.to_string() })?;
        Ok(Self {
            context: file.context,
            collections: file.collections,
        })
    }

    /// Load a records file from disk
    pub async fn load(path: &Path) -> CoreResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let store = Self::from_yaml(&content)?;
        log::info!(
            target: "cashdesk::store",
            "loaded {} collections from {}",
            store.collections.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn with_collection(mut self, name: &str, records: Vec<CashRecord>) -> Self {
        self.collections.insert(name.to_string(), records);
        self
    }

    pub fn with_context(mut self, context: JsonMap) -> Self {
        self.context = Some(context);
        self
    }

    pub fn context(&self) -> Option<&JsonMap> {
        self.context.as_ref()
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }
}

#[async_trait]
impl RecordQueryService for MemoryStore {
    async fn count(&self, collection: &str, filter: &Filter) -> CoreResult<u64> {
        let records = self
            .collections
            .get(collection)
            .ok_or_else(|| CoreError::CollectionUnavailable {
                collection: collection.to_string(),
            })?;
        Ok(records.iter().filter(|r| r.matches(filter)).count() as u64)
    }
}

/// Session backed by configuration and the records file
#[derive(Debug, Default)]
pub struct StaticSession {
    identity: Option<String>,
    request_context: JsonMap,
    remote_context: Option<JsonMap>,
}

impl StaticSession {
    pub fn new(config: &SessionConfig, remote_context: Option<JsonMap>) -> Self {
        Self {
            identity: config.user.clone(),
            request_context: config
                .request_context
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
            remote_context,
        }
    }
}

#[async_trait]
impl SessionService for StaticSession {
    fn session_identity(&self) -> Option<String> {
        self.identity.clone()
    }

    fn request_context(&self) -> JsonMap {
        self.request_context.clone()
    }

    async fn fetch_context(&self) -> CoreResult<JsonMap> {
        self.remote_context
            .clone()
            .ok_or_else(|| CoreError::ContextUnavailable {
                message: "records file has no context section".to_string(),
            })
    }
}

// ==================== Tests ====================
