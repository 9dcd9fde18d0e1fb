//! Hand-written collaborators for unit tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::models::{ActionRequest, Filter, Identity, Notification};
use crate::resolver::IdentityStrategy;
use crate::services::{ActionService, Notifier, RecordQueryService, SessionService};
use crate::types::Severity;

type JsonMap = serde_json::Map<String, serde_json::Value>;

// ==================== Identity ====================

#[derive(Debug, Clone)]
pub enum Scripted {
    Found(&'static str),
    Missing,
    Fails,
    Panics,
}

pub struct ScriptedStrategy {
    outcome: Scripted,
    calls: Arc<AtomicUsize>,
}

impl ScriptedStrategy {
    pub fn new(outcome: Scripted) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl IdentityStrategy for ScriptedStrategy {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn attempt(&self) -> CoreResult<Option<Identity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Scripted::Found(id) => Ok(Identity::new(id)),
            Scripted::Missing => Ok(None),
            Scripted::Fails => Err(CoreError::ContextUnavailable {
                message: "scripted failure".to_string(),
            }),
            Scripted::Panics => panic!("scripted strategy panic"),
        }
    }
}

#[derive(Default)]
pub struct FakeSession {
    identity: Option<String>,
    request: JsonMap,
    remote: Option<JsonMap>,
    remote_delay: Option<Duration>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = Some(identity.to_string());
        self
    }

    pub fn with_request_field(mut self, field: &str, value: serde_json::Value) -> Self {
        self.request.insert(field.to_string(), value);
        self
    }

    pub fn with_remote_field(mut self, field: &str, value: serde_json::Value) -> Self {
        self.remote
            .get_or_insert_with(JsonMap::new)
            .insert(field.to_string(), value);
        self
    }

    pub fn with_remote_delay(mut self, delay: Duration) -> Self {
        self.remote_delay = Some(delay);
        self
    }
}

#[async_trait]
impl SessionService for FakeSession {
    fn session_identity(&self) -> Option<String> {
        self.identity.clone()
    }

    fn request_context(&self) -> JsonMap {
        self.request.clone()
    }

    async fn fetch_context(&self) -> CoreResult<JsonMap> {
        if let Some(delay) = self.remote_delay {
            tokio::time::sleep(delay).await;
        }
        self.remote.clone().ok_or(CoreError::ContextUnavailable {
            message: "no remote context".to_string(),
        })
    }
}

// ==================== Queries ====================

/// Wraps a query service and fails every count on one collection whose
/// filter constrains `status` to the given value
pub struct FailingStatus<Q> {
    pub inner: Q,
    pub collection: &'static str,
    pub status: &'static str,
}

#[async_trait]
impl<Q: RecordQueryService> RecordQueryService for FailingStatus<Q> {
    async fn count(&self, collection: &str, filter: &Filter) -> CoreResult<u64> {
        let hit = collection == self.collection
            && filter.conditions.iter().any(|c| c.value == self.status);
        if hit {
            return Err(CoreError::QueryFailed {
                collection: collection.to_string(),
                message: "scripted failure".to_string(),
            });
        }
        self.inner.count(collection, filter).await
    }
}

/// Records every filter it is asked to count
pub struct RecordingQuery<Q> {
    pub inner: Q,
    pub seen: Mutex<Vec<(String, Filter)>>,
}

impl<Q> RecordingQuery<Q> {
    pub fn new(inner: Q) -> Self {
        Self {
            inner,
            seen: Mutex::new(vec![]),
        }
    }

    pub fn seen(&self) -> Vec<(String, Filter)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl<Q: RecordQueryService> RecordQueryService for RecordingQuery<Q> {
    async fn count(&self, collection: &str, filter: &Filter) -> CoreResult<u64> {
        self.seen
            .lock()
            .unwrap()
            .push((collection.to_string(), filter.clone()));
        self.inner.count(collection, filter).await
    }
}

/// Never answers within any sane deadline
pub struct HangingQuery;

#[async_trait]
impl RecordQueryService for HangingQuery {
    async fn count(&self, _collection: &str, _filter: &Filter) -> CoreResult<u64> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(0)
    }
}

// ==================== Actions & Notifications ====================

#[derive(Default)]
pub struct RecordingActions {
    registered: HashSet<String>,
    hanging: HashSet<String>,
    reject_descriptors: bool,
    runs: Mutex<Vec<ActionRequest>>,
}

impl RecordingActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: &str) -> Self {
        self.registered.insert(name.to_string());
        self
    }

    /// Registered action that never answers
    pub fn hang_on(mut self, name: &str) -> Self {
        self.hanging.insert(name.to_string());
        self.register(name)
    }

    pub fn rejecting_descriptors(mut self) -> Self {
        self.reject_descriptors = true;
        self
    }

    /// Every request that ran successfully
    pub fn executed(&self) -> Vec<ActionRequest> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionService for RecordingActions {
    async fn run(&self, request: &ActionRequest) -> CoreResult<()> {
        match request {
            ActionRequest::Named(name) if !self.registered.contains(name) => {
                return Err(CoreError::ActionNotRegistered { name: name.clone() });
            }
            ActionRequest::Descriptor(_) if self.reject_descriptors => {
                return Err(CoreError::ActionFailed {
                    message: "view unavailable".to_string(),
                });
            }
            ActionRequest::Named(name) if self.hanging.contains(name) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            _ => {}
        }
        self.runs.lock().unwrap().push(request.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.shown().iter().filter(|n| n.severity == severity).count()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, notification: Notification) {
        self.shown.lock().unwrap().push(notification);
    }
}
