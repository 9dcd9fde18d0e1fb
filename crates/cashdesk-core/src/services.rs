//! Contracts of the collaborators the dashboard talks to
//!
//! The record store, the session, the action executor and the notification
//! area all belong to the host application. The dashboard only sees them
//! through these traits.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::models::{ActionRequest, Filter, Notification};

/// Counts records of a named collection
#[async_trait]
pub trait RecordQueryService: Send + Sync {
    /// Number of records in `collection` matching `filter`
    async fn count(&self, collection: &str, filter: &Filter) -> CoreResult<u64>;
}

/// Sources of the current user identity
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Identity held by the local session, read without any network call
    fn session_identity(&self) -> Option<String>;

    /// Request context handed over by the embedding page
    fn request_context(&self) -> serde_json::Map<String, serde_json::Value>;

    /// Remote "get current context" operation
    async fn fetch_context(&self) -> CoreResult<serde_json::Map<String, serde_json::Value>>;
}

/// Opens views in the host application
#[async_trait]
pub trait ActionService: Send + Sync {
    async fn run(&self, request: &ActionRequest) -> CoreResult<()>;
}

/// Shows toasts to the user
pub trait Notifier: Send + Sync {
    fn show(&self, notification: Notification);
}

pub type QueryRef = Arc<dyn RecordQueryService>;
pub type SessionRef = Arc<dyn SessionService>;
pub type ActionRef = Arc<dyn ActionService>;
pub type NotifierRef = Arc<dyn Notifier>;

/// Bound a remote call; an elapsed deadline becomes [`CoreError::Timeout`]
pub async fn with_timeout<T, F>(operation: &str, limit: Duration, call: F) -> CoreResult<T>
where
    F: Future<Output = CoreResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(CoreError::Timeout {
            operation: operation.to_string(),
            millis: limit.as_millis() as u64,
        }),
    }
}
