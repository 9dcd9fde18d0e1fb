//! Current user resolution
//!
//! The identity can be exposed through different channels depending on how
//! the dashboard is embedded: a full session knows it locally, lightweight
//! embeddings only pass a request context, and some only offer a remote
//! context lookup. [`UserContextResolver`] walks an ordered list of
//! [`IdentityStrategy`] values and returns the first identity found. When none
//! answers, the dashboard falls back to unfiltered counts.

use async_trait::async_trait;
use cashdesk_config::SessionConfig;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::models::Identity;
use crate::services::{with_timeout, SessionRef};

/// One way of finding the current identity
#[async_trait]
pub trait IdentityStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// `Ok(None)` and `Err(_)` both mean "try the next strategy"
    async fn attempt(&self) -> CoreResult<Option<Identity>>;
}

/// Reads the identity held by the local session
pub struct SessionStrategy {
    session: SessionRef,
}

impl SessionStrategy {
    pub fn new(session: SessionRef) -> Self {
        Self { session }
    }
}

#[async_trait]
impl IdentityStrategy for SessionStrategy {
    fn name(&self) -> &str {
        "session"
    }

    async fn attempt(&self) -> CoreResult<Option<Identity>> {
        Ok(self
            .session
            .session_identity()
            .and_then(|raw| Identity::new(&raw)))
    }
}

/// Reads a named field from the request context
pub struct RequestContextStrategy {
    session: SessionRef,
    field: String,
}

impl RequestContextStrategy {
    pub fn new(session: SessionRef, field: &str) -> Self {
        Self {
            session,
            field: field.to_string(),
        }
    }
}

#[async_trait]
impl IdentityStrategy for RequestContextStrategy {
    fn name(&self) -> &str {
        "request_context"
    }

    async fn attempt(&self) -> CoreResult<Option<Identity>> {
        let context = self.session.request_context();
        Ok(context.get(&self.field).and_then(Identity::from_json))
    }
}

/// Asks the backend for the current context
pub struct RemoteContextStrategy {
    session: SessionRef,
    field: String,
    timeout: Duration,
}

impl RemoteContextStrategy {
    pub fn new(session: SessionRef, field: &str, timeout: Duration) -> Self {
        Self {
            session,
            field: field.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl IdentityStrategy for RemoteContextStrategy {
    fn name(&self) -> &str {
        "remote_context"
    }

    async fn attempt(&self) -> CoreResult<Option<Identity>> {
        let context = with_timeout("fetch context", self.timeout, self.session.fetch_context()).await?;
        match context.get(&self.field) {
            Some(value) => Ok(Identity::from_json(value)),
            None => Err(CoreError::ContextUnavailable {
                message: format!("remote context has no '{}' field", self.field),
            }),
        }
    }
}

/// Ordered identity strategies, first success wins
pub struct UserContextResolver {
    strategies: Vec<Box<dyn IdentityStrategy>>,
}

impl UserContextResolver {
    pub fn new(strategies: Vec<Box<dyn IdentityStrategy>>) -> Self {
        Self { strategies }
    }

    /// Session, then request context, then the remote context lookup
    pub fn from_session(session: SessionRef, config: &SessionConfig, timeout: Duration) -> Self {
        Self::new(vec![
            Box::new(SessionStrategy::new(session.clone())),
            Box::new(RequestContextStrategy::new(session.clone(), &config.context_field)),
            Box::new(RemoteContextStrategy::new(session, &config.remote_field, timeout)),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve the identity to filter by; `None` means unfiltered mode
    pub async fn resolve(&self) -> Option<Identity> {
        for strategy in &self.strategies {
            match strategy.attempt().await {
                Ok(Some(identity)) => {
                    log::debug!(target: "cashdesk::resolver", "identity {} found via {}", identity, strategy.name());
                    return Some(identity);
                }
                Ok(None) => {
                    log::debug!(target: "cashdesk::resolver", "{} has no identity", strategy.name());
                }
                Err(e) => {
                    log::debug!(target: "cashdesk::resolver", "{} failed: {}", strategy.name(), e);
                }
            }
        }

        log::info!(target: "cashdesk::resolver", "no identity resolved, using unfiltered statistics");
        None
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeSession, Scripted, ScriptedStrategy};
    use std::sync::Arc;

    fn resolver_of(outcomes: Vec<Scripted>) -> (UserContextResolver, Vec<Arc<std::sync::atomic::AtomicUsize>>) {
        let mut counters = vec![];
        let mut strategies: Vec<Box<dyn IdentityStrategy>> = vec![];
        for outcome in outcomes {
            let strategy = ScriptedStrategy::new(outcome);
            counters.push(strategy.calls());
            strategies.push(Box::new(strategy));
        }
        (UserContextResolver::new(strategies), counters)
    }

    fn calls(counter: &Arc<std::sync::atomic::AtomicUsize>) -> usize {
        counter.load(std::sync::atomic::Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let (resolver, counters) = resolver_of(vec![
            Scripted::Found("1"),
            Scripted::Found("2"),
            Scripted::Fails,
        ]);

        assert_eq!(resolver.resolve().await, Identity::new("1"));
        assert_eq!(calls(&counters[0]), 1);
        assert_eq!(calls(&counters[1]), 0);
        assert_eq!(calls(&counters[2]), 0);
    }

    #[tokio::test]
    async fn test_failures_cascade_to_later_strategy() {
        let (resolver, counters) = resolver_of(vec![
            Scripted::Fails,
            Scripted::Missing,
            Scripted::Found("42"),
        ]);

        assert_eq!(resolver.resolve().await, Identity::new("42"));
        assert!(counters.iter().all(|c| calls(c) == 1));
    }

    #[tokio::test]
    async fn test_every_outcome_combination() {
        let choices = [Scripted::Found("a"), Scripted::Missing, Scripted::Fails];
        for first in &choices {
            for second in &choices {
                for third in &choices {
                    let outcomes = vec![first.clone(), second.clone(), third.clone()];
                    let expected = outcomes.iter().find_map(|o| match o {
                        Scripted::Found(id) => Identity::new(id),
                        _ => None,
                    });
                    let (resolver, _) = resolver_of(outcomes);
                    assert_eq!(resolver.resolve().await, expected);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_all_fail_is_absent() {
        let (resolver, _) = resolver_of(vec![Scripted::Fails, Scripted::Fails, Scripted::Missing]);
        assert_eq!(resolver.resolve().await, None);
    }

    #[tokio::test]
    async fn test_session_identity_preferred() {
        let session = FakeSession::new()
            .with_identity("7")
            .with_request_field("uid", serde_json::json!(8))
            .with_remote_field("uid", serde_json::json!(9));
        let resolver = UserContextResolver::from_session(Arc::new(session), &SessionConfig::default(), Duration::from_millis(100));

        assert_eq!(resolver.strategy_names(), vec!["session", "request_context", "remote_context"]);
        assert_eq!(resolver.resolve().await, Identity::new("7"));
    }

    #[tokio::test]
    async fn test_request_context_uses_configured_field() {
        let session = FakeSession::new()
            .with_request_field("uid", serde_json::json!(8))
            .with_request_field("user_id", serde_json::json!(11));
        let config = SessionConfig {
            context_field: "user_id".to_string(),
            ..SessionConfig::default()
        };
        let resolver = UserContextResolver::from_session(Arc::new(session), &config, Duration::from_millis(100));

        assert_eq!(resolver.resolve().await, Identity::new("11"));
    }

    #[tokio::test]
    async fn test_blank_session_falls_through_to_remote() {
        let session = FakeSession::new()
            .with_identity("   ")
            .with_request_field("uid", serde_json::Value::Null)
            .with_remote_field("uid", serde_json::json!(9));
        let resolver = UserContextResolver::from_session(Arc::new(session), &SessionConfig::default(), Duration::from_millis(100));

        assert_eq!(resolver.resolve().await, Identity::new("9"));
    }

    #[tokio::test]
    async fn test_remote_timeout_is_absent() {
        let session = FakeSession::new()
            .with_remote_field("uid", serde_json::json!(9))
            .with_remote_delay(Duration::from_secs(5));
        let resolver = UserContextResolver::from_session(Arc::new(session), &SessionConfig::default(), Duration::from_millis(20));

        assert_eq!(resolver.resolve().await, None);
    }

    #[tokio::test]
    async fn test_remote_without_field_fails() {
        let session = Arc::new(FakeSession::new().with_remote_field("partner_id", serde_json::json!(3)));
        let strategy = RemoteContextStrategy::new(session, "uid", Duration::from_millis(100));

        assert!(matches!(strategy.attempt().await, Err(CoreError::ContextUnavailable { .. })));
    }
}
