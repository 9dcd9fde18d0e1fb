//! Dashboard widget state
//!
//! [`Dashboard`] owns the displayed snapshot and the selected category. All
//! mutation goes through [`Dashboard::reload_stats`] (snapshot) and
//! [`Dashboard::select`] (selection). The snapshot is swapped wholesale once a
//! run completes, so readers never observe a partially updated set.

use cashdesk_config::{CashCategory, Config};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::aggregator::{self, CashStatsAggregator};
use crate::dispatcher::ActionDispatcher;
use crate::models::{ActionIntent, DispatchOutcome, IntentKind, Notification, ResolutionMode, StatsSnapshot};
use crate::resolver::UserContextResolver;
use crate::services::{ActionRef, NotifierRef, QueryRef, SessionRef};

/// Collaborators supplied by the host application
#[derive(Clone)]
pub struct Services {
    pub query: QueryRef,
    pub session: SessionRef,
    pub actions: ActionRef,
    pub notifier: NotifierRef,
}

/// Mutable part of the widget
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub snapshot: Arc<StatsSnapshot>,
    pub selected: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

pub struct Dashboard {
    categories: Arc<Vec<CashCategory>>,
    resolver: Arc<UserContextResolver>,
    aggregator: Arc<CashStatsAggregator>,
    dispatcher: ActionDispatcher,
    notifier: NotifierRef,
    state: RwLock<DashboardState>,
}

impl Dashboard {
    /// Build the widget with the default identity strategies
    pub fn new(config: &Config, services: Services) -> Self {
        let timeout = Duration::from_millis(config.dashboard.query_timeout_ms);
        let resolver = UserContextResolver::from_session(services.session.clone(), &config.session, timeout);
        Self::with_resolver(config, services, resolver)
    }

    pub fn with_resolver(config: &Config, services: Services, resolver: UserContextResolver) -> Self {
        let timeout = Duration::from_millis(config.dashboard.query_timeout_ms);
        let categories = Arc::new(config.dashboard.categories.clone());
        let resolver = Arc::new(resolver);
        let aggregator = Arc::new(CashStatsAggregator::new(services.query.clone(), timeout));
        let dispatcher = ActionDispatcher::new(
            categories.clone(),
            services.actions,
            services.notifier.clone(),
            services.query,
            resolver.clone(),
            timeout,
        )
        .scope_open_to_identity(config.dashboard.scope_open_to_identity);

        let initial = aggregator::zeroed(&categories);

        Self {
            categories,
            resolver,
            aggregator,
            dispatcher,
            notifier: services.notifier,
            state: RwLock::new(DashboardState {
                snapshot: Arc::new(initial),
                selected: None,
                refreshed_at: None,
            }),
        }
    }

    pub fn categories(&self) -> &[CashCategory] {
        &self.categories
    }

    /// Populate the snapshot for the first display
    pub async fn start(&self) -> Arc<StatsSnapshot> {
        log::info!(target: "cashdesk::dashboard", "starting dashboard with {} categories", self.categories.len());
        self.reload_stats().await
    }

    /// Re-aggregate and tell the user the numbers are fresh
    pub async fn refresh(&self) -> Arc<StatsSnapshot> {
        let snapshot = self.reload_stats().await;
        self.notifier.show(Notification::success(
            "Updated",
            "Statistics updated successfully.",
        ));
        snapshot
    }

    /// Run identity resolution and aggregation, then swap the snapshot in.
    ///
    /// The run happens on its own task: a panicking strategy or backend ends
    /// up as the all-zero snapshot instead of tearing down the caller.
    pub async fn reload_stats(&self) -> Arc<StatsSnapshot> {
        let categories = self.categories.clone();
        let resolver = self.resolver.clone();
        let aggregator = self.aggregator.clone();

        let task = tokio::spawn(async move { aggregator.collect(&resolver, &categories).await });

        let snapshot = match task.await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!(target: "cashdesk::dashboard", "statistics task aborted: {}", e);
                aggregator::zeroed(&self.categories)
            }
        };

        if snapshot.mode == ResolutionMode::Unavailable {
            log::warn!(target: "cashdesk::dashboard", "statistics unavailable, showing zeros");
        }

        let snapshot = Arc::new(snapshot);
        let mut state = self.state.write().await;
        state.snapshot = snapshot.clone();
        state.refreshed_at = Some(Utc::now());
        snapshot
    }

    pub async fn snapshot(&self) -> Arc<StatsSnapshot> {
        self.state.read().await.snapshot.clone()
    }

    pub async fn selected(&self) -> Option<String> {
        self.state.read().await.selected.clone()
    }

    pub async fn state(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// Remember the category and open its list
    pub async fn select(&self, key: &str) -> DispatchOutcome {
        if self.dispatcher.category(key).is_some() {
            self.state.write().await.selected = Some(key.to_string());
        }
        self.dispatcher.dispatch(&ActionIntent::new(key, IntentKind::Select)).await
    }

    pub async fn create(&self, key: &str) -> DispatchOutcome {
        self.dispatcher.dispatch(&ActionIntent::new(key, IntentKind::Create)).await
    }

    pub async fn view_open(&self, key: &str) -> DispatchOutcome {
        self.dispatcher.dispatch(&ActionIntent::new(key, IntentKind::ViewOpen)).await
    }

    pub async fn movement_analysis(&self, key: &str) -> DispatchOutcome {
        self.dispatcher.dispatch(&ActionIntent::new(key, IntentKind::MovementAnalysis)).await
    }

    /// Route any intent, keeping the selection in sync
    pub async fn handle(&self, intent: &ActionIntent) -> DispatchOutcome {
        match intent.kind {
            IntentKind::Select => self.select(&intent.category).await,
            _ => self.dispatcher.dispatch(intent).await,
        }
    }
}

// ==================== Tests ====================
