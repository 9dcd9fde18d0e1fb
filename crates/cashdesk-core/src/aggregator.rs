//! Per-category statistics with isolated failures
//!
//! Each category gets four counts (total, open, closed, draft) scoped to the
//! resolved identity, or global when no identity resolved. A category entry is
//! atomic: the counts either all come back or the entry is zeroed. One
//! unavailable category, including one with no collection configured, never
//! affects the others. Only a list with duplicate keys zeroes everything.

use cashdesk_config::CashCategory;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::models::{CategoryEntry, CategoryStats, Filter, Identity, ResolutionMode, StatsSnapshot};
use crate::resolver::UserContextResolver;
use crate::services::{with_timeout, QueryRef};
use crate::types::RecordStatus;

pub struct CashStatsAggregator {
    query: QueryRef,
    timeout: Duration,
    logger: Arc<dyn ErrorLogger>,
}

impl CashStatsAggregator {
    pub fn new(query: QueryRef, timeout: Duration) -> Self {
        Self {
            query,
            timeout,
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Resolve the identity once, then aggregate with it
    pub async fn collect(&self, resolver: &UserContextResolver, categories: &[CashCategory]) -> StatsSnapshot {
        let identity = resolver.resolve().await;
        self.aggregate(identity.as_ref(), categories).await
    }

    /// Snapshot with exactly one entry per requested category; never fails
    pub async fn aggregate(&self, identity: Option<&Identity>, categories: &[CashCategory]) -> StatsSnapshot {
        match self.try_aggregate(identity, categories).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.logger.log_error(&e, &ErrorContext::new("aggregate"));
                zeroed(categories)
            }
        }
    }

    async fn try_aggregate(&self, identity: Option<&Identity>, categories: &[CashCategory]) -> CoreResult<StatsSnapshot> {
        validate_categories(categories)?;

        let mode = match identity {
            Some(_) => ResolutionMode::Filtered,
            None => ResolutionMode::Unfiltered,
        };

        let mut entries = Vec::with_capacity(categories.len());
        for category in categories {
            let stats = match self.category_stats(identity, category).await {
                Ok(stats) => stats,
                Err(e) => {
                    let context = ErrorContext::new("aggregate").with_category(&category.key);
                    self.logger.log_recovered(&e, &context);
                    CategoryStats::default()
                }
            };
            entries.push(CategoryEntry {
                key: category.key.clone(),
                stats,
            });
        }

        Ok(StatsSnapshot { mode, entries })
    }

    async fn category_stats(&self, identity: Option<&Identity>, category: &CashCategory) -> CoreResult<CategoryStats> {
        if category.collection.trim().is_empty() {
            return Err(CoreError::InvalidCategory {
                message: format!("category '{}' has no collection", category.key),
            });
        }

        let scope = Filter::owned_by(identity);
        let open = scope.clone().status(RecordStatus::Open);
        let closed = scope.clone().status(RecordStatus::Closed);
        let draft = scope.clone().status(RecordStatus::Draft);

        let (total, open, closed, draft) = tokio::join!(
            self.count(&category.collection, &scope),
            self.count(&category.collection, &open),
            self.count(&category.collection, &closed),
            self.count(&category.collection, &draft),
        );

        Ok(CategoryStats::new(total?, open?, closed?).with_draft(draft?))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> CoreResult<u64> {
        let operation = format!("count {} [{}]", collection, filter);
        with_timeout(&operation, self.timeout, self.query.count(collection, filter)).await
    }
}

/// All-zero snapshot used when aggregation fails wholesale
pub fn zeroed(categories: &[CashCategory]) -> StatsSnapshot {
    StatsSnapshot::zeroed(categories.iter().map(|c| c.key.as_str()), ResolutionMode::Unavailable)
}

/// Reject category lists whose entries cannot be told apart
pub fn validate_categories(categories: &[CashCategory]) -> CoreResult<()> {
    let mut seen = HashSet::new();
    for category in categories {
        if !seen.insert(category.key.as_str()) {
            return Err(CoreError::InvalidCategory {
                message: format!("category '{}' is listed twice", category.key),
            });
        }
    }
    Ok(())
}

// ==================== Tests ====================
