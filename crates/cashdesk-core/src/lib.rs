//! Cash register dashboard logic
//!
//! Three cooperating pieces sit behind the dashboard:
//! - resolver: finds the current user through ordered strategies
//! - aggregator: per-category counts that tolerate missing collections
//! - dispatcher: registered action first, synthesized view otherwise
//!
//! [`Dashboard`] wires them together and owns the displayed snapshot.

pub mod error;
pub mod types;
pub mod models;
pub mod services;
pub mod resolver;
pub mod aggregator;
pub mod dispatcher;
pub mod dashboard;
pub mod store;

#[cfg(test)]
mod fakes;

pub use error::{CoreError, CoreResult, ErrorSeverity};
pub use types::{NavTarget, RecordStatus, Severity, ViewMode};
pub use models::{
    ActionDescriptor, ActionIntent, ActionRequest, CategoryEntry, CategoryStats, DispatchOutcome,
    Filter, Identity, IntentKind, Notification, ResolutionMode, StatsSnapshot,
};
pub use services::{ActionService, Notifier, RecordQueryService, SessionService};
pub use resolver::{IdentityStrategy, UserContextResolver};
pub use aggregator::CashStatsAggregator;
pub use dispatcher::{ActionDispatcher, NavigationPlan};
pub use dashboard::{Dashboard, DashboardState, Services};
pub use store::{CashRecord, MemoryStore, StaticSession};
