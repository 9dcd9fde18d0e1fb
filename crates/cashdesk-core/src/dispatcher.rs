//! Navigation with a synthesized fallback
//!
//! Registered actions may be missing from a given deployment, but the effect
//! they produce (open this collection, in these view modes, with this context)
//! can always be described ad hoc. Every intent is therefore mapped to a
//! [`NavigationPlan`]: an optional symbolic action name plus the equivalent
//! [`ActionDescriptor`]. [`ActionDispatcher::run_plan`] tries the former and
//! falls back to the latter.

use cashdesk_config::CashCategory;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::models::{
    ActionDescriptor, ActionIntent, ActionRequest, DispatchOutcome, Filter, IntentKind, Notification,
};
use crate::resolver::UserContextResolver;
use crate::services::{with_timeout, ActionRef, NotifierRef, QueryRef};
use crate::types::{RecordStatus, ViewMode};

const ERROR_TITLE: &str = "Error";

/// What to run for one intent
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationPlan {
    /// Registered action to try first
    pub primary: Option<String>,
    /// Equivalent descriptor run when the primary is missing or fails
    pub fallback: ActionDescriptor,
}

/// Map an intent on `category` to its plan; `None` when the category cannot
/// serve the intent
pub fn plan_for(category: &CashCategory, kind: IntentKind) -> Option<NavigationPlan> {
    let plan = match kind {
        IntentKind::Select => NavigationPlan {
            primary: category.actions.open.clone(),
            fallback: ActionDescriptor::window(&category.title, &category.collection)
                .with_views(&[ViewMode::Kanban, ViewMode::List, ViewMode::Form])
                .with_context("default_state", json!(RecordStatus::Draft.to_string()))
                .with_context("search_default_my_records", json!(1)),
        },
        IntentKind::Create => NavigationPlan {
            primary: category.actions.create.clone(),
            fallback: ActionDescriptor::window(&category.create_title(), &category.collection)
                .with_views(&[ViewMode::Form])
                .with_context("default_state", json!(RecordStatus::Draft.to_string())),
        },
        IntentKind::ViewOpen => NavigationPlan {
            primary: category.actions.open_only.clone(),
            fallback: ActionDescriptor::window(&format!("Open {}", category.title), &category.collection)
                .with_views(&[ViewMode::List, ViewMode::Kanban, ViewMode::Form])
                .with_context("search_default_open", json!(1)),
        },
        IntentKind::MovementAnalysis => {
            let lines = category.line_collection.as_deref()?;
            NavigationPlan {
                primary: None,
                fallback: ActionDescriptor::window(&category.movements_title(), lines)
                    .with_views(&[ViewMode::List])
                    .with_context("search_default_current_month", json!(1)),
            }
        }
    };
    Some(plan)
}

pub struct ActionDispatcher {
    categories: Arc<Vec<CashCategory>>,
    actions: ActionRef,
    notifier: NotifierRef,
    query: QueryRef,
    resolver: Arc<UserContextResolver>,
    scope_open_to_identity: bool,
    timeout: Duration,
    logger: Arc<dyn ErrorLogger>,
}

impl ActionDispatcher {
    pub fn new(
        categories: Arc<Vec<CashCategory>>,
        actions: ActionRef,
        notifier: NotifierRef,
        query: QueryRef,
        resolver: Arc<UserContextResolver>,
        timeout: Duration,
    ) -> Self {
        Self {
            categories,
            actions,
            notifier,
            query,
            resolver,
            scope_open_to_identity: false,
            timeout,
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    /// Count only the user's own records before "view open"
    pub fn scope_open_to_identity(mut self, enabled: bool) -> Self {
        self.scope_open_to_identity = enabled;
        self
    }

    pub fn category(&self, key: &str) -> Option<&CashCategory> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Perform the navigation behind `intent`. Failures end up as a danger
    /// notification, never as an error for the caller.
    pub async fn dispatch(&self, intent: &ActionIntent) -> DispatchOutcome {
        let context = ErrorContext::new(&format!("dispatch {}", intent.kind)).with_category(&intent.category);

        let Some(category) = self.category(&intent.category) else {
            let error = CoreError::UnknownCategory { key: intent.category.clone() };
            self.logger.log_error(&error, &context);
            self.notifier.show(Notification::danger(
                ERROR_TITLE,
                &format!("Unknown cash register type: {}.", intent.category),
            ));
            return DispatchOutcome::Failed;
        };

        if intent.kind == IntentKind::ViewOpen {
            match self.count_open(category).await {
                Ok(0) => {
                    self.notifier.show(Notification::info(
                        "No Open Records",
                        &format!("There are no open {} records at the moment.", category.title),
                    ));
                    return DispatchOutcome::NothingToShow;
                }
                Ok(_) => {}
                Err(e) => {
                    self.logger.log_error(&e, &context);
                    self.notifier.show(Notification::danger(
                        ERROR_TITLE,
                        &format!("Could not check the open {} records.", category.title),
                    ));
                    return DispatchOutcome::Failed;
                }
            }
        }

        let Some(plan) = plan_for(category, intent.kind) else {
            self.notifier.show(Notification::danger(
                ERROR_TITLE,
                &format!("Movement analysis is not available for {}.", category.title),
            ));
            return DispatchOutcome::Failed;
        };

        match self.run_plan(&plan).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.logger.log_error(&e, &context);
                self.notifier.show(Notification::danger(
                    ERROR_TITLE,
                    &format!("Could not open {}.", plan.fallback.title),
                ));
                DispatchOutcome::Failed
            }
        }
    }

    /// Try the registered action, then the synthesized descriptor
    pub async fn run_plan(&self, plan: &NavigationPlan) -> CoreResult<DispatchOutcome> {
        if let Some(name) = &plan.primary {
            match self.run(&ActionRequest::Named(name.clone())).await {
                Ok(()) => return Ok(DispatchOutcome::Primary),
                Err(e) => {
                    log::info!(target: "cashdesk::dispatcher", "action {} unavailable ({}), opening {} directly", name, e, plan.fallback.collection);
                }
            }
        }

        self.run(&ActionRequest::Descriptor(plan.fallback.clone())).await?;
        Ok(DispatchOutcome::Fallback)
    }

    async fn run(&self, request: &ActionRequest) -> CoreResult<()> {
        with_timeout("run action", self.timeout, self.actions.run(request)).await
    }

    async fn count_open(&self, category: &CashCategory) -> CoreResult<u64> {
        let identity = if self.scope_open_to_identity {
            self.resolver.resolve().await
        } else {
            None
        };
        let filter = Filter::owned_by(identity.as_ref()).status(RecordStatus::Open);
        let operation = format!("count {} [{}]", category.collection, filter);
        with_timeout(&operation, self.timeout, self.query.count(&category.collection, &filter)).await
    }
}

// ==================== Tests ====================
