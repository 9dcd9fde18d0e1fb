//! Settings API endpoints - JSON API
//!
//! Only the dashboard section is exposed; session values stay server side.

use crate::AppState;
use cashdesk_config::CashCategory;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DashboardSettings<'a> {
    pub categories: &'a [CashCategory],
    pub query_timeout_ms: u64,
    pub scope_open_to_identity: bool,
    pub registered_actions: &'a [String],
}

pub async fn api_settings(state: axum::extract::State<AppState>) -> String {
    let dashboard = &state.config.dashboard;
    let settings = DashboardSettings {
        categories: &dashboard.categories,
        query_timeout_ms: dashboard.query_timeout_ms,
        scope_open_to_identity: dashboard.scope_open_to_identity,
        registered_actions: &dashboard.registered_actions,
    };
    serde_json::to_string(&settings).unwrap_or_default()
}
