//! Statistics API endpoints - JSON API

use crate::AppState;
use cashdesk_core::StatsSnapshot;
use serde::Serialize;

/// Snapshot plus the time it was computed
#[derive(Debug, Serialize)]
pub struct StatsResponse<'a> {
    #[serde(flatten)]
    pub snapshot: &'a StatsSnapshot,
    pub selected: Option<String>,
    pub refreshed_at: Option<String>,
}

pub async fn api_stats(state: axum::extract::State<AppState>) -> String {
    let current = state.dashboard.state().await;
    let response = StatsResponse {
        snapshot: &current.snapshot,
        selected: current.selected,
        refreshed_at: current.refreshed_at.map(|t| t.to_rfc3339()),
    };
    serde_json::to_string(&response).unwrap_or_default()
}

/// Recompute the statistics and report the toasts it raised
pub async fn api_refresh(state: axum::extract::State<AppState>) -> String {
    let _guard = state.interaction.lock().await;
    state.outbox.take();

    let snapshot = state.dashboard.refresh().await;
    let events = state.outbox.take();

    serde_json::to_string(&serde_json::json!({
        "success": true,
        "stats": &*snapshot,
        "notifications": events.notifications,
    }))
    .unwrap_or_default()
}
