//! Category API endpoints - one POST per user intent

use crate::outbox::OutboxEvents;
use crate::{ApiError, AppState};
use axum::extract::Path;
use cashdesk_core::{ActionIntent, DispatchOutcome, IntentKind};
use serde::Serialize;

/// What the browser should do after an interaction
#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    pub outcome: DispatchOutcome,
    #[serde(flatten)]
    pub events: OutboxEvents,
}

/// `POST /api/categories/:key/:intent` with intent one of
/// select, create, open, movements
pub async fn api_category_intent(
    state: axum::extract::State<AppState>,
    Path((key, intent)): Path<(String, String)>,
) -> Result<String, ApiError> {
    let kind: IntentKind = intent
        .parse()
        .map_err(|message| ApiError::BadRequest { message })?;
    if state.config.category(&key).is_none() {
        return Err(ApiError::NotFound {
            resource: format!("category '{}'", key),
        });
    }

    // One interaction at a time so the drained events belong to this request
    let _guard = state.interaction.lock().await;
    state.outbox.take();

    let outcome = state.dashboard.handle(&ActionIntent::new(&key, kind)).await;
    let response = InteractionResponse {
        outcome,
        events: state.outbox.take(),
    };

    log::info!(target: "cashdesk::api", "{} {} -> {:?}", key, kind, response.outcome);
    Ok(serde_json::to_string(&response).unwrap_or_default())
}
