//! HTTP API server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::stats: Snapshot JSON, refresh, dashboard page
//! - routes::categories: Select, create, view open, movement analysis
//! - routes::settings: Configuration display

pub mod error;
pub mod outbox;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use cashdesk_config::Config;
use cashdesk_core::Dashboard;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

pub use error::ApiError;
pub use outbox::{Outbox, OutboxEvents};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub outbox: Arc<Outbox>,
    pub config: Config,
    /// Held for the whole of an interaction so its outbox events stay together
    pub interaction: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config, dashboard: Arc<Dashboard>, outbox: Arc<Outbox>) -> Self {
        Self {
            dashboard,
            outbox,
            config,
            interaction: Arc::new(Mutex::new(())),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::categories::api_category_intent;
    use routes::settings::api_settings;
    use routes::stats::{api_refresh, api_stats, page_dashboard};

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/stats", get(api_stats))
        .route("/api/stats/refresh", post(api_refresh))
        .route("/api/categories/:key/:intent", post(api_category_intent))
        .route("/api/settings", get(api_settings))
        // HTMX page routes
        .route("/", get(page_dashboard))
        .route("/dashboard", get(page_dashboard))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Cashdesk</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        title, content
    )
}

/// Start the HTTP server
///
/// Binds `server.host:server.port` and serves until the listener fails.
pub async fn start_server(config: Config, dashboard: Arc<Dashboard>, outbox: Arc<Outbox>) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let router = create_router(AppState::new(config, dashboard, outbox));

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Cashdesk server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Dashboard)");
    log::info!("  - /api/stats (Statistics snapshot)");
    log::info!("  - /api/categories/:key/:intent (Category actions)");
    log::info!("  - /api/settings (Configuration)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use cashdesk_core::{CashRecord, MemoryStore, RecordStatus, Services, StaticSession};
    use tower::ServiceExt;

    async fn app(registered: &[&str]) -> Router {
        let mut config = Config::default();
        config.session.user = Some("u".to_string());
        let store = MemoryStore::new().with_collection(
            "petty.cash",
            vec![
                CashRecord::new(1, Some("u"), RecordStatus::Open),
                CashRecord::new(2, Some("u"), RecordStatus::Closed),
            ],
        ).with_collection("logistics.cash", vec![CashRecord::new(3, Some("u"), RecordStatus::Closed)]);
        let outbox = Arc::new(Outbox::new(registered.iter().copied()));
        let services = Services {
            query: Arc::new(store),
            session: Arc::new(StaticSession::new(&config.session, None)),
            actions: outbox.clone(),
            notifier: outbox.clone(),
        };
        let dashboard = Arc::new(Dashboard::new(&config, services));
        dashboard.start().await;
        create_router(AppState::new(config, dashboard, outbox))
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let (status, body) = call(app(&[]).await, "GET", "/api/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "filtered");
        assert_eq!(body["entries"][0]["key"], "petty_cash");
        assert_eq!(body["entries"][0]["stats"]["total"], 2);
        assert_eq!(body["entries"][0]["stats"]["draft"], 0);
        assert_eq!(body["entries"][1]["stats"]["total"], 0);
        assert!(body["refreshed_at"].is_string());
    }

    #[tokio::test]
    async fn test_select_runs_registered_action() {
        let (status, body) = call(
            app(&["petty_cash.action_petty_cash"]).await,
            "POST",
            "/api/categories/petty_cash/select",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "primary");
        assert_eq!(body["navigation"][0]["type"], "named");
        assert_eq!(body["navigation"][0]["action"], "petty_cash.action_petty_cash");
    }

    #[tokio::test]
    async fn test_movements_always_synthesized() {
        let (_, body) = call(app(&[]).await, "POST", "/api/categories/distribution_cash/movements").await;

        assert_eq!(body["outcome"], "fallback");
        assert_eq!(body["navigation"][0]["type"], "descriptor");
        assert_eq!(body["navigation"][0]["action"]["collection"], "distribution.cash.line");
    }

    #[tokio::test]
    async fn test_open_without_open_records_notifies() {
        let (_, body) = call(app(&[]).await, "POST", "/api/categories/logistics_cash/open").await;

        assert_eq!(body["outcome"], "nothing_to_show");
        assert!(body["navigation"].as_array().unwrap().is_empty());
        assert_eq!(body["notifications"][0]["severity"], "info");
    }

    #[tokio::test]
    async fn test_refresh_reports_success() {
        let (_, body) = call(app(&[]).await, "POST", "/api/stats/refresh").await;

        assert_eq!(body["success"], true);
        assert_eq!(body["notifications"][0]["severity"], "success");
        assert_eq!(body["stats"]["entries"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_bad_requests() {
        let (status, _) = call(app(&[]).await, "POST", "/api/categories/petty_cash/delete").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(app(&[]).await, "POST", "/api/categories/bank_cash/select").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_settings_hide_session() {
        let (status, body) = call(app(&[]).await, "GET", "/api/settings").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["categories"].as_array().unwrap().len(), 3);
        assert_eq!(body["query_timeout_ms"], 5000);
        assert!(body.get("session").is_none());
        assert!(body.get("server").is_none());
    }

    #[tokio::test]
    async fn test_dashboard_page_renders_cards() {
        let response = app(&[])
            .await
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(html.contains("Petty Cash"));
        assert!(html.contains("/api/categories/logistics_cash/open"));
        assert!(html.contains("Showing your cash registers"));
        assert!(html.contains("id='draft-petty_cash'>0<"));
    }
}
