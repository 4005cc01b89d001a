// src/api/mod.rs
// HTTP surface: context endpoints, Telegram webhook, health probe.

pub mod context;
pub mod error;
pub mod webhook;

pub use error::{ApiError, ApiResult};

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::chat::{ChatService, ContextStore};
use crate::config::BoltunConfig;
use crate::llm::ProviderGateway;
use crate::telegram::TelegramClient;

pub const API_VERSION: &str = "0.1.0";

// ============================================================================
// Server State
// ============================================================================

pub struct AppState {
    pub chat: ChatService,
    pub telegram: TelegramClient,
}

/// Wire the shared state from configuration.
pub fn build_state(config: &BoltunConfig) -> anyhow::Result<AppState> {
    let gateway = ProviderGateway::new(config)?;
    let telegram = TelegramClient::new(
        &config.telegram_api_base,
        &config.telegram_bot_token,
        config.request_timeout(),
    )?;

    Ok(AppState {
        chat: ChatService::new(ContextStore::new(), gateway),
        telegram,
    })
}

// ============================================================================
// Routes
// ============================================================================

/// Ceiling on total request handling time. Outbound calls carry their own
/// configurable timeouts below this, so provider trouble surfaces as a
/// failure reply rather than a dropped request.
const SURFACE_TIMEOUT: Duration = Duration::from_secs(180);

/// Create the router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // API version header on all responses
    let version_header = SetResponseHeaderLayer::if_not_present(
        header::HeaderName::from_static("x-api-version"),
        HeaderValue::from_static(API_VERSION),
    );

    Router::new()
        .route(
            "/context",
            get(context::get_context_handler)
                .post(context::post_chat_handler)
                .delete(context::clear_context_handler),
        )
        .route("/webhook", post(webhook::webhook_handler))
        .route("/health", get(health_handler))
        .method_not_allowed_fallback(method_not_allowed_handler)
        .layer(TimeoutLayer::new(SURFACE_TIMEOUT))
        .layer(version_header)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": API_VERSION,
    }))
}

async fn method_not_allowed_handler() -> impl IntoResponse {
    ApiError::method_not_allowed()
}

/// Run the HTTP server
pub async fn run(config: BoltunConfig) -> anyhow::Result<()> {
    let state = Arc::new(build_state(&config)?);
    let app = create_router(state);
    let addr = config.bind_address();

    println!("Server listening on http://{}", addr);
    if config.telegram_bot_token.is_empty() {
        println!("Telegram:     DISABLED (set TELEGRAM_BOT_TOKEN to enable)");
    } else {
        println!("Telegram:     ENABLED");
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
