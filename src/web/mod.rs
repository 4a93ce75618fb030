//! Web API module for Vitrine.
//!
//! This module provides the REST API a kiosk front end talks to: the scanned
//! catalog, media files, branding, and the kiosk state machine with its
//! assistant panel.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/catalog` - Category tree
//! - `POST /api/catalog/rescan` - Rescan the content root
//! - `GET /api/company` - Company product
//! - `GET /api/branding` - Theme
//! - `GET /api/idle` - Idle takeover settings
//! - `GET /api/media?path=` - A media file below the content root
//! - `GET /api/models` - Assistant models with a configured key
//! - `GET /api/kiosk` - Kiosk snapshot
//! - `POST /api/kiosk/events` - Dispatch a visitor event
//! - `GET /api/chat/history?limit=` - Persisted chat log
//! - `DELETE /api/chat/history` - Clear the chat log
//! - `POST /api/chat` - Ask the assistant
//! - `POST /api/chat/voice` - Ask the assistant with recorded audio

pub mod media;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::branding::BrandingConfig;
use crate::config::Config;
use crate::kiosk::{
    self, ChatExchange, ChatOutcome, KioskEvent, KioskHandle, KioskServices, KioskSettings,
    KioskSnapshot, KioskState,
};
use crate::models::{Category, ChatMessage, Product};
use crate::services::api_keys::{ApiKeys, Provider};
use crate::services::assistant::{available_models, ModelInfo};
use crate::services::chat_store::DEFAULT_HISTORY_READ;
use crate::services::{
    open_chat_store, CatalogService, DisabledTranscriber, IdleConfig, UnavailableAssistant,
};

/// Largest accepted voice recording.
const MAX_VOICE_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// Content root and current catalog
    catalog: Arc<RwLock<CatalogService>>,
    /// Kiosk event loop
    kiosk: KioskHandle,
    /// Assistant provider keys
    api_keys: Arc<ApiKeys>,
}

impl AppState {
    /// Scans the content root and starts the kiosk loop with the built-in
    /// collaborators.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: &Config) -> (Self, JoinHandle<KioskState>) {
        let api_keys = ApiKeys::load(&config.paths.app_root);
        let services = KioskServices {
            assistant: Arc::new(UnavailableAssistant::new(api_keys.clone())),
            transcriber: Arc::new(DisabledTranscriber),
            store: open_chat_store(config.paths.chat_log.as_deref()),
        };
        Self::with_services(config, api_keys, services)
    }

    /// Like [`AppState::new`] with caller-supplied collaborators.
    pub fn with_services(
        config: &Config,
        api_keys: ApiKeys,
        services: KioskServices,
    ) -> (Self, JoinHandle<KioskState>) {
        let catalog = CatalogService::load(config);
        let state = KioskState::new(
            catalog.catalog(),
            &KioskSettings::from_config(config),
            Instant::now(),
        );
        let (kiosk, task) = kiosk::spawn(state, services);

        (
            Self {
                catalog: Arc::new(RwLock::new(catalog)),
                kiosk,
                api_keys: Arc::new(api_keys),
            },
            task,
        )
    }

    /// Handle to the kiosk loop.
    #[must_use]
    pub fn kiosk(&self) -> &KioskHandle {
        &self.kiosk
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current health status (e.g., "healthy").
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Category tree response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    /// Root categories
    pub categories: Vec<Category>,
    /// Products in the whole tree, without the company product
    pub product_count: usize,
    /// When the catalog was scanned
    pub scanned_at: DateTime<Utc>,
}

/// Company product response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    /// The company product
    pub product: Product,
    /// Company logo file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<std::path::PathBuf>,
}

/// Query parameters for media requests.
#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    /// Path relative to the content root, or an absolute path from the catalog.
    pub path: String,
}

/// Model list response.
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    /// Models whose provider has a key.
    pub models: Vec<&'static ModelInfo>,
    /// Providers with a key.
    pub providers: Vec<Provider>,
}

/// Query parameters for chat history reads.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Number of messages (default 100).
    pub limit: Option<usize>,
}

/// Chat history response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Oldest first
    pub messages: Vec<ChatMessage>,
}

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Typed question; surrounding whitespace is trimmed
    pub text: String,
}

/// Chat reply.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The visitor's message as recorded
    pub question: ChatMessage,
    /// The assistant's reply
    pub answer: ChatMessage,
}

impl From<ChatExchange> for ChatResponse {
    fn from(exchange: ChatExchange) -> Self {
        Self {
            question: exchange.question,
            answer: exchange.answer,
        }
    }
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn kiosk_unavailable(e: &anyhow::Error) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiError::with_details("Kiosk is not running", e.to_string())),
    )
}

fn internal_error(error: &str, e: &anyhow::Error) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::with_details(error, format!("{e:#}"))),
    )
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/catalog - Category tree.
async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let catalog = state.catalog.read().await.catalog();
    Json(CatalogResponse {
        categories: catalog.categories.clone(),
        product_count: catalog.product_count(),
        scanned_at: catalog.scanned_at,
    })
}

/// POST /api/catalog/rescan - Rescan the content root and return home.
async fn rescan_catalog(State(state): State<AppState>) -> ApiResult<Json<CatalogResponse>> {
    let mut service = state.catalog.read().await.clone();
    let service = tokio::task::spawn_blocking(move || {
        service.rescan();
        service
    })
    .await
    .map_err(|e| internal_error("Rescan failed", &anyhow::Error::new(e)))?;

    let catalog = service.catalog();
    *state.catalog.write().await = service;

    state
        .kiosk
        .replace_catalog(Arc::clone(&catalog))
        .await
        .map_err(|e| kiosk_unavailable(&e))?;

    info!(
        categories = catalog.categories.len(),
        products = catalog.product_count(),
        "Catalog rescanned"
    );

    Ok(Json(CatalogResponse {
        categories: catalog.categories.clone(),
        product_count: catalog.product_count(),
        scanned_at: catalog.scanned_at,
    }))
}

/// GET /api/company - Company product.
async fn get_company(State(state): State<AppState>) -> ApiResult<Json<CompanyResponse>> {
    let catalog = state.catalog.read().await.catalog();
    let product = catalog.company.clone().ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new("No company info found")),
        )
    })?;

    Ok(Json(CompanyResponse {
        product,
        logo: catalog.company_logo.clone(),
    }))
}

/// GET /api/branding - Theme.
async fn get_branding(State(state): State<AppState>) -> Json<BrandingConfig> {
    Json(state.catalog.read().await.catalog().branding.clone())
}

/// GET /api/idle - Idle takeover settings.
async fn get_idle(State(state): State<AppState>) -> Json<IdleConfig> {
    Json(state.catalog.read().await.catalog().idle.clone())
}

/// GET /api/media?path= - Serve a media file.
async fn get_media(
    State(state): State<AppState>,
    Query(query): Query<MediaQuery>,
) -> ApiResult<Response> {
    let resolved = state.catalog.read().await.resolve_media(&query.path);
    let Some(resolved) = resolved else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::new(format!("Media not found: {}", query.path))),
        ));
    };
    Ok(media::serve(&resolved).await)
}

/// GET /api/models - Models with a configured key.
async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: available_models(&state.api_keys),
        providers: state.api_keys.providers(),
    })
}

/// GET /api/kiosk - Current kiosk state.
async fn get_kiosk(State(state): State<AppState>) -> ApiResult<Json<KioskSnapshot>> {
    let snapshot = state
        .kiosk
        .snapshot()
        .await
        .map_err(|e| kiosk_unavailable(&e))?;
    Ok(Json(snapshot))
}

/// POST /api/kiosk/events - Apply a visitor event.
async fn dispatch_event(
    State(state): State<AppState>,
    Json(event): Json<KioskEvent>,
) -> ApiResult<Json<KioskSnapshot>> {
    let snapshot = state
        .kiosk
        .dispatch(event)
        .await
        .map_err(|e| kiosk_unavailable(&e))?;
    Ok(Json(snapshot))
}

/// GET /api/chat/history - Persisted chat log.
async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_READ);
    let messages = state
        .kiosk
        .history(limit)
        .await
        .map_err(|e| internal_error("Failed to read chat history", &e))?;
    Ok(Json(HistoryResponse { messages }))
}

/// DELETE /api/chat/history - Clear the chat log.
async fn clear_history(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state
        .kiosk
        .clear_history()
        .await
        .map_err(|e| internal_error("Failed to clear chat history", &e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/chat - Ask the assistant.
async fn send_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let outcome = state
        .kiosk
        .chat(request.text)
        .await
        .map_err(|e| kiosk_unavailable(&e))?;
    chat_response(outcome)
}

/// POST /api/chat/voice - Ask the assistant with recorded audio.
async fn send_voice(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ChatResponse>> {
    if body.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("No audio received")),
        ));
    }
    let outcome = state
        .kiosk
        .voice(body.to_vec())
        .await
        .map_err(|e| kiosk_unavailable(&e))?;
    chat_response(outcome)
}

fn chat_response(outcome: ChatOutcome) -> ApiResult<Json<ChatResponse>> {
    match outcome {
        ChatOutcome::Answered(exchange) => Ok(Json(exchange.into())),
        ChatOutcome::Empty => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("Message is empty")),
        )),
        ChatOutcome::Busy => Err((
            StatusCode::CONFLICT,
            Json(ApiError::new("Another answer is still loading")),
        )),
        ChatOutcome::Discarded => Err((
            StatusCode::CONFLICT,
            Json(ApiError::new("The session was reset before the answer arrived")),
        )),
        ChatOutcome::VoiceFailed(message) => {
            warn!(error = %message, "Voice request failed");
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiError::with_details("Transcription failed", message)),
            ))
        }
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    // The kiosk front end is served from its own origin on the same machine.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Content endpoints
        .route("/api/catalog", get(get_catalog))
        .route("/api/catalog/rescan", post(rescan_catalog))
        .route("/api/company", get(get_company))
        .route("/api/branding", get(get_branding))
        .route("/api/idle", get(get_idle))
        .route("/api/media", get(get_media))
        // Kiosk state endpoints
        .route("/api/kiosk", get(get_kiosk))
        .route("/api/kiosk/events", post(dispatch_event))
        // Assistant endpoints
        .route("/api/models", get(list_models))
        .route("/api/chat", post(send_chat))
        .route(
            "/api/chat/history",
            get(get_history).delete(clear_history),
        )
        .route(
            "/api/chat/voice",
            post(send_voice).layer(DefaultBodyLimit::max(MAX_VOICE_BYTES)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the web server and the kiosk loop.
///
/// # Arguments
///
/// * `config` - Application configuration (content root, timers, assistant)
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: Config, addr: SocketAddr) -> anyhow::Result<()> {
    let (state, _kiosk_task) = AppState::new(&config);
    let app = create_router(state);

    info!(
        "Starting Vitrine web server on {} (content root {})",
        addr,
        config.paths.app_root.display()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
