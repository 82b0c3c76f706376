//! HTTP API server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/upload/farmer_data` | Validate and store a farm record |
//! | `POST` | `/upload/market_data` | Validate and store a market record |
//! | `GET`  | `/farmers` | All farm records |
//! | `GET`  | `/markets` | All market records |
//! | `GET`  | `/advise/{farm_id}` | Compose an advisory for one farm |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! The list endpoints answer an empty table with
//! `{ "message": "No farmer data found" }` (or the market equivalent), and an
//! unknown farm id on `/advise` yields `404 { "message": "Farm not found" }`.
//!
//! # Error Contract
//!
//! Other error responses share one shape:
//!
//! ```json
//! { "error": { "code": "validation_error", "message": "...", "fields": [...] } }
//! ```
//!
//! Error codes: `bad_request` (400), `unsupported_media_type` (415),
//! `validation_error` (422), `storage_error` (500), `model_unavailable` (502),
//! `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::advisor::{advisor_from_config, Advisor};
use crate::config::Config;
use crate::error::{Error, FieldError};
use crate::models::{
    FARM_ADDED_MESSAGE, FARM_NOT_FOUND_MESSAGE, MARKET_ADDED_MESSAGE, NO_FARMS_MESSAGE,
    NO_MARKETS_MESSAGE,
};
use crate::store::{SqliteStore, Store};
use crate::validate::{validate_farm, validate_market};
use crate::{db, migrate};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub advisor: Arc<Advisor>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, advisor: Arc<Advisor>) -> Self {
        Self { store, advisor }
    }
}

/// Build the application router with CORS and request tracing applied.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload/farmer_data", post(handle_upload_farm))
        .route("/upload/market_data", post(handle_upload_market))
        .route("/farmers", get(handle_list_farms))
        .route("/markets", get(handle_list_markets))
        .route("/advise/{farm_id}", get(handle_advise))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Opens the database (creating tables if needed), wires the store and the
/// advisory composer into the router, and serves on `[server].bind` until
/// Ctrl-C. The database pool is closed on the way out.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::create_tables(&pool).await?;
    info!("Database ready at {}", config.db.path.display());

    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool.clone()));
    let advisor = advisor_from_config(config, store.clone())?;
    let app = build_router(AppState::new(store, Arc::new(advisor)));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Farm advisor listening on http://{}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
}

/// Internal error type that converts into an Axum HTTP response.
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    fields: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                fields: self.fields,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn app_error(status: StatusCode, code: &str, message: impl Into<String>) -> AppError {
    AppError {
        status,
        code: code.to_string(),
        message: message.into(),
        fields: None,
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(v) => {
                warn!(fields = ?v.field_names(), "rejected invalid record");
                AppError {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    code: "validation_error".to_string(),
                    message: v.to_string(),
                    fields: Some(v.fields),
                }
            }
            Error::Storage(e) => {
                error!("Storage failure: {}", e);
                app_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    format!("Database error: {}", e),
                )
            }
            Error::ModelUnavailable(msg) => {
                error!("Language model failure: {}", msg);
                app_error(StatusCode::BAD_GATEWAY, "model_unavailable", msg)
            }
            other => {
                error!("Request failed: {}", other);
                app_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    other.to_string(),
                )
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        let code = if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
            "unsupported_media_type"
        } else {
            "bad_request"
        };
        app_error(status, code, rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        app_error(StatusCode::BAD_REQUEST, "bad_request", rejection.body_text())
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /upload/* ============

/// Handler for `POST /upload/farmer_data`.
///
/// Returns `422` with every offending field when validation fails.
async fn handle_upload_farm(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body?;
    let farm = validate_farm(&body).map_err(Error::from)?;
    let farm_id = state.store.insert_farm(&farm).await?;
    info!(farm_id, crop = %farm.crop_type, "stored farm record");

    Ok(Json(json!({ "message": FARM_ADDED_MESSAGE, "Farm_ID": farm_id })))
}

/// Handler for `POST /upload/market_data`.
async fn handle_upload_market(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body?;
    let market = validate_market(&body).map_err(Error::from)?;
    let market_id = state.store.insert_market(&market).await?;
    info!(market_id, product = %market.product, "stored market record");

    Ok(Json(json!({ "message": MARKET_ADDED_MESSAGE, "Market_ID": market_id })))
}

// ============ GET /farmers, /markets ============

async fn handle_list_farms(State(state): State<AppState>) -> Result<Response, AppError> {
    let farms = state.store.list_farms().await?;
    if farms.is_empty() {
        return Ok(Json(json!({ "message": NO_FARMS_MESSAGE })).into_response());
    }
    Ok(Json(farms).into_response())
}

async fn handle_list_markets(State(state): State<AppState>) -> Result<Response, AppError> {
    let markets = state.store.list_markets().await?;
    if markets.is_empty() {
        return Ok(Json(json!({ "message": NO_MARKETS_MESSAGE })).into_response());
    }
    Ok(Json(markets).into_response())
}

// ============ GET /advise/{farm_id} ============

/// Handler for `GET /advise/{farm_id}`.
///
/// An unknown farm is a `404` with the `{ "message": ... }` payload rather
/// than an error object; a failed model call is a `502`.
async fn handle_advise(
    State(state): State<AppState>,
    farm_id: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(farm_id) = farm_id?;

    match state.advisor.advise(farm_id).await? {
        Some(advisory) => Ok(Json(advisory).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": FARM_NOT_FOUND_MESSAGE })),
        )
            .into_response()),
    }
}
