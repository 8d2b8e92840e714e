//! HTTP surface.
//!
//! `GET /api/soil` runs the aggregation pipeline for one location. The
//! assistant routes accept model tool calls and expose the farm records.

use crate::analysis::{self, AggregationPlan};
use crate::assistant::{
    get_tool_definitions, CommandExecutor, FarmSnapshot, ToolCall, ToolDefinition, ToolResult,
};
use crate::config::AnalysisConfig;
use crate::models::{dedup_depths, parse_depth, Coordinates};
use crate::provider::{ProviderError, SoilDataSource};
use crate::report::SoilReport;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn SoilDataSource>,
    pub analysis: AnalysisConfig,
    pub assistant: CommandExecutor,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Provider(ProviderError::Auth { status, .. }) => {
                match StatusCode::from_u16(*status) {
                    Ok(code) if code.is_client_error() || code.is_server_error() => code,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                }
            }
            ApiError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub include_raw: bool,
    /// Comma-separated depth labels, e.g. `0-5,5-15`.
    pub depths: Option<String>,
}

/// Parse a comma-separated depth list. Blank input means "use the defaults".
/// Repeated labels are kept once, in first-seen order.
pub fn parse_depth_list(raw: Option<&str>) -> Result<Option<Vec<String>>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let labels = dedup_depths(raw.split(',').map(str::trim).filter(|d| !d.is_empty()));

    if labels.is_empty() {
        return Ok(None);
    }
    if let Some(bad) = labels.iter().find(|d| parse_depth(d).is_none()) {
        return Err(format!(
            "Invalid depth '{}': expected a range such as 0-5 with top < bottom",
            bad
        ));
    }

    Ok(Some(labels))
}

impl SoilQuery {
    fn into_plan(self, defaults: &AnalysisConfig) -> Result<(AggregationPlan, bool), ApiError> {
        let coords = Coordinates::new(
            self.lat.unwrap_or(defaults.default_latitude),
            self.lon.unwrap_or(defaults.default_longitude),
        );
        coords.validate().map_err(ApiError::BadRequest)?;

        let depths = parse_depth_list(self.depths.as_deref())
            .map_err(ApiError::BadRequest)?
            .unwrap_or_else(|| defaults.depths.clone());

        let plan = AggregationPlan {
            coords,
            depths,
            max_concurrent: defaults.max_concurrent_fetches,
        };
        Ok((plan, self.include_raw))
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub results: Vec<ToolResult>,
    pub farm: FarmSnapshot,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/soil", get(soil))
        .route("/api/assistant/commands", post(assistant_commands))
        .route("/api/assistant/tools", get(assistant_tools))
        .route("/api/assistant/farm", get(assistant_farm))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn soil(
    State(state): State<AppState>,
    query: Result<Query<SoilQuery>, QueryRejection>,
) -> Result<Json<SoilReport>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (plan, include_raw) = query.into_plan(&state.analysis)?;
    let report = analysis::run(state.source.as_ref(), &plan, include_raw).await?;
    Ok(Json(report))
}

async fn assistant_commands(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Json<CommandResponse> {
    let results = state.assistant.execute_all(&request.tool_calls).await;
    let applied = results.iter().filter(|r| r.success).count();
    info!(
        "Applied {}/{} assistant tool calls",
        applied,
        request.tool_calls.len()
    );

    let farm = state.assistant.store().snapshot().await;
    Json(CommandResponse { results, farm })
}

async fn assistant_tools() -> Json<Vec<ToolDefinition>> {
    Json(get_tool_definitions())
}

async fn assistant_farm(State(state): State<AppState>) -> Json<FarmSnapshot> {
    Json(state.assistant.store().snapshot().await)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
