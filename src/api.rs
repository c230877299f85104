// src/api.rs
//! HTTP surface: JSON analytics endpoints, the chat router, and the static UI.
//!
//! Handlers load the CSV collections on the blocking pool for every request
//! and hand them to the pure analytics functions. Nothing is cached.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::AnalyticsError;
use crate::health::{self, CustomerHealth};
use crate::intent::{self, QueryResult};
use crate::kpi::{DashboardKpis, SecurityKpis};
use crate::loader::{DataSource, Dataset};
use crate::metrics::{record_intent, record_request};
use crate::record::{Datasets, Record};
use crate::security::{self, IpProfile, SegmentProfile};
use crate::timebucket::{self, TimeBuckets};

#[derive(Clone)]
pub struct AppState {
    source: Arc<DataSource>,
}

impl AppState {
    pub fn new(source: DataSource) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(DataSource::from_config(cfg))
    }

    async fn load(&self, ds: Dataset) -> Result<Vec<Record>, ApiError> {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || source.load(ds))
            .await
            .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("dataset loader task")))
    }

    async fn load_all(&self) -> Result<Datasets, ApiError> {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || source.load_all())
            .await
            .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("dataset loader task")))
    }
}

/// API routes only (no static files). Used directly by tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/test", get(test_endpoint))
        .route("/api/dashboard", get(dashboard))
        .route("/api/customers", get(customers))
        .route("/api/tickets", get(tickets))
        .route("/api/security-kpis", get(security_kpis))
        .route("/api/ip-analysis", get(ip_analysis))
        .route("/api/attack-patterns", get(attack_patterns))
        .route("/api/network-analysis", get(network_analysis))
        .route("/api/health-scores", get(health_scores))
        .route("/api/chat", post(chat))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Full application: API routes with the dashboard UI served as fallback.
pub fn create_router(cfg: &AppConfig) -> Router {
    router(AppState::from_config(cfg)).fallback_service(ServeDir::new(&cfg.static_dir))
}

/* ----------------------------
Errors
---------------------------- */

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(anyhow::Error),
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(e) => {
                error!(error = ?e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/* ----------------------------
Handlers
---------------------------- */

async fn test_endpoint() -> Json<serde_json::Value> {
    Json(json!({ "message": "Server is running" }))
}

async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardKpis>, ApiError> {
    record_request("dashboard");
    let d = state.load_all().await?;
    Ok(Json(DashboardKpis::compute(
        &d.customers,
        &d.tickets,
        &d.incidents,
        &d.feedback,
    )))
}

async fn customers(State(state): State<AppState>) -> Result<Json<Vec<Record>>, ApiError> {
    record_request("customers");
    Ok(Json(state.load(Dataset::Customers).await?))
}

async fn tickets(State(state): State<AppState>) -> Result<Json<Vec<Record>>, ApiError> {
    record_request("tickets");
    Ok(Json(state.load(Dataset::Tickets).await?))
}

async fn security_kpis(State(state): State<AppState>) -> Result<Json<SecurityKpis>, ApiError> {
    record_request("security-kpis");
    let incidents = state.load(Dataset::Incidents).await?;
    let kpis = SecurityKpis::compute(&incidents);
    info!(posture = %kpis.security_posture, total = kpis.total_incidents, "security kpis");
    Ok(Json(kpis))
}

async fn ip_analysis(State(state): State<AppState>) -> Result<Json<Vec<IpProfile>>, ApiError> {
    record_request("ip-analysis");
    let incidents = state.load(Dataset::Incidents).await?;
    Ok(Json(security::analyze_ips(&incidents)?))
}

async fn attack_patterns(State(state): State<AppState>) -> Result<Json<TimeBuckets>, ApiError> {
    record_request("attack-patterns");
    let incidents = state.load(Dataset::Incidents).await?;
    Ok(Json(timebucket::attack_patterns(&incidents)))
}

async fn network_analysis(
    State(state): State<AppState>,
) -> Result<Json<Vec<SegmentProfile>>, ApiError> {
    record_request("network-analysis");
    let incidents = state.load(Dataset::Incidents).await?;
    Ok(Json(security::analyze_network_segments(&incidents)?))
}

async fn health_scores(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerHealth>>, ApiError> {
    record_request("health-scores");
    let d = state.load_all().await?;
    Ok(Json(health::health_scores(
        &d.customers,
        &d.tickets,
        &d.incidents,
        &d.feedback,
    )))
}

#[derive(serde::Deserialize)]
struct ChatReq {
    #[serde(default)]
    question: Option<String>,
}

#[derive(serde::Serialize)]
struct ChatResp {
    response: QueryResult,
}

async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatReq>,
) -> Result<Json<ChatResp>, ApiError> {
    record_request("chat");
    let question = body
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Question is required".into()))?;

    let data = state.load_all().await?;
    info!(
        customers = data.customers.len(),
        tickets = data.tickets.len(),
        incidents = data.incidents.len(),
        "chat data loaded"
    );

    let response = intent::answer(&question, &data);
    record_intent(response.kind());
    info!(intent = response.kind(), items = response.len(), "chat answered");

    Ok(Json(ChatResp { response }))
}
