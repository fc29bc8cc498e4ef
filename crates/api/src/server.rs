use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics::counter;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use soilscope_types::SoilSample;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::errors::{ApiError, ValidationError};
use crate::service::{AnalysisError, SoilAnalyzer};

pub const REQUESTS_TOTAL: &str = "soilscope_requests_total";
pub const ANALYSES_TOTAL: &str = "soilscope_analyses_total";
pub const MODEL_UNAVAILABLE_TOTAL: &str = "soilscope_model_unavailable_total";
pub const VALIDATION_ERRORS_TOTAL: &str = "soilscope_validation_errors_total";

/// Which browser origins may call the API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Mirror any origin and allow credentials (development).
    #[default]
    Permissive,
    /// Only these origins.
    AllowList(Vec<String>),
}

impl CorsPolicy {
    /// An empty list means permissive.
    pub fn from_origins(origins: &[String]) -> Self {
        if origins.is_empty() {
            CorsPolicy::Permissive
        } else {
            CorsPolicy::AllowList(origins.to_vec())
        }
    }

    fn layer(&self) -> CorsLayer {
        match self {
            CorsPolicy::Permissive => CorsLayer::very_permissive(),
            CorsPolicy::AllowList(origins) => {
                let origins: Vec<HeaderValue> = origins
                    .iter()
                    .filter_map(|origin| match HeaderValue::from_str(origin) {
                        Ok(value) => Some(value),
                        Err(_) => {
                            warn!("Ignoring invalid CORS origin: {}", origin);
                            None
                        }
                    })
                    .collect();
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
    }
}

pub struct AppState {
    pub analyzer: SoilAnalyzer,
    pub metrics: Option<PrometheusHandle>,
    pub cors: CorsPolicy,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(analyzer: SoilAnalyzer) -> Self {
        Self {
            analyzer,
            metrics: None,
            cors: CorsPolicy::default(),
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }
}

fn record_request() {
    counter!(REQUESTS_TOTAL).increment(1);
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
}

pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let shared = Arc::new(state);
    let app = build_router(shared);
    let listener = bind_listener(addr).await?;
    info!("SoilScope API listening on {}", addr);
    axum::serve(listener, app)
        .await
        .context("API server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind API listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind API listener on {addr}"))
    }
}

pub fn build_router(state: SharedState) -> Router {
    let cors = state.cors.layer();
    Router::new()
        .route("/", get(handle_status))
        .route("/analyze", post(handle_analyze))
        .route("/analyze/advice", post(handle_advice))
        .route("/metrics", get(handle_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    record_request();
    Json(StatusResponse {
        status: "API is online",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.analyzer.model_loaded(),
    })
}

async fn handle_analyze(
    State(state): State<SharedState>,
    payload: Result<Json<SoilSample>, JsonRejection>,
) -> Response {
    record_request();
    let sample = match parse_sample(payload) {
        Ok(sample) => sample,
        Err(err) => return err.into_response(),
    };
    analysis_response(state.analyzer.analyze(&sample))
}

async fn handle_advice(
    State(state): State<SharedState>,
    payload: Result<Json<SoilSample>, JsonRejection>,
) -> Response {
    record_request();
    let sample = match parse_sample(payload) {
        Ok(sample) => sample,
        Err(err) => return err.into_response(),
    };
    analysis_response(state.analyzer.advise(&sample))
}

async fn handle_metrics(State(state): State<SharedState>) -> Result<Response, ApiError> {
    record_request();
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| ApiError::not_found("Prometheus metrics are disabled"))?;

    let mut response = handle.render().into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    Ok(response)
}

fn parse_sample(payload: Result<Json<SoilSample>, JsonRejection>) -> Result<SoilSample, ValidationError> {
    match payload {
        Ok(Json(sample)) => Ok(sample),
        Err(rejection) => {
            counter!(VALIDATION_ERRORS_TOTAL).increment(1);
            let err = ValidationError::from(rejection);
            debug!(status = %err.status, "Rejected request body: {}", err.detail);
            Err(err)
        }
    }
}

/// Model-unavailable is a soft error: 200 with an `error` field.
fn analysis_response<T: Serialize>(result: Result<T, AnalysisError>) -> Response {
    match result {
        Ok(body) => {
            counter!(ANALYSES_TOTAL).increment(1);
            Json(body).into_response()
        }
        Err(err @ AnalysisError::ModelUnavailable) => {
            counter!(MODEL_UNAVAILABLE_TOTAL).increment(1);
            warn!("Analysis requested while the model is unavailable");
            Json(serde_json::json!({ "error": err.to_string() })).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_policy_from_origins() {
        assert_eq!(CorsPolicy::from_origins(&[]), CorsPolicy::Permissive);
        let origins = vec!["http://localhost:3000".to_string()];
        assert_eq!(
            CorsPolicy::from_origins(&origins),
            CorsPolicy::AllowList(origins.clone())
        );
    }
}
