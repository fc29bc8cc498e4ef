//! SoilScope API - HTTP surface for soil analysis
//!
//! `GET /` reports status, `POST /analyze` classifies and scores a sample,
//! `POST /analyze/advice` adds crop and soil-management advice and
//! `GET /metrics` exposes Prometheus counters.

pub mod errors;
pub mod server;
pub mod service;

pub use errors::{ApiError, ValidationError};
pub use server::{build_router, start_server, AppState, CorsPolicy, SharedState};
pub use service::{AnalysisError, SoilAnalyzer, MODEL_NOT_LOADED};
