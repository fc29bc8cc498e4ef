//! Deterministic irrigation classifier.
//!
//! The pipeline is integer-only at inference time:
//!
//! - **Fixed-point features**: sample readings are scaled by 1e6 and rounded
//! - **Standardization**: `z = (x - mean) * SCALE / std`
//! - **Feature selection**: a fixed subset of standardized columns
//! - **Bagged random forests**: every tree yields a class-1 probability at SCALE
//! - **Canonical JSON + BLAKE3**: the artifact hashes identically everywhere
//!
//! # Artifact format
//!
//! ```json
//! {
//!   "classifier": {"estimators": [{"trees": [{"nodes": [
//!     {"feature_idx":0,"id":0,"leaf":null,"left":1,"right":2,"threshold":-250000},
//!     {"feature_idx":-1,"id":1,"leaf":1000000,"left":-1,"right":-1,"threshold":0},
//!     {"feature_idx":-1,"id":2,"leaf":0,"left":-1,"right":-1,"threshold":0}
//!   ]}]}]},
//!   "feature_names": ["N","P","K","temperature","humidity","ph","rainfall"],
//!   "metadata": {...},
//!   "scale": 1000000,
//!   "scaler": {"mean": [...], "std": [...]},
//!   "selector": {"percentile": 80, "scores": [...], "selected": [0,3,4,5,6]},
//!   "version": 1
//! }
//! ```
//!
//! A `<name>.hash` sidecar holding the BLAKE3 hex digest of the file is
//! checked on load when present.

pub mod classifier;
pub mod errors;
pub mod features;
pub mod forest;
pub mod pipeline;
pub mod scaler;
pub mod selection;
pub mod serde_canon;

pub use classifier::{Classifier, ModelState};
pub use errors::ModelError;
pub use features::{extract_features, to_fixed, SCALE};
pub use forest::{BaggedForest, Node, RandomForest, Tree};
pub use pipeline::{sidecar_path, PipelineMetadata, PipelineParams, SoilPipeline, PIPELINE_VERSION};
pub use scaler::StandardScaler;
pub use selection::FeatureSelector;
