use std::fmt;
use std::path::Path;
use std::sync::Arc;

use soilscope_types::{IrrigationClass, SoilSample};
use tracing::{error, info, instrument};

use crate::pipeline::SoilPipeline;

/// Anything that maps a soil sample to an irrigation label.
pub trait Classifier: Send + Sync {
    fn predict(&self, sample: &SoilSample) -> IrrigationClass;
}

impl Classifier for SoilPipeline {
    fn predict(&self, sample: &SoilSample) -> IrrigationClass {
        SoilPipeline::predict(self, sample)
    }
}

/// Outcome of the one-time model load.
///
/// Cloning shares the loaded classifier; nothing is ever reloaded.
#[derive(Clone)]
pub enum ModelState {
    Ready(Arc<dyn Classifier>),
    Unavailable { reason: Arc<str> },
}

impl ModelState {
    /// Load the pipeline artifact at `path`.
    ///
    /// Never fails: any load error is logged and kept as the unavailable reason.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Self {
        match SoilPipeline::load_json(path) {
            Ok(pipeline) => {
                info!(
                    estimators = pipeline.classifier.estimators.len(),
                    trees = pipeline.classifier.num_trees(),
                    selected = ?pipeline.selector.selected,
                    fingerprint = %pipeline.metadata.fingerprint,
                    "Model pipeline loaded"
                );
                Self::ready(pipeline)
            }
            Err(err) => {
                error!("Failed to load model pipeline: {}", err);
                Self::unavailable(err.to_string())
            }
        }
    }

    pub fn ready(classifier: impl Classifier + 'static) -> Self {
        ModelState::Ready(Arc::new(classifier))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        ModelState::Unavailable {
            reason: Arc::from(reason.into()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }

    pub fn classifier(&self) -> Option<&dyn Classifier> {
        match self {
            ModelState::Ready(classifier) => Some(classifier.as_ref()),
            ModelState::Unavailable { .. } => None,
        }
    }
}

impl fmt::Debug for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelState::Ready(_) => f.write_str("ModelState::Ready"),
            ModelState::Unavailable { reason } => f
                .debug_struct("ModelState::Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}
