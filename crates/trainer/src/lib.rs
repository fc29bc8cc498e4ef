//! SoilScope Trainer - deterministic offline pipeline trainer
//!
//! Generates or loads labelled soil readings and fits the irrigation
//! pipeline (standard scaler, ANOVA percentile selection, bagged random
//! forests) with integer arithmetic and seeded randomness only.

pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod evaluate;
pub mod forest;
pub mod preprocess;
pub mod trainer;

use std::path::{Path, PathBuf};

use soilscope_model::{sidecar_path, SoilPipeline};
use soilscope_types::SoilSample;

pub use dataset::{synthetic_label, Dataset, LABEL_COLUMN};
pub use deterministic::{LcgRng, SplitTieBreaker};
pub use errors::TrainerError;
pub use evaluate::{ClassMetrics, ClassificationReport};
pub use trainer::{PipelineTrainer, TrainingOutcome, TrainingParams};

/// File name of the serialized pipeline inside the output directory.
pub const ARTIFACT_FILE: &str = "soil_pipeline.json";

/// Train a pipeline directly from a CSV file.
pub fn train_pipeline_from_csv(
    path: &Path,
    params: TrainingParams,
) -> Result<TrainingOutcome, TrainerError> {
    let dataset = Dataset::from_csv(path).map_err(|err| TrainerError::Dataset(format!("{err:#}")))?;
    PipelineTrainer::new(params).train(&dataset)
}

/// Where a saved pipeline landed.
#[derive(Debug, Clone)]
pub struct SavedArtifact {
    pub model_path: PathBuf,
    pub hash_path: PathBuf,
    pub hash: String,
}

/// Write the pipeline and its hash sidecar into `dir`, creating it if needed.
pub fn save_pipeline(pipeline: &SoilPipeline, dir: &Path) -> Result<SavedArtifact, TrainerError> {
    std::fs::create_dir_all(dir)?;
    let model_path = dir.join(ARTIFACT_FILE);
    let hash = pipeline.save_json(&model_path)?;
    Ok(SavedArtifact {
        hash_path: sidecar_path(&model_path),
        model_path,
        hash,
    })
}

/// Canned readings for post-training smoke checks.
pub fn smoke_samples() -> [(&'static str, SoilSample); 3] {
    [
        (
            "Dry soil - needs irrigation",
            SoilSample {
                nitrogen: 50,
                phosphorus: 50,
                potassium: 50,
                temperature: 35.0,
                humidity: 40.0,
                ph: 6.5,
                rainfall: 20.0,
            },
        ),
        (
            "Wet soil - no irrigation",
            SoilSample {
                nitrogen: 80,
                phosphorus: 60,
                potassium: 70,
                temperature: 25.0,
                humidity: 85.0,
                ph: 6.8,
                rainfall: 150.0,
            },
        ),
        (
            "Moderate conditions",
            SoilSample {
                nitrogen: 70,
                phosphorus: 55,
                potassium: 60,
                temperature: 28.0,
                humidity: 70.0,
                ph: 6.5,
                rainfall: 80.0,
            },
        ),
    ]
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
