//! The serialized classifier pipeline: scaler, selector, bagged forest.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use soilscope_types::{IrrigationClass, SoilSample, FEATURE_COUNT, FEATURE_NAMES};

use crate::errors::ModelError;
use crate::features::{extract_features, SCALE};
use crate::forest::BaggedForest;
use crate::scaler::StandardScaler;
use crate::selection::FeatureSelector;
use crate::serde_canon::{digest_hex, hash_canonical_hex, to_canonical_json};

/// Artifact format version.
pub const PIPELINE_VERSION: i32 = 1;

/// Hyperparameters the pipeline was trained with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PipelineParams {
    pub n_estimators: usize,
    pub trees_per_estimator: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub min_samples_split: usize,
    pub max_features: usize,
    pub percentile: u8,
    pub test_percent: u8,
    pub seed: u64,
}

/// Provenance recorded by the trainer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PipelineMetadata {
    /// Unix seconds
    pub created_at: i64,
    pub train_samples: usize,
    pub test_samples: usize,
    /// Test accuracy at SCALE
    pub test_accuracy: i64,
    /// BLAKE3 of the fitted components, see [`SoilPipeline::fingerprint`]
    pub fingerprint: String,
    pub params: PipelineParams,
}

/// Fitted irrigation classifier pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoilPipeline {
    pub version: i32,
    pub scale: i64,
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub selector: FeatureSelector,
    pub classifier: BaggedForest,
    pub metadata: PipelineMetadata,
}

#[derive(Serialize)]
struct FittedComponents<'a> {
    scaler: &'a StandardScaler,
    selector: &'a FeatureSelector,
    classifier: &'a BaggedForest,
}

impl SoilPipeline {
    /// Assemble a pipeline and stamp its fingerprint into the metadata.
    pub fn new(
        scaler: StandardScaler,
        selector: FeatureSelector,
        classifier: BaggedForest,
        mut metadata: PipelineMetadata,
    ) -> Result<Self, ModelError> {
        metadata.fingerprint = String::new();
        let mut pipeline = Self {
            version: PIPELINE_VERSION,
            scale: SCALE,
            feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            scaler,
            selector,
            classifier,
            metadata,
        };
        pipeline.metadata.fingerprint = pipeline.fingerprint()?;
        Ok(pipeline)
    }

    /// Structural validation of every stage.
    pub fn validate(&self) -> Result<(), ModelError> {
        let fail = |msg: String| Err(ModelError::ValidationFailed(msg));

        if self.version != PIPELINE_VERSION {
            return fail(format!("Unsupported pipeline version: {}", self.version));
        }
        if self.scale <= 0 {
            return fail(format!("Invalid scale: {}", self.scale));
        }
        if self.feature_names.len() != FEATURE_COUNT {
            return fail(format!(
                "Expected {FEATURE_COUNT} feature names, found {}",
                self.feature_names.len()
            ));
        }
        self.scaler
            .validate(FEATURE_COUNT)
            .map_err(ModelError::ValidationFailed)?;
        self.selector
            .validate(FEATURE_COUNT)
            .map_err(ModelError::ValidationFailed)?;

        if self.classifier.estimators.is_empty() {
            return fail("Classifier has no estimators".to_string());
        }
        let n_selected = self.selector.selected.len();
        for (e, forest) in self.classifier.estimators.iter().enumerate() {
            if forest.trees.is_empty() {
                return fail(format!("Estimator {e} has no trees"));
            }
            for (t, tree) in forest.trees.iter().enumerate() {
                tree.validate(n_selected, self.scale).map_err(|err| {
                    ModelError::ValidationFailed(format!("Estimator {e} tree {t}: {err}"))
                })?;
            }
        }

        Ok(())
    }

    /// Class-1 ("no irrigation") probability at `scale`.
    pub fn predict_proba(&self, sample: &SoilSample) -> i64 {
        self.predict_proba_fixed(&extract_features(sample, self.scale))
    }

    /// Same as [`predict_proba`](Self::predict_proba) for features already
    /// in fixed point.
    pub fn predict_proba_fixed(&self, raw: &[i64]) -> i64 {
        let standardized = self.scaler.transform(raw, self.scale);
        let selected = self.selector.transform(&standardized);
        self.classifier.predict_proba(&selected)
    }

    /// Label 1 only when its probability is strictly above one half.
    pub fn predict(&self, sample: &SoilSample) -> IrrigationClass {
        label_for(self.predict_proba(sample), self.scale)
    }

    pub fn predict_fixed(&self, raw: &[i64]) -> IrrigationClass {
        label_for(self.predict_proba_fixed(raw), self.scale)
    }

    /// BLAKE3 hex over the fitted scaler, selector and classifier.
    ///
    /// Independent of metadata, so retraining on the same data with the
    /// same parameters reproduces it.
    pub fn fingerprint(&self) -> Result<String, ModelError> {
        Ok(hash_canonical_hex(&FittedComponents {
            scaler: &self.scaler,
            selector: &self.selector,
            classifier: &self.classifier,
        })?)
    }

    pub fn to_canonical_json(&self) -> Result<String, ModelError> {
        Ok(to_canonical_json(self)?)
    }

    /// BLAKE3 hex of the canonical artifact bytes.
    pub fn hash_hex(&self) -> Result<String, ModelError> {
        Ok(digest_hex(self.to_canonical_json()?.as_bytes()))
    }

    /// Write the canonical artifact and its hash sidecar. Returns the hash.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<String, ModelError> {
        let path = path.as_ref();
        let json = self.to_canonical_json()?;
        let hash = digest_hex(json.as_bytes());
        fs::write(path, &json)?;
        fs::write(sidecar_path(path), &hash)?;
        Ok(hash)
    }

    /// Load and validate an artifact, checking the sidecar hash if present.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;

        let sidecar = sidecar_path(path);
        if sidecar.exists() {
            let expected = fs::read_to_string(&sidecar)?.trim().to_lowercase();
            let actual = digest_hex(&bytes);
            if expected != actual {
                return Err(ModelError::HashMismatch { expected, actual });
            }
        }

        let pipeline: SoilPipeline = serde_json::from_slice(&bytes)?;
        pipeline.validate()?;
        Ok(pipeline)
    }
}

/// `models/soil_pipeline.json` -> `models/soil_pipeline.hash`
pub fn sidecar_path(path: &Path) -> PathBuf {
    path.with_extension("hash")
}

fn label_for(probability: i64, scale: i64) -> IrrigationClass {
    if i128::from(probability) * 2 > i128::from(scale) {
        IrrigationClass::NotNeeded
    } else {
        IrrigationClass::Needed
    }
}
