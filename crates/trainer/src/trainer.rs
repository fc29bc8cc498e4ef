//! End-to-end pipeline training
//!
//! Split → fit scaler → fit selector → fit bagged forest → evaluate.

use soilscope_model::{PipelineMetadata, PipelineParams, SoilPipeline};
use tracing::info;

use crate::cart::TreeConfig;
use crate::dataset::Dataset;
use crate::errors::TrainerError;
use crate::evaluate::ClassificationReport;
use crate::forest::{fit_bagged_forest, sqrt_features, ForestConfig};
use crate::preprocess::{fit_scaler, fit_selector};

/// Pipeline training configuration
#[derive(Clone, Debug)]
pub struct TrainingParams {
    pub n_estimators: usize,
    pub trees_per_estimator: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub min_samples_split: usize,
    /// Candidate columns per split; `None` means `sqrt(selected columns)`
    pub max_features: Option<usize>,
    pub percentile: u8,
    pub test_percent: u8,
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            n_estimators: 10,
            trees_per_estimator: 50,
            max_depth: 10,
            min_samples_leaf: 1,
            min_samples_split: 2,
            max_features: None,
            percentile: 80,
            test_percent: 20,
            seed: 42,
        }
    }
}

impl TrainingParams {
    pub fn validate(&self) -> Result<(), TrainerError> {
        let fail = |msg: &str| Err(TrainerError::Training(msg.to_string()));
        if self.n_estimators == 0 || self.trees_per_estimator == 0 {
            return fail("ensemble needs at least one estimator and one tree");
        }
        if self.max_depth == 0 {
            return fail("max_depth must be positive");
        }
        if self.percentile == 0 || self.percentile > 100 {
            return fail("percentile must be in 1..=100");
        }
        if self.test_percent == 0 || self.test_percent >= 100 {
            return fail("test_percent must be in 1..=99");
        }
        if self.max_features == Some(0) {
            return fail("max_features must be positive");
        }
        Ok(())
    }
}

/// A fitted pipeline with its held-out evaluation.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub pipeline: SoilPipeline,
    pub report: ClassificationReport,
}

/// Irrigation pipeline trainer
pub struct PipelineTrainer {
    params: TrainingParams,
}

impl PipelineTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    pub fn train(&self, dataset: &Dataset) -> Result<TrainingOutcome, TrainerError> {
        self.params.validate()?;
        dataset
            .validate()
            .map_err(|err| TrainerError::Dataset(format!("{err:#}")))?;
        let p = &self.params;

        let (train, test) = dataset.stratified_split(p.test_percent, p.seed);
        let [needed, not_needed] = train.class_counts();
        if needed == 0 || not_needed == 0 {
            return Err(TrainerError::Dataset(
                "training split must contain both classes".to_string(),
            ));
        }
        if test.is_empty() {
            return Err(TrainerError::Dataset("test split is empty".to_string()));
        }
        info!(
            "Split: {} training / {} test samples",
            train.len(),
            test.len()
        );

        let scaler = fit_scaler(&train.features, train.feature_count)?;
        let scale = soilscope_model::SCALE;
        let standardized: Vec<Vec<i64>> = train
            .features
            .iter()
            .map(|row| scaler.transform(row, scale))
            .collect();

        let selector = fit_selector(&standardized, &train.targets, train.feature_count, p.percentile)?;
        info!("Selected feature columns: {:?}", selector.selected);
        let selected: Vec<Vec<i64>> = standardized.iter().map(|row| selector.transform(row)).collect();

        let max_features = p
            .max_features
            .unwrap_or_else(|| sqrt_features(selector.selected.len()))
            .min(selector.selected.len());
        let forest_config = ForestConfig {
            n_estimators: p.n_estimators,
            trees_per_estimator: p.trees_per_estimator,
            tree: TreeConfig {
                max_depth: p.max_depth,
                min_samples_leaf: p.min_samples_leaf,
                min_samples_split: p.min_samples_split,
                max_features,
            },
        };
        info!(
            "Fitting {} x {} trees (max depth {}, {} candidate features per split)",
            p.n_estimators, p.trees_per_estimator, p.max_depth, max_features
        );
        let classifier = fit_bagged_forest(&selected, &train.targets, &forest_config, p.seed);

        let metadata = PipelineMetadata {
            created_at: chrono::Utc::now().timestamp(),
            train_samples: train.len(),
            test_samples: test.len(),
            test_accuracy: 0,
            fingerprint: String::new(),
            params: PipelineParams {
                n_estimators: p.n_estimators,
                trees_per_estimator: p.trees_per_estimator,
                max_depth: p.max_depth,
                min_samples_leaf: p.min_samples_leaf,
                min_samples_split: p.min_samples_split,
                max_features,
                percentile: p.percentile,
                test_percent: p.test_percent,
                seed: p.seed,
            },
        };
        let mut pipeline = SoilPipeline::new(scaler, selector, classifier, metadata)?;

        let predicted: Vec<_> = test
            .features
            .iter()
            .map(|row| pipeline.predict_fixed(row))
            .collect();
        let report = ClassificationReport::from_predictions(&predicted, &test.targets);
        pipeline.metadata.test_accuracy = report.accuracy;

        pipeline.validate()?;
        Ok(TrainingOutcome { pipeline, report })
    }
}
