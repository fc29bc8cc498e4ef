//! Integration tests for the pipeline trainer
//!
//! Reproducibility, accuracy on synthetic data and artifact round trips.

use anyhow::Result;
use soilscope_model::{Classifier, ModelState, SoilPipeline, SCALE};
use soilscope_trainer::{
    save_pipeline, smoke_samples, synthetic_label, train_pipeline_from_csv, Dataset,
    PipelineTrainer, TrainingParams,
};
use soilscope_types::IrrigationClass;

fn small_params() -> TrainingParams {
    TrainingParams {
        n_estimators: 3,
        trees_per_estimator: 8,
        max_depth: 8,
        ..TrainingParams::default()
    }
}

#[test]
fn test_identical_runs_share_fingerprint() -> Result<()> {
    let dataset = Dataset::synthetic(600, 42);

    let first = PipelineTrainer::new(small_params()).train(&dataset)?;
    let second = PipelineTrainer::new(small_params()).train(&dataset)?;

    assert_eq!(
        first.pipeline.metadata.fingerprint,
        second.pipeline.metadata.fingerprint
    );
    assert_eq!(first.pipeline.classifier, second.pipeline.classifier);
    assert_eq!(first.report, second.report);
    Ok(())
}

#[test]
fn test_different_seed_changes_fingerprint() -> Result<()> {
    let dataset = Dataset::synthetic(600, 42);
    let first = PipelineTrainer::new(small_params()).train(&dataset)?;
    let other = PipelineTrainer::new(TrainingParams {
        seed: 7,
        ..small_params()
    })
    .train(&dataset)?;

    assert_ne!(
        first.pipeline.metadata.fingerprint,
        other.pipeline.metadata.fingerprint
    );
    Ok(())
}

#[test]
fn test_synthetic_accuracy() -> Result<()> {
    let dataset = Dataset::synthetic(1000, 42);
    let outcome = PipelineTrainer::new(small_params()).train(&dataset)?;

    assert!(
        outcome.report.accuracy >= 75 * SCALE / 100,
        "accuracy too low:\n{}",
        outcome.report
    );
    Ok(())
}

#[test]
fn test_synthetic_labels_follow_rule() {
    let dataset = Dataset::synthetic(2000, 42);
    for (row, target) in dataset.features.iter().zip(&dataset.targets) {
        let (humidity, rainfall) = (row[4], row[6]);
        let expected = if humidity < 50 * SCALE && rainfall < 30 * SCALE {
            IrrigationClass::Needed
        } else if rainfall > 100 * SCALE || (humidity > 75 * SCALE && rainfall > 50 * SCALE) {
            IrrigationClass::NotNeeded
        } else {
            IrrigationClass::Needed
        };
        assert_eq!(*target, expected);
        assert_eq!(*target, synthetic_label(humidity, rainfall));
    }
}

#[test]
fn test_save_reload_matches_predictions() -> Result<()> {
    let dataset = Dataset::synthetic(500, 42);
    let outcome = PipelineTrainer::new(small_params()).train(&dataset)?;
    let dir = tempfile::tempdir()?;

    let saved = save_pipeline(&outcome.pipeline, dir.path())?;
    assert!(saved.model_path.exists());
    assert_eq!(std::fs::read_to_string(&saved.hash_path)?, saved.hash);

    let loaded = SoilPipeline::load_json(&saved.model_path)?;
    assert_eq!(loaded, outcome.pipeline);

    let state = ModelState::load(&saved.model_path);
    let classifier = state.classifier().expect("artifact should load");
    for (_, sample) in smoke_samples() {
        assert_eq!(classifier.predict(&sample), outcome.pipeline.predict(&sample));
    }
    Ok(())
}

#[test]
fn test_smoke_samples_on_full_size_data() -> Result<()> {
    let dataset = Dataset::synthetic(2000, 42);
    let outcome = PipelineTrainer::new(small_params()).train(&dataset)?;
    let [(_, dry), (_, wet), _] = smoke_samples();

    assert_eq!(outcome.pipeline.predict(&dry), IrrigationClass::Needed);
    assert_eq!(outcome.pipeline.predict(&wet), IrrigationClass::NotNeeded);
    Ok(())
}

#[test]
fn test_train_from_exported_csv() -> Result<()> {
    let dataset = Dataset::synthetic(300, 5);
    let dir = tempfile::tempdir()?;
    let csv = dir.path().join("soil_data.csv");
    dataset.to_csv(&csv)?;

    let from_csv = train_pipeline_from_csv(&csv, small_params())?;
    let direct = PipelineTrainer::new(small_params()).train(&dataset)?;
    assert_eq!(
        from_csv.pipeline.metadata.fingerprint,
        direct.pipeline.metadata.fingerprint
    );
    Ok(())
}
