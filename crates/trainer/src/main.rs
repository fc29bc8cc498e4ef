//! SoilScope pipeline trainer CLI
//!
//! One-shot batch job producing the irrigation classifier artifact.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use soilscope_model::{Classifier, ModelState};
use soilscope_trainer::dataset::format_fixed;
use soilscope_trainer::{
    save_pipeline, smoke_samples, Dataset, PipelineTrainer, TrainingParams, VERSION,
};
use soilscope_types::{IrrigationClass, FEATURE_NAMES};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "soilscope-train")]
#[command(author = "SoilScope Contributors")]
#[command(version = VERSION)]
#[command(about = "Deterministic trainer for the SoilScope irrigation pipeline", long_about = None)]
struct Args {
    /// Input CSV dataset (N,P,K,temperature,humidity,ph,rainfall,irrigation_needed).
    /// Synthetic data is generated when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Number of synthetic samples
    #[arg(long, default_value = "2000")]
    samples: usize,

    /// Write the training dataset to this CSV path
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Output directory for the pipeline and its hash
    #[arg(short, long, default_value = "models")]
    output: PathBuf,

    /// Number of bagged random forests
    #[arg(long, default_value = "10")]
    estimators: usize,

    /// Trees per random forest
    #[arg(long, default_value = "50")]
    trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value = "10")]
    max_depth: usize,

    /// Minimum samples per leaf
    #[arg(long, default_value = "1")]
    min_samples_leaf: usize,

    /// Minimum samples to split a node
    #[arg(long, default_value = "2")]
    min_samples_split: usize,

    /// Candidate features per split (default: sqrt of selected features)
    #[arg(long)]
    max_features: Option<usize>,

    /// Percentile of features kept by ANOVA selection
    #[arg(long, default_value = "80")]
    percentile: u8,

    /// Percentage of samples held out for evaluation
    #[arg(long, default_value = "20")]
    test_percent: u8,

    /// Random seed for data generation, splitting and bootstrapping
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("SoilScope Irrigation Pipeline Trainer v{}", VERSION);
    info!("═══════════════════════════════════════════");

    // Data
    let dataset = match &args.input {
        Some(path) => {
            info!("Loading dataset from: {}", path.display());
            Dataset::from_csv(path).context("Failed to load dataset")?
        }
        None => {
            info!(
                "Generating {} synthetic samples with seed {}",
                args.samples, args.seed
            );
            Dataset::synthetic(args.samples, args.seed)
        }
    };

    let [needed, not_needed] = dataset.class_counts();
    info!("Loaded {} samples", dataset.len());
    info!("  Irrigation needed (0): {}", needed);
    info!("  No irrigation needed (1): {}", not_needed);
    for (name, (min, max)) in FEATURE_NAMES.iter().zip(dataset.feature_stats()) {
        info!("  {}: min={}, max={}", name, format_fixed(min), format_fixed(max));
    }

    if let Some(path) = &args.export_csv {
        dataset
            .to_csv(path)
            .with_context(|| format!("Failed to export dataset to {}", path.display()))?;
        info!("Dataset exported to: {}", path.display());
    }

    // Fit
    let params = TrainingParams {
        n_estimators: args.estimators,
        trees_per_estimator: args.trees,
        max_depth: args.max_depth,
        min_samples_leaf: args.min_samples_leaf,
        min_samples_split: args.min_samples_split,
        max_features: args.max_features,
        percentile: args.percentile,
        test_percent: args.test_percent,
        seed: args.seed,
    };

    info!("═══════════════════════════════════════════");
    info!("Starting training...");
    let outcome = PipelineTrainer::new(params)
        .train(&dataset)
        .context("Training failed")?;
    let pipeline = &outcome.pipeline;

    info!("Training complete!");
    info!("  Estimators: {}", pipeline.classifier.estimators.len());
    info!("  Trees: {}", pipeline.classifier.num_trees());
    info!("  Fingerprint: {}", pipeline.metadata.fingerprint);

    // Evaluate
    info!("═══════════════════════════════════════════");
    info!(
        "Test accuracy: {:.2}%",
        outcome.report.accuracy as f64 / soilscope_model::SCALE as f64 * 100.0
    );
    info!("Classification report:");
    for line in outcome.report.to_string().lines() {
        info!("{}", line);
    }

    // Save
    let saved = save_pipeline(pipeline, &args.output).context("Failed to save pipeline")?;
    info!("Model saved to: {}", saved.model_path.display());
    info!("Hash saved to: {} ({})", saved.hash_path.display(), saved.hash);

    // Smoke test through the serving loader
    info!("═══════════════════════════════════════════");
    info!("Testing saved model");
    let state = ModelState::load(&saved.model_path);
    let classifier = match &state {
        ModelState::Ready(classifier) => classifier,
        ModelState::Unavailable { reason } => {
            anyhow::bail!("Saved model failed to reload: {reason}")
        }
    };
    for (name, sample) in smoke_samples() {
        let prediction = classifier.predict(&sample);
        let result = match prediction {
            IrrigationClass::NotNeeded => "No irrigation needed",
            IrrigationClass::Needed => "Irrigation needed",
        };
        info!("  {}: {} (class {})", name, result, prediction);
    }

    info!("═══════════════════════════════════════════");
    info!("✓ Training completed successfully");

    Ok(())
}
