//! Request handling independent of the HTTP transport.

use soilscope_model::ModelState;
use soilscope_scoring::{improvement_suggestions, recommend_crops, score_fertility, score_irrigation};
use soilscope_types::{SoilAdvice, SoilAnalysis, SoilSample};
use thiserror::Error;
use tracing::debug;

/// Message returned to clients while no model is loaded.
pub const MODEL_NOT_LOADED: &str = "Model is not loaded on the server.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Model is not loaded on the server.")]
    ModelUnavailable,
}

/// Classifies a sample and scores it for irrigation and fertility.
///
/// Holds the model state loaded at startup; clones share it.
#[derive(Debug, Clone)]
pub struct SoilAnalyzer {
    state: ModelState,
}

impl SoilAnalyzer {
    pub fn new(state: ModelState) -> Self {
        Self { state }
    }

    pub fn model_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn analyze(&self, sample: &SoilSample) -> Result<SoilAnalysis, AnalysisError> {
        let classifier = self
            .state
            .classifier()
            .ok_or(AnalysisError::ModelUnavailable)?;

        let prediction = classifier.predict(sample);
        debug!(prediction = %prediction, "Sample classified");

        Ok(SoilAnalysis {
            irrigation_analysis: score_irrigation(prediction, sample.humidity, sample.rainfall),
            fertility_analysis: score_fertility(
                sample.nitrogen,
                sample.phosphorus,
                sample.potassium,
                sample.ph,
            ),
        })
    }

    /// `analyze` plus crop recommendations and improvement suggestions.
    pub fn advise(&self, sample: &SoilSample) -> Result<SoilAdvice, AnalysisError> {
        let analysis = self.analyze(sample)?;
        let recommended_crops = recommend_crops(sample, &analysis.fertility_analysis);
        let improvement_suggestions = improvement_suggestions(
            sample,
            &analysis.fertility_analysis,
            analysis.irrigation_analysis.score,
        );
        Ok(SoilAdvice {
            analysis,
            recommended_crops,
            improvement_suggestions,
        })
    }
}
