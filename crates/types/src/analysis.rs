use serde::{Deserialize, Serialize};

use crate::{FertilityResult, IrrigationResult};

/// Combined response for one analyzed sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilAnalysis {
    pub irrigation_analysis: IrrigationResult,
    pub fertility_analysis: FertilityResult,
}

/// Analysis plus crop and soil-management advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilAdvice {
    #[serde(flatten)]
    pub analysis: SoilAnalysis,
    pub recommended_crops: Vec<String>,
    pub improvement_suggestions: Vec<String>,
}
