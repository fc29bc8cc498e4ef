use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TypesError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhStatus {
    Optimal,
    #[serde(rename = "Acidic - Low")]
    Acidic,
    #[serde(rename = "Alkaline - High")]
    Alkaline,
}

/// Status for nitrogen and phosphorus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NutrientStatus {
    Optimal,
    Low,
    High,
}

/// Potassium has no `High` status: above-range readings report `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PotassiumStatus {
    Optimal,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FertilityGrade {
    Poor,
    Moderate,
    Good,
}

impl FertilityGrade {
    /// Grade for a 0-100 point total.
    pub fn from_percent(percent: u8) -> Self {
        if percent >= 75 {
            FertilityGrade::Good
        } else if percent >= 50 {
            FertilityGrade::Moderate
        } else {
            FertilityGrade::Poor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FertilityGrade::Poor => "Poor",
            FertilityGrade::Moderate => "Moderate",
            FertilityGrade::Good => "Good",
        }
    }
}

/// Overall fertility, rendered on the wire as `"<Grade> (<percent>%)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverallFertility {
    pub grade: FertilityGrade,
    pub percent: u8,
}

impl OverallFertility {
    pub fn from_percent(percent: u8) -> Self {
        Self {
            grade: FertilityGrade::from_percent(percent),
            percent,
        }
    }
}

impl fmt::Display for OverallFertility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.grade.as_str(), self.percent)
    }
}

impl FromStr for OverallFertility {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypesError::InvalidFertilityLabel(s.to_string());
        let (grade, rest) = s.split_once(" (").ok_or_else(invalid)?;
        let percent: u8 = rest
            .strip_suffix("%)")
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let parsed = OverallFertility::from_percent(percent);
        if parsed.grade.as_str() != grade || percent > 100 {
            return Err(invalid());
        }
        Ok(parsed)
    }
}

impl Serialize for OverallFertility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OverallFertility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-check fertility report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertilityResult {
    pub ph: PhStatus,
    pub nitrogen: NutrientStatus,
    pub phosphorus: NutrientStatus,
    pub potassium: PotassiumStatus,
    pub overall_fertility: OverallFertility,
}
