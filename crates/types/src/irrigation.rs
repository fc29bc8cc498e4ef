use serde::{Deserialize, Serialize};

/// The six outcomes of irrigation scoring, from most urgent to waterlogged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IrrigationLevel {
    Urgent,
    Needed,
    Optimal,
    Sufficient,
    High,
    WaterLogged,
}

impl IrrigationLevel {
    pub fn score(self) -> u8 {
        match self {
            IrrigationLevel::Urgent => 0,
            IrrigationLevel::Needed => 1,
            IrrigationLevel::Optimal => 2,
            IrrigationLevel::Sufficient => 3,
            IrrigationLevel::High => 4,
            IrrigationLevel::WaterLogged => 5,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            IrrigationLevel::Urgent => "Irrigation needed urgently",
            IrrigationLevel::Needed => "Irrigation needed",
            IrrigationLevel::Optimal => "Optimal moisture, no irrigation required",
            IrrigationLevel::Sufficient => "Sufficient water, no irrigation required",
            IrrigationLevel::High => "High water level, no irrigation required",
            IrrigationLevel::WaterLogged => "Water logged",
        }
    }
}

/// Irrigation score (0-5) with its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrigationResult {
    pub score: u8,
    pub description: String,
}

impl From<IrrigationLevel> for IrrigationResult {
    fn from(level: IrrigationLevel) -> Self {
        Self {
            score: level.score(),
            description: level.description().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_are_ordered() {
        let levels = [
            IrrigationLevel::Urgent,
            IrrigationLevel::Needed,
            IrrigationLevel::Optimal,
            IrrigationLevel::Sufficient,
            IrrigationLevel::High,
            IrrigationLevel::WaterLogged,
        ];
        for (expected, level) in levels.iter().enumerate() {
            assert_eq!(level.score() as usize, expected);
        }
    }

    #[test]
    fn test_result_json_shape() {
        let result = IrrigationResult::from(IrrigationLevel::WaterLogged);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"score":5,"description":"Water logged"}"#);
    }
}
