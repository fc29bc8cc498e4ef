use soilscope_types::{IrrigationClass, IrrigationLevel, IrrigationResult};

const URGENT_HUMIDITY_BELOW: f64 = 65.0;
const WATERLOGGED_RAINFALL_ABOVE: f64 = 200.0;
const WATERLOGGED_HUMIDITY_ABOVE: f64 = 90.0;
const HIGH_RAINFALL_ABOVE: f64 = 170.0;
const HIGH_HUMIDITY_ABOVE: f64 = 88.0;
const SUFFICIENT_RAINFALL_ABOVE: f64 = 120.0;
const SUFFICIENT_HUMIDITY_ABOVE: f64 = 80.0;

/// Map a classifier label plus raw humidity and rainfall to an irrigation level.
///
/// Branches are checked top to bottom; every comparison is strict.
pub fn irrigation_level(prediction: IrrigationClass, humidity: f64, rainfall: f64) -> IrrigationLevel {
    match prediction {
        IrrigationClass::Needed => {
            if humidity < URGENT_HUMIDITY_BELOW {
                IrrigationLevel::Urgent
            } else {
                IrrigationLevel::Needed
            }
        }
        IrrigationClass::NotNeeded => {
            if rainfall > WATERLOGGED_RAINFALL_ABOVE && humidity > WATERLOGGED_HUMIDITY_ABOVE {
                IrrigationLevel::WaterLogged
            } else if rainfall > HIGH_RAINFALL_ABOVE || humidity > HIGH_HUMIDITY_ABOVE {
                IrrigationLevel::High
            } else if rainfall > SUFFICIENT_RAINFALL_ABOVE || humidity > SUFFICIENT_HUMIDITY_ABOVE {
                IrrigationLevel::Sufficient
            } else {
                IrrigationLevel::Optimal
            }
        }
    }
}

/// Score irrigation urgency on the 0-5 scale.
pub fn score_irrigation(prediction: IrrigationClass, humidity: f64, rainfall: f64) -> IrrigationResult {
    irrigation_level(prediction, humidity, rainfall).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    use IrrigationClass::{Needed, NotNeeded};

    #[test]
    fn test_needed_humidity_boundary() {
        let at = score_irrigation(Needed, 65.0, 0.0);
        assert_eq!(at.score, 1);
        assert_eq!(at.description, "Irrigation needed");

        let below = score_irrigation(Needed, 64.999, 0.0);
        assert_eq!(below.score, 0);
        assert_eq!(below.description, "Irrigation needed urgently");
    }

    #[test]
    fn test_needed_ignores_rainfall() {
        assert_eq!(irrigation_level(Needed, 30.0, 500.0), IrrigationLevel::Urgent);
        assert_eq!(irrigation_level(Needed, 95.0, 500.0), IrrigationLevel::Needed);
    }

    #[test]
    fn test_waterlogged_requires_strict_bounds() {
        assert_eq!(irrigation_level(NotNeeded, 90.0, 200.0), IrrigationLevel::High);
        assert_eq!(irrigation_level(NotNeeded, 90.1, 200.1), IrrigationLevel::WaterLogged);
        assert_eq!(irrigation_level(NotNeeded, 95.0, 200.0), IrrigationLevel::High);
    }

    #[test]
    fn test_not_needed_cascade() {
        assert_eq!(irrigation_level(NotNeeded, 50.0, 171.0), IrrigationLevel::High);
        assert_eq!(irrigation_level(NotNeeded, 88.5, 10.0), IrrigationLevel::High);
        assert_eq!(irrigation_level(NotNeeded, 50.0, 121.0), IrrigationLevel::Sufficient);
        assert_eq!(irrigation_level(NotNeeded, 80.5, 10.0), IrrigationLevel::Sufficient);
        assert_eq!(irrigation_level(NotNeeded, 80.0, 120.0), IrrigationLevel::Optimal);
    }

    #[test]
    fn test_canonical_fixture() {
        let result = score_irrigation(NotNeeded, 75.0, 120.0);
        assert_eq!(result.score, 2);
        assert_eq!(result.description, "Optimal moisture, no irrigation required");
    }

    #[test]
    fn test_nan_readings_fall_through() {
        assert_eq!(irrigation_level(Needed, f64::NAN, 0.0), IrrigationLevel::Needed);
        assert_eq!(irrigation_level(NotNeeded, f64::NAN, f64::NAN), IrrigationLevel::Optimal);
    }
}
