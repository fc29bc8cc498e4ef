use soilscope_types::{SoilSample, FEATURE_COUNT};

/// Fixed-point scale (micro precision).
pub const SCALE: i64 = 1_000_000;

/// Convert a reading to fixed point, rounding half away from zero.
///
/// Non-finite input saturates (`NaN` becomes 0).
pub fn to_fixed(value: f64, scale: i64) -> i64 {
    (value * scale as f64).round() as i64
}

/// Sample readings as fixed-point features in model column order.
pub fn extract_features(sample: &SoilSample, scale: i64) -> [i64; FEATURE_COUNT] {
    sample.features().map(|value| to_fixed(value, scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(to_fixed(2.5, 1), 3);
        assert_eq!(to_fixed(-2.5, 1), -3);
        assert_eq!(to_fixed(0.25, 10), 3);
        assert_eq!(to_fixed(6.8, SCALE), 6_800_000);
        assert_eq!(to_fixed(f64::NAN, SCALE), 0);
    }

    #[test]
    fn test_feature_order() {
        let sample = SoilSample {
            nitrogen: 90,
            phosphorus: 60,
            potassium: 70,
            temperature: 28.5,
            humidity: 75.0,
            ph: 6.8,
            rainfall: 120.0,
        };
        assert_eq!(
            extract_features(&sample, SCALE),
            [
                90_000_000,
                60_000_000,
                70_000_000,
                28_500_000,
                75_000_000,
                6_800_000,
                120_000_000
            ]
        );
    }
}
