use serde::{Deserialize, Serialize};

/// Fitted standard scaler (fixed-point mean and population std per column).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StandardScaler {
    pub mean: Vec<i64>,
    pub std: Vec<i64>,
}

impl StandardScaler {
    /// Standardize one row: `(x - mean) * scale / std`, saturating at the
    /// `i64` bounds. Columns without statistics pass through unchanged.
    pub fn transform(&self, row: &[i64], scale: i64) -> Vec<i64> {
        row.iter()
            .enumerate()
            .map(|(i, &x)| match (self.mean.get(i), self.std.get(i)) {
                (Some(&mean), Some(&std)) if std > 0 => {
                    let z = (i128::from(x) - i128::from(mean)) * i128::from(scale) / i128::from(std);
                    z.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
                }
                _ => x,
            })
            .collect()
    }

    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.mean.len() != n_features || self.std.len() != n_features {
            return Err(format!(
                "scaler expects {n_features} columns, has mean={} std={}",
                self.mean.len(),
                self.std.len()
            ));
        }
        if let Some(i) = self.std.iter().position(|&s| s <= 0) {
            return Err(format!("scaler std for column {i} is not positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SCALE;

    #[test]
    fn test_transform() {
        let scaler = StandardScaler {
            mean: vec![10 * SCALE, 0],
            std: vec![2 * SCALE, SCALE],
        };
        let z = scaler.transform(&[14 * SCALE, -3 * SCALE], SCALE);
        assert_eq!(z, vec![2 * SCALE, -3 * SCALE]);
    }

    #[test]
    fn test_transform_saturates() {
        let scaler = StandardScaler {
            mean: vec![i64::MIN],
            std: vec![1],
        };
        assert_eq!(scaler.transform(&[i64::MAX], SCALE), vec![i64::MAX]);
    }

    #[test]
    fn test_validate() {
        let good = StandardScaler {
            mean: vec![0, 0],
            std: vec![1, SCALE],
        };
        assert!(good.validate(2).is_ok());
        assert!(good.validate(3).is_err());

        let zero_std = StandardScaler {
            mean: vec![0],
            std: vec![0],
        };
        assert!(zero_std.validate(1).is_err());
    }
}
