use serde::{Deserialize, Serialize};

/// Percentile-based feature selector.
///
/// `scores` holds the fitted ANOVA F-score per input column at fixed point;
/// `selected` lists the kept columns in ascending order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FeatureSelector {
    pub percentile: u8,
    pub scores: Vec<i64>,
    pub selected: Vec<usize>,
}

impl FeatureSelector {
    /// Project a row onto the selected columns. Missing columns read as 0.
    pub fn transform(&self, row: &[i64]) -> Vec<i64> {
        self.selected
            .iter()
            .map(|&i| row.get(i).copied().unwrap_or(0))
            .collect()
    }

    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.selected.is_empty() {
            return Err("selector keeps no features".to_string());
        }
        if !self.selected.windows(2).all(|w| w[0] < w[1]) {
            return Err(format!(
                "selected indices must be strictly ascending: {:?}",
                self.selected
            ));
        }
        if let Some(&i) = self.selected.iter().find(|&&i| i >= n_features) {
            return Err(format!("selected index {i} out of range for {n_features} features"));
        }
        if !self.scores.is_empty() && self.scores.len() != n_features {
            return Err(format!(
                "selector has {} scores for {n_features} features",
                self.scores.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(selected: Vec<usize>) -> FeatureSelector {
        FeatureSelector {
            percentile: 80,
            scores: vec![],
            selected,
        }
    }

    #[test]
    fn test_transform_keeps_order() {
        let s = selector(vec![0, 3, 4]);
        assert_eq!(s.transform(&[10, 11, 12, 13, 14]), vec![10, 13, 14]);
    }

    #[test]
    fn test_validate() {
        assert!(selector(vec![0, 3, 4, 5, 6]).validate(7).is_ok());
        assert!(selector(vec![]).validate(7).is_err());
        assert!(selector(vec![3, 3]).validate(7).is_err());
        assert!(selector(vec![4, 2]).validate(7).is_err());
        assert!(selector(vec![7]).validate(7).is_err());

        let mut wrong_scores = selector(vec![0]);
        wrong_scores.scores = vec![1, 2];
        assert!(wrong_scores.validate(7).is_err());
    }
}
