//! Fitting the scaler and the feature selector.

use soilscope_model::{FeatureSelector, StandardScaler, SCALE};
use soilscope_types::IrrigationClass;

use crate::deterministic::isqrt;
use crate::errors::TrainerError;

fn overflow(stage: &str, column: usize) -> TrainerError {
    TrainerError::Dataset(format!(
        "{stage}: column {column} overflows integer statistics; readings are out of range"
    ))
}

/// Fit per-column mean and population standard deviation.
///
/// A column with zero variance gets `std = SCALE`, leaving it centred but
/// unscaled.
pub fn fit_scaler(features: &[Vec<i64>], feature_count: usize) -> Result<StandardScaler, TrainerError> {
    let n = features.len().max(1) as i128;
    let mut mean = Vec::with_capacity(feature_count);
    let mut std = Vec::with_capacity(feature_count);

    for j in 0..feature_count {
        let sum: i128 = features.iter().map(|row| i128::from(row[j])).sum();
        let mu = sum / n;
        let sq_dev = features
            .iter()
            .try_fold(0i128, |acc, row| {
                let d = i128::from(row[j]) - mu;
                d.checked_mul(d).and_then(|sq| acc.checked_add(sq))
            })
            .ok_or_else(|| overflow("scaler", j))?;
        let sigma = i64::try_from(isqrt((sq_dev / n) as u128)).map_err(|_| overflow("scaler", j))?;

        mean.push(mu as i64);
        std.push(if sigma == 0 { SCALE } else { sigma });
    }

    Ok(StandardScaler { mean, std })
}

/// One-way ANOVA F statistic per column at `SCALE`.
///
/// Degenerate columns (a class missing, or fewer than three rows) score 0;
/// zero within-class variance with separated class means saturates.
pub fn anova_f_scores(
    features: &[Vec<i64>],
    targets: &[IrrigationClass],
    feature_count: usize,
) -> Result<Vec<i64>, TrainerError> {
    let n = features.len() as i128;
    let mut class_n = [0i128; 2];
    for target in targets {
        class_n[target.label() as usize] += 1;
    }
    if n < 3 || class_n.contains(&0) {
        return Ok(vec![0; feature_count]);
    }

    (0..feature_count)
        .map(|j| f_score(features, targets, j, n, class_n).ok_or_else(|| overflow("ANOVA", j)))
        .collect()
}

fn f_score(
    features: &[Vec<i64>],
    targets: &[IrrigationClass],
    j: usize,
    n: i128,
    class_n: [i128; 2],
) -> Option<i64> {
    let mut total = 0i128;
    let mut squares = 0i128;
    let mut class_sum = [0i128; 2];
    for (row, target) in features.iter().zip(targets) {
        let x = i128::from(row[j]);
        total = total.checked_add(x)?;
        squares = squares.checked_add(x.checked_mul(x)?)?;
        let c = target.label() as usize;
        class_sum[c] = class_sum[c].checked_add(x)?;
    }

    let mut explained = 0i128;
    for c in 0..2 {
        explained = explained.checked_add(class_sum[c].checked_mul(class_sum[c])? / class_n[c])?;
    }
    let between = explained.checked_sub(total.checked_mul(total)? / n)?;
    let within = squares.checked_sub(explained)?;

    if within <= 0 {
        return Some(if between > 0 { i64::MAX } else { 0 });
    }
    let f = between
        .max(0)
        .checked_mul(n - 2)?
        .checked_mul(i128::from(SCALE))?
        / within;
    Some(f.min(i128::from(i64::MAX)) as i64)
}

/// Indices of the top `max(1, n * percentile / 100)` scores, ascending.
/// Equal scores favour the lower index.
pub fn select_percentile(scores: &[i64], percentile: u8) -> Vec<usize> {
    let keep = (scores.len() * percentile as usize / 100).max(1).min(scores.len());
    let mut ranked: Vec<usize> = (0..scores.len()).collect();
    ranked.sort_by(|&a, &b| scores[b].cmp(&scores[a]).then(a.cmp(&b)));
    let mut selected: Vec<usize> = ranked.into_iter().take(keep).collect();
    selected.sort_unstable();
    selected
}

/// Fit a percentile selector on standardized features.
pub fn fit_selector(
    features: &[Vec<i64>],
    targets: &[IrrigationClass],
    feature_count: usize,
    percentile: u8,
) -> Result<FeatureSelector, TrainerError> {
    let scores = anova_f_scores(features, targets, feature_count)?;
    let selected = select_percentile(&scores, percentile);
    Ok(FeatureSelector {
        percentile,
        scores,
        selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use IrrigationClass::{Needed, NotNeeded};

    #[test]
    fn test_fit_scaler() {
        let rows = vec![vec![2 * SCALE, 5], vec![4 * SCALE, 5], vec![6 * SCALE, 5]];
        let scaler = fit_scaler(&rows, 2).unwrap();
        assert_eq!(scaler.mean, vec![4 * SCALE, 5]);
        // population std of {2,4,6} is sqrt(8/3)
        assert_eq!(scaler.std[0], 1_632_993);
        assert_eq!(scaler.std[1], SCALE);
    }

    #[test]
    fn test_f_scores_rank_separating_feature() {
        let rows = vec![
            vec![0, 10, 3],
            vec![1, 20, 1],
            vec![0, 90, 2],
            vec![1, 80, 3],
        ];
        let targets = vec![Needed, Needed, NotNeeded, NotNeeded];
        let scores = anova_f_scores(&rows, &targets, 3).unwrap();
        assert_eq!(scores[0], 0);
        assert!(scores[1] > scores[2]);
        // between = 4900, within = 100, df = 2
        assert_eq!(scores[1], 98 * SCALE);
    }

    #[test]
    fn test_f_scores_degenerate() {
        let rows = vec![vec![1], vec![2], vec![3]];
        assert_eq!(anova_f_scores(&rows, &[Needed; 3], 1).unwrap(), vec![0]);

        let rows = vec![vec![0], vec![0], vec![5], vec![5]];
        let targets = [Needed, Needed, NotNeeded, NotNeeded];
        assert_eq!(anova_f_scores(&rows, &targets, 1).unwrap(), vec![i64::MAX]);
    }

    #[test]
    fn test_select_percentile() {
        let scores = vec![5, 1, 9, 9, 0, 3, 7];
        assert_eq!(select_percentile(&scores, 80), vec![0, 2, 3, 5, 6]);
        assert_eq!(select_percentile(&scores, 10), vec![2]);
        assert_eq!(select_percentile(&scores, 100), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(select_percentile(&[4, 4, 4], 50), vec![0]);
    }

    #[test]
    fn test_fit_at_reading_limits() {
        use crate::dataset::MAX_ABS_READING;

        let limit = (MAX_ABS_READING * SCALE as f64) as i64;
        let rows = vec![vec![limit], vec![-limit], vec![limit], vec![-limit]];
        let targets = [Needed, NotNeeded, Needed, NotNeeded];

        let scaler = fit_scaler(&rows, 1).unwrap();
        assert_eq!(scaler.mean, vec![0]);
        assert_eq!(scaler.std, vec![limit]);
        assert_eq!(anova_f_scores(&rows, &targets, 1).unwrap(), vec![i64::MAX]);
    }

    #[test]
    fn test_saturated_columns_report_overflow() {
        let rows = vec![vec![i64::MAX], vec![i64::MIN], vec![i64::MAX], vec![i64::MIN]];
        assert!(matches!(fit_scaler(&rows, 1), Err(TrainerError::Dataset(_))));

        let many: Vec<Vec<i64>> = (0..64).map(|i| vec![i64::MAX - i % 2]).collect();
        let labels: Vec<_> = (0..64).map(|i| if i < 32 { Needed } else { NotNeeded }).collect();
        assert!(matches!(
            anova_f_scores(&many, &labels, 1),
            Err(TrainerError::Dataset(_))
        ));
    }
}
