//! Accuracy and per-class metrics for a fitted pipeline.

use std::fmt;

use soilscope_model::SCALE;
use soilscope_types::IrrigationClass;

/// Precision, recall and F1 (at `SCALE`) plus support for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassMetrics {
    pub class: IrrigationClass,
    pub precision: i64,
    pub recall: i64,
    pub f1: i64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationReport {
    /// Fraction of correct predictions at `SCALE`
    pub accuracy: i64,
    pub classes: Vec<ClassMetrics>,
    pub total: usize,
}

fn ratio(numerator: usize, denominator: usize) -> i64 {
    if denominator == 0 {
        return 0;
    }
    (numerator as i128 * i128::from(SCALE) / denominator as i128) as i64
}

impl ClassificationReport {
    pub fn from_predictions(predicted: &[IrrigationClass], actual: &[IrrigationClass]) -> Self {
        let pairs: Vec<(IrrigationClass, IrrigationClass)> =
            predicted.iter().copied().zip(actual.iter().copied()).collect();
        let correct = pairs.iter().filter(|(p, a)| p == a).count();

        let classes = IrrigationClass::ALL
            .iter()
            .map(|&class| {
                let tp = pairs.iter().filter(|&&(p, a)| p == class && a == class).count();
                let predicted_n = pairs.iter().filter(|&&(p, _)| p == class).count();
                let support = pairs.iter().filter(|&&(_, a)| a == class).count();
                let precision = ratio(tp, predicted_n);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0 {
                    0
                } else {
                    (2 * i128::from(precision) * i128::from(recall)
                        / (i128::from(precision) + i128::from(recall))) as i64
                };
                ClassMetrics {
                    class,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        Self {
            accuracy: ratio(correct, pairs.len()),
            classes,
            total: pairs.len(),
        }
    }
}

fn percent(value: i64) -> f64 {
    value as f64 / SCALE as f64
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>20} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for m in &self.classes {
            writeln!(
                f,
                "{:>20} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                m.class.display_name(),
                percent(m.precision),
                percent(m.recall),
                percent(m.f1),
                m.support
            )?;
        }
        write!(
            f,
            "{:>20} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy",
            "",
            "",
            percent(self.accuracy),
            self.total
        )
    }
}
