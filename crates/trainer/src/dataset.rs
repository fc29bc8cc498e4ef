//! Training data: synthetic generation, CSV import/export and splitting.
//!
//! Features are stored as fixed-point integers at `SCALE` in the model
//! column order; labels are irrigation classes.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use soilscope_model::{to_fixed, SCALE};
use soilscope_types::{IrrigationClass, FEATURE_COUNT, FEATURE_NAMES};

use crate::deterministic::LcgRng;

/// Name of the label column in CSV files.
pub const LABEL_COLUMN: &str = "irrigation_needed";

/// Largest accepted magnitude for a raw reading.
pub const MAX_ABS_READING: f64 = 1e9;
const MAX_ABS_FIXED: i64 = 1_000_000_000 * SCALE;

/// One CSV row; `T` is `f64` when reading and preformatted text when writing.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord<T> {
    #[serde(rename = "N")]
    nitrogen: T,
    #[serde(rename = "P")]
    phosphorus: T,
    #[serde(rename = "K")]
    potassium: T,
    temperature: T,
    humidity: T,
    ph: T,
    rainfall: T,
    irrigation_needed: u8,
}

impl<T> CsvRecord<T> {
    fn readings(self) -> [T; FEATURE_COUNT] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }

    fn from_readings(values: Vec<T>, irrigation_needed: u8) -> Option<Self> {
        let [nitrogen, phosphorus, potassium, temperature, humidity, ph, rainfall]: [T; FEATURE_COUNT] =
            values.try_into().ok()?;
        Some(Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
            irrigation_needed,
        })
    }
}

/// Labelled dataset with fixed-point features
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dataset {
    pub features: Vec<Vec<i64>>,
    pub targets: Vec<IrrigationClass>,
    pub feature_count: usize,
}

/// Rainfall above this means no irrigation.
const WET_RAINFALL: i64 = 100 * SCALE;
const HUMID_HUMIDITY: i64 = 75 * SCALE;
const HUMID_MIN_RAINFALL: i64 = 50 * SCALE;
/// Below both of these the field always needs water.
const DRY_HUMIDITY: i64 = 50 * SCALE;
const DRY_RAINFALL: i64 = 30 * SCALE;

/// Labelling rule for synthetic data, on fixed-point humidity and rainfall.
pub fn synthetic_label(humidity: i64, rainfall: i64) -> IrrigationClass {
    let wet = rainfall > WET_RAINFALL || (humidity > HUMID_HUMIDITY && rainfall > HUMID_MIN_RAINFALL);
    let parched = humidity < DRY_HUMIDITY && rainfall < DRY_RAINFALL;
    if wet && !parched {
        IrrigationClass::NotNeeded
    } else {
        IrrigationClass::Needed
    }
}

impl Dataset {
    pub fn new(features: Vec<Vec<i64>>, targets: Vec<IrrigationClass>) -> Result<Self> {
        if features.len() != targets.len() {
            bail!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            );
        }
        let dataset = Self {
            features,
            targets,
            feature_count: FEATURE_COUNT,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Row widths and reading magnitudes must suit the integer statistics
    /// used during fitting.
    pub fn validate(&self) -> Result<()> {
        for (i, row) in self.features.iter().enumerate() {
            if row.len() != self.feature_count {
                bail!("Row {}: expected {} features, got {}", i, self.feature_count, row.len());
            }
            if let Some((j, _)) = row
                .iter()
                .enumerate()
                .find(|(_, value)| value.unsigned_abs() > MAX_ABS_FIXED.unsigned_abs())
            {
                bail!(
                    "Row {}, column {}: reading outside ±{}",
                    i,
                    FEATURE_NAMES.get(j).copied().unwrap_or("?"),
                    MAX_ABS_READING
                );
            }
        }
        Ok(())
    }

    /// Generate `n_samples` synthetic readings with the given seed.
    ///
    /// Nutrients are whole ppm in N [20,150), P [20,100), K [20,100);
    /// temperature [15,40), humidity [30,100), ph [4.5,9.0) and
    /// rainfall [0,300) are drawn at micro precision.
    pub fn synthetic(n_samples: usize, seed: u64) -> Self {
        let mut rng = LcgRng::new(seed as i64);
        let mut features = Vec::with_capacity(n_samples);
        let mut targets = Vec::with_capacity(n_samples);

        for _ in 0..n_samples {
            let nitrogen = rng.next_between(20, 150) * SCALE;
            let phosphorus = rng.next_between(20, 100) * SCALE;
            let potassium = rng.next_between(20, 100) * SCALE;
            let temperature = rng.next_between(15 * SCALE, 40 * SCALE);
            let humidity = rng.next_between(30 * SCALE, 100 * SCALE);
            let ph = rng.next_between(4_500_000, 9_000_000);
            let rainfall = rng.next_between(0, 300 * SCALE);

            targets.push(synthetic_label(humidity, rainfall));
            features.push(vec![
                nitrogen,
                phosphorus,
                potassium,
                temperature,
                humidity,
                ph,
                rainfall,
            ]);
        }

        Self {
            features,
            targets,
            feature_count: FEATURE_COUNT,
        }
    }

    /// Load a CSV with header `N,P,K,temperature,humidity,ph,rainfall,irrigation_needed`.
    ///
    /// Columns may appear in any order; extra columns are ignored.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).context("Failed to read CSV file")?;
        Self::read_csv(file)
    }

    pub fn parse_csv(content: &str) -> Result<Self> {
        Self::read_csv(content.as_bytes())
    }

    fn read_csv<R: io::Read>(source: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(source);
        let headers = reader.headers().context("Failed to read CSV header")?.clone();
        for name in FEATURE_NAMES.iter().chain([&LABEL_COLUMN]) {
            if !headers.iter().any(|column| column == *name) {
                bail!("CSV header is missing column '{name}'");
            }
        }

        let mut features = Vec::new();
        let mut targets = Vec::new();
        let mut raw = csv::StringRecord::new();

        while reader.read_record(&mut raw).context("Malformed CSV row")? {
            let line_no = raw.position().map_or(0, |pos| pos.line());
            let record: CsvRecord<f64> = raw
                .deserialize(Some(&headers))
                .with_context(|| format!("Line {line_no}: invalid row"))?;

            let target = IrrigationClass::try_from(record.irrigation_needed)
                .with_context(|| format!("Line {line_no}: invalid label"))?;

            let mut row = Vec::with_capacity(FEATURE_COUNT);
            for (value, name) in record.readings().into_iter().zip(FEATURE_NAMES) {
                if !value.is_finite() || value.abs() > MAX_ABS_READING {
                    bail!(
                        "Line {line_no}, column {name}: value {value} outside ±{MAX_ABS_READING}"
                    );
                }
                row.push(to_fixed(value, SCALE));
            }

            features.push(row);
            targets.push(target);
        }

        if features.is_empty() {
            bail!("Dataset is empty");
        }

        Self::new(features, targets)
    }

    /// Write the dataset as CSV in the same layout [`from_csv`](Self::from_csv) reads.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref()).context("Failed to write CSV file")?;
        for (row, target) in self.features.iter().zip(&self.targets) {
            let text: Vec<String> = row.iter().map(|&value| format_fixed(value)).collect();
            let record = CsvRecord::from_readings(text, target.label())
                .context("Dataset row has the wrong number of features")?;
            writer.serialize(record).context("Failed to write CSV row")?;
        }
        writer.flush().context("Failed to write CSV file")
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of samples per class, indexed by label.
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for target in &self.targets {
            counts[target.label() as usize] += 1;
        }
        counts
    }

    /// (min, max) per feature column.
    pub fn feature_stats(&self) -> Vec<(i64, i64)> {
        let mut stats = vec![(i64::MAX, i64::MIN); self.feature_count];
        for row in &self.features {
            for (i, &val) in row.iter().enumerate() {
                stats[i].0 = stats[i].0.min(val);
                stats[i].1 = stats[i].1.max(val);
            }
        }
        stats
    }

    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
            feature_count: self.feature_count,
        }
    }

    /// Stratified train/test split.
    ///
    /// Each class contributes `round(count * test_percent / 100)` samples to
    /// the test set, keeping at least one sample of each class on both sides
    /// when the class has two or more. Row order is preserved within each part.
    pub fn stratified_split(&self, test_percent: u8, seed: u64) -> (Self, Self) {
        let mut rng = LcgRng::new(seed as i64);
        let mut train_idx = Vec::new();
        let mut test_idx = Vec::new();

        for class in IrrigationClass::ALL {
            let mut members: Vec<usize> = (0..self.len())
                .filter(|&i| self.targets[i] == class)
                .collect();
            rng.shuffle(&mut members);

            let n = members.len();
            let mut n_test = (n * test_percent as usize + 50) / 100;
            if n >= 2 {
                n_test = n_test.clamp(1, n - 1);
            }
            test_idx.extend_from_slice(&members[..n_test]);
            train_idx.extend_from_slice(&members[n_test..]);
        }

        train_idx.sort_unstable();
        test_idx.sort_unstable();
        (self.subset(&train_idx), self.subset(&test_idx))
    }
}

/// Render a fixed-point value as a decimal with six fractional digits.
pub fn format_fixed(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    let scale = SCALE as u64;
    format!("{}{}.{:06}", sign, abs / scale, abs % scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "N,P,K,temperature,humidity,ph,rainfall,irrigation_needed")?;
        writeln!(file, "50,50,50,35,40,6.5,20,0")?;
        writeln!(file, "80,60,70,25,85,6.8,150,1")?;
        writeln!(file, "70,55,60,28,70,6.5,80.25,0")?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_csv() -> Result<()> {
        let file = create_test_csv()?;
        let dataset = Dataset::from_csv(file.path())?;

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.feature_count, FEATURE_COUNT);
        assert_eq!(
            dataset.features[0],
            vec![50 * SCALE, 50 * SCALE, 50 * SCALE, 35 * SCALE, 40 * SCALE, 6_500_000, 20 * SCALE]
        );
        assert_eq!(dataset.features[2][6], 80_250_000);
        assert_eq!(dataset.targets[1], IrrigationClass::NotNeeded);
        assert_eq!(dataset.class_counts(), [2, 1]);
        Ok(())
    }

    #[test]
    fn test_csv_column_order_is_free() -> Result<()> {
        let csv = "irrigation_needed,rainfall,ph,humidity,temperature,K,P,N,notes\n1,150,6.8,85,25,70,60,80,x\n";
        let dataset = Dataset::parse_csv(csv)?;
        assert_eq!(dataset.features[0][0], 80 * SCALE);
        assert_eq!(dataset.features[0][6], 150 * SCALE);
        Ok(())
    }

    #[test]
    fn test_csv_errors() {
        assert!(Dataset::parse_csv("").is_err());
        assert!(Dataset::parse_csv("N,P,K\n1,2,3\n").is_err());
        let header = "N,P,K,temperature,humidity,ph,rainfall,irrigation_needed\n";
        assert!(Dataset::parse_csv(header).is_err());
        assert!(Dataset::parse_csv(&format!("{header}1,2,3,4,5,6,7,2\n")).is_err());
        assert!(Dataset::parse_csv(&format!("{header}1,2,3,4,5,x,7,0\n")).is_err());
        assert!(Dataset::parse_csv(&format!("{header}1,2,3,4,5,6,7\n")).is_err());
    }

    #[test]
    fn test_csv_comments_and_padding() -> Result<()> {
        let csv = "# exported by field logger\nN, P, K, temperature, humidity, ph, rainfall, irrigation_needed\n 90 , 60, 70, 28.5, 75, 6.8, 120, 1\n";
        let dataset = Dataset::parse_csv(csv)?;
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.features[0][3], 28_500_000);
        assert_eq!(dataset.targets[0], IrrigationClass::NotNeeded);
        Ok(())
    }

    #[test]
    fn test_csv_rejects_extreme_readings() {
        let header = "N,P,K,temperature,humidity,ph,rainfall,irrigation_needed\n";
        let csv = format!("{header}1e13,50,50,25,60,6.5,80,0\n-1e13,50,50,25,60,6.5,80,1\n");
        let err = Dataset::parse_csv(&csv).unwrap_err().to_string();
        assert!(err.contains("Line 2"), "{err}");
        assert!(err.contains("column N"), "{err}");

        assert!(Dataset::parse_csv(&format!("{header}50,50,50,25,60,NaN,80,0\n")).is_err());
        assert!(Dataset::parse_csv(&format!("{header}50,50,50,25,60,6.5,inf,0\n")).is_err());
        assert!(Dataset::parse_csv(&format!("{header}1e9,50,50,25,60,6.5,80,0\n")).is_ok());
    }

    #[test]
    fn test_new_rejects_extreme_readings() {
        let mut row = vec![0; FEATURE_COUNT];
        row[6] = i64::MAX;
        assert!(Dataset::new(vec![row], vec![IrrigationClass::Needed]).is_err());
    }

    #[test]
    fn test_csv_header_names_missing_column() {
        let err = Dataset::parse_csv("N,P,K,temperature,humidity,ph,rainfall\n1,2,3,4,5,6,7\n")
            .unwrap_err()
            .to_string();
        assert!(err.contains(LABEL_COLUMN), "{err}");
    }

    #[test]
    fn test_csv_export_roundtrip() -> Result<()> {
        let dataset = Dataset::synthetic(25, 9);
        let file = NamedTempFile::new()?;
        dataset.to_csv(file.path())?;
        let loaded = Dataset::from_csv(file.path())?;
        assert_eq!(loaded, dataset);
        Ok(())
    }

    #[test]
    fn test_synthetic_ranges_and_labels() {
        let dataset = Dataset::synthetic(2000, 42);
        assert_eq!(dataset.len(), 2000);

        for (row, &target) in dataset.features.iter().zip(&dataset.targets) {
            assert!((20 * SCALE..150 * SCALE).contains(&row[0]));
            assert_eq!(row[0] % SCALE, 0);
            assert!((20 * SCALE..100 * SCALE).contains(&row[1]));
            assert!((20 * SCALE..100 * SCALE).contains(&row[2]));
            assert!((15 * SCALE..40 * SCALE).contains(&row[3]));
            assert!((30 * SCALE..100 * SCALE).contains(&row[4]));
            assert!((4_500_000..9_000_000).contains(&row[5]));
            assert!((0..300 * SCALE).contains(&row[6]));
            assert_eq!(target, synthetic_label(row[4], row[6]));
        }

        let [needed, not_needed] = dataset.class_counts();
        assert!(needed > 200 && not_needed > 200, "{needed} / {not_needed}");
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        assert_eq!(Dataset::synthetic(100, 42), Dataset::synthetic(100, 42));
        assert_ne!(Dataset::synthetic(100, 42), Dataset::synthetic(100, 43));
    }

    #[test]
    fn test_label_rule() {
        use IrrigationClass::*;
        assert_eq!(synthetic_label(60 * SCALE, 101 * SCALE), NotNeeded);
        assert_eq!(synthetic_label(60 * SCALE, 100 * SCALE), Needed);
        assert_eq!(synthetic_label(76 * SCALE, 51 * SCALE), NotNeeded);
        assert_eq!(synthetic_label(75 * SCALE, 51 * SCALE), Needed);
        assert_eq!(synthetic_label(40 * SCALE, 20 * SCALE), Needed);
        assert_eq!(synthetic_label(40 * SCALE, 120 * SCALE), NotNeeded);
    }

    #[test]
    fn test_stratified_split() {
        let dataset = Dataset::synthetic(500, 42);
        let (train, test) = dataset.stratified_split(20, 42);
        assert_eq!(train.len() + test.len(), 500);

        let all = dataset.class_counts();
        let tr = train.class_counts();
        let te = test.class_counts();
        for class in 0..2 {
            assert_eq!(tr[class] + te[class], all[class]);
            assert_eq!(te[class], (all[class] * 20 + 50) / 100);
            assert!(tr[class] > 0 && te[class] > 0);
        }

        let (train2, test2) = dataset.stratified_split(20, 42);
        assert_eq!(train, train2);
        assert_eq!(test, test2);
    }

    #[test]
    fn test_split_keeps_rare_class_on_both_sides() {
        let mut features = vec![vec![0; FEATURE_COUNT]; 10];
        features[0][0] = 1;
        let mut targets = vec![IrrigationClass::Needed; 10];
        targets[0] = IrrigationClass::NotNeeded;
        targets[1] = IrrigationClass::NotNeeded;
        let dataset = Dataset::new(features, targets).unwrap();

        let (train, test) = dataset.stratified_split(20, 1);
        assert_eq!(train.class_counts()[1], 1);
        assert_eq!(test.class_counts()[1], 1);
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(6_800_000), "6.800000");
        assert_eq!(format_fixed(-1_500_000), "-1.500000");
        assert_eq!(format_fixed(42), "0.000042");
    }
}
