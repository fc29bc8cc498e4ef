use serde::{Deserialize, Serialize};

/// Column names in the order the classifier consumes them.
pub const FEATURE_NAMES: [&str; 7] = [
    "N",
    "P",
    "K",
    "temperature",
    "humidity",
    "ph",
    "rainfall",
];

/// Number of model input features.
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// One soil and weather reading submitted for analysis.
///
/// Nutrients are whole ppm values; JSON numbers with a fractional part are
/// rejected for them. Unknown fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    /// Nitrogen (ppm)
    #[serde(rename = "N")]
    pub nitrogen: i64,

    /// Phosphorus (ppm)
    #[serde(rename = "P")]
    pub phosphorus: i64,

    /// Potassium (ppm)
    #[serde(rename = "K")]
    pub potassium: i64,

    /// Air temperature (°C)
    pub temperature: f64,

    /// Relative humidity (%)
    pub humidity: f64,

    /// Soil pH (0-14)
    pub ph: f64,

    /// Rainfall (mm)
    pub rainfall: f64,
}

impl SoilSample {
    /// Feature values in [`FEATURE_NAMES`] order.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.nitrogen as f64,
            self.phosphorus as f64,
            self.potassium as f64,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}
