use thiserror::Error;

/// Errors raised when decoding wire values into SoilScope types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Invalid irrigation class: {0} (expected 0 or 1)")]
    InvalidClass(u8),

    #[error("Invalid overall fertility label: {0}")]
    InvalidFertilityLabel(String),
}
