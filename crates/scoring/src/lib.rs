//! Rule-based scoring for SoilScope.
//!
//! All functions here are pure and total: any numeric input produces a
//! result, out-of-range readings included. Nothing here touches the model.

pub mod advisory;
pub mod fertility;
pub mod irrigation;

pub use advisory::{improvement_suggestions, recommend_crops};
pub use fertility::score_fertility;
pub use irrigation::{irrigation_level, score_irrigation};
