//! Shared data types for SoilScope.
//!
//! Everything here is a plain value: built for one request, serialized into a
//! response and dropped. Wire names follow the public JSON contract exactly.

pub mod analysis;
pub mod class;
pub mod error;
pub mod fertility;
pub mod irrigation;
pub mod sample;

pub use analysis::*;
pub use class::*;
pub use error::*;
pub use fertility::*;
pub use irrigation::*;
pub use sample::*;
