use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Binary classifier label. Serialized as `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IrrigationClass {
    /// Label `0`: the field needs water.
    Needed,
    /// Label `1`: current moisture is enough.
    NotNeeded,
}

impl IrrigationClass {
    pub fn label(self) -> u8 {
        match self {
            IrrigationClass::Needed => 0,
            IrrigationClass::NotNeeded => 1,
        }
    }

    /// Human-readable class name used in evaluation reports.
    pub fn display_name(self) -> &'static str {
        match self {
            IrrigationClass::Needed => "Irrigation Needed",
            IrrigationClass::NotNeeded => "No Irrigation",
        }
    }

    pub const ALL: [IrrigationClass; 2] = [IrrigationClass::Needed, IrrigationClass::NotNeeded];
}

impl TryFrom<u8> for IrrigationClass {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(IrrigationClass::Needed),
            1 => Ok(IrrigationClass::NotNeeded),
            other => Err(TypesError::InvalidClass(other)),
        }
    }
}

impl From<IrrigationClass> for u8 {
    fn from(class: IrrigationClass) -> Self {
        class.label()
    }
}

impl fmt::Display for IrrigationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
