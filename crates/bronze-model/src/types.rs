//! Logical column types supported by bronze schema manifests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Largest decimal precision that fits a 128-bit unscaled value.
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// Column type declared in a schema manifest.
///
/// Names follow the engine vocabulary used by bronze tables (`long`,
/// `decimal(15,8)`, ...), parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    /// 64-bit signed integer (`bigint`).
    Long,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit IEEE float.
    Double,
    /// Fixed-point decimal with `precision` total digits, `scale` of them fractional.
    Decimal { precision: u8, scale: u8 },
    String,
    Boolean,
    /// Calendar date without time zone.
    Date,
}

impl DataType {
    /// Builds a decimal type, validating precision and scale.
    pub fn decimal(precision: u8, scale: u8) -> Result<Self, ModelError> {
        if precision == 0 || precision > MAX_DECIMAL_PRECISION {
            return Err(ModelError::InvalidType {
                value: format!("decimal({precision},{scale})"),
                reason: format!("precision must be between 1 and {MAX_DECIMAL_PRECISION}"),
            });
        }
        if scale > precision {
            return Err(ModelError::InvalidType {
                value: format!("decimal({precision},{scale})"),
                reason: "scale cannot exceed precision".to_string(),
            });
        }
        Ok(Self::Decimal { precision, scale })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Integer => write!(f, "integer"),
            Self::Double => write!(f, "double"),
            Self::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
            Self::String => write!(f, "string"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
        }
    }
}

impl FromStr for DataType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "long" | "bigint" => return Ok(Self::Long),
            "integer" | "int" => return Ok(Self::Integer),
            "double" => return Ok(Self::Double),
            "string" => return Ok(Self::String),
            "boolean" | "bool" => return Ok(Self::Boolean),
            "date" => return Ok(Self::Date),
            _ => {}
        }

        let invalid = |reason: &str| ModelError::InvalidType {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let args = normalized
            .strip_prefix("decimal(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| invalid("unknown type name"))?;
        let (precision, scale) = args
            .split_once(',')
            .ok_or_else(|| invalid("expected decimal(precision,scale)"))?;
        let precision: u8 = precision
            .parse()
            .map_err(|_| invalid("precision is not a number"))?;
        let scale: u8 = scale.parse().map_err(|_| invalid("scale is not a number"))?;
        Self::decimal(precision, scale)
    }
}

impl TryFrom<String> for DataType {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.to_string()
    }
}
