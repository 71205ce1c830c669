//! Metadata columns appended to every bronze row.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Literal landing path the batch was loaded from.
pub const FILE_PATH: &str = "file_path";
/// Basename of the source file of each row.
pub const ORIGINAL_FILE_NAME: &str = "original_file_name";
/// Record source (data-source tag).
pub const RSRC: &str = "RSRC";
/// Random identifier generated per row at load time.
pub const RECORD_ID: &str = "RECORD_ID";
/// Delivery mode of the load.
pub const LOAD_TYPE: &str = "LOAD_TYPE";
/// MD5 over the business-key columns.
pub const HASH_KEY: &str = "HASH_KEY";
/// MD5 over the tracked attribute columns.
pub const HASH_VALUE: &str = "HASH_VALUE";

/// Every column the pipeline appends, in output order.
pub const METADATA_COLUMNS: [&str; 7] = [
    FILE_PATH,
    ORIGINAL_FILE_NAME,
    RSRC,
    RECORD_ID,
    LOAD_TYPE,
    HASH_KEY,
    HASH_VALUE,
];

/// Whether a delivery is a full reload or an incremental delta.
///
/// The mode is recorded in `LOAD_TYPE`; the bronze table is replaced either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeliveryMode {
    #[default]
    Full,
    Delta,
}

impl DeliveryMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Delta => "DELTA",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FULL" => Ok(Self::Full),
            "DELTA" => Ok(Self::Delta),
            _ => Err(ModelError::InvalidDeliveryMode {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for DeliveryMode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeliveryMode> for String {
    fn from(value: DeliveryMode) -> Self {
        value.as_str().to_string()
    }
}
