//! Instance manifests: one landing feed and its bronze table.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::schema::TableSchema;

const AIRPORTS_MANIFEST: &str = include_str!("../manifests/airports.toml");

/// Manifests compiled into the binary, keyed by instance name.
const BUILTIN: &[(&str, &str)] = &[("AIRPORTS", AIRPORTS_MANIFEST)];

/// Everything the pipeline needs to know about one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub columns: TableSchema,
    /// Business-key columns feeding `HASH_KEY`, in hash order.
    pub business_keys: Vec<String>,
    /// Tracked attributes feeding `HASH_VALUE`, in hash order.
    pub attributes: Vec<String>,
}

impl InstanceDefinition {
    /// Parses and validates a TOML manifest. `origin` names the source in errors.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self> {
        let mut definition: Self = toml::from_str(content).map_err(|source| ModelError::Toml {
            origin: origin.to_string(),
            source,
        })?;
        definition.name = definition.name.to_uppercase();
        definition.validate()?;
        Ok(definition)
    }

    /// Loads a manifest from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Checks that hash inputs reference declared columns.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(ModelError::Empty {
                instance: self.name.clone(),
                what: "columns",
            });
        }
        if self.business_keys.is_empty() {
            return Err(ModelError::Empty {
                instance: self.name.clone(),
                what: "business keys",
            });
        }
        if self.attributes.is_empty() {
            return Err(ModelError::Empty {
                instance: self.name.clone(),
                what: "attributes",
            });
        }
        for (role, names) in [
            ("business key", &self.business_keys),
            ("attribute", &self.attributes),
        ] {
            if let Some(missing) = names.iter().find(|n| !self.columns.contains(n)) {
                return Err(ModelError::UndeclaredColumn {
                    instance: self.name.clone(),
                    role,
                    column: missing.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Returns the compiled-in manifest for `name` (case-insensitive).
pub fn builtin_instance(name: &str) -> Result<InstanceDefinition> {
    let upper = name.to_uppercase();
    let (_, manifest) = BUILTIN
        .iter()
        .find(|(builtin, _)| *builtin == upper)
        .ok_or(ModelError::UnknownInstance { name: upper.clone() })?;
    InstanceDefinition::from_toml_str(manifest, &format!("builtin:{upper}"))
}

pub fn builtin_instance_names() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(name, _)| *name)
}
