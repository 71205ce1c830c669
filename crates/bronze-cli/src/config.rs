//! Pipeline configuration: built-in defaults, TOML file, CLI overrides.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use bronze_common::StorageLocation;
use bronze_delta::TableOptions;
use bronze_ingest::CsvOptions;
use bronze_model::{DeliveryMode, InstanceDefinition, builtin_instance};

/// Prefix of environment variables forwarded to the object store.
const AZURE_ENV_PREFIX: &str = "AZURE_";

/// Everything a run needs besides the instance manifest.
///
/// Missing keys in a config file keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub storage_account: String,
    pub landing_container: String,
    pub bronze_container: String,
    pub landing_base_path: String,
    pub bronze_base_path: String,
    /// Name of the load pattern, used in log output.
    pub pattern_name: String,
    pub layer_name: String,
    /// Value written to `RSRC`.
    pub data_source: String,
    pub instance: String,
    pub delivery_mode: DeliveryMode,
    /// Field separator of the landing files.
    pub delimiter: char,
    /// Landing folder as a URL, optionally ending in `*`. Replaces the
    /// container and base path layout for the landing side.
    pub landing_path: Option<String>,
    /// Resolve containers under this local directory instead of ADLS.
    pub local_root: Option<PathBuf>,
    /// Manifest file replacing the built-in definition of `instance`.
    pub manifest: Option<PathBuf>,
    /// Properties set on the bronze table when it is created.
    pub table_properties: BTreeMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_account: "adls2synapseintf".to_string(),
            landing_container: "tutorialcontainer".to_string(),
            bronze_container: "tutorialcontainer".to_string(),
            landing_base_path: "test/landing".to_string(),
            bronze_base_path: "test/bronze".to_string(),
            pattern_name: "BRONZE_DV_PREP".to_string(),
            layer_name: "BRONZE".to_string(),
            data_source: "CSV".to_string(),
            instance: "AIRPORTS".to_string(),
            delivery_mode: DeliveryMode::Full,
            delimiter: ';',
            landing_path: None,
            local_root: None,
            manifest: None,
            table_properties: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Reads a TOML config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Instance name as used in folder and table paths.
    pub fn instance_name(&self) -> String {
        self.instance.trim().to_uppercase()
    }

    /// Manifest for the configured instance.
    pub fn instance_definition(&self) -> Result<InstanceDefinition> {
        let definition = match &self.manifest {
            Some(path) => InstanceDefinition::from_path(path)
                .with_context(|| format!("load manifest {}", path.display()))?,
            None => builtin_instance(&self.instance)
                .with_context(|| format!("no manifest for instance {}", self.instance_name()))?,
        };
        Ok(definition)
    }

    /// Folder the instance's CSV files are delivered to.
    pub fn landing_location(&self) -> Result<StorageLocation> {
        let Some(pattern) = &self.landing_path else {
            return self
                .location(&self.landing_container, &self.landing_base_path)
                .context("resolve landing location");
        };
        let location = bronze_ingest::landing_location(pattern)
            .with_context(|| format!("resolve landing path {pattern}"))?;
        if location.is_local() {
            Ok(location)
        } else {
            Ok(location.with_options(azure_env_options()))
        }
    }

    /// Root of the instance's bronze Delta table.
    pub fn bronze_location(&self) -> Result<StorageLocation> {
        self.location(&self.bronze_container, &self.bronze_base_path)
            .context("resolve bronze location")
    }

    pub fn csv_options(&self) -> Result<CsvOptions> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter {:?} is not an ASCII character", self.delimiter);
        }
        Ok(CsvOptions::default().with_delimiter(self.delimiter as u8))
    }

    pub fn table_options(&self, table_name: &str) -> TableOptions {
        self.table_properties.iter().fold(
            TableOptions::default().with_name(table_name),
            |options, (key, value)| options.with_property(key, value),
        )
    }

    fn location(&self, container: &str, base_path: &str) -> bronze_common::Result<StorageLocation> {
        let path = format!("{}/{}", base_path.trim_matches('/'), self.instance_name());
        match &self.local_root {
            Some(root) => StorageLocation::local_container(root, container, &path),
            None => Ok(StorageLocation::adls(&self.storage_account, container, &path)?
                .with_options(azure_env_options())),
        }
    }
}

/// `AZURE_*` environment variables as object store options (`azure_storage_account_key`, ...).
pub fn azure_env_options() -> HashMap<String, String> {
    collect_azure_options(std::env::vars())
}

fn collect_azure_options(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter(|(key, _)| key.starts_with(AZURE_ENV_PREFIX))
        .map(|(key, value)| (key.to_ascii_lowercase(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_adls() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.landing_location().unwrap().to_string(),
            "abfss://tutorialcontainer@adls2synapseintf.dfs.core.windows.net/test/landing/AIRPORTS/"
        );
        assert_eq!(
            config.bronze_location().unwrap().to_string(),
            "abfss://tutorialcontainer@adls2synapseintf.dfs.core.windows.net/test/bronze/AIRPORTS/"
        );
        assert_eq!(config.delivery_mode, DeliveryMode::Full);
        assert_eq!(config.data_source, "CSV");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            instance = "airports"
            delivery_mode = "DELTA"

            [table_properties]
            "delta.appendOnly" = "false"
            "#,
        )
        .unwrap();
        assert_eq!(config.instance_name(), "AIRPORTS");
        assert_eq!(config.delivery_mode, DeliveryMode::Delta);
        assert_eq!(config.storage_account, "adls2synapseintf");

        let options = config.table_options("AIRPORTS");
        assert_eq!(options.name.as_deref(), Some("AIRPORTS"));
        assert_eq!(
            options.configuration.get("delta.appendOnly").map(String::as_str),
            Some("false")
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(PipelineConfig::from_toml_str("storage_acount = \"x\"").is_err());
    }

    #[test]
    fn test_local_root_resolves_containers() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            local_root: Some(dir.path().to_path_buf()),
            ..PipelineConfig::default()
        };
        let landing = config.landing_location().unwrap();
        assert!(landing.is_local());
        assert!(
            landing
                .url()
                .path()
                .ends_with("/tutorialcontainer/test/landing/AIRPORTS/")
        );
    }

    #[test]
    fn test_landing_path_glob_overrides_layout() {
        let config = PipelineConfig {
            landing_path: Some(
                "abfss://drop@otheraccount.dfs.core.windows.net/in/AIRPORTS/*".to_string(),
            ),
            ..PipelineConfig::default()
        };
        let landing = config.landing_location().unwrap();
        assert_eq!(
            landing.to_string(),
            "abfss://drop@otheraccount.dfs.core.windows.net/in/AIRPORTS/"
        );
        assert_eq!(
            landing.glob(),
            "abfss://drop@otheraccount.dfs.core.windows.net/in/AIRPORTS/*"
        );
        assert!(
            config
                .bronze_location()
                .unwrap()
                .to_string()
                .ends_with("/test/bronze/AIRPORTS/")
        );
    }

    #[test]
    fn test_azure_options_are_lowercased() {
        let vars = vec![
            ("AZURE_STORAGE_ACCOUNT_KEY".to_string(), "key".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ];
        let options = collect_azure_options(vars.into_iter());
        assert_eq!(options.len(), 1);
        assert_eq!(
            options.get("azure_storage_account_key").map(String::as_str),
            Some("key")
        );
    }

    #[test]
    fn test_multibyte_delimiter_is_rejected() {
        let config = PipelineConfig {
            delimiter: '→',
            ..PipelineConfig::default()
        };
        assert!(config.csv_options().is_err());
        assert_eq!(
            PipelineConfig::default().csv_options().unwrap().delimiter,
            b';'
        );
    }
}
