//! Storage locations for landing folders and bronze tables.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Result, StorageError};

/// A directory in some object store, always addressed with a trailing `/`.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageLocation {
    url: Url,
    options: HashMap<String, String>,
}

impl StorageLocation {
    /// Parses a directory URL (`file://`, `abfss://`, `az://`, `memory://`).
    pub fn parse(url: &str) -> Result<Self> {
        let mut parsed = Url::parse(url).map_err(|e| StorageError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }
        Ok(Self {
            url: parsed,
            options: HashMap::new(),
        })
    }

    /// Location of a local directory; relative paths resolve against the working directory.
    pub fn local(path: &Path) -> Result<Self> {
        let absolute = std::path::absolute(path).map_err(|_| StorageError::LocalPath {
            path: path.to_path_buf(),
        })?;
        let url = Url::from_directory_path(&absolute).map_err(|()| StorageError::LocalPath {
            path: absolute.clone(),
        })?;
        Ok(Self {
            url,
            options: HashMap::new(),
        })
    }

    /// Azure Data Lake Gen2 location `abfss://<container>@<account>.dfs.core.windows.net/<path>/`.
    pub fn adls(account: &str, container: &str, path: &str) -> Result<Self> {
        Self::parse(&adls_url(account, container, path))
    }

    /// Location of `<root>/<container>/<path>/` on the local filesystem.
    pub fn local_container(root: &Path, container: &str, path: &str) -> Result<Self> {
        let mut dir: PathBuf = root.join(container);
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            dir.push(segment);
        }
        Self::local(&dir)
    }

    /// Adds object store options (credentials, endpoints).
    #[must_use]
    pub fn with_options(mut self, options: HashMap<String, String>) -> Self {
        self.options.extend(options);
        self
    }

    /// Returns a location for a sub-directory.
    pub fn join(&self, segment: &str) -> Result<Self> {
        let trimmed = segment.trim_matches('/');
        let joined = self
            .url
            .join(&format!("{trimmed}/"))
            .map_err(|e| StorageError::InvalidUrl {
                url: format!("{}{trimmed}", self.url),
                reason: e.to_string(),
            })?;
        Ok(Self {
            url: joined,
            options: self.options.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn options(&self) -> &HashMap<String, String> {
        &self.options
    }

    pub fn is_local(&self) -> bool {
        self.url.scheme() == "file"
    }

    /// Location rendered as a glob over its contents, e.g. `abfss://c@a.dfs.core.windows.net/landing/X/*`.
    pub fn glob(&self) -> String {
        format!("{}*", self.url)
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

// Options may carry secrets; only the URL is printed.
impl fmt::Debug for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageLocation")
            .field("url", &self.url.as_str())
            .field("options", &self.options.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builds an ADLS Gen2 URL for a container path.
pub fn adls_url(account: &str, container: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    format!("abfss://{container}@{account}.dfs.core.windows.net/{path}/")
}
