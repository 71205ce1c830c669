//! File discovery for landing folders.

use bronze_common::{ObjectMeta, ObjectPath, Storage, StorageLocation};
use tracing::{info, warn};

use crate::error::Result;

/// A CSV file found in the landing zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingFile {
    /// Object path inside the landing store.
    pub path: ObjectPath,
    /// Full URI, used for lineage and log output.
    pub uri: String,
    /// File name without directories.
    pub name: String,
    pub size: u64,
}

/// Non-empty list of discovered CSV files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingFiles {
    files: Vec<LandingFile>,
}

impl LandingFiles {
    pub fn count(&self) -> usize {
        self.files.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LandingFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[LandingFile] {
        &self.files
    }
}

impl<'a> IntoIterator for &'a LandingFiles {
    type Item = &'a LandingFile;
    type IntoIter = std::slice::Iter<'a, LandingFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Resolves a landing path that may end in a `*` glob to its directory.
pub fn landing_location(pattern: &str) -> bronze_common::Result<StorageLocation> {
    StorageLocation::parse(pattern.trim_end_matches('*'))
}

/// Lists CSV files directly in the storage root and in its immediate subfolders.
///
/// Deeper folders are not visited. Returns `None` when nothing was found so the
/// caller can decide whether an empty landing zone is fatal.
pub async fn discover_csv_files(storage: &Storage) -> Result<Option<LandingFiles>> {
    let listing = storage.list_dir(storage.root()).await?;
    let mut files = Vec::new();

    for file in csv_objects(storage, listing.objects) {
        info!(path = %file.uri, file = %file.name, "found CSV in base directory");
        files.push(file);
    }

    let mut folders = listing.common_prefixes;
    folders.sort();
    for folder in folders {
        info!(folder = %storage.uri(&folder), "listing files in folder");
        let nested = storage.list_dir(&folder).await?;
        for file in csv_objects(storage, nested.objects) {
            info!(path = %file.uri, file = %file.name, "found CSV file");
            files.push(file);
        }
    }

    if files.is_empty() {
        warn!(
            location = %storage.location(),
            "no CSV files found; check that files were delivered to the landing zone"
        );
        return Ok(None);
    }
    Ok(Some(LandingFiles { files }))
}

fn csv_objects(storage: &Storage, objects: Vec<ObjectMeta>) -> Vec<LandingFile> {
    let mut files: Vec<LandingFile> = objects
        .into_iter()
        .filter_map(|meta| {
            let name = meta.location.filename()?.to_string();
            is_csv(&name).then(|| LandingFile {
                uri: storage.uri(&meta.location),
                path: meta.location,
                name,
                size: u64::try_from(meta.size).unwrap_or(u64::MAX),
            })
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

fn is_csv(name: &str) -> bool {
    name.len() > 4
        && name
            .get(name.len() - 4..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".csv"))
}
