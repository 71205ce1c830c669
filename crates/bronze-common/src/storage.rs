//! Object store access rooted at a [`StorageLocation`].

use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::{ListResult, ObjectMeta, ObjectStore, PutPayload};
use tracing::debug;

use crate::error::{Result, StorageError};
use crate::location::StorageLocation;

/// An object store plus the directory it was opened for.
///
/// Relative paths passed to the methods below resolve against that directory.
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn ObjectStore>,
    root: Path,
    location: StorageLocation,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Storage<{}>", self.location)
    }
}

impl Storage {
    /// Opens the object store backing `location`.
    pub fn open(location: &StorageLocation) -> Result<Self> {
        let (store, root) = object_store::parse_url_opts(location.url(), location.options())
            .map_err(|source| StorageError::object_store("open", location, source))?;
        debug!(location = %location, root = %root, "opened storage");
        Ok(Self {
            store: Arc::from(store),
            root,
            location: location.clone(),
        })
    }

    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a `/`-separated relative path against the root.
    pub fn qualify(&self, relative: &str) -> Path {
        Path::from(relative)
            .parts()
            .fold(self.root.clone(), |path, part| path.child(part))
    }

    /// Path of `path` relative to the root, or the full path when outside it.
    pub fn relative(&self, path: &Path) -> String {
        match path.prefix_match(&self.root) {
            Some(parts) => parts
                .map(|part| part.as_ref().to_string())
                .collect::<Vec<_>>()
                .join("/"),
            None => path.to_string(),
        }
    }

    /// Full URI of an object, e.g. `abfss://c@a.dfs.core.windows.net/landing/X/file.csv`.
    pub fn uri(&self, path: &Path) -> String {
        format!("{}{}", self.location, self.relative(path))
    }

    /// Lists one directory level: objects directly inside `dir` plus its sub-directories.
    ///
    /// A missing directory lists as empty.
    pub async fn list_dir(&self, dir: &Path) -> Result<ListResult> {
        match self.store.list_with_delimiter(Some(dir)).await {
            Ok(listing) => Ok(listing),
            Err(object_store::Error::NotFound { .. }) => Ok(ListResult {
                common_prefixes: Vec::new(),
                objects: Vec::new(),
            }),
            Err(source) => Err(StorageError::object_store("list", dir, source)),
        }
    }

    /// Recursively lists every object under `prefix`.
    pub async fn list_all(&self, prefix: &Path) -> Result<Vec<ObjectMeta>> {
        let listed: std::result::Result<Vec<ObjectMeta>, object_store::Error> =
            self.store.list(Some(prefix)).try_collect().await;
        match listed {
            Ok(objects) => Ok(objects),
            Err(object_store::Error::NotFound { .. }) => Ok(Vec::new()),
            Err(source) => Err(StorageError::object_store("list", prefix, source)),
        }
    }

    /// Returns true if at least one object exists under `prefix`.
    pub async fn has_objects(&self, prefix: &Path) -> Result<bool> {
        let mut stream = self.store.list(Some(prefix));
        match stream.try_next().await {
            Ok(first) => Ok(first.is_some()),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(source) => Err(StorageError::object_store("list", prefix, source)),
        }
    }

    pub async fn get(&self, path: &Path) -> Result<Bytes> {
        let result = self
            .store
            .get(path)
            .await
            .map_err(|source| StorageError::object_store("get", path, source))?;
        result
            .bytes()
            .await
            .map_err(|source| StorageError::object_store("get", path, source))
    }

    pub async fn put(&self, path: &Path, bytes: Bytes) -> Result<()> {
        self.store
            .put(path, PutPayload::from(bytes))
            .await
            .map_err(|source| StorageError::object_store("put", path, source))?;
        Ok(())
    }

    pub async fn delete(&self, path: &Path) -> Result<()> {
        match self.store.delete(path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(source) => Err(StorageError::object_store("delete", path, source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_storage(dir: &std::path::Path) -> Storage {
        Storage::open(&StorageLocation::local(dir).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn put_get_and_list_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = local_storage(dir.path());

        let nested = storage.qualify("sub/b.csv");
        storage.put(&storage.qualify("a.csv"), Bytes::from_static(b"x")).await.unwrap();
        storage.put(&nested, Bytes::from_static(b"y")).await.unwrap();

        let listing = storage.list_dir(storage.root()).await.unwrap();
        assert_eq!(listing.objects.len(), 1);
        assert_eq!(listing.common_prefixes.len(), 1);

        let all = storage.list_all(storage.root()).await.unwrap();
        assert_eq!(all.len(), 2);

        assert_eq!(storage.get(&nested).await.unwrap(), Bytes::from_static(b"y"));
        assert_eq!(storage.relative(&nested), "sub/b.csv");
        assert!(storage.uri(&nested).ends_with("/sub/b.csv"));
    }

    #[tokio::test]
    async fn missing_prefix_has_no_objects() {
        let dir = tempfile::tempdir().unwrap();
        let storage = local_storage(dir.path());
        let prefix = storage.qualify("_delta_log");
        assert!(!storage.has_objects(&prefix).await.unwrap());
        assert!(storage.list_all(&prefix).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_object_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = local_storage(dir.path());
        storage.delete(&storage.qualify("nothing.parquet")).await.unwrap();
    }
}
