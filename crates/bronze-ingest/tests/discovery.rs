//! Tests for landing zone discovery.

use std::fs;
use std::path::Path;

use bronze_common::{Storage, StorageLocation};
use bronze_ingest::discover_csv_files;

fn touch(dir: &Path, name: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(&path, "A;B\n1;2\n").expect("write file");
}

fn open(dir: &Path) -> Storage {
    Storage::open(&StorageLocation::local(dir).expect("location")).expect("open storage")
}

#[tokio::test]
async fn discovers_base_and_first_level_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    touch(dir.path(), "b.csv");
    touch(dir.path(), "a.CSV");
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "2024-01/c.csv");
    touch(dir.path(), "2024-01/deeper/ignored.csv");

    let files = discover_csv_files(&open(dir.path()))
        .await
        .expect("discover")
        .expect("files found");

    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.CSV", "b.csv", "c.csv"]);
    assert_eq!(files.count(), 3);
    assert!(files.as_slice()[2].uri.ends_with("/2024-01/c.csv"));
}

#[tokio::test]
async fn files_two_levels_deep_are_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    touch(dir.path(), "one/two/deep.csv");

    let files = discover_csv_files(&open(dir.path())).await.expect("discover");
    assert!(files.is_none());
}

#[tokio::test]
async fn missing_landing_folder_is_absent_not_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = open(&dir.path().join("AIRPORTS"));

    let files = discover_csv_files(&storage).await.expect("discover");
    assert!(files.is_none());
}
