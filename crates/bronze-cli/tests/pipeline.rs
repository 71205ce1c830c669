//! End-to-end loads against a local landing zone and bronze table.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use deltalake::arrow::array::{Array, StringArray};

use bronze_cli::{PipelineConfig, PipelineError, run_pipeline};
use bronze_common::StorageLocation;
use bronze_delta::{TableContents, read_table};
use bronze_model::{DeliveryMode, HASH_KEY, LOAD_TYPE, ORIGINAL_FILE_NAME, RECORD_ID, RSRC};
use bronze_transform::md5_hex;

const HEADER: &str = "API_ID;GMT;AIRPORT_ID;IATA_CODE;CITY_IATA_CODE;ICAO_CODE;COUNTRY_ISO2;\
GEONAME_ID;LATITUDE;LONGITUDE;AIRPORT_NAME;COUNTRY_NAME;PHONE_NUMBER;TIMEZONE";

fn config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        local_root: Some(root.to_path_buf()),
        ..PipelineConfig::default()
    }
}

fn landing_dir(root: &Path) -> PathBuf {
    root.join("tutorialcontainer/test/landing/AIRPORTS")
}

fn bronze_dir(root: &Path) -> PathBuf {
    root.join("tutorialcontainer/test/bronze/AIRPORTS")
}

fn deliver(root: &Path, relative: &str, rows: &[&str]) {
    let path = landing_dir(root).join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("create landing dir");
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(path, content).expect("write landing file");
}

fn strings(contents: &TableContents, column: &str) -> Vec<Option<String>> {
    contents
        .batches
        .iter()
        .flat_map(|batch| {
            let array = batch
                .column_by_name(column)
                .expect("column")
                .as_any()
                .downcast_ref::<StringArray>()
                .expect("string column")
                .clone();
            (0..array.len())
                .map(|i| (!array.is_null(i)).then(|| array.value(i).to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn deliver_airports(root: &Path) {
    deliver(
        root,
        "airports_1.csv",
        &[
            "1;-10;1;AAA;AAA;NTGA;PF;6947726;-17.352606;-145.509956;Anaa;French Polynesia;;Pacific/Tahiti",
            "2;1;2;;AAE;DABB;DZ;2570559;36.822225;7.809167;El Mellah;Algeria;;Africa/Algiers",
        ],
    );
    deliver(
        root,
        "2024/airports_2.csv",
        &["3;1;3;AAL;AAL;EKYT;DK;2624887;57.08655;9.872241;Aalborg;Denmark;;Europe/Copenhagen"],
    );
}

#[tokio::test]
async fn load_writes_enriched_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    deliver_airports(dir.path());

    let summary = run_pipeline(&config(dir.path()), false).await.expect("run");
    assert_eq!(summary.files, 2);
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.nulled_values, 0);
    assert!(summary.version.is_some());
    assert!(summary.landing.ends_with("/test/landing/AIRPORTS/*"));

    let location = config(dir.path()).bronze_location().expect("location");
    let contents = read_table(&location, None).await.expect("read");
    assert_eq!(contents.num_rows(), 3);

    let mut names: Vec<String> = strings(&contents, ORIGINAL_FILE_NAME)
        .into_iter()
        .flatten()
        .collect();
    names.sort();
    assert_eq!(names, vec!["airports_1.csv", "airports_1.csv", "airports_2.csv"]);

    let keys: HashSet<String> = strings(&contents, HASH_KEY).into_iter().flatten().collect();
    assert!(keys.contains(&md5_hex("-1")));
    assert!(keys.contains(&md5_hex("AAA")));

    assert!(
        strings(&contents, RSRC)
            .iter()
            .all(|v| v.as_deref() == Some("CSV"))
    );
    assert!(
        strings(&contents, LOAD_TYPE)
            .iter()
            .all(|v| v.as_deref() == Some("FULL"))
    );

    let record_ids: HashSet<String> = strings(&contents, RECORD_ID).into_iter().flatten().collect();
    assert_eq!(record_ids.len(), 3);
}

#[tokio::test]
async fn rerun_replaces_previous_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    deliver_airports(dir.path());
    let config = config(dir.path());

    let first = run_pipeline(&config, false).await.expect("first run");
    let second = run_pipeline(&config, false).await.expect("second run");
    assert_eq!(first.deleted_objects, 0);
    assert!(second.deleted_objects > 0);

    let contents = read_table(&config.bronze_location().expect("location"), None)
        .await
        .expect("read");
    assert_eq!(contents.num_rows(), 3);

    // Fresh ids on every load.
    let ids: HashSet<String> = strings(&contents, RECORD_ID).into_iter().flatten().collect();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn empty_landing_zone_fails_before_truncation() {
    let dir = tempfile::tempdir().expect("tempdir");
    deliver_airports(dir.path());
    let config = config(dir.path());
    run_pipeline(&config, false).await.expect("seed run");

    fs::remove_dir_all(landing_dir(dir.path())).expect("clear landing");
    fs::create_dir_all(landing_dir(dir.path()).join("empty")).expect("empty folder");
    fs::write(landing_dir(dir.path()).join("notes.txt"), "not a csv").expect("write");

    let err = run_pipeline(&config, false).await.expect_err("no files");
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NoCsvFiles { .. })
    ));

    let contents = read_table(&config.bronze_location().expect("location"), None)
        .await
        .expect("destination untouched");
    assert_eq!(contents.num_rows(), 3);
}

#[tokio::test]
async fn dry_run_leaves_destination_absent() {
    let dir = tempfile::tempdir().expect("tempdir");
    deliver_airports(dir.path());

    let summary = run_pipeline(&config(dir.path()), true).await.expect("dry run");
    assert!(summary.dry_run);
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.version, None);
    assert!(!bronze_dir(dir.path()).exists());
}

#[tokio::test]
async fn delivery_mode_is_recorded_and_table_still_replaced() {
    let dir = tempfile::tempdir().expect("tempdir");
    deliver_airports(dir.path());
    let config = PipelineConfig {
        delivery_mode: DeliveryMode::Delta,
        ..config(dir.path())
    };

    run_pipeline(&config, false).await.expect("first run");
    run_pipeline(&config, false).await.expect("second run");

    let contents = read_table(&config.bronze_location().expect("location"), None)
        .await
        .expect("read");
    assert_eq!(contents.num_rows(), 3);
    assert!(
        strings(&contents, LOAD_TYPE)
            .iter()
            .all(|v| v.as_deref() == Some("DELTA"))
    );
}

#[tokio::test]
async fn unparseable_values_are_counted() {
    let dir = tempfile::tempdir().expect("tempdir");
    deliver(
        dir.path(),
        "airports.csv",
        &["x;abc;1;AAA;AAA;NTGA;PF;6947726;north;-145.509956;Anaa;French Polynesia;;Pacific/Tahiti"],
    );

    let summary = run_pipeline(&config(dir.path()), true).await.expect("dry run");
    assert_eq!(summary.nulled_values, 3);
}

#[tokio::test]
async fn empty_delivery_file_is_skipped_under_landing_glob() {
    let dir = tempfile::tempdir().expect("tempdir");
    deliver_airports(dir.path());
    fs::write(landing_dir(dir.path()).join("2024/empty.csv"), "").expect("write");

    let glob = StorageLocation::local(&landing_dir(dir.path()))
        .expect("location")
        .glob();
    let config = PipelineConfig {
        landing_path: Some(glob.clone()),
        ..config(dir.path())
    };

    let summary = run_pipeline(&config, false).await.expect("run");
    assert_eq!(summary.files, 3);
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.landing, glob);

    let contents = read_table(&config.bronze_location().expect("location"), None)
        .await
        .expect("read");
    assert_eq!(contents.num_rows(), 3);
}
