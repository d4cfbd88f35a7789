use std::fs;

use scrape_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out").join("nested");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_content() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("20240101_gdpr.json", b"{}").unwrap();
    assert_eq!(first.file_name().unwrap(), "20240101_gdpr.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "{}");

    let second = writer.write("20240101_gdpr.json", b"{\"data\": null}").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "{\"data\": null}");
    // No temp files are left next to the artifact.
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn file_in_place_of_directory_is_reported_with_its_path() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let err = writer.write("out.csv", b"a,b\n").unwrap_err();
    assert!(matches!(err, PersistError::OutputDir { .. }));
    assert_eq!(err.path(), file_path.as_path());
    assert!(!file_path.with_file_name("out.csv").exists());
}
