use std::fs;

use jobwatch_engine::{ensure_output_dir, ExportWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_export_dir() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("exports").join("2024");
    ensure_output_dir(&dir).unwrap();
    assert!(dir.is_dir());
}

#[test]
fn rewriting_same_day_export_replaces_file() {
    let temp = TempDir::new().unwrap();
    let writer = ExportWriter::new(temp.path().to_path_buf());

    let first = writer
        .write("job_hunter_2024-05-01.csv", "Title,Company\n")
        .unwrap();
    let second = writer
        .write("job_hunter_2024-05-01.csv", "Title,Company\n\"A\",\"B\"")
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        fs::read_to_string(&second).unwrap(),
        "Title,Company\n\"A\",\"B\""
    );
    let entries = fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn export_dir_that_is_a_file_leaves_nothing_behind() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("exports");
    fs::write(&blocker, "x").unwrap();

    let writer = ExportWriter::new(blocker.clone());
    let result = writer.write("jobs.csv", "data");
    assert!(matches!(result, Err(PersistError::OutputDir(_))));
    assert!(!temp.path().join("jobs.csv").exists());
}

#[test]
fn file_names_with_separators_are_rejected() {
    let temp = TempDir::new().unwrap();
    let writer = ExportWriter::new(temp.path().to_path_buf());
    assert!(matches!(
        writer.write("../escape.csv", "x"),
        Err(PersistError::FileName(_))
    ));
    assert!(matches!(writer.write("", "x"), Err(PersistError::FileName(_))));
}
