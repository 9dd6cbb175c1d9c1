use imt_logger::{LevelFilter, Logger, Rotation};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn file_logging_writes_filtered_json_lines() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder("imt-file-logging")
        .level(LevelFilter::INFO)
        .directives(Some("info,noisy=error"))
        .file(&log_dir, Rotation::DAILY, 2)
        .init()?;
    assert_eq!(logger.directory(), Some(log_dir.as_path()));

    tracing::info!("hello from integration test");
    tracing::warn!(target: "noisy", "filtered out");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");
    let file_name = log_file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    assert!(file_name.starts_with("imt-file-logging."));

    let contents = fs::read_to_string(&log_file)?;
    let first = contents.lines().next().expect("log file should not be empty");
    assert!(first.starts_with('{'), "file lines should be JSON objects");
    assert!(first.contains("hello from integration test"));
    assert!(!contents.contains("filtered out"));

    Ok(())
}
