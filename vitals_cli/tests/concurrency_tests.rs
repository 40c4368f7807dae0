//! Concurrency tests for the vitals binary.
//!
//! These tests verify that multiple processes can safely:
//! - Append to the journal simultaneously (file locking)
//! - Read history while other processes write

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const SENSOR_CSV: &str = "\
timestamp,bpm,hrv,accel_x,accel_y,accel_z
2024-03-01 10:00:00,70,50,0.0,0.1,9.8
2024-03-01 10:00:01,72,49,0.1,0.1,9.7
2024-03-01 10:00:02,75,47,0.2,0.0,9.9
";

/// CLI against `data_dir`, with an empty config next to it so the
/// developer's own config file is never read
fn cli(data_dir: &Path) -> Command {
    let config_path = data_dir.with_extension("toml");
    if !config_path.exists() {
        let _ = fs::write(&config_path, "");
    }

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vitals"));
    cmd.arg("--data-dir")
        .arg(data_dir)
        .arg("--config")
        .arg(config_path);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn write_sensor_csv(dir: &Path) -> PathBuf {
    let path = dir.join("sensors.csv");
    fs::write(&path, SENSOR_CSV).expect("Failed to write sensor CSV");
    path
}

fn count_valid_lines(path: &Path) -> usize {
    let content = fs::read_to_string(path).expect("Failed to read journal");
    content
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            let parsed: Result<serde_json::Value, _> = serde_json::from_str(line);
            assert!(parsed.is_ok(), "Journal contains invalid JSON line: {}", line);
        })
        .count()
}

#[test]
fn test_concurrent_imports() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let csv = write_sensor_csv(temp_dir.path());

    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let data_dir = data_dir.clone();
            let csv = csv.clone();
            thread::spawn(move || {
                // Small stagger to reduce thundering herd
                thread::sleep(Duration::from_millis(i * 5));
                cli(&data_dir)
                    .arg("import")
                    .arg("--user")
                    .arg(i.to_string())
                    .arg(&csv)
                    .timeout(Duration::from_secs(10))
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    // Every batch lands whole
    let count = count_valid_lines(&data_dir.join("journal/samples.jsonl"));
    assert_eq!(count, 8 * 3, "Expected 24 samples, got {}", count);
}

#[test]
fn test_reads_while_recording() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    let reader_dir = data_dir.clone();
    let reader = thread::spawn(move || {
        for _ in 0..5 {
            cli(&reader_dir)
                .args(["load", "--user", "1"])
                .timeout(Duration::from_secs(10))
                .assert()
                .success();
            thread::sleep(Duration::from_millis(5));
        }
    });

    for i in 0..5 {
        cli(&data_dir)
            .args(["record", "--user", "1", "--questionnaire", "general"])
            .args(["--set", "rpe=5"])
            .arg("--set")
            .arg(format!("duracion_min={}", 30 + i * 10))
            .timeout(Duration::from_secs(10))
            .assert()
            .success();
    }

    reader.join().expect("Reader thread panicked");

    let count = count_valid_lines(&data_dir.join("journal/questionnaires.jsonl"));
    assert_eq!(count, 5);
}
