//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};

const CSV: &str = "\
Time,CPU_Usage,Memory_Usage,Network_Usage,Temperature
2024-01-01 09:00:00,70,8.0,120,45
2024-01-01 10:00:00,80,8.5,130,46
2024-01-01 11:00:00,90,9.0,125,47
2024-01-01 12:00:00,95,9.5,140,48
2024-01-01 13:00:00,99,10.0,150,49
";

fn analyzer() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_server-analyzer"));
    for var in [
        "ANALYZER_CSV",
        "ANALYZER_OUTPUT_DIR",
        "ANALYZER_THRESHOLD_METHOD",
        "ANALYZER_LOG_JSON",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn write_csv(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("server_usage_data.csv");
    std::fs::write(&path, CSV).expect("Failed to write fixture");
    path
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = run(analyzer().arg("--help"));
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Analyze server performance data"),
        "Should show about text"
    );
    assert!(stdout.contains("--csv"), "Should show csv option");
    assert!(stdout.contains("ANALYZER_CSV"), "Should show env var");
    assert!(stdout.contains("--method"), "Should show method option");
    assert!(stdout.contains("--no-plots"), "Should show no-plots flag");
    assert!(stdout.contains("json"), "Should show json format");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = run(analyzer().arg("--version"));
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("server-analyzer"), "Should show binary name");
}

#[test]
fn test_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(analyzer()
        .arg("--csv")
        .arg(dir.path().join("absent.csv"))
        .arg("--no-plots"));
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Missing file should fail");
    assert!(stderr.contains("File not found"), "Should name the failure");
}

#[test]
fn test_unknown_method_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path());
    let output = run(analyzer()
        .arg("--csv")
        .arg(&csv)
        .args(["--method", "zscore", "--no-plots"]));

    assert!(!output.status.success(), "Unknown method should fail");
    assert!(String::from_utf8_lossy(&output.stderr).contains("zscore"));
}

#[test]
fn test_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path());
    let output = run(analyzer()
        .arg("--csv")
        .arg(&csv)
        .args(["--format", "json", "--no-plots"]));

    assert!(output.status.success(), "JSON run should succeed");
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");

    assert_eq!(report["row_count"], 5);
    assert_eq!(report["threshold_method"], "percentile");

    let cpu = &report["thresholds"]["CPU_Usage"];
    assert!((cpu["warning"].as_f64().unwrap() - 97.4).abs() < 1e-9);
    assert!((cpu["critical"].as_f64().unwrap() - 98.2).abs() < 1e-9);

    let anomalies = &report["anomalies"]["CPU_Usage"];
    assert_eq!(anomalies["warning_count"], 1);
    assert_eq!(anomalies["critical_count"], 1);

    assert_eq!(report["statistics"]["CPU_Usage"]["count"], 5);
    assert!(report["time_patterns"]["hourly"]["9"].is_object());
    assert!(!dir.path().join("plot").exists());
}

#[test]
fn test_table_report_sections() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path());
    let output = run(analyzer()
        .arg("--csv")
        .arg(&csv)
        .args(["--method", "iqr", "--no-plots"]));
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Table run should succeed");
    assert!(stdout.contains("DESCRIPTIVE STATISTICS"));
    assert!(stdout.contains("ALERTNESS THRESHOLDS"));
    assert!(stdout.contains("OPTIMIZATION RECOMMENDATIONS"));
    assert!(stdout.contains("iqr"));
}

#[test]
fn test_charts_written() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path());
    let plots = dir.path().join("plots");
    let output = run(analyzer()
        .arg("--csv")
        .arg(&csv)
        .arg("--output-dir")
        .arg(&plots)
        .args(["--format", "json"]));

    assert!(output.status.success(), "Chart run should succeed");
    for name in [
        "performance_timeseries.png",
        "performance_distributions.png",
        "correlation_heatmap.png",
        "hourly_patterns.png",
        "anomaly_detection.png",
    ] {
        assert!(plots.join(name).exists(), "{name} should be written");
    }
}

#[test]
fn test_output_dir_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path());
    let plots = dir.path().join("env-plots");
    let output = run(analyzer()
        .env("ANALYZER_OUTPUT_DIR", &plots)
        .arg("--csv")
        .arg(&csv)
        .args(["--format", "json"]));

    assert!(output.status.success(), "Env-configured run should succeed");
    assert!(plots.join("correlation_heatmap.png").exists());
}
