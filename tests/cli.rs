use std::fs;

use tempfile::tempdir;

#[test]
fn cli_writes_history_csv() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("params.json");
    fs::write(&config, r#"{ "pop_size": 50, "sim_speed": 20.0 }"#).unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("epinet")
        .arg("--random-seed")
        .arg("3")
        .arg("--config")
        .arg(&config)
        .arg("--days")
        .arg("2")
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .success();

    let csv = fs::read_to_string(dir.path().join("history.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("day,susceptible,active,recovered,dead,hospitalized")
    );
    assert!(lines.count() > 0);
}

#[test]
fn cli_rejects_unknown_parameters() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("params.json");
    fs::write(&config, r#"{ "population": 50 }"#).unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("epinet")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}

#[test]
fn cli_logs_at_requested_level() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("epinet")
        .args(["--days", "0", "--log-level", "info"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("built world"), "{stdout}");
}
