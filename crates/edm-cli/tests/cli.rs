use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

fn data_dir() -> String {
    repo_path("test_data/chennai").to_str().unwrap().to_string()
}

#[test]
fn edm_report_runs_every_step() {
    let mut cmd = Command::cargo_bin("edm").unwrap();
    cmd.args(["report", "--data-dir", &data_dir()])
        .assert()
        .success()
        .stdout(predicate::str::contains("DATASET SUMMARY"))
        .stdout(predicate::str::contains("HISTORICAL TRENDS (2020-2024)"))
        .stdout(predicate::str::contains("Peak months: May"))
        .stdout(predicate::str::contains("Weekday peak: 19:00"))
        .stdout(predicate::str::contains("Largest consumer sector: Domestic"));
}

#[test]
fn edm_report_skips_missing_datasets() {
    Command::cargo_bin("edm")
        .unwrap()
        .args(["report", "--data-dir", &data_dir()])
        .assert()
        .success()
        .stderr(predicate::str::contains("weather"));
}

#[test]
fn edm_sectors_reports_unavailable_without_data() {
    let empty = tempdir().unwrap();
    Command::cargo_bin("edm")
        .unwrap()
        .args(["sectors", "--data-dir", empty.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Sector-wise consumption: unavailable",
        ));
}

#[test]
fn edm_historical_exports_growth_columns() {
    let out = tempdir().unwrap();
    Command::cargo_bin("edm")
        .unwrap()
        .args([
            "historical",
            "--data-dir",
            &data_dir(),
            "--export-dir",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Demand CAGR (2020-2024)"));
    let exported = fs::read_to_string(out.path().join("historical_trends.csv")).unwrap();
    let header = exported.lines().next().unwrap();
    assert!(header.contains("Demand_Growth_%"));
    assert!(header.contains("Cost_Growth_%"));
}

#[test]
fn edm_missing_column_fails_fast() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path()
            .join("chennai_electricity_historical_2020_2024.csv"),
        "Year,Demand_MU\n2020,100\n2021,110\n",
    )
    .unwrap();
    Command::cargo_bin("edm")
        .unwrap()
        .args(["historical", "--data-dir", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cost_Rs_per_unit"));
}

#[test]
fn edm_generate_writes_csv_files() {
    let out = tempdir().unwrap();
    Command::cargo_bin("edm")
        .unwrap()
        .args(["generate", "--out-dir", out.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("GENERATED PROJECTIONS"))
        .stdout(predicate::str::contains("Base Case"));
    for file in [
        "generated_projections.csv",
        "generated_sector_data.csv",
        "generated_monthly_data.csv",
        "generated_scenarios.csv",
    ] {
        assert!(out.path().join(file).exists(), "{file} not written");
    }
}

#[test]
fn edm_cagr_prints_rate() {
    Command::cargo_bin("edm")
        .unwrap()
        .args(["cagr", "--first", "100", "--last", "121", "--periods", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.00%"));
}

#[test]
fn edm_cagr_rejects_zero_start() {
    Command::cargo_bin("edm")
        .unwrap()
        .args(["cagr", "--first", "0", "--last", "121", "--periods", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("division by zero"));
}

#[test]
fn edm_config_sets_display_policy() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("edm.toml");
    fs::write(&config, "[display]\ndecimals = 1\n").unwrap();
    Command::cargo_bin("edm")
        .unwrap()
        .args([
            "--config",
            config.to_str().unwrap(),
            "cagr",
            "--first",
            "100",
            "--last",
            "121",
            "--periods",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.0%"));
}

#[test]
fn edm_report_skips_unreadable_dataset() {
    let dir = tempdir().unwrap();
    for entry in fs::read_dir(repo_path("test_data/chennai")).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, dir.path().join(path.file_name().unwrap())).unwrap();
    }
    let mut weather = b"Date,Condition\n2023-01-01,".to_vec();
    weather.extend_from_slice(&[0xff, 0xfe, 0xfd, b'\n']);
    fs::write(dir.path().join("chennai_weather_data_2023_2025.csv"), weather).unwrap();
    Command::cargo_bin("edm")
        .unwrap()
        .args(["report", "--data-dir", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("HISTORICAL TRENDS (2020-2024)"))
        .stdout(predicate::str::contains("Largest consumer sector: Domestic"));
}

#[test]
fn edm_export_failure_keeps_printed_step() {
    let dir = tempdir().unwrap();
    let not_a_dir = dir.path().join("exports");
    fs::write(&not_a_dir, "").unwrap();
    Command::cargo_bin("edm")
        .unwrap()
        .args([
            "historical",
            "--data-dir",
            &data_dir(),
            "--export-dir",
            not_a_dir.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Demand CAGR (2020-2024)"))
        .stdout(predicate::str::contains("unavailable").not())
        .stderr(predicate::str::contains("could not export"));
}
