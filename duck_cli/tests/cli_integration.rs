use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Fast cadence and short retry delays so runs finish quickly
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
profile = "v6"

[system]
read_interval_ms = 5
sensor_timeout_ms = 10
retry_delay_ms = 1
max_retry_count = 2
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn duck(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("duck").unwrap();
    cmd.arg("--config").arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "ok", "stdout")]
#[case(&["classify"], 2, "required", "stderr")]
#[case(&["classify", "--features", "1,2"], 5, "takes 9 features", "stderr")]
#[case(&["classify", "--features", "a,b"], 2, "invalid", "stderr")]
#[case(&["health", "--fail-every", "1"], 4, "sensor read failed", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = duck(&cfg);
    for a in args {
        cmd.arg(a);
    }
    let assert = cmd.assert().code(exit_code);

    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn classify_prints_label_and_votes() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = duck(&cfg)
        .args(["--json", "classify", "--features", "0,0,0,0,0,0,0,0,nan"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let votes = v["votes"].as_array().unwrap();
    assert_eq!(votes.len(), 2);
    let total: u64 = votes.iter().map(|x| x.as_u64().unwrap()).sum();
    assert_eq!(total, 10);
    assert!(v["label"].as_u64().unwrap() < 2);
}

#[test]
fn negative_features_are_not_flags() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    duck(&cfg)
        .args(["classify", "--features", "-1,-0.5,0,0,0,0,0,0,0"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("label "));
}

#[test]
fn run_emits_one_json_record_per_cycle() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = duck(&cfg)
        .args(["run", "--cycles", "3", "--interval-ms", "1"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 3);
    for r in &records {
        assert!(r["timestamp_ms"].is_u64());
        assert!(r["prediction"].as_u64().unwrap() < 2);
        assert_eq!(r["features"]["channels"].as_array().unwrap().len(), 4);
        assert!(r["has_valid_gps"].is_boolean());
    }
    // The simulated receiver has a fix after its first read.
    assert_eq!(records[2]["has_valid_gps"], true);
}

#[rstest]
#[case("[system]\nmax_retry_count = 0\n", "max_retry_count")]
#[case("profile = \"v9\"\n", "parse config")]
#[case("[bounds.temperature]\nmin = 10.0\nmax = 0.0\n", "min must be <= max")]
fn invalid_config_exits_3(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, toml).unwrap();
    duck(&path)
        .arg("self-check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains(needle));
}

#[test]
fn missing_config_file_exits_3() {
    let dir = tempdir().unwrap();
    duck(&dir.path().join("nope.toml"))
        .arg("self-check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("read config"));
}

#[test]
fn cli_reports_bad_calibration_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let bad_csv = dir.path().join("calib.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "raw,value").unwrap();
    writeln!(f, "100,0.0").unwrap();

    duck(&cfg)
        .arg("--calibration")
        .arg(&bad_csv)
        .arg("self-check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("channel,mean,std"));
}

#[test]
fn calibration_csv_is_applied() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let csv = dir.path().join("calib.csv");
    fs::write(&csv, "channel,mean,std\ntemperature,25.0,2.0\n").unwrap();
    duck(&cfg)
        .arg("--calibration")
        .arg(&csv)
        .arg("self-check")
        .assert()
        .success();
}

#[test]
fn health_reports_status_as_json() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = duck(&cfg).args(["--json", "health"]).output().unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["status"]["kind"], "ok");
    assert_eq!(v["stack"]["task"], "ml");
    assert_eq!(v["stack"]["low"], false);
    assert!(v["reading"]["temperature"].is_number());
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = duck(&cfg)
        .args(["--json", "health", "--fail-every", "1"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(4));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let line = stderr
        .lines()
        .find(|l| l.contains("\"reason\""))
        .expect("structured error line");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "RetryExhausted");
    assert_eq!(v["details"]["attempts"], 2);
}
