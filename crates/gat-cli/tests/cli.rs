use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

fn gat_protect() -> Command {
    Command::cargo_bin("gat-protect").unwrap()
}

#[test]
fn simulate_bus4_table() {
    gat_protect()
        .args(["simulate", "--bus", "4", "--fault-type", "3-phase", "--severity", "0.8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bus 4"))
        .stdout(predicate::str::contains("87T-TR1"))
        .stdout(predicate::str::contains("IEEE_C37_112"));
}

#[test]
fn simulate_json_is_parseable() {
    let output = gat_protect()
        .args(["simulate", "--bus", "4", "--severity", "0.8", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["affected_zone"], "Z1");
    assert_eq!(value["device_responses"].as_array().unwrap().len(), 8);
}

#[test]
fn simulate_rejects_unknown_fault_type() {
    gat_protect()
        .args(["simulate", "--bus", "4", "--fault-type", "4ph"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fault type"));
}

#[test]
fn simulate_rejects_out_of_range_severity() {
    gat_protect()
        .args(["simulate", "--bus", "4", "--severity", "1.5"])
        .assert()
        .failure();
}

#[test]
fn train_reports_episodes() {
    let output = gat_protect()
        .args([
            "train",
            "--episodes",
            "3",
            "--scenario",
            "4:3ph:0.8",
            "--seed",
            "5",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["episodes_completed"], 3);
    assert_eq!(value["results"].as_array().unwrap().len(), 3);
}

#[test]
fn train_defaults_to_builtin_batch() {
    gat_protect()
        .args(["train", "--episodes", "2", "--seed", "5"])
        .assert()
        .success()
        .stderr(predicate::str::contains("over 3 scenario(s)"))
        .stdout(predicate::str::contains("Completed 2 episode(s)"));
}

#[test]
fn optimize_never_regresses_and_writes_topology() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("optimized.json");
    let output = gat_protect()
        .args(["optimize", "--episodes", "5", "--seed", "3", "--format", "json", "-o"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["improvement"].as_f64().unwrap() >= 0.0);

    let topology: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(topology["zones"].as_array().unwrap().len(), 2);
}

#[test]
fn status_table() {
    gat_protect()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("healthy"))
        .stdout(predicate::str::contains("uninitialized"));
}

#[test]
fn audit_reports_zone_overlap() {
    gat_protect()
        .args(["audit", "--episodes", "2", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Coordination audit score"))
        .stdout(predicate::str::contains("Bus 5"));
}

#[test]
fn custom_config_and_topology() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("engine.toml");
    fs::write(&config, "[agent]\nstate_size = 16\nseed = 9\n").unwrap();
    let topology = dir.path().join("topology.toml");
    fs::write(
        &topology,
        r#"
[[zones]]
id = "ZA"
transformer = "TRA"
power_mva = 10.0
voltage_kv = 13.8
buses = [1, 2]

[[zones.devices]]
id = "87T-A"
zone = "ZA"
type = "87T"
location = "TRA"
pickup_current = 0.3
time_delay = 0.02
"#,
    )
    .unwrap();

    let output = gat_protect()
        .args(["status", "--format", "json", "--config"])
        .arg(&config)
        .arg("--topology")
        .arg(&topology)
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["system"]["total_devices"], 1);
    assert_eq!(value["rl"]["state_size"], 16);
    assert_eq!(value["rl"]["action_space_size"], 4);
}

#[test]
fn invalid_config_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[agent]\nlearning_rate = 0.0\n").unwrap();
    gat_protect()
        .args(["status", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("learning_rate"));
}
