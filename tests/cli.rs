#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn cli(roster: &Path) -> Command {
    let mut cmd = Command::cargo_bin("turnqueue-cli").unwrap();
    cmd.env_remove("TURNQUEUE_STORE")
        .env_remove("TURNQUEUE_ROSTER")
        .arg("--roster")
        .arg(roster);
    cmd
}

#[test]
fn front_desk_rotation() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");

    cli(&roster)
        .args(["add", "--name", "Alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 | #1 Alice | AVAILABLE | out"));
    cli(&roster).args(["add", "--name", "Bob"]).assert().success();
    cli(&roster).args(["toggle", "--id", "1"]).assert().success();
    cli(&roster).args(["toggle", "--id", "2"]).assert().success();

    cli(&roster)
        .arg("assign")
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 Alice | BUSY | in"));

    cli(&roster)
        .args(["complete", "--id", "1", "--request"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 | #1 Alice | AVAILABLE | in"));

    cli(&roster)
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 | #2 Bob"));
}

#[test]
fn engine_errors_fail_the_command() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");

    cli(&roster)
        .arg("assign")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no available technicians"));

    cli(&roster)
        .args(["break", "--id", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("technician with id 7 not found"));
}

#[test]
fn next_on_empty_queue_exits_with_warning_code() {
    let dir = tempdir().unwrap();
    cli(&dir.path().join("roster.json"))
        .arg("next")
        .assert()
        .code(2);
}

#[test]
fn reorder_and_export() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    for name in ["Alice", "Bob", "Charlie"] {
        cli(&roster).args(["add", "--name", name]).assert().success();
    }

    cli(&roster)
        .args(["reorder", "--ids", "2,3,1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 | #2 Bob"))
        .stdout(predicate::str::contains("3 | #1 Alice"));

    let csv = dir.path().join("queue.csv");
    cli(&roster)
        .arg("list")
        .arg("--out-csv")
        .arg(&csv)
        .assert()
        .success();
    let exported = std::fs::read_to_string(&csv).unwrap();
    let names: Vec<&str> = exported
        .lines()
        .skip(1)
        .filter_map(|l| l.split(',').nth(2))
        .collect();
    assert_eq!(names, vec!["Bob", "Charlie", "Alice"]);
}

#[test]
fn reset_requires_confirmation() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    cli(&roster).args(["add", "--name", "Alice"]).assert().success();

    cli(&roster).arg("reset").assert().failure();
    cli(&roster)
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 technician(s) deleted"));

    cli(&roster)
        .args(["add", "--name", "Zoe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 Zoe"));
}

#[test]
fn memory_backend_does_not_touch_disk() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    cli(&roster)
        .args(["--store", "memory", "add", "--name", "Alice"])
        .assert()
        .success();
    assert!(!roster.exists());
}
