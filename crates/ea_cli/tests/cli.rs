use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, v: &Value) {
    fs::write(dir.join(name), serde_json::to_vec(v).unwrap()).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "roster.json",
        &json!({ "students": [
            { "rollNumber": "A1", "homeDepartmentId": "cs", "meritScore": 90, "preferences": ["me"] },
            { "rollNumber": "A2", "homeDepartmentId": "cs", "meritScore": 80, "preferences": ["me", "ee"] },
            { "rollNumber": "B1", "homeDepartmentId": "ee", "meritScore": 50, "preferences": ["me"] }
        ]}),
    );
    write(
        dir.path(),
        "departments.json",
        &json!({ "departments": [
            { "id": "me", "capacity": 2 },
            { "id": "ee", "capacity": 1 }
        ]}),
    );
    dir
}

fn ea() -> Command {
    let mut cmd = Command::cargo_bin("ea").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn run_writes_artifacts() {
    let dir = fixture();
    let out = dir.path().join("out");
    ea().current_dir(dir.path())
        .args(["run", "--roster", "roster.json", "--departments", "departments.json", "--trace", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("result: RES:"))
        .stdout(predicate::str::contains("assigned: 3"));

    let result: Value = serde_json::from_slice(&fs::read(out.join("result.json")).unwrap()).unwrap();
    assert_eq!(result["outcomes"][2]["reason"], "assigned:rank=1");
    assert_eq!(result["outcomes"][1]["assignedDepartmentId"], "ee");
    assert!(out.join("run_record.json").exists());
    assert!(out.join("allocation_trace.json").exists());
}

#[test]
fn seeded_runs_are_reproducible() {
    let dir = fixture();
    let run = |sub: &str| {
        let out = dir.path().join(sub);
        ea().current_dir(dir.path())
            .args(["--quiet", "run", "--roster", "roster.json", "--departments", "departments.json"])
            .args(["--seed", "0x2a", "--out"])
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
        fs::read(out.join("result.json")).unwrap()
    };
    assert_eq!(run("one"), run("two"));
}

#[test]
fn validate_reports_warnings_and_passes() {
    let dir = fixture();
    write(
        dir.path(),
        "roster.json",
        &json!({ "students": [
            { "rollNumber": "A1", "homeDepartmentId": "cs", "meritScore": 90, "preferences": ["nowhere"] }
        ]}),
    );
    ea().current_dir(dir.path())
        .args(["validate", "--roster", "roster.json", "--departments", "departments.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Student.UnknownPreference"))
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn validation_errors_exit_2() {
    let dir = fixture();
    write(
        dir.path(),
        "departments.json",
        &json!({ "departments": [ { "id": "me", "capacity": 0 } ] }),
    );
    ea().current_dir(dir.path())
        .args(["validate", "--json", "--roster", "roster.json", "--departments", "departments.json"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Department.CapacityNonPositive"));

    ea().current_dir(dir.path())
        .args(["run", "--roster", "roster.json", "--departments", "departments.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("FAIL"));
}

#[test]
fn schema_errors_exit_2() {
    let dir = fixture();
    write(dir.path(), "roster.json", &json!({ "students": [ { "rollNumber": "A1" } ] }));
    ea().current_dir(dir.path())
        .args(["validate", "--roster", "roster.json", "--departments", "departments.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("schema error"));
}

#[test]
fn digest_mismatch_exits_3() {
    let dir = fixture();
    write(
        dir.path(),
        "manifest.json",
        &json!({
            "roster_path": "roster.json",
            "departments_path": "departments.json",
            "inputs_sha256": { "departments_path": "f".repeat(64) }
        }),
    );
    ea().current_dir(dir.path())
        .args(["run", "--manifest", "manifest.json", "--out", "out"])
        .assert()
        .code(3);
}

#[test]
fn missing_file_exits_4() {
    let dir = fixture();
    ea().current_dir(dir.path())
        .args(["validate", "--roster", "absent.json", "--departments", "departments.json"])
        .assert()
        .code(4);
}

#[test]
fn urls_are_refused() {
    let dir = fixture();
    ea().current_dir(dir.path())
        .args(["run", "--roster", "https://example.org/r.json", "--departments", "departments.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("local file"));
}
