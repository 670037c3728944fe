use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn flow(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("flow").unwrap();
    cmd.arg("--root").arg(root.path()).env("NO_COLOR", "1");
    cmd
}

fn create_process(root: &TempDir, requirement: &str) -> String {
    let output = flow(root)
        .args(["--json", "create", "--name", "Login UX", "--requirement", requirement])
        .output()
        .unwrap();
    assert!(output.status.success());
    let process: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    process["id"].as_str().unwrap().to_string()
}

#[test]
fn test_init_writes_templates() {
    let root = TempDir::new().unwrap();

    flow(&root)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("agents/demand-manager.md"));

    assert!(root.path().join(".product-flow/config.toml").exists());

    flow(&root)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_create_show_and_list() {
    let root = TempDir::new().unwrap();
    let id = create_process(&root, "Optimize login");

    flow(&root)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Clarification round 1"))
        .stdout(predicate::str::contains("q3"));

    flow(&root)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));
}

#[test]
fn test_answer_moves_to_judgment() {
    let root = TempDir::new().unwrap();
    let id = create_process(&root, "Optimize login");

    let output = flow(&root)
        .args(["--json", "answer", &id, "q1=Mobile users", "q2=Login", "q3=None"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let process: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(process["currentStep"], "1.2_judgment");
    assert_eq!(process["steps"]["1.1"]["status"], "completed");
}

#[test]
fn test_invalid_transition_is_reported() {
    let root = TempDir::new().unwrap();
    let id = create_process(&root, "Optimize login");

    flow(&root)
        .args(["skip-research", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid transition"));
}

#[test]
fn test_unknown_step_is_rejected() {
    let root = TempDir::new().unwrap();
    let id = create_process(&root, "Optimize login");

    flow(&root)
        .args(["update-step", &id, "1.10", "completed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown step"));
}

#[test]
fn test_missing_process() {
    let root = TempDir::new().unwrap();

    flow(&root)
        .args(["show", "process_missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
