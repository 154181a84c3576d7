use std::io::Write;
use std::process::{Command, Stdio};

const NO_CONFIG: &str = "/nonexistent/battlegraph/config.toml";

fn run_battle(args: &[&str], answers: &str) -> (bool, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_battlegraph"))
        .arg("battle")
        .args(args)
        .args(["--config", NO_CONFIG])
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child.stdin.take().unwrap().write_all(answers.as_bytes()).unwrap();
    let output = child.wait_with_output().unwrap();
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn battle_orders_items_from_answers() {
    // minimum-degree is deterministic: (A, B), then (A, C), then (B, C).
    let (ok, stdout, _) = run_battle(
        &["--item", "A", "--item", "B", "--item", "C", "--chooser", "minimum-degree", "--json"],
        "1\n1\n1\n",
    );
    assert!(ok);

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["complete"], true);
    assert_eq!(value["decisions"], 3);
    assert_eq!(value["items"][0]["item"], "A");
    assert_eq!(value["items"][0]["wins"], 2);
    assert_eq!(value["items"][2]["item"], "C");
}

#[test]
fn battle_uses_transitivity() {
    // A > B, then C > A on the second pair; C > B is never asked.
    let (ok, stdout, _) = run_battle(
        &["--item", "A", "--item", "B", "--item", "C", "--chooser", "minimum-degree", "--json"],
        "1\n2\n",
    );
    assert!(ok);

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["complete"], true);
    assert_eq!(value["decisions"], 2);
    assert_eq!(value["items"][0]["item"], "C");
}

#[test]
fn battle_quit_reports_partial_results() {
    let (ok, stdout, stderr) = run_battle(
        &["--item", "A", "--item", "B", "--item", "C", "--item", "D", "--seed", "1"],
        "oops\n1\nq\n",
    );
    assert!(ok);
    assert!(stderr.contains("Please answer 1, 2 or q."));
    assert!(stdout.contains("1 decisions"));
    assert!(stdout.contains("still undecided"));
}

#[test]
fn battle_rejects_duplicate_items() {
    let (ok, _, stderr) = run_battle(&["--item", "A", "--item", "A"], "");
    assert!(!ok);
    assert!(stderr.contains("listed more than once"));
}

#[test]
fn simulate_reports_every_chooser() {
    let output = Command::new(env!("CARGO_BIN_EXE_battlegraph"))
        .args(["simulate", "--item-count", "6", "--trials", "2", "--seed", "1", "--json", "--config", NO_CONFIG])
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports.len(), 8);
    assert_eq!(reports[0]["chooser"], "random");
    for report in &reports {
        assert_eq!(report["trials"], 2);
        assert!(report["min_decisions"].as_u64().unwrap() >= 5);
    }
}

#[test]
fn simulate_short_item_count_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_battlegraph"))
        .args(["simulate", "-n", "4", "--chooser", "bi-section", "--trials", "1", "--json", "--config", NO_CONFIG])
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["chooser"], "bi-section");
}

#[test]
fn simulate_items_flag_is_battle_only() {
    let output = Command::new(env!("CARGO_BIN_EXE_battlegraph"))
        .args(["simulate", "--items", "6", "--config", NO_CONFIG])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
