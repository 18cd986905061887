//! End-to-end tests of the `kiln` binary

use std::io::Write;
use std::process::{Command, Output};

fn run_kiln(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kiln"))
        .args(args)
        .env_remove("KILN_LOG")
        .env_remove("KILN_REPORT")
        .output()
        .unwrap_or_else(|e| panic!("failed to run kiln with args {:?}: {e}", args))
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_run_pairs() {
    let output = run_kiln(&["run", "pairs"]);
    assert_eq!(output.status.code(), Some(0), "stderr:\n{}", stderr(&output));
    assert_eq!(stdout(&output), "(1 2)\n2\n");
}

#[test]
fn test_run_sum() {
    let output = run_kiln(&["run", "sum"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "465\n");
}

#[test]
fn test_arity_error_exits_one() {
    let output = run_kiln(&["run", "arity-error"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "before\n");
    let err = stderr(&output);
    assert!(err.contains("error: "), "stderr:\n{}", err);
    assert!(err.contains("`first`"), "stderr:\n{}", err);
    assert!(err.contains("requires 2, got 1"), "stderr:\n{}", err);
}

#[test]
fn test_unknown_program() {
    let output = run_kiln(&["run", "nonesuch"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown program 'nonesuch'"));
}

#[test]
fn test_list_names_every_program() {
    let output = run_kiln(&["list"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for name in [
        "pairs",
        "fibo",
        "sum",
        "parity",
        "church",
        "counter",
        "arity-error",
    ] {
        assert!(text.contains(name), "missing {} in:\n{}", name, text);
    }
}

#[test]
fn test_human_report_on_stderr() {
    let output = run_kiln(&["run", "sum", "--report", "human"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "465\n");
    let err = stderr(&output);
    assert!(err.contains("=== KILN REPORT ==="), "stderr:\n{}", err);
    assert!(err.contains("Program:         sum"), "stderr:\n{}", err);
}

#[test]
fn test_report_env_var() {
    let output = Command::new(env!("CARGO_BIN_EXE_kiln"))
        .args(["run", "counter"])
        .env_remove("KILN_LOG")
        .env("KILN_REPORT", "human")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stderr(&output).contains("Instances built:"));
}

#[cfg(feature = "report-json")]
#[test]
fn test_json_report_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "report = \"json\"\nstack_size_kib = 512").unwrap();
    let path = file.path().to_str().unwrap();

    let output = run_kiln(&["run", "parity", "--config", path]);
    assert!(output.status.success(), "stderr:\n{}", stderr(&output));
    assert_eq!(stdout(&output), "#f\n");

    let err = stderr(&output);
    let line = err
        .lines()
        .find(|l| l.starts_with('{'))
        .unwrap_or_else(|| panic!("no json line in:\n{}", err));
    let report: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(report["program"], "parity");
    assert_eq!(report["exit_code"], 0);
    assert_eq!(report["tail_calls"], 100_001);
}

#[test]
fn test_bad_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "unknown_key = 1").unwrap();
    let output = run_kiln(&["run", "pairs", "--config", file.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid config"));
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_oversized_stack_rejected() {
    let kib = usize::MAX.to_string();
    let output = run_kiln(&["run", "sum", "--stack-size", &kib]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
    assert!(stderr(&output).contains("too large"), "stderr:\n{}", stderr(&output));
}
