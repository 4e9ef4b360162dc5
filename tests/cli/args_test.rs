//! Argument handling of the `sqlws` binary. No service is contacted.

use std::process::Command;

fn run_sqlws(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_sqlws"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute sqlws");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

#[test]
fn test_help_lists_subcommands() {
    let (code, stdout, _) = run_sqlws(&["--help"]);

    assert_eq!(code, 0);
    for sub in ["run", "databases", "tables", "columns", "drop-database"] {
        assert!(stdout.contains(sub), "help should mention '{sub}'");
    }
}

#[test]
fn test_missing_subcommand_fails() {
    let (code, _, stderr) = run_sqlws(&[]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Usage"));
}

#[test]
fn test_invalid_url_is_config_error() {
    let (code, _, stderr) = run_sqlws(&[
        "--config",
        "/nonexistent/sqlws/config.toml",
        "--url",
        "ftp://nowhere",
        "databases",
    ]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Configuration Error"), "stderr: {stderr}");
}
