//! Tests running the `connect` binary.

use std::process::Command;

fn run_connect(args: &[&str]) -> (bool, String, String) {
	let output = Command::new(env!("CARGO_BIN_EXE_connect"))
		.args(args)
		.output()
		.expect("failed to execute connect");
	let stdout = String::from_utf8_lossy(&output.stdout).to_string();
	let stderr = String::from_utf8_lossy(&output.stderr).to_string();
	(output.status.success(), stdout, stderr)
}

#[test]
fn check_url_prints_valid_url() {
	let (success, stdout, stderr) = run_connect(&["check-url", "https://mastercard.com/path"]);
	assert!(success, "command failed: {stderr}");
	assert_eq!(stdout.trim(), "https://mastercard.com/path");
}

#[test]
fn check_url_prints_default_for_invalid_url() {
	let (success, stdout, stderr) = run_connect(&["check-url", "ftp://x"]);
	assert!(success, "command failed: {stderr}");
	assert_eq!(stdout.trim(), "https://b2b.mastercard.com/open-banking-solutions/");
}

#[test]
fn relay_without_connect_url_fails() {
	let (success, stdout, stderr) = run_connect(&["relay", "--port", "0"]);
	assert!(!success);
	assert!(stdout.is_empty());
	assert!(stderr.contains("connect URL is required"), "stderr: {stderr}");
}
