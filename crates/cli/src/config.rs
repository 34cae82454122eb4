//! Relay configuration: an optional JSON file overlaid with command-line flags.

use std::path::Path;

use anyhow::{Context, Result, bail};
use connect::ConnectConfig;
use serde_json::{Map, Value};

use crate::cli::RelayArgs;

/// Builds the session configuration for `connect relay`.
///
/// Values from `--config` are read first; every flag that was given replaces
/// the corresponding key. The merged document is validated as a whole.
pub fn resolve(args: &RelayArgs) -> Result<ConnectConfig> {
	let mut doc = match &args.config {
		Some(path) => read_file(path)?,
		None => Map::new(),
	};

	let flags = [
		("connectUrl", args.connect_url.clone().map(Value::from)),
		("redirectUrl", args.redirect_url.clone().map(Value::from)),
		("linkingUri", args.linking_uri.clone().map(Value::from)),
		("platform", args.platform.map(|p| Value::from(p.as_str()))),
		("pingIntervalMs", args.ping_interval_ms.map(Value::from)),
	];
	for (key, value) in flags {
		if let Some(value) = value {
			doc.insert(key.to_string(), value);
		}
	}

	if !doc.contains_key("connectUrl") {
		bail!("a connect URL is required (--connect-url or \"connectUrl\" in --config)");
	}

	let config: ConnectConfig =
		serde_json::from_value(Value::Object(doc)).context("Invalid relay configuration")?;
	config.validate().context("Invalid relay configuration")?;
	Ok(config)
}

fn read_file(path: &Path) -> Result<Map<String, Value>> {
	let raw = std::fs::read_to_string(path)
		.with_context(|| format!("Failed to read config file {}", path.display()))?;
	let value: Value = serde_json::from_str(&raw)
		.with_context(|| format!("Failed to parse config file {}", path.display()))?;
	match value {
		Value::Object(map) => Ok(map),
		_ => bail!("config file {} must contain a JSON object", path.display()),
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use clap::Parser;
	use connect::Platform;

	use super::*;
	use crate::cli::{Cli, Commands};

	fn relay_args(argv: &[&str]) -> RelayArgs {
		let mut full = vec!["connect", "relay"];
		full.extend_from_slice(argv);
		match Cli::try_parse_from(full).unwrap().command {
			Commands::Relay(args) => args,
			_ => panic!("Expected Relay command"),
		}
	}

	fn config_file(contents: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file
	}

	#[test]
	fn flags_only() {
		let config = resolve(&relay_args(&[
			"--connect-url",
			"https://connect.example.com/go",
			"--platform",
			"ios",
		]))
		.unwrap();
		assert_eq!(config.connect_url, "https://connect.example.com/go");
		assert_eq!(config.platform, Platform::Ios);
		assert_eq!(config.ping_interval_ms, 1000);
	}

	#[test]
	fn flags_override_file() {
		let file = config_file(
			r#"{
				"connectUrl": "https://connect.example.com/from-file",
				"redirectUrl": "https://app.example.com/done",
				"pingIntervalMs": 500
			}"#,
		);
		let path = file.path().to_str().unwrap();
		let config = resolve(&relay_args(&["--config", path, "--ping-interval-ms", "50"])).unwrap();

		assert_eq!(config.connect_url, "https://connect.example.com/from-file");
		assert_eq!(config.redirect_url, "https://app.example.com/done");
		assert_eq!(config.ping_interval_ms, 50);
	}

	#[test]
	fn missing_connect_url_is_an_error() {
		let err = resolve(&relay_args(&[])).unwrap_err();
		assert!(err.to_string().contains("connect URL is required"));
	}

	#[test]
	fn invalid_values_are_rejected() {
		assert!(resolve(&relay_args(&["--connect-url", "not a url"])).is_err());
		assert!(
			resolve(&relay_args(&[
				"--connect-url",
				"https://connect.example.com",
				"--ping-interval-ms",
				"0"
			]))
			.is_err()
		);
	}

	#[test]
	fn non_object_file_is_rejected() {
		let file = config_file("[1, 2, 3]");
		let path = file.path().to_str().unwrap();
		let err = resolve(&relay_args(&["--config", path])).unwrap_err();
		assert!(err.to_string().contains("must contain a JSON object"));
	}

	#[test]
	fn unreadable_file_names_the_path() {
		let err = resolve(&relay_args(&["--config", "/nonexistent/connect.json"])).unwrap_err();
		assert!(err.to_string().contains("/nonexistent/connect.json"));
	}
}
