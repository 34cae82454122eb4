use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_relay_defaults() {
	let args = vec!["connect", "relay", "--connect-url", "https://connect.example.com/go"];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Relay(args) => {
			assert_eq!(args.connect_url.as_deref(), Some("https://connect.example.com/go"));
			assert_eq!(args.redirect_url, None);
			assert_eq!(args.platform, None);
			assert_eq!(args.ping_interval_ms, None);
			assert_eq!(args.host, "127.0.0.1");
			assert_eq!(args.port, 19989);
		}
		_ => panic!("Expected Relay command"),
	}
}

#[test]
fn parse_relay_all_flags() {
	let args = vec![
		"connect",
		"relay",
		"--connect-url",
		"https://connect.example.com/go",
		"--redirect-url",
		"https://app.example.com/done",
		"--linking-uri",
		"myapp://connect",
		"--platform",
		"IOS",
		"--ping-interval-ms",
		"250",
		"--config",
		"/tmp/connect.json",
		"--host",
		"0.0.0.0",
		"--port",
		"4000",
	];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Relay(args) => {
			assert_eq!(args.redirect_url.as_deref(), Some("https://app.example.com/done"));
			assert_eq!(args.linking_uri.as_deref(), Some("myapp://connect"));
			assert_eq!(args.platform, Some(Platform::Ios));
			assert_eq!(args.ping_interval_ms, Some(250));
			assert_eq!(args.config, Some(PathBuf::from("/tmp/connect.json")));
			assert_eq!(args.host, "0.0.0.0");
			assert_eq!(args.port, 4000);
		}
		_ => panic!("Expected Relay command"),
	}
}

#[test]
fn parse_relay_rejects_unknown_platform() {
	let args = vec!["connect", "relay", "--platform", "windows"];
	assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn parse_check_url_command() {
	let args = vec!["connect", "check-url", "myapp://open"];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::CheckUrl(args) => assert_eq!(args.url, "myapp://open"),
		_ => panic!("Expected CheckUrl command"),
	}
}

#[test]
fn verbose_is_global_and_counted() {
	let args = vec!["connect", "check-url", "myapp://open", "-vv"];
	let cli = Cli::try_parse_from(args).unwrap();
	assert_eq!(cli.verbose, 2);
}

#[test]
fn check_url_requires_argument() {
	assert!(Cli::try_parse_from(vec!["connect", "check-url"]).is_err());
}
