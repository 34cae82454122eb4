#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use connect::Platform;

/// Root CLI for the Connect desktop harness.
#[derive(Parser, Debug)]
#[command(name = "connect")]
#[command(about = "Host and exercise the Connect web flow from the desktop")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Host a Connect session behind a WebSocket surface endpoint.
	///
	/// A client connecting to `ws://HOST:PORT/surface` becomes the web surface:
	/// its text frames are routed as inbound messages and it receives pings
	/// and notices as text frames. Handler calls are printed to stdout as
	/// NDJSON. The relay exits once the flow closes.
	Relay(RelayArgs),
	/// Validate a URL the way the SDK does and print the result.
	CheckUrl(CheckUrlArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RelayArgs {
	/// URL of the Connect flow to host.
	#[arg(long, value_name = "URL")]
	pub connect_url: Option<String>,

	/// Redirect URL announced to the content in every ping.
	#[arg(long, value_name = "URL")]
	pub redirect_url: Option<String>,

	/// App link the popup browser returns to.
	#[arg(long, value_name = "URI")]
	pub linking_uri: Option<String>,

	/// Host platform to emulate (android or ios).
	#[arg(long, value_name = "PLATFORM")]
	pub platform: Option<Platform>,

	/// Milliseconds between pings until the content acknowledges.
	#[arg(long, value_name = "MS")]
	pub ping_interval_ms: Option<u64>,

	/// JSON configuration file; flags override its values.
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[arg(long, default_value = "127.0.0.1")]
	pub host: String,

	#[arg(long, default_value_t = 19989)]
	pub port: u16,
}

#[derive(Args, Debug, Clone)]
pub struct CheckUrlArgs {
	#[arg(value_name = "URL")]
	pub url: String,
}
