use std::net::SocketAddr;

use anyhow::{Context, Result};
use connect::validate_url;

use crate::cli::{CheckUrlArgs, Cli, Commands, RelayArgs};
use crate::config;
use crate::output::stdout_handlers;
use crate::relay::{Relay, RelayCapabilities};

pub async fn dispatch(cli: Cli) -> Result<()> {
	match cli.command {
		Commands::Relay(args) => relay(args).await,
		Commands::CheckUrl(args) => {
			println!("{}", check_url(&args));
			Ok(())
		}
	}
}

async fn relay(args: RelayArgs) -> Result<()> {
	let config = config::resolve(&args)?;
	let addr: SocketAddr = format!("{}:{}", args.host, args.port)
		.parse()
		.with_context(|| format!("Invalid host/port combination: {}:{}", args.host, args.port))?;

	let relay = Relay::bind(config, addr, RelayCapabilities::system(stdout_handlers())).await?;
	relay.serve().await
}

/// Validated form of the URL; invalid input yields the default redirect URL.
pub fn check_url(args: &CheckUrlArgs) -> String {
	validate_url(&args.url)
}
