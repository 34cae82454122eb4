//! Deep-link checks against the freedesktop scheme handler registry.

use std::path::PathBuf;

use async_trait::async_trait;
use connect::{Error, LinkChecker, Result};
use tokio::process::Command;
use tracing::debug;

use crate::browser::{find_opener, spawn_opener};

/// Hands URLs to an installed application when one is registered for the scheme.
///
/// `xdg-mime query default x-scheme-handler/<scheme>` names the registered
/// desktop entry; when there is one, the URL is passed to the URL opener and
/// the check reports that an app took it. Web URLs always stay in the popup
/// browser.
pub struct XdgLinkChecker {
	xdg_mime: Option<PathBuf>,
	opener: Option<PathBuf>,
}

impl XdgLinkChecker {
	pub fn detect() -> Self {
		Self {
			xdg_mime: which::which("xdg-mime").ok(),
			opener: find_opener(),
		}
	}

	pub fn with_tools(xdg_mime: Option<PathBuf>, opener: Option<PathBuf>) -> Self {
		Self { xdg_mime, opener }
	}

	async fn registered_handler(&self, url: &str, scheme: &str) -> Result<Option<String>> {
		let xdg_mime = self.xdg_mime.as_ref().ok_or_else(|| link_error(url, "xdg-mime not found on PATH"))?;

		let output = Command::new(xdg_mime)
			.args(["query", "default", &format!("x-scheme-handler/{scheme}")])
			.output()
			.await
			.map_err(|e| link_error(url, &format!("failed to run xdg-mime: {e}")))?;

		if !output.status.success() {
			return Ok(None);
		}
		let handler = String::from_utf8_lossy(&output.stdout).trim().to_string();
		Ok((!handler.is_empty()).then_some(handler))
	}
}

/// Lower-cased scheme of `url`, or a link-check error if it has none.
pub fn scheme_of(url: &str) -> Result<String> {
	::url::Url::parse(url)
		.map(|parsed| parsed.scheme().to_ascii_lowercase())
		.map_err(|e| link_error(url, &format!("unparseable URL: {e}")))
}

fn link_error(url: &str, message: &str) -> Error {
	Error::LinkCheck {
		url: url.to_string(),
		message: message.to_string(),
	}
}

#[async_trait]
impl LinkChecker for XdgLinkChecker {
	async fn can_open(&self, url: &str) -> Result<bool> {
		let scheme = scheme_of(url)?;
		if scheme == "http" || scheme == "https" {
			return Ok(false);
		}

		let Some(handler) = self.registered_handler(url, &scheme).await? else {
			debug!(url, scheme = %scheme, "no application registered for scheme");
			return Ok(false);
		};

		let opener = self.opener.as_deref().ok_or_else(|| link_error(url, "no URL opener found on PATH"))?;
		spawn_opener(opener, url).map_err(|e| link_error(url, &format!("failed to hand off URL: {e}")))?;
		debug!(url, handler = %handler, "handed URL to registered application");
		Ok(true)
	}
}
