//! Popup browser backed by the desktop's URL opener.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use connect::{BrowserLauncher, DismissReason, Dismissal, Error, OpenOptions, Result};
use parking_lot::Mutex;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Commands that open a URL in the user's default browser, in preference order.
fn opener_candidates() -> &'static [&'static str] {
	if cfg!(target_os = "macos") {
		&["open"]
	} else {
		&["xdg-open", "wslview", "open"]
	}
}

/// Finds the first available URL opener on `PATH`.
pub fn find_opener() -> Option<PathBuf> {
	opener_candidates()
		.iter()
		.find_map(|candidate| which::which(candidate).ok())
}

/// Spawns `opener url` detached from the relay's stdio and reaps it in the background.
pub(crate) fn spawn_opener(opener: &Path, url: &str) -> std::io::Result<()> {
	let mut child = Command::new(opener)
		.arg(url)
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.spawn()?;

	let opener = opener.display().to_string();
	tokio::spawn(async move {
		match child.wait().await {
			Ok(status) if status.success() => {}
			Ok(status) => warn!(opener = %opener, %status, "URL opener exited with failure"),
			Err(e) => warn!(opener = %opener, error = %e, "failed to wait for URL opener"),
		}
	});
	Ok(())
}

/// Opens popups in the system browser.
///
/// An external browser window cannot be observed, so [`open`](BrowserLauncher::open)
/// stays pending until [`close`](BrowserLauncher::close) is called; the flow
/// closes popups itself with `closePopup` once the user is back.
pub struct SystemBrowser {
	opener: Option<PathBuf>,
	pending: Mutex<Option<oneshot::Sender<()>>>,
}

impl SystemBrowser {
	/// Uses the first opener found on `PATH`.
	pub fn detect() -> Self {
		Self::with_opener(find_opener())
	}

	pub fn with_opener(opener: Option<PathBuf>) -> Self {
		Self {
			opener,
			pending: Mutex::new(None),
		}
	}

	pub fn opener(&self) -> Option<&Path> {
		self.opener.as_deref()
	}
}

#[async_trait]
impl BrowserLauncher for SystemBrowser {
	async fn is_available(&self) -> bool {
		self.opener.is_some()
	}

	async fn open(&self, url: &str, options: &OpenOptions) -> Result<Dismissal> {
		let opener = self
			.opener
			.as_deref()
			.ok_or_else(|| Error::BrowserLaunch("no URL opener found on PATH".into()))?;

		spawn_opener(opener, url)
			.map_err(|e| Error::BrowserLaunch(format!("{}: {e}", opener.display())))?;

		let (tx, rx) = oneshot::channel();
		if self.pending.lock().replace(tx).is_some() {
			debug!("replacing a popup that was never closed");
		}
		info!(url, linking_uri = ?options.linking_uri, "opened popup in system browser");

		// A dropped sender means a newer popup replaced this one.
		let _ = rx.await;
		Ok(Dismissal::new(DismissReason::Dismiss))
	}

	async fn close(&self) -> Result<()> {
		match self.pending.lock().take() {
			Some(tx) => {
				let _ = tx.send(());
				info!("popup closed; the system browser tab stays with the user");
			}
			None => debug!("no popup to close"),
		}
		Ok(())
	}
}
