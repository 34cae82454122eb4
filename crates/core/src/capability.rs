//! Native capabilities consumed by a session.
//!
//! The SDK does not render anything itself. The host application provides:
//!
//! - [`Overlay`] - shows and hides the modal hosting the web surface
//! - [`Surface`] - the mounted web view, receiving outbound messages
//! - [`BrowserLauncher`] - opens popup URLs in an in-app or system browser
//! - [`LinkChecker`] - asks the OS whether an installed app handles a URL

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mounted web surface showing the Connect content.
pub trait Surface: Send + Sync {
	/// Delivers a serialized message to the web content.
	fn post_message(&self, message: &str);
}

/// Modal container hosting the surface.
pub trait Overlay: Send + Sync {
	/// Shows the overlay and starts loading the request's URL.
	fn present(&self, request: &PresentRequest);

	/// Hides the overlay.
	fn dismiss(&self);
}

/// Opens popup URLs outside the surface.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
	/// Prepares the browser before opening. Returns false if it is unavailable.
	async fn is_available(&self) -> bool {
		true
	}

	/// Opens `url` and resolves once the browser is dismissed.
	async fn open(&self, url: &str, options: &OpenOptions) -> Result<Dismissal>;

	/// Closes the browser if it is still showing.
	async fn close(&self) -> Result<()>;
}

/// Asks the OS whether an installed application handles a URL.
#[async_trait]
pub trait LinkChecker: Send + Sync {
	/// Returns true if the OS opened `url` in another application.
	async fn can_open(&self, url: &str) -> Result<bool>;
}

/// Host platform; decides presentation and popup behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
	Ios,
	#[default]
	Android,
}

impl Platform {
	/// Whether popup URLs are first offered to installed apps.
	pub fn checks_deep_links(self) -> bool {
		matches!(self, Platform::Ios)
	}

	pub fn presentation_style(self) -> PresentationStyle {
		match self {
			Platform::Ios => PresentationStyle::PageSheet,
			Platform::Android => PresentationStyle::FullScreen,
		}
	}

	/// Browser options for popups opened on this platform.
	pub fn open_options(self, linking_uri: Option<&str>) -> OpenOptions {
		let mut options = match self {
			// iOS browsers misbehave when handed Android-only options
			Platform::Ios => OpenOptions::default(),
			Platform::Android => OpenOptions {
				force_close_on_redirection: Some(false),
				show_in_recents: Some(true),
				linking_uri: None,
			},
		};
		options.linking_uri = linking_uri.map(str::to_string);
		options
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Platform::Ios => "ios",
			Platform::Android => "android",
		}
	}
}

impl fmt::Display for Platform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Platform {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		match s.to_ascii_lowercase().as_str() {
			"ios" => Ok(Platform::Ios),
			"android" => Ok(Platform::Android),
			other => Err(Error::InvalidConfig(format!(
				"unknown platform '{other}' (expected ios or android)"
			))),
		}
	}
}

/// How the overlay is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresentationStyle {
	PageSheet,
	FullScreen,
}

/// Everything an [`Overlay`] needs to show the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentRequest {
	pub url: String,
	pub style: PresentationStyle,
	/// Script to inject before the content loads.
	pub bootstrap_script: &'static str,
}

/// Options passed to [`BrowserLauncher::open`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOptions {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub force_close_on_redirection: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub show_in_recents: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub linking_uri: Option<String>,
}

/// Why a popup browser went away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DismissReason {
	/// The user closed the browser.
	Cancel,
	/// The browser was dismissed programmatically.
	Dismiss,
	/// The browser followed a redirect back to the app.
	Success,
	#[serde(other)]
	Unknown,
}

/// Result of [`BrowserLauncher::open`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dismissal {
	#[serde(rename = "type")]
	pub reason: DismissReason,
}

impl Dismissal {
	pub fn new(reason: DismissReason) -> Self {
		Self { reason }
	}

	/// Whether the browser is already gone and must not be closed again.
	pub fn closed_by_user(&self) -> bool {
		self.reason == DismissReason::Cancel
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn platform_presentation_styles() {
		assert_eq!(Platform::Ios.presentation_style(), PresentationStyle::PageSheet);
		assert_eq!(Platform::Android.presentation_style(), PresentationStyle::FullScreen);
	}

	#[test]
	fn only_ios_checks_deep_links() {
		assert!(Platform::Ios.checks_deep_links());
		assert!(!Platform::Android.checks_deep_links());
	}

	#[test]
	fn android_open_options_serialize_to_browser_flags() {
		let options = Platform::Android.open_options(None);
		assert_eq!(
			serde_json::to_value(&options).unwrap(),
			json!({"forceCloseOnRedirection": false, "showInRecents": true})
		);
	}

	#[test]
	fn ios_open_options_are_empty() {
		let options = Platform::Ios.open_options(None);
		assert_eq!(options, OpenOptions::default());
		assert_eq!(serde_json::to_value(&options).unwrap(), json!({}));
	}

	#[test]
	fn linking_uri_is_forwarded() {
		let options = Platform::Ios.open_options(Some("myapp://connect"));
		assert_eq!(options.linking_uri.as_deref(), Some("myapp://connect"));
	}

	#[test]
	fn platform_parses_case_insensitively() {
		assert_eq!("iOS".parse::<Platform>().unwrap(), Platform::Ios);
		assert_eq!("android".parse::<Platform>().unwrap(), Platform::Android);
		assert!("web".parse::<Platform>().unwrap_err().is_config());
	}

	#[test]
	fn dismissal_reads_browser_result() {
		let cancel: Dismissal = serde_json::from_value(json!({"type": "cancel"})).unwrap();
		assert!(cancel.closed_by_user());

		let other: Dismissal = serde_json::from_value(json!({"type": "locked"})).unwrap();
		assert_eq!(other.reason, DismissReason::Unknown);
		assert!(!other.closed_by_user());
	}
}
