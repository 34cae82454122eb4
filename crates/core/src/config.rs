//! Session configuration.

use std::time::Duration;

use connect_protocol::PING_INTERVAL;
use serde::{Deserialize, Serialize};

use crate::capability::Platform;
use crate::error::{Error, Result};

fn default_ping_interval_ms() -> u64 {
	PING_INTERVAL.as_millis() as u64
}

/// Configuration for one Connect session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectConfig {
	/// URL of the Connect flow to load.
	pub connect_url: String,
	/// URL the content redirects to once finished; announced in every ping.
	#[serde(default)]
	pub redirect_url: String,
	/// App link the popup browser returns to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub linking_uri: Option<String>,
	#[serde(default)]
	pub platform: Platform,
	#[serde(default = "default_ping_interval_ms")]
	pub ping_interval_ms: u64,
}

impl ConnectConfig {
	pub fn new(connect_url: impl Into<String>) -> Self {
		Self {
			connect_url: connect_url.into(),
			redirect_url: String::new(),
			linking_uri: None,
			platform: Platform::default(),
			ping_interval_ms: default_ping_interval_ms(),
		}
	}

	/// Parses a JSON configuration document.
	pub fn from_json_str(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
		self.redirect_url = redirect_url.into();
		self
	}

	pub fn with_linking_uri(mut self, linking_uri: impl Into<String>) -> Self {
		self.linking_uri = Some(linking_uri.into());
		self
	}

	pub fn with_platform(mut self, platform: Platform) -> Self {
		self.platform = platform;
		self
	}

	pub fn with_ping_interval(mut self, interval: Duration) -> Self {
		self.ping_interval_ms = interval.as_millis() as u64;
		self
	}

	pub fn ping_interval(&self) -> Duration {
		Duration::from_millis(self.ping_interval_ms)
	}

	/// Checks that the configuration can start a session.
	pub fn validate(&self) -> Result<()> {
		if self.connect_url.trim().is_empty() {
			return Err(Error::InvalidConfig("connect URL is required".into()));
		}
		::url::Url::parse(&self.connect_url).map_err(|e| {
			Error::InvalidConfig(format!("connect URL '{}' is invalid: {e}", self.connect_url))
		})?;
		if self.ping_interval_ms == 0 {
			return Err(Error::InvalidConfig("ping interval must be positive".into()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn json_defaults() {
		let config =
			ConnectConfig::from_json_str(r#"{"connectUrl": "https://connect.example.com/go"}"#).unwrap();
		assert_eq!(config.redirect_url, "");
		assert_eq!(config.linking_uri, None);
		assert_eq!(config.platform, Platform::Android);
		assert_eq!(config.ping_interval(), PING_INTERVAL);
	}

	#[test]
	fn json_overrides() {
		let config = ConnectConfig::from_json_str(
			r#"{
				"connectUrl": "https://connect.example.com/go",
				"redirectUrl": "https://app.example.com/done",
				"linkingUri": "myapp://connect",
				"platform": "ios",
				"pingIntervalMs": 250
			}"#,
		)
		.unwrap();
		assert_eq!(config.redirect_url, "https://app.example.com/done");
		assert_eq!(config.linking_uri.as_deref(), Some("myapp://connect"));
		assert_eq!(config.platform, Platform::Ios);
		assert_eq!(config.ping_interval(), Duration::from_millis(250));
	}

	#[test]
	fn missing_connect_url_is_rejected() {
		assert!(ConnectConfig::from_json_str("{}").is_err());
		assert!(ConnectConfig::new("").validate().unwrap_err().is_config());
		assert!(ConnectConfig::new("not a url").validate().unwrap_err().is_config());
	}

	#[test]
	fn zero_ping_interval_is_rejected() {
		let config = ConnectConfig::new("https://connect.example.com").with_ping_interval(Duration::ZERO);
		assert!(config.validate().unwrap_err().is_config());
	}
}
