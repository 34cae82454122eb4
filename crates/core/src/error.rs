//! Error types for the Connect SDK.
//!
//! Inbound traffic never surfaces errors to the application; these cover the
//! caller-facing setup calls and the consumed platform capabilities.

use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring a session or calling a capability.
#[derive(Debug, Error)]
pub enum Error {
	/// Session configuration was rejected.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	/// Operation is not allowed in the session's current state.
	#[error("Invalid session state: {0}")]
	InvalidState(String),

	/// Deep-link check could not determine whether a URL is handled externally.
	#[error("Link check failed for '{url}': {message}")]
	LinkCheck { url: String, message: String },

	/// Popup browser could not be opened or closed.
	#[error("Browser launch failed: {0}")]
	BrowserLaunch(String),

	/// I/O error from a platform capability.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if this error came from configuration validation.
	pub fn is_config(&self) -> bool {
		matches!(self, Error::InvalidConfig(_))
	}
}
