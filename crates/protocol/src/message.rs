//! Messages posted by the host into the Connect web content.

use serde::{Deserialize, Serialize};

use crate::constants::{SDK_PLATFORM, SDK_VERSION};

/// Message sent from the host to the embedded web content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
	/// Keepalive announcing the SDK until the content acknowledges it.
	#[serde(rename_all = "camelCase")]
	Ping {
		sdk_version: String,
		platform: String,
		redirect_url: String,
	},
	/// Popup browser state change.
	Window { closed: bool },
}

impl OutboundMessage {
	/// Ping carrying this SDK's version and platform.
	pub fn ping(redirect_url: impl Into<String>) -> Self {
		Self::Ping {
			sdk_version: SDK_VERSION.to_string(),
			platform: SDK_PLATFORM.to_string(),
			redirect_url: redirect_url.into(),
		}
	}

	/// Notice that the popup browser was closed.
	pub fn window_closed() -> Self {
		Self::Window { closed: true }
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn ping_serializes_with_camel_case_fields() {
		let value = serde_json::to_value(OutboundMessage::ping("https://example.com")).unwrap();
		assert_eq!(
			value,
			json!({
				"type": "ping",
				"sdkVersion": SDK_VERSION,
				"platform": SDK_PLATFORM,
				"redirectUrl": "https://example.com"
			})
		);
	}

	#[test]
	fn window_closed_notice_shape() {
		let json = serde_json::to_string(&OutboundMessage::window_closed()).unwrap();
		assert_eq!(json, r#"{"type":"window","closed":true}"#);
	}
}
