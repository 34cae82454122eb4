//! Events posted by the Connect web content to the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event posted by the embedded web content.
///
/// Internal events (`url`, `closePopup`, `ack`) drive the host's own
/// lifecycle; the rest are forwarded to the application's handlers.
/// Unrecognized `type` tags deserialize to [`Unknown`](Self::Unknown).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundEvent {
	/// The web content wants a URL opened outside the surface.
	Url {
		#[serde(default)]
		url: Option<String>,
	},
	/// The web content wants the popup browser closed.
	ClosePopup,
	/// Acknowledges the host's keepalive ping.
	Ack,
	/// The user left the flow.
	Cancel {
		#[serde(default)]
		data: Value,
	},
	/// The flow finished.
	Done {
		#[serde(default)]
		data: Value,
	},
	/// The flow failed.
	Error {
		#[serde(default)]
		data: Value,
	},
	/// The flow moved to another screen.
	Route {
		#[serde(default)]
		data: Value,
	},
	/// User-level analytics event.
	User {
		#[serde(default)]
		data: Value,
	},
	#[serde(other)]
	Unknown,
}

impl InboundEvent {
	/// Returns the wire tag of this event.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Url { .. } => "url",
			Self::ClosePopup => "closePopup",
			Self::Ack => "ack",
			Self::Cancel { .. } => "cancel",
			Self::Done { .. } => "done",
			Self::Error { .. } => "error",
			Self::Route { .. } => "route",
			Self::User { .. } => "user",
			Self::Unknown => "unknown",
		}
	}
}

/// Raw message as delivered by a surface: JSON text or an already-parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
	Text(String),
	Structured(Value),
}

impl InboundMessage {
	/// Parses this message into an event.
	///
	/// Text is decoded as JSON; a structured string value is treated as text.
	/// Returns `None` for anything that is not a well-formed event.
	pub fn parse(&self) -> Option<InboundEvent> {
		match self {
			Self::Text(text) => serde_json::from_str(text).ok(),
			Self::Structured(Value::String(text)) => serde_json::from_str(text).ok(),
			Self::Structured(value) => InboundEvent::deserialize(value).ok(),
		}
	}
}

impl From<&str> for InboundMessage {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for InboundMessage {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<Value> for InboundMessage {
	fn from(value: Value) -> Self {
		Self::Structured(value)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn parses_url_event_from_text() {
		let msg = InboundMessage::from(r#"{"type":"url","url":"https://example.com"}"#);
		assert_eq!(
			msg.parse(),
			Some(InboundEvent::Url {
				url: Some("https://example.com".into())
			})
		);
	}

	#[test]
	fn null_url_parses_as_none() {
		let msg = InboundMessage::from(json!({"type": "url", "url": null}));
		assert_eq!(msg.parse(), Some(InboundEvent::Url { url: None }));
	}

	#[test]
	fn close_popup_uses_camel_case_tag() {
		let msg = InboundMessage::from(r#"{"type":"closePopup"}"#);
		assert_eq!(msg.parse(), Some(InboundEvent::ClosePopup));
	}

	#[test]
	fn structured_cancel_keeps_payload() {
		let msg = InboundMessage::from(json!({
			"type": "cancel",
			"data": {"code": 100, "reason": "exit"}
		}));
		assert_eq!(
			msg.parse(),
			Some(InboundEvent::Cancel {
				data: json!({"code": 100, "reason": "exit"})
			})
		);
	}

	#[test]
	fn structured_string_is_decoded_as_text() {
		let msg = InboundMessage::Structured(Value::String(r#"{"type":"ack"}"#.into()));
		assert_eq!(msg.parse(), Some(InboundEvent::Ack));
	}

	#[test]
	fn missing_data_defaults_to_null() {
		let msg = InboundMessage::from(r#"{"type":"done"}"#);
		assert_eq!(msg.parse(), Some(InboundEvent::Done { data: Value::Null }));
	}

	#[test]
	fn unknown_type_is_unknown_event() {
		let msg = InboundMessage::from(r#"{"type":"success","data":{}}"#);
		assert_eq!(msg.parse(), Some(InboundEvent::Unknown));
	}

	#[test]
	fn malformed_messages_parse_to_none() {
		for raw in ["{0}", "", "not json", "[]", "42", r#"{"url":"x"}"#] {
			assert_eq!(InboundMessage::from(raw).parse(), None, "input: {raw:?}");
		}
		assert_eq!(InboundMessage::from(json!(null)).parse(), None);
	}

	#[test]
	fn kind_matches_wire_tag() {
		assert_eq!(InboundEvent::ClosePopup.kind(), "closePopup");
		assert_eq!(InboundEvent::Route { data: Value::Null }.kind(), "route");
	}
}
