//! Well-known payload shapes carried in an event's `data` field.
//!
//! Event payloads are opaque to the host and handed to application handlers
//! as raw JSON. These types are conveniences for handlers that want to read
//! the documented fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{EXIT_CODE, EXIT_REASON};

/// Payload of `cancel`, `done` and `error` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitData {
	pub code: i64,
	pub reason: String,
}

impl ExitData {
	/// Sentinel reported when the host closes the flow itself.
	pub fn exit() -> Self {
		Self {
			code: EXIT_CODE,
			reason: EXIT_REASON.to_string(),
		}
	}

	/// Reads an exit payload from raw event data.
	pub fn from_data(data: &Value) -> Option<Self> {
		Self::deserialize(data).ok()
	}

	pub fn to_value(&self) -> Value {
		serde_json::json!({ "code": self.code, "reason": self.reason })
	}
}

/// Payload of `route` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteData {
	pub screen: String,
	#[serde(default)]
	pub params: Map<String, Value>,
}

impl RouteData {
	/// Reads a route payload from raw event data.
	pub fn from_data(data: &Value) -> Option<Self> {
		Self::deserialize(data).ok()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn exit_sentinel_value() {
		assert_eq!(ExitData::exit().to_value(), json!({"code": 100, "reason": "exit"}));
	}

	#[test]
	fn exit_data_from_event_payload() {
		let data = json!({"code": 200, "reason": "complete", "extra": true});
		let exit = ExitData::from_data(&data).unwrap();
		assert_eq!(exit.code, 200);
		assert_eq!(exit.reason, "complete");
		assert!(ExitData::from_data(&json!("nope")).is_none());
	}

	#[test]
	fn route_data_defaults_params() {
		let route = RouteData::from_data(&json!({"screen": "Search"})).unwrap();
		assert_eq!(route.screen, "Search");
		assert!(route.params.is_empty());
	}
}
