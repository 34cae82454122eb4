//! NDJSON rendering of handler calls.
//!
//! Each handler call becomes one line on stdout:
//!
//! ```text
//! {"event":"load"}
//! {"event":"done","data":{"code":200,"reason":"complete"}}
//! ```

use std::io::Write;

use connect::EventHandlers;
use serde_json::{Value, json};

/// One NDJSON line for a handler call. `data` is omitted for `load`.
pub fn event_line(event: &str, data: Option<&Value>) -> String {
	match data {
		Some(data) => json!({ "event": event, "data": data }).to_string(),
		None => json!({ "event": event }).to_string(),
	}
}

/// Handlers printing every call to stdout.
pub fn stdout_handlers() -> EventHandlers {
	EventHandlers::new()
		.on_cancel(|data| emit("cancel", Some(&data)))
		.on_done(|data| emit("done", Some(&data)))
		.on_error(|data| emit("error", Some(&data)))
		.on_load(|| emit("load", None))
		.on_route(|data| emit("route", Some(&data)))
		.on_user(|data| emit("user", Some(&data)))
}

fn emit(event: &str, data: Option<&Value>) {
	let mut stdout = std::io::stdout().lock();
	// stdout closed by the reader; nothing left to report to
	let _ = writeln!(stdout, "{}", event_line(event, data));
	let _ = stdout.flush();
}
