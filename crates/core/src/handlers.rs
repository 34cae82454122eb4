//! Application callbacks for Connect events.
//!
//! [`EventHandlers`] is always fully populated: every slot starts as a no-op
//! and the builder methods overlay the application's callbacks on top, so
//! dispatch never has to check for a missing handler.

use std::sync::Arc;

use serde_json::Value;

/// Callback receiving an event's `data` payload.
pub type HandlerFn = Arc<dyn Fn(Value) + Send + Sync>;

/// Callback without a payload.
pub type NotifyFn = Arc<dyn Fn() + Send + Sync>;

/// Handler set for one session.
#[derive(Clone)]
pub struct EventHandlers {
	cancel: HandlerFn,
	done: HandlerFn,
	error: HandlerFn,
	load: NotifyFn,
	route: HandlerFn,
	user: HandlerFn,
}

fn noop() -> HandlerFn {
	Arc::new(|_: Value| {})
}

impl Default for EventHandlers {
	fn default() -> Self {
		Self {
			cancel: noop(),
			done: noop(),
			error: noop(),
			load: Arc::new(|| {}),
			route: noop(),
			user: noop(),
		}
	}
}

impl EventHandlers {
	/// Handler set where every callback is a no-op.
	pub fn new() -> Self {
		Self::default()
	}

	/// Called when the user leaves the flow, or the host closes it.
	pub fn on_cancel<F>(mut self, handler: F) -> Self
	where
		F: Fn(Value) + Send + Sync + 'static,
	{
		self.cancel = Arc::new(handler);
		self
	}

	/// Called when the flow finishes.
	pub fn on_done<F>(mut self, handler: F) -> Self
	where
		F: Fn(Value) + Send + Sync + 'static,
	{
		self.done = Arc::new(handler);
		self
	}

	/// Called when the flow fails.
	pub fn on_error<F>(mut self, handler: F) -> Self
	where
		F: Fn(Value) + Send + Sync + 'static,
	{
		self.error = Arc::new(handler);
		self
	}

	/// Called once the content acknowledges the SDK.
	pub fn on_load<F>(mut self, handler: F) -> Self
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.load = Arc::new(handler);
		self
	}

	/// Called when the flow moves to another screen.
	pub fn on_route<F>(mut self, handler: F) -> Self
	where
		F: Fn(Value) + Send + Sync + 'static,
	{
		self.route = Arc::new(handler);
		self
	}

	/// Called for user-level analytics events.
	pub fn on_user<F>(mut self, handler: F) -> Self
	where
		F: Fn(Value) + Send + Sync + 'static,
	{
		self.user = Arc::new(handler);
		self
	}

	pub(crate) fn cancel(&self, data: Value) {
		(self.cancel)(data)
	}

	pub(crate) fn done(&self, data: Value) {
		(self.done)(data)
	}

	pub(crate) fn error(&self, data: Value) {
		(self.error)(data)
	}

	pub(crate) fn load(&self) {
		(self.load)()
	}

	pub(crate) fn route(&self, data: Value) {
		(self.route)(data)
	}

	pub(crate) fn user(&self, data: Value) {
		(self.user)(data)
	}
}

impl std::fmt::Debug for EventHandlers {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventHandlers").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use serde_json::json;

	use super::*;

	#[test]
	fn defaults_are_noops() {
		let handlers = EventHandlers::new();
		handlers.cancel(json!({"code": 100}));
		handlers.done(Value::Null);
		handlers.error(Value::Null);
		handlers.load();
		handlers.route(Value::Null);
		handlers.user(Value::Null);
	}

	#[test]
	fn overlay_replaces_only_given_slot() {
		let calls = Arc::new(AtomicUsize::new(0));
		let calls_clone = Arc::clone(&calls);

		let handlers = EventHandlers::new().on_done(move |data| {
			assert_eq!(data["code"], 200);
			calls_clone.fetch_add(1, Ordering::SeqCst);
		});

		handlers.cancel(Value::Null);
		handlers.done(json!({"code": 200}));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn clones_share_callbacks() {
		let calls = Arc::new(AtomicUsize::new(0));
		let calls_clone = Arc::clone(&calls);

		let handlers = EventHandlers::new().on_load(move || {
			calls_clone.fetch_add(1, Ordering::SeqCst);
		});
		let copy = handlers.clone();

		handlers.load();
		copy.load();
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}
}
