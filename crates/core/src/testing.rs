//! Recording fakes for the native capabilities.
//!
//! These let applications (and this crate's own tests) drive a
//! [`ConnectSession`](crate::ConnectSession) without a web view or browser.
//! Every fake records what it was asked to do for later assertions.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

use crate::capability::{
	BrowserLauncher, DismissReason, Dismissal, LinkChecker, OpenOptions, Overlay, PresentRequest, Surface,
};
use crate::error::{Error, Result};
use crate::handlers::EventHandlers;

/// Surface that records every message posted to it.
#[derive(Default)]
pub struct RecordingSurface {
	messages: Mutex<Vec<String>>,
}

impl RecordingSurface {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Raw messages in posting order.
	pub fn messages(&self) -> Vec<String> {
		self.messages.lock().clone()
	}

	/// Messages decoded as JSON; undecodable ones become `Value::Null`.
	pub fn json_messages(&self) -> Vec<Value> {
		self.messages
			.lock()
			.iter()
			.map(|m| serde_json::from_str(m).unwrap_or(Value::Null))
			.collect()
	}

	/// Number of messages whose `type` field equals `kind`.
	pub fn count_of(&self, kind: &str) -> usize {
		self.json_messages().iter().filter(|m| m["type"] == kind).count()
	}
}

impl Surface for RecordingSurface {
	fn post_message(&self, message: &str) {
		self.messages.lock().push(message.to_string());
	}
}

/// Overlay that records presentations and dismissals.
#[derive(Default)]
pub struct RecordingOverlay {
	presented: Mutex<Vec<PresentRequest>>,
	dismissed: AtomicUsize,
}

impl RecordingOverlay {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn presented(&self) -> Vec<PresentRequest> {
		self.presented.lock().clone()
	}

	pub fn dismiss_count(&self) -> usize {
		self.dismissed.load(Ordering::SeqCst)
	}
}

impl Overlay for RecordingOverlay {
	fn present(&self, request: &PresentRequest) {
		self.presented.lock().push(request.clone());
	}

	fn dismiss(&self) {
		self.dismissed.fetch_add(1, Ordering::SeqCst);
	}
}

/// Browser whose `open` stays pending until [`finish`](Self::finish) is called.
#[derive(Default)]
pub struct FakeBrowser {
	opened: Mutex<Vec<(String, OpenOptions)>>,
	closed: AtomicUsize,
	outcome: Mutex<Option<Result<Dismissal>>>,
	finished: Notify,
}

impl FakeBrowser {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Resolves the pending `open` with the given reason.
	pub fn finish(&self, reason: DismissReason) {
		*self.outcome.lock() = Some(Ok(Dismissal::new(reason)));
		self.finished.notify_one();
	}

	/// Resolves the pending `open` with an error.
	pub fn fail(&self, message: &str) {
		*self.outcome.lock() = Some(Err(Error::BrowserLaunch(message.to_string())));
		self.finished.notify_one();
	}

	/// URLs and options passed to `open`, in call order.
	pub fn opened(&self) -> Vec<(String, OpenOptions)> {
		self.opened.lock().clone()
	}

	pub fn open_count(&self) -> usize {
		self.opened.lock().len()
	}

	pub fn close_count(&self) -> usize {
		self.closed.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl BrowserLauncher for FakeBrowser {
	async fn open(&self, url: &str, options: &OpenOptions) -> Result<Dismissal> {
		self.opened.lock().push((url.to_string(), options.clone()));
		self.finished.notified().await;
		self.outcome
			.lock()
			.take()
			.unwrap_or_else(|| Ok(Dismissal::new(DismissReason::Dismiss)))
	}

	async fn close(&self) -> Result<()> {
		self.closed.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

/// Link checker returning a fixed answer.
pub struct FakeLinkChecker {
	answer: Mutex<Option<bool>>,
	checked: Mutex<Vec<String>>,
}

impl FakeLinkChecker {
	/// Checker answering `can_open` with `answer`.
	pub fn answering(answer: bool) -> Arc<Self> {
		Arc::new(Self {
			answer: Mutex::new(Some(answer)),
			checked: Mutex::new(Vec::new()),
		})
	}

	/// Checker whose `can_open` always fails.
	pub fn failing() -> Arc<Self> {
		Arc::new(Self {
			answer: Mutex::new(None),
			checked: Mutex::new(Vec::new()),
		})
	}

	pub fn checked(&self) -> Vec<String> {
		self.checked.lock().clone()
	}
}

#[async_trait]
impl LinkChecker for FakeLinkChecker {
	async fn can_open(&self, url: &str) -> Result<bool> {
		self.checked.lock().push(url.to_string());
		let answer = *self.answer.lock();
		answer.ok_or_else(|| Error::LinkCheck {
			url: url.to_string(),
			message: "no handler registry".into(),
		})
	}
}

/// Handler calls recorded as `(kind, data)`; `load` records `Value::Null`.
#[derive(Clone, Default)]
pub struct HandlerLog {
	calls: Arc<Mutex<Vec<(&'static str, Value)>>>,
}

impl HandlerLog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Handler set recording every callback into this log.
	pub fn handlers(&self) -> EventHandlers {
		let record = |kind: &'static str| {
			let calls = Arc::clone(&self.calls);
			move |data: Value| calls.lock().push((kind, data))
		};
		let load_calls = Arc::clone(&self.calls);

		EventHandlers::new()
			.on_cancel(record("cancel"))
			.on_done(record("done"))
			.on_error(record("error"))
			.on_load(move || load_calls.lock().push(("load", Value::Null)))
			.on_route(record("route"))
			.on_user(record("user"))
	}

	pub fn calls(&self) -> Vec<(&'static str, Value)> {
		self.calls.lock().clone()
	}

	pub fn count_of(&self, kind: &str) -> usize {
		self.calls.lock().iter().filter(|(k, _)| *k == kind).count()
	}

	pub fn last(&self, kind: &str) -> Option<Value> {
		self.calls
			.lock()
			.iter()
			.rev()
			.find(|(k, _)| *k == kind)
			.map(|(_, data)| data.clone())
	}
}
