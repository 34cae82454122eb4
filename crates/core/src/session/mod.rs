//! Connect session: overlay lifecycle, event routing and keepalive.
//!
//! A [`ConnectSession`] is a cheap, cloneable handle. All mutable state lives
//! behind one lock and is only changed through the session's methods; the
//! lock is never held while calling into the application (handlers,
//! surface, overlay, browser), so callbacks may re-enter the session.
//!
//! # Lifecycle
//!
//! ```text
//! build() ──► Loading ──surface_loaded()──► Active
//!                │                            │
//!                └──── cancel/done/error, close(), request_exit() ──► Closed
//! ```
//!
//! Entering `Closed` hides the overlay, stops the keepalive, force-closes an
//! open popup browser and releases the surface.
//!
//! # Popup browser
//!
//! `url` events move the browser through `Idle → Checking → Open → Idle`.
//! While not `Idle`, further `url` events are ignored. A `closePopup` during
//! `Checking` cancels the pending launch; once `Open`, it closes the browser
//! and tells the content. A launch that resolves after its browser was
//! already dismissed changes nothing.


use std::sync::Arc;
use std::time::Duration;

use connect_protocol::{BOOTSTRAP_SCRIPT, ExitData, InboundEvent, InboundMessage, OutboundMessage};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use crate::capability::{
	BrowserLauncher, LinkChecker, Overlay, Platform, PresentRequest, PresentationStyle, Surface,
};
use crate::config::ConnectConfig;
use crate::error::{Error, Result};
use crate::handlers::EventHandlers;
use crate::keepalive::{Keepalive, Tick};
use crate::url::validate_url;

/// Visibility of the overlay hosting the Connect content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
	Closed,
	/// Visible, content still loading.
	Loading,
	/// Visible, content loaded.
	Active,
}

/// State of the popup browser opened for `url` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserState {
	Idle,
	/// Waiting on the deep-link check before launching.
	Checking,
	Open,
}

struct SessionState {
	connect_url: String,
	overlay: OverlayState,
	surface: Option<Arc<dyn Surface>>,
	browser: BrowserState,
	/// Bumped for every accepted `url` event; stale launches compare against it.
	navigation: u64,
	keepalive: Keepalive,
	acknowledged: bool,
	/// Runtime that launched the popup browser; closing it goes back there.
	runtime: Option<Handle>,
}

struct Inner {
	platform: Platform,
	redirect_url: String,
	linking_uri: Option<String>,
	ping_interval: Duration,
	handlers: EventHandlers,
	overlay: Option<Arc<dyn Overlay>>,
	launcher: Option<Arc<dyn BrowserLauncher>>,
	link_checker: Option<Arc<dyn LinkChecker>>,
	state: Mutex<SessionState>,
}

/// Handle to one embedded Connect flow.
///
/// `handle`, `surface_loaded` and `start_pinging` start background work and
/// must be called from within a Tokio runtime. `close`, `request_exit` and
/// `dismiss_browser` may be called from any thread; closing an open popup is
/// scheduled on the runtime that opened it.
#[derive(Clone)]
pub struct ConnectSession {
	inner: Arc<Inner>,
}

/// Builder for [`ConnectSession`].
pub struct ConnectSessionBuilder {
	config: ConnectConfig,
	handlers: EventHandlers,
	overlay: Option<Arc<dyn Overlay>>,
	launcher: Option<Arc<dyn BrowserLauncher>>,
	link_checker: Option<Arc<dyn LinkChecker>>,
}

impl ConnectSessionBuilder {
	pub fn handlers(mut self, handlers: EventHandlers) -> Self {
		self.handlers = handlers;
		self
	}

	pub fn overlay(mut self, overlay: Arc<dyn Overlay>) -> Self {
		self.overlay = Some(overlay);
		self
	}

	/// Browser used for `url` events. Without one, `url` events are dropped.
	pub fn browser_launcher(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
		self.launcher = Some(launcher);
		self
	}

	/// Deep-link checker consulted on platforms that check links first.
	pub fn link_checker(mut self, checker: Arc<dyn LinkChecker>) -> Self {
		self.link_checker = Some(checker);
		self
	}

	/// Validates the configuration and presents the overlay.
	///
	/// A non-empty redirect URL that fails validation is replaced by the
	/// default redirect URL.
	pub fn build(self) -> Result<ConnectSession> {
		self.config.validate()?;

		let redirect_url = if self.config.redirect_url.is_empty() {
			String::new()
		} else {
			validate_url(&self.config.redirect_url)
		};

		let session = ConnectSession {
			inner: Arc::new(Inner {
				platform: self.config.platform,
				redirect_url,
				linking_uri: self.config.linking_uri.clone(),
				ping_interval: self.config.ping_interval(),
				handlers: self.handlers,
				overlay: self.overlay,
				launcher: self.launcher,
				link_checker: self.link_checker,
				state: Mutex::new(SessionState {
					connect_url: self.config.connect_url,
					overlay: OverlayState::Closed,
					surface: None,
					browser: BrowserState::Idle,
					navigation: 0,
					keepalive: Keepalive::new(),
					acknowledged: false,
					runtime: None,
				}),
			}),
		};
		session.present();
		Ok(session)
	}
}

impl ConnectSession {
	pub fn builder(config: ConnectConfig) -> ConnectSessionBuilder {
		ConnectSessionBuilder {
			config,
			handlers: EventHandlers::new(),
			overlay: None,
			launcher: None,
			link_checker: None,
		}
	}

	fn present(&self) {
		let request = {
			let mut state = self.inner.state.lock();
			state.overlay = OverlayState::Loading;
			PresentRequest {
				url: state.connect_url.clone(),
				style: self.inner.platform.presentation_style(),
				bootstrap_script: BOOTSTRAP_SCRIPT,
			}
		};
		debug!(url = %request.url, style = ?request.style, "presenting connect overlay");
		if let Some(overlay) = &self.inner.overlay {
			overlay.present(&request);
		}
	}

	/// Shows a closed session again with a new Connect URL.
	///
	/// Acknowledgment is reset so the new content is pinged again.
	pub fn relaunch(&self, connect_url: impl Into<String>) -> Result<()> {
		let connect_url = connect_url.into();
		::url::Url::parse(&connect_url)
			.map_err(|e| Error::InvalidConfig(format!("connect URL '{connect_url}' is invalid: {e}")))?;

		{
			let mut state = self.inner.state.lock();
			if state.overlay != OverlayState::Closed {
				return Err(Error::InvalidState("session is still open".into()));
			}
			state.connect_url = connect_url;
			state.acknowledged = false;
		}
		self.present();
		Ok(())
	}

	/// Attaches the mounted web surface.
	pub fn attach_surface(&self, surface: Arc<dyn Surface>) {
		self.inner.state.lock().surface = Some(surface);
	}

	/// Detaches the web surface; later outbound messages are dropped.
	pub fn detach_surface(&self) {
		self.inner.state.lock().surface = None;
	}

	/// Detaches `surface` only if it is still the attached one.
	///
	/// Returns false if another surface replaced it in the meantime.
	pub fn detach_surface_if(&self, surface: &Arc<dyn Surface>) -> bool {
		let mut state = self.inner.state.lock();
		match &state.surface {
			Some(current) if Arc::ptr_eq(current, surface) => {
				state.surface = None;
				true
			}
			_ => false,
		}
	}

	/// Signals that the surface finished loading the Connect content.
	pub fn surface_loaded(&self) {
		{
			let mut state = self.inner.state.lock();
			match state.overlay {
				OverlayState::Closed => {
					debug!("surface loaded after the overlay closed; ignoring");
					return;
				}
				OverlayState::Loading => state.overlay = OverlayState::Active,
				OverlayState::Active => {}
			}
		}
		self.start_pinging();
	}

	/// Closes the flow on the application's behalf.
	///
	/// Always reports `{code: 100, reason: "exit"}` to the cancel handler.
	pub fn close(&self) {
		self.dismiss();
		self.inner.handlers.cancel(ExitData::exit().to_value());
	}

	/// Exit requested by the overlay itself (e.g. a hardware back button).
	pub fn request_exit(&self) {
		debug!("overlay requested exit");
		self.close();
	}

	/// Serializes `payload` and posts it to the attached surface.
	///
	/// Does nothing if no surface is attached.
	pub fn post_message<T: Serialize + ?Sized>(&self, payload: &T) {
		self.post(payload);
	}

	fn post<T: Serialize + ?Sized>(&self, payload: &T) -> bool {
		let surface = self.inner.state.lock().surface.clone();
		match surface {
			Some(surface) => send(surface.as_ref(), payload),
			None => {
				trace!("no surface attached; dropping outbound message");
				false
			}
		}
	}

	/// Routes one message posted by the web content.
	///
	/// Malformed messages are ignored. Never fails.
	pub fn handle(&self, message: impl Into<InboundMessage>) {
		let message: InboundMessage = message.into();
		let Some(event) = message.parse() else {
			debug!("ignoring malformed inbound message");
			return;
		};
		trace!(kind = event.kind(), "inbound event");

		let handlers = &self.inner.handlers;
		match event {
			InboundEvent::Url { url } => self.open_url(url.as_deref().unwrap_or_default()),
			InboundEvent::ClosePopup => self.close_popup(),
			InboundEvent::Ack => self.acknowledge(),
			InboundEvent::Cancel { data } => {
				self.dismiss();
				handlers.cancel(data);
			}
			InboundEvent::Done { data } => {
				self.dismiss();
				handlers.done(data);
			}
			InboundEvent::Error { data } => {
				self.dismiss();
				handlers.error(data);
			}
			InboundEvent::Route { data } => handlers.route(data),
			InboundEvent::User { data } => handlers.user(data),
			InboundEvent::Unknown => trace!("ignoring unrecognized event"),
		}
	}

	fn acknowledge(&self) {
		let first = {
			let mut state = self.inner.state.lock();
			state.keepalive.stop();
			!std::mem::replace(&mut state.acknowledged, true)
		};
		if first {
			debug!("connect acknowledged the sdk");
			self.inner.handlers.load();
		} else {
			trace!("duplicate ack ignored");
		}
	}

	/// Enters `Closed`. Returns false if the overlay was already closed.
	fn dismiss(&self) -> bool {
		let (surface, browser_open) = {
			let mut state = self.inner.state.lock();
			if state.overlay == OverlayState::Closed {
				return false;
			}
			state.overlay = OverlayState::Closed;
			state.keepalive.stop();
			let browser_open = state.browser == BrowserState::Open;
			state.browser = BrowserState::Idle;
			(state.surface.take(), browser_open)
		};

		if browser_open {
			if let Some(surface) = &surface {
				send(surface.as_ref(), &OutboundMessage::window_closed());
			}
			self.spawn_browser_close();
		}
		if let Some(overlay) = &self.inner.overlay {
			overlay.dismiss();
		}
		debug!("connect overlay dismissed");
		true
	}

	// --- keepalive ---

	/// Starts pinging the content every ping interval.
	///
	/// Only arms when a surface is attached, no ack was received and the
	/// keepalive is not already running. Returns true if it armed.
	pub fn start_pinging(&self) -> bool {
		let weak = Arc::downgrade(&self.inner);
		let period = self.inner.ping_interval;

		let mut state = self.inner.state.lock();
		if state.surface.is_none() || state.acknowledged {
			return false;
		}
		let started = state.keepalive.start(period, move || {
			let Some(inner) = weak.upgrade() else {
				return Tick::Stop;
			};
			if (ConnectSession { inner }).send_ping() {
				Tick::Continue
			} else {
				Tick::Stop
			}
		});
		if started {
			debug!(interval_ms = period.as_millis() as u64, "keepalive armed");
		}
		started
	}

	/// Stops the keepalive. Returns true if it was armed.
	pub fn stop_pinging(&self) -> bool {
		self.inner.state.lock().keepalive.stop()
	}

	/// Posts one ping now, or stops the keepalive if no surface is attached.
	pub fn ping(&self) {
		if !self.send_ping() {
			self.stop_pinging();
		}
	}

	fn send_ping(&self) -> bool {
		self.post(&OutboundMessage::ping(self.inner.redirect_url.as_str()))
	}

	// --- popup browser ---

	fn open_url(&self, url: &str) {
		if url.is_empty() {
			debug!("url event without a URL; ignoring");
			return;
		}

		let Ok(runtime) = Handle::try_current() else {
			warn!(url, "url event outside a Tokio runtime; ignoring");
			return;
		};

		let navigation = {
			let mut state = self.inner.state.lock();
			if state.browser != BrowserState::Idle {
				debug!(url, browser = ?state.browser, "browser busy; ignoring url event");
				return;
			}
			state.browser = BrowserState::Checking;
			state.navigation += 1;
			state.runtime = Some(runtime.clone());
			state.navigation
		};

		let session = self.clone();
		let url = url.to_string();
		runtime.spawn(async move { session.navigate(url, navigation).await });
	}

	async fn navigate(self, url: String, navigation: u64) {
		let Some(launcher) = self.inner.launcher.clone() else {
			warn!(url = %url, "no browser launcher configured; dropping url event");
			self.cancel_launch(navigation);
			return;
		};

		if self.inner.platform.checks_deep_links() {
			if let Some(checker) = &self.inner.link_checker {
				match checker.can_open(&url).await {
					Ok(true) => {
						debug!(url = %url, "url handled by an installed app");
						self.cancel_launch(navigation);
						return;
					}
					Ok(false) => {}
					Err(e) => warn!(url = %url, error = %e, "link check failed; opening browser"),
				}
			}
		}

		if !self.mark_browser_open(navigation) {
			debug!(url = %url, "launch cancelled before the browser opened");
			return;
		}

		if !launcher.is_available().await {
			debug!("browser reported unavailable; opening anyway");
		}
		let options = self.inner.platform.open_options(self.inner.linking_uri.as_deref());

		match launcher.open(&url, &options).await {
			Ok(dismissal) => {
				debug!(reason = ?dismissal.reason, "browser dismissed");
				self.dismiss_browser_with(Some(navigation), !dismissal.closed_by_user());
			}
			Err(e) => {
				warn!(url = %url, error = %e, "failed to open browser");
				self.dismiss_browser_with(Some(navigation), false);
			}
		}
	}

	fn cancel_launch(&self, navigation: u64) {
		let mut state = self.inner.state.lock();
		if state.browser == BrowserState::Checking && state.navigation == navigation {
			state.browser = BrowserState::Idle;
		}
	}

	fn mark_browser_open(&self, navigation: u64) -> bool {
		let mut state = self.inner.state.lock();
		if state.browser == BrowserState::Checking && state.navigation == navigation {
			state.browser = BrowserState::Open;
			true
		} else {
			false
		}
	}

	fn close_popup(&self) {
		let cancelled = {
			let mut state = self.inner.state.lock();
			if state.browser == BrowserState::Checking {
				state.browser = BrowserState::Idle;
				true
			} else {
				false
			}
		};
		if cancelled {
			debug!("cancelled pending browser launch");
			return;
		}
		self.dismiss_browser();
	}

	/// Closes the popup browser and tells the content it closed.
	///
	/// No-op unless a browser is open. Returns true if it closed one.
	pub fn dismiss_browser(&self) -> bool {
		self.dismiss_browser_with(None, true)
	}

	fn dismiss_browser_with(&self, navigation: Option<u64>, close_launcher: bool) -> bool {
		{
			let mut state = self.inner.state.lock();
			if state.browser != BrowserState::Open {
				return false;
			}
			if navigation.is_some_and(|n| n != state.navigation) {
				return false;
			}
			state.browser = BrowserState::Idle;
		}

		self.post(&OutboundMessage::window_closed());
		if close_launcher {
			self.spawn_browser_close();
		}
		true
	}

	fn spawn_browser_close(&self) {
		let Some(launcher) = self.inner.launcher.clone() else {
			return;
		};
		let stored = self.inner.state.lock().runtime.clone();
		let Some(runtime) = stored.or_else(|| Handle::try_current().ok()) else {
			warn!("no Tokio runtime to close the browser on");
			return;
		};
		runtime.spawn(async move {
			if let Err(e) = launcher.close().await {
				warn!(error = %e, "failed to close browser");
			}
		});
	}

	// --- accessors ---

	pub fn overlay_state(&self) -> OverlayState {
		self.inner.state.lock().overlay
	}

	pub fn is_visible(&self) -> bool {
		self.overlay_state() != OverlayState::Closed
	}

	pub fn browser_state(&self) -> BrowserState {
		self.inner.state.lock().browser
	}

	pub fn is_pinging(&self) -> bool {
		self.inner.state.lock().keepalive.is_armed()
	}

	pub fn is_acknowledged(&self) -> bool {
		self.inner.state.lock().acknowledged
	}

	pub fn has_surface(&self) -> bool {
		self.inner.state.lock().surface.is_some()
	}

	pub fn connect_url(&self) -> String {
		self.inner.state.lock().connect_url.clone()
	}

	/// Redirect URL announced in pings, after validation.
	pub fn redirect_url(&self) -> &str {
		&self.inner.redirect_url
	}

	pub fn platform(&self) -> Platform {
		self.inner.platform
	}

	pub fn presentation_style(&self) -> PresentationStyle {
		self.inner.platform.presentation_style()
	}
}

impl std::fmt::Debug for ConnectSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("ConnectSession")
			.field("connect_url", &state.connect_url)
			.field("overlay", &state.overlay)
			.field("browser", &state.browser)
			.field("pinging", &state.keepalive.is_armed())
			.field("acknowledged", &state.acknowledged)
			.finish()
	}
}

fn send<T: Serialize + ?Sized>(surface: &dyn Surface, payload: &T) -> bool {
	match serde_json::to_string(payload) {
		Ok(text) => {
			surface.post_message(&text);
			true
		}
		Err(e) => {
			warn!(error = %e, "failed to serialize outbound message");
			false
		}
	}
}
