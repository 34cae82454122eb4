//! WebSocket relay hosting a Connect session.
//!
//! The relay plays the native side of the SDK on the desktop: its overlay is
//! the relay lifetime and the surface is whichever client is connected to
//! `/surface`. Closing the flow shuts the relay down.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::routing::get;
use connect::{
	BrowserLauncher, ConnectConfig, ConnectSession, EventHandlers, LinkChecker, Overlay, PresentRequest, Surface,
};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::browser::SystemBrowser;
use crate::link_check::XdgLinkChecker;

/// How long a disconnecting surface gets to flush queued frames.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Overlay whose dismissal ends the relay.
struct RelayOverlay {
	closed: watch::Sender<bool>,
}

impl Overlay for RelayOverlay {
	fn present(&self, request: &PresentRequest) {
		self.closed.send_replace(false);
		info!(url = %request.url, style = ?request.style, "connect flow ready; waiting for a surface");
	}

	fn dismiss(&self) {
		self.closed.send_replace(true);
	}
}

/// Surface forwarding outbound messages to a WebSocket client.
struct WsSurface {
	tx: mpsc::UnboundedSender<Message>,
}

impl Surface for WsSurface {
	fn post_message(&self, message: &str) {
		if self.tx.send(Message::Text(message.to_owned().into())).is_err() {
			debug!("surface socket already closed; dropping message");
		}
	}
}

#[derive(Clone)]
struct RelayState {
	session: ConnectSession,
	closed: watch::Receiver<bool>,
	/// Bumped for every surface connection; older connections stop when it moves on.
	connections: Arc<watch::Sender<u64>>,
}

/// Capabilities the relay hands to its session.
pub struct RelayCapabilities {
	pub handlers: EventHandlers,
	pub browser: Arc<dyn BrowserLauncher>,
	pub link_checker: Arc<dyn LinkChecker>,
}

impl RelayCapabilities {
	/// System browser and xdg link checker, with the given handlers.
	pub fn system(handlers: EventHandlers) -> Self {
		Self {
			handlers,
			browser: Arc::new(SystemBrowser::detect()),
			link_checker: Arc::new(XdgLinkChecker::detect()),
		}
	}
}

/// A bound relay with its session already presented.
pub struct Relay {
	listener: TcpListener,
	session: ConnectSession,
	closed: watch::Receiver<bool>,
}

impl Relay {
	pub async fn bind(config: ConnectConfig, addr: SocketAddr, capabilities: RelayCapabilities) -> Result<Self> {
		let listener = TcpListener::bind(addr)
			.await
			.with_context(|| format!("Failed to bind relay server to {addr}"))?;

		let (closed_tx, closed) = watch::channel(false);
		let session = ConnectSession::builder(config)
			.handlers(capabilities.handlers)
			.overlay(Arc::new(RelayOverlay { closed: closed_tx }))
			.browser_launcher(capabilities.browser)
			.link_checker(capabilities.link_checker)
			.build()
			.context("Failed to start connect session")?;

		Ok(Self {
			listener,
			session,
			closed,
		})
	}

	pub fn local_addr(&self) -> Result<SocketAddr> {
		self.listener.local_addr().context("Relay listener has no local address")
	}

	pub fn session(&self) -> &ConnectSession {
		&self.session
	}

	/// Serves until the flow closes. Ctrl-C closes the flow.
	pub async fn serve(self) -> Result<()> {
		let addr = self.local_addr()?;
		let state = RelayState {
			session: self.session.clone(),
			closed: self.closed.clone(),
			connections: Arc::new(watch::channel(0).0),
		};

		let app = Router::new()
			.route("/", get(|| async { "OK" }))
			.route(
				"/surface",
				get(
					|ws: WebSocketUpgrade, State(state): State<RelayState>| async move {
						ws.on_upgrade(|socket| handle_surface_socket(socket, state))
					},
				),
			)
			.with_state(state);

		info!(%addr, "relay listening; connect the surface to ws://{addr}/surface");

		let session = self.session;
		let mut closed = self.closed;
		let shutdown = async move {
			tokio::select! {
				_ = closed.wait_for(|closed| *closed) => {}
				Ok(()) = tokio::signal::ctrl_c() => {
					info!("interrupted; closing connect flow");
					session.close();
				}
			}
		};

		axum::serve(self.listener, app.into_make_service())
			.with_graceful_shutdown(shutdown)
			.await
			.context("Relay server error")?;

		info!("connect flow closed; relay stopped");
		Ok(())
	}
}

async fn handle_surface_socket(socket: WebSocket, state: RelayState) {
	let RelayState {
		session,
		mut closed,
		connections,
	} = state;
	if !session.is_visible() {
		debug!("surface connected after the flow closed");
		return;
	}

	let mut connection = 0;
	connections.send_modify(|count| {
		*count += 1;
		connection = *count;
	});
	let mut replaced = connections.subscribe();

	let (tx, rx) = mpsc::unbounded_channel();
	if session.has_surface() {
		warn!("replacing existing surface connection");
	}
	let surface: Arc<dyn Surface> = Arc::new(WsSurface { tx: tx.clone() });
	session.attach_surface(surface.clone());
	info!(connection, "surface connected");

	let mut rx_stream = UnboundedReceiverStream::new(rx);
	let (mut ws_tx, mut ws_rx) = socket.split();

	let mut send_task = tokio::spawn(async move {
		while let Some(msg) = rx_stream.next().await {
			if ws_tx.send(msg).await.is_err() {
				break;
			}
		}
	});

	session.surface_loaded();

	loop {
		tokio::select! {
			msg = ws_rx.next() => match msg {
				Some(Ok(Message::Text(text))) => session.handle(text.as_str()),
				Some(Ok(Message::Close(_))) | None => break,
				Some(Ok(_)) => {}
				Some(Err(err)) => {
					warn!(error = %err, "surface websocket error");
					break;
				}
			},
			_ = closed.wait_for(|closed| *closed) => break,
			_ = replaced.wait_for(|latest| *latest != connection) => {
				info!(connection, "surface replaced by a newer connection");
				break;
			}
		}
	}

	session.detach_surface_if(&surface);
	drop(surface);
	let _ = tx.send(Message::Close(None));
	drop(tx);

	if tokio::time::timeout(DRAIN_TIMEOUT, &mut send_task).await.is_err() {
		send_task.abort();
	}
	info!(connection, "surface disconnected");
}
