//! Host-side SDK for embedding the Connect web flow.
//!
//! A [`ConnectSession`] presents the Connect flow in an overlay, relays
//! messages between the embedded web content and the application, and keeps
//! announcing the SDK to the content until it acknowledges.
//!
//! Native pieces the SDK cannot own itself are consumed through traits in
//! [`capability`]: the web [`Surface`] and its [`Overlay`], the popup
//! [`BrowserLauncher`], and the deep-link [`LinkChecker`].
//!
//! # Example
//!
//! ```ignore
//! let handlers = EventHandlers::new()
//!     .on_done(|data| println!("done: {data}"))
//!     .on_cancel(|data| println!("cancelled: {data}"));
//!
//! let session = ConnectSession::builder(ConnectConfig::new(connect_url))
//!     .handlers(handlers)
//!     .overlay(overlay)
//!     .browser_launcher(launcher)
//!     .build()?;
//!
//! // When the web view mounts and finishes loading:
//! session.attach_surface(surface);
//! session.surface_loaded();
//!
//! // For every message the web view posts:
//! session.handle(raw_message);
//! ```

pub mod capability;
pub mod config;
pub mod error;
pub mod handlers;
pub mod keepalive;
pub mod session;
pub mod testing;
pub mod url;

pub use capability::{
	BrowserLauncher, DismissReason, Dismissal, LinkChecker, OpenOptions, Overlay, Platform,
	PresentRequest, PresentationStyle, Surface,
};
pub use config::ConnectConfig;
pub use connect_protocol as protocol;
pub use error::{Error, Result};
pub use handlers::EventHandlers;
pub use session::{BrowserState, ConnectSession, ConnectSessionBuilder, OverlayState};
pub use url::validate_url;
