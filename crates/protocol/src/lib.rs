//! Wire types for the Connect message contract.
//!
//! The embedded Connect web flow and the native host exchange small JSON
//! objects tagged by a `type` field. This crate holds the shapes of those
//! objects as they appear on the wire:
//!
//! - [`InboundEvent`] - messages posted by the web content to the host
//! - [`OutboundMessage`] - messages the host posts into the web content
//! - [`ExitData`], [`RouteData`] - well-known payload shapes
//!
//! Types here carry no behavior beyond (de)serialization and parsing. The
//! session logic that acts on them lives in `connect-sdk`.

pub mod constants;
pub mod event;
pub mod message;
pub mod payload;

pub use constants::*;
pub use event::*;
pub use message::*;
pub use payload::*;
