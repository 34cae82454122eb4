//! Desktop harness for the Connect SDK.
//!
//! `connect relay` hosts a [`ConnectSession`](connect::ConnectSession) behind a
//! WebSocket endpoint so any page or test client can act as the web surface;
//! `connect check-url` runs the SDK's URL validation.

pub mod browser;
pub mod cli;
pub mod commands;
pub mod config;
pub mod link_check;
pub mod logging;
pub mod output;
pub mod relay;
