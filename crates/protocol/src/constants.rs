//! Constants shared by the host and the web content.

use std::time::Duration;

/// SDK version announced to the web content in every ping.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Platform identifier announced to the web content in every ping.
pub const SDK_PLATFORM: &str = "rust";

/// Default interval between keepalive pings.
pub const PING_INTERVAL: Duration = Duration::from_millis(1000);

/// Fallback returned by URL validation when a candidate URL is rejected.
pub const DEFAULT_REDIRECT_URL: &str = "https://b2b.mastercard.com/open-banking-solutions/";

/// Code reported to the cancel handler when the host closes the flow.
pub const EXIT_CODE: i64 = 100;

/// Reason reported to the cancel handler when the host closes the flow.
pub const EXIT_REASON: &str = "exit";

/// Script injected into the surface before the Connect content loads.
///
/// Connect checks these globals to decide whether it runs inside a native
/// host and should post events instead of using browser redirects.
pub const BOOTSTRAP_SCRIPT: &str = r#"
(function() {
  window.maOBConnectReactNative = window.maOBConnectReactNative || true;
  window.ReactNativeWebView = window.ReactNativeWebView || true;
})();
"#;
