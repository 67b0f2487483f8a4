//! Server configuration constants.
//!
//! Centralizes hardcoded values for easier configuration and documentation.

use std::time::Duration;

/// Default bind address (localhost only; put a proxy in front for TLS).
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Default WebSocket port.
pub const DEFAULT_PORT: u16 = 9090;

/// Operations kept per room for transforming late-based client ops.
/// Clients whose base falls outside this window must rejoin.
pub const MAX_HISTORY_LENGTH: usize = 1000;

/// Ping interval; a connection silent for two intervals is terminated.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Outbound frames buffered per connection before it is considered
/// persistently behind and dropped.
pub const OUTBOUND_QUEUE_DEPTH: usize = 256;

/// WebSocket close code sent on authentication failure.
pub const CLOSE_AUTH_FAILURE: u16 = 4001;
