//! Event stream transport: WebSocket connection and reconnect policy.

pub mod backoff;
pub mod connection;

pub use backoff::ReconnectBackoff;
pub use connection::run_stream;
