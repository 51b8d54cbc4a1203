//! WebSocket transport: wire protocol and connection handling.

pub mod connection;
pub mod protocol;
