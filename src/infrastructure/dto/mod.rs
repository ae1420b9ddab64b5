//! Data transfer objects for the external HTTP API and the WebSocket
//! chat channel.

pub mod http;
pub mod websocket;
