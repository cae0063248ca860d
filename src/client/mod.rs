//! Feed client for Coinbase market data.
//!
//! - [`websocket`] - WebSocket client for the `level2` channel

pub mod websocket;

pub use websocket::FeedClient;
