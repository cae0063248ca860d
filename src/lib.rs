//! # coinbase-book
//!
//! An in-memory limit order book rebuilt from the [Coinbase Advanced
//! Trade](https://docs.cdp.coinbase.com/advanced-trade/docs/ws-overview)
//! `level2` delta feed, queryable for best bid/ask, spread and mid point
//! while updates keep arriving.
//!
//! ## Features
//!
//! - **Fixed-Point Prices** - Decimal strings decoded into `i64` scaled by 10^8
//! - **Concurrent Orderbook** - One writer, any number of readers, consistent snapshots
//! - **O(log n) Best Price** - Ordered index behind the per-side level map
//! - **Feed Client** - Minimal `level2` WebSocket client built on Tokio
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use coinbase_book::client::FeedClient;
//! use coinbase_book::orderbook::BookManager;
//! use coinbase_book::types::fixed;
//! use coinbase_book::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), coinbase_book::Error> {
//!     let config = Config::from_env()?;
//!     let manager = Arc::new(BookManager::with_instruments(config.instruments()));
//!
//!     let mut feed = FeedClient::connect(&config).await?;
//!     feed.subscribe_level2(config.instruments()).await?;
//!
//!     let reader = Arc::clone(&manager);
//!     tokio::spawn(async move {
//!         if let Some(mid) = reader.mid_point("BTC-USD") {
//!             println!("BTC-USD mid: {}", fixed::encode(mid));
//!         }
//!     });
//!
//!     feed.pump(&manager).await
//! }
//! ```
//!
//! ## Price Representation
//!
//! Prices and quantities are integers scaled by 10^8:
//! - `"12.3"` = 1_230_000_000
//! - `"0.00000001"` = 1
//! - `0` is never a valid price and means "no level" internally
//!
//! ## Architecture
//!
//! - [`types`] - Fixed-point codec, `Side`/`Update`, feed message types
//! - [`orderbook`] - Level storage, the locked `Orderbook`, multi-instrument manager
//! - [`client`] - WebSocket feed client
//! - [`config`] - Feed endpoint and instrument set
//! - [`error`] - Error types for the crate

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod orderbook;
pub mod types;

// Re-export main types at crate root for convenience
pub use config::Config;
pub use error::Error;
pub use orderbook::{BookManager, Orderbook};
pub use types::{Side, Update};

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
