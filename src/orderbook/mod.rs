//! Concurrent limit order book.
//!
//! This module provides the order book maintenance engine:
//!
//! - [`levels`] - per-side price level storage and best-price tracking
//! - [`book`] - [`Orderbook`], both sides behind one `RwLock`
//! - [`manager`] - [`BookManager`], one independently locked book per instrument
//!
//! # Example
//!
//! ```rust
//! use coinbase_book::orderbook::Orderbook;
//! use coinbase_book::types::{fixed, Side, Update};
//!
//! let book = Orderbook::new("BTC-USD");
//!
//! // Apply level updates in feed order
//! book.apply_update(&Update::new(Side::Bid, "21921.73", "0.5")).unwrap();
//! book.apply_update(&Update::new(Side::Ask, "21921.74", "1.25")).unwrap();
//!
//! // Get best bid
//! if let Some((price, qty)) = book.best_bid() {
//!     println!("Best bid: {} @ {}", fixed::encode(qty), fixed::encode(price));
//! }
//! ```

pub mod book;
pub mod levels;
pub mod manager;

pub use book::{BookStats, Orderbook, TopOfBook};
pub use levels::{ApplyOutcome, BookSide};
pub use manager::{BookManager, MessageSummary};
