//! Domain and wire types.
//!
//! - [`fixed`] - Decimal string <-> fixed-point integer codec
//! - [`update`] - Book side and the canonical level update record
//! - [`messages`] - Coinbase `level2` WebSocket message types

pub mod fixed;
pub mod messages;
pub mod update;

pub use fixed::ParseError;
pub use messages::{FeedEvent, FeedMessage, SubscribeCommand};
pub use update::{Side, Update};

/// Price scaled by 10^8 (see [`fixed`])
///
/// Valid prices are strictly positive, so `0` never names a real level.
/// Using `i64` instead of floating point for:
/// - Exact arithmetic (no floating point errors)
/// - Exact equality as a map key
pub type Price = i64;

/// Resting size at a price level, scaled by 10^8
///
/// `0` in an update means "remove the level"; stored levels are always positive.
pub type Quantity = i64;
