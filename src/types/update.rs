//! Book side and the level update consumed by [`Orderbook`](crate::orderbook::Orderbook).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::fixed::{self, ParseError};
use super::{Price, Quantity};

/// Side of the book
///
/// Coinbase calls the ask side `"offer"`; `"ask"` is accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy interest, best = highest price
    Bid,
    /// Sell interest, best = lowest price
    #[serde(rename = "offer", alias = "ask")]
    Ask,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// A single price-level change, still in decimal-string form.
///
/// Deserializes straight from a Coinbase `level2` update object:
///
/// ```json
/// {"side": "bid", "event_time": "...", "price_level": "21921.73", "new_quantity": "0.06317902"}
/// ```
///
/// `quantity` is the new absolute resting size, not a delta; `"0"` removes
/// the level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Book side
    pub side: Side,
    /// Price as a decimal string
    #[serde(rename = "price_level")]
    pub price: String,
    /// New resting quantity as a decimal string
    #[serde(rename = "new_quantity")]
    pub quantity: String,
}

impl Update {
    /// Create an update from decimal strings
    pub fn new(side: Side, price: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            side,
            price: price.into(),
            quantity: quantity.into(),
        }
    }

    /// Decode the price and quantity into fixed-point integers
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if either field is not a valid decimal string.
    pub fn decode(&self) -> Result<(Price, Quantity), ParseError> {
        Ok((fixed::decode(&self.price)?, fixed::decode(&self.quantity)?))
    }
}
