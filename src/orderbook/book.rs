//! Core orderbook data structure.
//!
//! An [`Orderbook`] is two [`BookSide`]s behind one `parking_lot::RwLock`:
//!
//! - writers hold the exclusive lock for the whole level change, including
//!   the best-price recomputation, so readers never see a best price whose
//!   level is already gone
//! - every query takes the shared lock, including `best_bid` / `best_ask`
//! - drop counters are atomics and are read without the lock

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{trace, warn};

use crate::error::Error;
use crate::types::{Price, Quantity, Side, Update};

use super::levels::{ApplyOutcome, BookSide};

/// Both sides of the book, always read and written together
#[derive(Debug, Clone)]
struct BookState {
    bids: BookSide,
    asks: BookSide,
}

impl BookState {
    fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }
}

/// Best bid and ask read under a single lock acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopOfBook {
    /// Best bid `(price, quantity)`
    pub bid: Option<(Price, Quantity)>,
    /// Best ask `(price, quantity)`
    pub ask: Option<(Price, Quantity)>,
}

impl TopOfBook {
    /// Best ask minus best bid, if both sides are present
    #[must_use]
    pub fn spread(&self) -> Option<Price> {
        match (self.bid, self.ask) {
            (Some((bid, _)), Some((ask, _))) => Some(ask - bid),
            _ => None,
        }
    }

    /// Integer-truncated mean of best bid and best ask, if both are present
    #[must_use]
    pub fn mid_point(&self) -> Option<Price> {
        match (self.bid, self.ask) {
            // i128 so two prices near i64::MAX cannot overflow the sum
            (Some((bid, _)), Some((ask, _))) => Some(((bid as i128 + ask as i128) / 2) as Price),
            _ => None,
        }
    }
}

/// Counters of what happened to updates fed into a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookStats {
    /// Updates that changed the book (insert, overwrite or removal)
    pub applied: u64,
    /// Updates rejected for a non-positive price or negative quantity
    pub dropped: u64,
    /// Updates whose decimal strings failed to decode
    pub parse_failures: u64,
}

/// Thread-safe limit order book for a single instrument.
///
/// # Design Decisions
///
/// 1. **Fixed-point prices**: Prices and quantities are `i64` scaled by
///    10^8, so comparisons and map keys are exact.
///
/// 2. **Hash map + ordered index**: Level lookups are O(1); recomputing the
///    best price after the top level is removed is O(log n).
///
/// 3. **Internal locking**: Unlike a bare data structure, the book carries
///    its own `RwLock`, so an `Arc<Orderbook>` can be shared between the
///    feed task and any number of readers.
///
/// # Example
///
/// ```rust
/// use coinbase_book::orderbook::Orderbook;
/// use coinbase_book::types::{fixed, Side, Update};
///
/// let book = Orderbook::new("BTC-USD");
///
/// book.apply_update(&Update::new(Side::Bid, "99", "1"))?;
/// book.apply_update(&Update::new(Side::Ask, "101", "2.5"))?;
///
/// assert_eq!(book.spread(), Some(fixed::decode("2")?));
/// assert_eq!(book.mid_point().map(fixed::encode).as_deref(), Some("100.00000000"));
/// # Ok::<(), coinbase_book::Error>(())
/// ```
#[derive(Debug)]
pub struct Orderbook {
    /// Instrument (product) identifier
    instrument: String,

    state: RwLock<BookState>,

    applied: AtomicU64,
    dropped: AtomicU64,
    parse_failures: AtomicU64,
}

impl Orderbook {
    /// Create a new empty orderbook for the given instrument
    #[must_use]
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            state: RwLock::new(BookState {
                bids: BookSide::new(Side::Bid),
                asks: BookSide::new(Side::Ask),
            }),
            applied: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            parse_failures: AtomicU64::new(0),
        }
    }

    /// Get the instrument identifier
    #[must_use]
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Decode and apply one feed update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the price or quantity string is malformed.
    /// The book is left untouched and the parse-failure counter is bumped;
    /// the caller decides whether to skip the update or stop the stream.
    pub fn apply_update(&self, update: &Update) -> Result<ApplyOutcome, Error> {
        match update.decode() {
            Ok((price, quantity)) => Ok(self.apply_level(update.side, price, quantity)),
            Err(e) => {
                self.parse_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    instrument = %self.instrument,
                    side = %update.side,
                    price = %update.price,
                    quantity = %update.quantity,
                    error = %e,
                    "undecodable level update"
                );
                Err(e.into())
            }
        }
    }

    /// Apply an already-decoded level change.
    ///
    /// - `price <= 0` or `quantity < 0`: dropped, counted, no error
    /// - `quantity == 0`: the level is removed (no-op if absent)
    /// - otherwise the level is inserted or overwritten
    pub fn apply_level(&self, side: Side, price: Price, quantity: Quantity) -> ApplyOutcome {
        let outcome = self.state.write().side_mut(side).apply(price, quantity);

        match outcome {
            ApplyOutcome::Dropped => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!(instrument = %self.instrument, %side, price, quantity, "dropped invalid level");
            }
            o if o.is_change() => {
                self.applied.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        outcome
    }

    /// Get the best bid (highest bid)
    ///
    /// Returns `(price, quantity)` or `None` if no bids.
    #[must_use]
    pub fn best_bid(&self) -> Option<(Price, Quantity)> {
        self.state.read().bids.best()
    }

    /// Get the best ask (lowest ask)
    ///
    /// Returns `(price, quantity)` or `None` if no asks.
    #[must_use]
    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.state.read().asks.best()
    }

    /// Best bid and ask from one consistent read
    #[must_use]
    pub fn top_of_book(&self) -> TopOfBook {
        let state = self.state.read();
        TopOfBook {
            bid: state.bids.best(),
            ask: state.asks.best(),
        }
    }

    /// Best ask minus best bid, `None` unless both sides have levels
    #[must_use]
    pub fn spread(&self) -> Option<Price> {
        self.top_of_book().spread()
    }

    /// Integer-truncated `(best_ask + best_bid) / 2`, `None` unless both sides have levels
    #[must_use]
    pub fn mid_point(&self) -> Option<Price> {
        self.top_of_book().mid_point()
    }

    /// Check if the book is crossed (best bid >= best ask)
    ///
    /// The feed should never produce this; it flags a missed update.
    #[must_use]
    pub fn is_crossed(&self) -> bool {
        match self.top_of_book() {
            TopOfBook {
                bid: Some((bid, _)),
                ask: Some((ask, _)),
            } => bid >= ask,
            _ => false,
        }
    }

    /// Quantity resting at a price, `None` if there is no level
    #[must_use]
    pub fn level(&self, side: Side, price: Price) -> Option<Quantity> {
        self.state.read().side(side).quantity_at(price)
    }

    /// Get the top N bid levels, best first
    #[must_use]
    pub fn top_bids(&self, n: usize) -> Vec<(Price, Quantity)> {
        self.state.read().bids.iter().take(n).collect()
    }

    /// Get the top N ask levels, best first
    #[must_use]
    pub fn top_asks(&self, n: usize) -> Vec<(Price, Quantity)> {
        self.state.read().asks.iter().take(n).collect()
    }

    /// Total resting quantity on one side, widened so it cannot overflow
    #[must_use]
    pub fn total_quantity(&self, side: Side) -> i128 {
        self.state.read().side(side).total_quantity()
    }

    /// Get the number of price levels as `(bids, asks)`
    #[must_use]
    pub fn num_levels(&self) -> (usize, usize) {
        let state = self.state.read();
        (state.bids.len(), state.asks.len())
    }

    /// Check if the orderbook is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let state = self.state.read();
        state.bids.is_empty() && state.asks.is_empty()
    }

    /// Update counters since creation
    #[must_use]
    pub fn stats(&self) -> BookStats {
        BookStats {
            applied: self.applied.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
        }
    }

    /// Remove every level; counters are kept
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.bids.clear();
        state.asks.clear();
    }
}
