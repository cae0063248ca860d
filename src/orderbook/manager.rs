//! Orderbook manager for handling multiple instruments fed from one connection.
//!
//! This module provides [`BookManager`], a thread-safe registry of
//! [`Orderbook`]s that routes decoded feed messages to the right book.
//!
//! # Design
//!
//! Each book carries its own lock, so an update to `ETH-USD` never blocks a
//! reader of `BTC-USD`. The manager's `RwLock` only guards the registry;
//! lookups hand out an `Arc<Orderbook>` and release it immediately.
//!
//! # Error Policy
//!
//! A malformed update is dropped, counted on its book and logged; the rest of
//! the message is still applied. Updates for untracked instruments are
//! skipped.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::types::messages::{EventKind, FeedMessage};
use crate::types::{Price, Quantity, Update};

use super::levels::ApplyOutcome;
use super::Orderbook;

/// What processing one [`FeedMessage`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageSummary {
    /// Updates that changed a book
    pub applied: usize,
    /// Updates that were valid but changed nothing (zero size on an absent level)
    pub ignored: usize,
    /// Updates rejected for a non-positive price or negative quantity
    pub dropped: usize,
    /// Updates with undecodable decimal strings
    pub parse_failures: usize,
    /// Updates for instruments the manager does not track
    pub untracked: usize,
    /// Snapshot events applied to a tracked book
    pub snapshots: usize,
}

impl MessageSummary {
    fn record(&mut self, outcome: ApplyOutcome) {
        match outcome {
            ApplyOutcome::Inserted | ApplyOutcome::Updated | ApplyOutcome::Removed => {
                self.applied += 1
            }
            ApplyOutcome::Ignored => self.ignored += 1,
            ApplyOutcome::Dropped => self.dropped += 1,
        }
    }
}

/// Manager for multiple orderbooks with feed integration.
///
/// # Thread Safety
///
/// The manager is safe to share across threads via `Arc<BookManager>`.
///
/// # Example
///
/// ```rust
/// use coinbase_book::orderbook::BookManager;
/// use coinbase_book::types::{Side, Update};
///
/// let manager = BookManager::new();
/// manager.add_instrument("BTC-USD");
///
/// manager.apply_update("BTC-USD", &Update::new(Side::Bid, "21921.73", "0.5"))?;
///
/// if let Some(book) = manager.get_orderbook("BTC-USD") {
///     println!("Best bid: {:?}", book.best_bid());
/// }
/// # Ok::<(), coinbase_book::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct BookManager {
    /// Orderbooks by instrument
    books: RwLock<FxHashMap<String, Arc<Orderbook>>>,
}

impl BookManager {
    /// Create a new, empty manager
    pub fn new() -> Self {
        Self {
            books: RwLock::new(FxHashMap::default()),
        }
    }

    /// Create a manager tracking the given instruments
    pub fn with_instruments<I, S>(instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let manager = Self::new();
        for instrument in instruments {
            manager.add_instrument(instrument);
        }
        manager
    }

    /// Start tracking an instrument with an empty book
    ///
    /// Adding an instrument that is already tracked keeps its existing book.
    pub fn add_instrument(&self, instrument: impl Into<String>) -> Arc<Orderbook> {
        let instrument = instrument.into();
        let mut books = self.books.write();
        books
            .entry(instrument.clone())
            .or_insert_with(|| {
                debug!(%instrument, "tracking instrument");
                Arc::new(Orderbook::new(instrument))
            })
            .clone()
    }

    /// Stop tracking an instrument, returning its book
    pub fn remove_instrument(&self, instrument: &str) -> Option<Arc<Orderbook>> {
        self.books.write().remove(instrument)
    }

    /// Get a shared handle to an instrument's book
    pub fn get_orderbook(&self, instrument: &str) -> Option<Arc<Orderbook>> {
        self.books.read().get(instrument).cloned()
    }

    /// Get best bid for an instrument
    pub fn best_bid(&self, instrument: &str) -> Option<(Price, Quantity)> {
        self.get_orderbook(instrument).and_then(|b| b.best_bid())
    }

    /// Get best ask for an instrument
    pub fn best_ask(&self, instrument: &str) -> Option<(Price, Quantity)> {
        self.get_orderbook(instrument).and_then(|b| b.best_ask())
    }

    /// Get spread for an instrument
    pub fn spread(&self, instrument: &str) -> Option<Price> {
        self.get_orderbook(instrument).and_then(|b| b.spread())
    }

    /// Get mid point for an instrument
    pub fn mid_point(&self, instrument: &str) -> Option<Price> {
        self.get_orderbook(instrument).and_then(|b| b.mid_point())
    }

    /// Apply a single update to a tracked instrument
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownInstrument`] if the instrument is not tracked
    /// - [`Error::Parse`] if the update's decimal strings are malformed
    pub fn apply_update(&self, instrument: &str, update: &Update) -> Result<ApplyOutcome, Error> {
        let book = self
            .get_orderbook(instrument)
            .ok_or_else(|| Error::UnknownInstrument(instrument.to_string()))?;
        book.apply_update(update)
    }

    /// Process a feed message
    ///
    /// Applies every `level2` update, in delivery order, to its instrument's
    /// book. Non-`level2` messages are ignored (subscription confirmations are
    /// logged). Returns what happened to each update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Feed`] if the message is a server error report. Bad
    /// individual updates never fail the call.
    pub fn process_message(&self, message: &FeedMessage) -> Result<MessageSummary, Error> {
        if let Some(reason) = message.error_message() {
            return Err(Error::Feed(reason.to_string()));
        }

        let mut summary = MessageSummary::default();

        if !message.is_level2() {
            for subs in message.events.iter().filter_map(|e| e.subscriptions.as_ref()) {
                info!(channel = %message.channel, subscriptions = ?subs, "subscriptions confirmed");
            }
            return Ok(summary);
        }

        for event in &message.events {
            let Some(book) = self.get_orderbook(&event.product_id) else {
                debug!(instrument = %event.product_id, "skipping untracked instrument");
                summary.untracked += event.updates.len();
                continue;
            };

            if event.kind == Some(EventKind::Snapshot) {
                summary.snapshots += 1;
                debug!(instrument = %event.product_id, levels = event.updates.len(), "applying snapshot");
            }

            for update in &event.updates {
                match book.apply_update(update) {
                    Ok(outcome) => summary.record(outcome),
                    // already counted and logged by the book
                    Err(_) => summary.parse_failures += 1,
                }
            }
        }

        if summary.parse_failures > 0 || summary.dropped > 0 {
            warn!(
                sequence = message.sequence_num,
                dropped = summary.dropped,
                parse_failures = summary.parse_failures,
                "skipped bad level updates"
            );
        }

        Ok(summary)
    }

    /// Clear all books (instruments stay tracked)
    pub fn clear(&self) {
        for book in self.books.read().values() {
            book.clear();
        }
    }

    /// Get number of tracked instruments
    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    /// Check if manager has no instruments
    pub fn is_empty(&self) -> bool {
        self.books.read().is_empty()
    }

    /// Get all tracked instruments
    pub fn instruments(&self) -> Vec<String> {
        self.books.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{fixed, Side};

    fn level2(json_events: &str) -> FeedMessage {
        let json = format!(
            r#"{{"channel": "l2_data", "client_id": "", "timestamp": "2023-02-09T20:32:50Z", "sequence_num": 3, "events": {}}}"#,
            json_events
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_add_instrument() {
        let manager = BookManager::new();
        let first = manager.add_instrument("BTC-USD");
        let again = manager.add_instrument("BTC-USD");

        assert_eq!(manager.len(), 1);
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(manager.instruments(), vec!["BTC-USD".to_string()]);
    }

    #[test]
    fn test_remove_instrument() {
        let manager = BookManager::with_instruments(["BTC-USD", "ETH-USD"]);
        assert!(manager.remove_instrument("ETH-USD").is_some());
        assert!(manager.remove_instrument("ETH-USD").is_none());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_apply_update_unknown_instrument() {
        let manager = BookManager::new();
        let result = manager.apply_update("BTC-USD", &Update::new(Side::Bid, "1", "1"));
        assert!(matches!(result, Err(Error::UnknownInstrument(_))));
    }

    #[test]
    fn test_process_snapshot_then_update() {
        let manager = BookManager::with_instruments(["BTC-USD"]);

        let snapshot = level2(
            r#"[{"type": "snapshot", "product_id": "BTC-USD", "updates": [
                {"side": "bid", "event_time": "t", "price_level": "99", "new_quantity": "1"},
                {"side": "bid", "event_time": "t", "price_level": "101", "new_quantity": "1"},
                {"side": "offer", "event_time": "t", "price_level": "102", "new_quantity": "2"}
            ]}]"#,
        );
        let summary = manager.process_message(&snapshot).unwrap();
        assert_eq!(summary.applied, 3);
        assert_eq!(summary.snapshots, 1);

        let delta = level2(
            r#"[{"type": "update", "product_id": "BTC-USD", "updates": [
                {"side": "bid", "event_time": "t", "price_level": "101", "new_quantity": "0"}
            ]}]"#,
        );
        let summary = manager.process_message(&delta).unwrap();
        assert_eq!(summary.snapshots, 0);

        let px = |s| fixed::decode(s).unwrap();
        assert_eq!(manager.best_bid("BTC-USD"), Some((px("99"), px("1"))));
        assert_eq!(manager.best_ask("BTC-USD"), Some((px("102"), px("2"))));
        assert_eq!(manager.spread("BTC-USD"), Some(px("3")));
        assert_eq!(manager.mid_point("BTC-USD"), Some(px("100.5")));
    }

    #[test]
    fn test_bad_updates_are_skipped() {
        let manager = BookManager::with_instruments(["BTC-USD"]);

        let msg = level2(
            r#"[{"type": "update", "product_id": "BTC-USD", "updates": [
                {"side": "bid", "event_time": "t", "price_level": "abc", "new_quantity": "1"},
                {"side": "bid", "event_time": "t", "price_level": "0", "new_quantity": "1"},
                {"side": "bid", "event_time": "t", "price_level": "5", "new_quantity": "0"},
                {"side": "bid", "event_time": "t", "price_level": "10", "new_quantity": "1"}
            ]}]"#,
        );
        let summary = manager.process_message(&msg).unwrap();

        assert_eq!(
            summary,
            MessageSummary {
                applied: 1,
                ignored: 1,
                dropped: 1,
                parse_failures: 1,
                untracked: 0,
                snapshots: 0,
            }
        );
        let book = manager.get_orderbook("BTC-USD").unwrap();
        assert_eq!(book.num_levels(), (1, 0));
        assert_eq!(book.stats().parse_failures, 1);
        assert_eq!(book.stats().dropped, 1);
    }

    #[test]
    fn test_untracked_instrument_skipped() {
        let manager = BookManager::with_instruments(["BTC-USD"]);

        let msg = level2(
            r#"[{"type": "update", "product_id": "ETH-USD", "updates": [
                {"side": "bid", "event_time": "t", "price_level": "1650", "new_quantity": "1"}
            ]}]"#,
        );
        let summary = manager.process_message(&msg).unwrap();

        assert_eq!(summary.untracked, 1);
        assert!(manager.get_orderbook("BTC-USD").unwrap().is_empty());
        assert!(manager.get_orderbook("ETH-USD").is_none());
    }

    #[test]
    fn test_non_level2_message_ignored() {
        let manager = BookManager::with_instruments(["BTC-USD"]);
        let msg: FeedMessage = serde_json::from_str(
            r#"{"channel": "subscriptions", "events": [{"subscriptions": {"level2": ["BTC-USD"]}}]}"#,
        )
        .unwrap();

        assert_eq!(manager.process_message(&msg).unwrap(), MessageSummary::default());
    }

    #[test]
    fn test_error_message_is_error() {
        let manager = BookManager::new();
        let msg: FeedMessage =
            serde_json::from_str(r#"{"type": "error", "message": "bad product"}"#).unwrap();

        assert!(matches!(manager.process_message(&msg), Err(Error::Feed(_))));
    }

    #[test]
    fn test_clear() {
        let manager = BookManager::with_instruments(["BTC-USD"]);
        manager
            .apply_update("BTC-USD", &Update::new(Side::Ask, "10", "1"))
            .unwrap();

        manager.clear();

        assert_eq!(manager.len(), 1);
        assert!(manager.get_orderbook("BTC-USD").unwrap().is_empty());
    }
}
