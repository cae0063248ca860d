//! Per-side price level storage with best-price tracking.
//!
//! Quantities live in an `FxHashMap` for O(1) lookup by price. A `BTreeSet`
//! index over the same keys makes recomputing the best price after the top
//! level is removed O(log n) instead of a full scan.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::types::{Price, Quantity, Side};

/// Best-price value meaning "no levels on this side"
pub const NO_PRICE: Price = 0;

/// What a level change did to one side of the book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new price level was added
    Inserted,
    /// An existing level's quantity was overwritten
    Updated,
    /// A level was deleted
    Removed,
    /// Zero quantity for a price that had no level
    Ignored,
    /// Non-positive price or negative quantity; nothing changed
    Dropped,
}

impl ApplyOutcome {
    /// Whether the book state changed
    #[must_use]
    pub const fn is_change(self) -> bool {
        matches!(self, Self::Inserted | Self::Updated | Self::Removed)
    }
}

/// One side of the book: levels, their ordered index and the cached best.
///
/// Invariants, held after every call:
///
/// - every stored quantity is `> 0`
/// - `index` holds exactly the keys of `levels`
/// - `best` is the max key (bids) / min key (asks), or [`NO_PRICE`] when empty
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: FxHashMap<Price, Quantity>,
    index: BTreeSet<Price>,
    best: Price,
}

impl BookSide {
    /// Create an empty side
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: FxHashMap::default(),
            index: BTreeSet::new(),
            best: NO_PRICE,
        }
    }

    /// Set or remove a level.
    ///
    /// `price <= 0` or `quantity < 0` is [`ApplyOutcome::Dropped`] and leaves
    /// the side untouched; a zero price would collide with [`NO_PRICE`].
    pub fn apply(&mut self, price: Price, quantity: Quantity) -> ApplyOutcome {
        if price <= 0 || quantity < 0 {
            return ApplyOutcome::Dropped;
        }

        if quantity == 0 {
            return self.remove(price);
        }

        let outcome = match self.levels.insert(price, quantity) {
            Some(_) => ApplyOutcome::Updated,
            None => {
                self.index.insert(price);
                ApplyOutcome::Inserted
            }
        };

        // a new level can only improve the best, never worsen it
        if self.improves_best(price) {
            self.best = price;
        }

        outcome
    }

    fn remove(&mut self, price: Price) -> ApplyOutcome {
        if self.levels.remove(&price).is_none() {
            return ApplyOutcome::Ignored;
        }
        self.index.remove(&price);

        if price == self.best {
            self.best = self.edge_of_index();
        }

        ApplyOutcome::Removed
    }

    fn improves_best(&self, price: Price) -> bool {
        match self.side {
            Side::Bid => price > self.best,
            Side::Ask => self.best == NO_PRICE || price < self.best,
        }
    }

    fn edge_of_index(&self) -> Price {
        let edge = match self.side {
            Side::Bid => self.index.last(),
            Side::Ask => self.index.first(),
        };
        edge.copied().unwrap_or(NO_PRICE)
    }

    /// Best price and its quantity, `None` when the side is empty
    #[must_use]
    pub fn best(&self) -> Option<(Price, Quantity)> {
        if self.best == NO_PRICE {
            debug_assert!(self.levels.is_empty(), "{} side has levels but no best", self.side);
            return None;
        }
        let quantity = self.levels.get(&self.best).copied();
        debug_assert!(quantity.is_some(), "{} best {} has no level", self.side, self.best);
        quantity.map(|q| (self.best, q))
    }

    /// Cached best price, [`NO_PRICE`] when empty
    #[must_use]
    pub const fn best_price(&self) -> Price {
        self.best
    }

    /// Quantity resting at `price`
    #[must_use]
    pub fn quantity_at(&self, price: Price) -> Option<Quantity> {
        self.levels.get(&price).copied()
    }

    /// Levels from best to worst
    pub fn iter(&self) -> Box<dyn Iterator<Item = (Price, Quantity)> + '_> {
        let quantity = move |p: &Price| (*p, self.levels[p]);
        match self.side {
            Side::Bid => Box::new(self.index.iter().rev().map(quantity)),
            Side::Ask => Box::new(self.index.iter().map(quantity)),
        }
    }

    /// Sum of all resting quantity.
    ///
    /// Widened to `i128`: a handful of large levels can exceed `i64::MAX`.
    #[must_use]
    pub fn total_quantity(&self) -> i128 {
        self.levels.values().map(|&q| i128::from(q)).sum()
    }

    /// Number of price levels
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the side has no levels
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Remove every level
    pub fn clear(&mut self) {
        self.levels.clear();
        self.index.clear();
        self.best = NO_PRICE;
    }
}
