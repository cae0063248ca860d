//! Property-style tests for the order book.
//!
//! Random update sequences are replayed against both the book and a plain
//! `BTreeMap` model; after every step the book's best prices must match the
//! model's extremes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use coinbase_book::orderbook::{ApplyOutcome, Orderbook};
use coinbase_book::types::fixed;
use coinbase_book::{Side, Update};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Reference model: per-side map with zero-quantity levels removed
#[derive(Default)]
struct Model {
    bids: BTreeMap<i64, i64>,
    asks: BTreeMap<i64, i64>,
}

impl Model {
    fn apply(&mut self, side: Side, price: i64, quantity: i64) {
        if price <= 0 || quantity < 0 {
            return;
        }
        let levels = match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };
        if quantity == 0 {
            levels.remove(&price);
        } else {
            levels.insert(price, quantity);
        }
    }

    fn best_bid(&self) -> Option<(i64, i64)> {
        self.bids.iter().next_back().map(|(&p, &q)| (p, q))
    }

    fn best_ask(&self) -> Option<(i64, i64)> {
        self.asks.iter().next().map(|(&p, &q)| (p, q))
    }
}

fn random_level(rng: &mut StdRng) -> (Side, i64, i64) {
    let side = if rng.gen_bool(0.5) { Side::Bid } else { Side::Ask };
    // narrow price range so removals hit existing levels often
    let price = rng.gen_range(-2..40);
    let quantity = if rng.gen_bool(0.4) {
        0
    } else {
        rng.gen_range(-1..1_000)
    };
    (side, price, quantity)
}

#[test]
fn best_prices_match_model_extremes() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let book = Orderbook::new("PROP");
        let mut model = Model::default();

        for step in 0..2_000 {
            let (side, price, quantity) = random_level(&mut rng);
            book.apply_level(side, price, quantity);
            model.apply(side, price, quantity);

            assert_eq!(book.best_bid(), model.best_bid(), "seed {seed} step {step}");
            assert_eq!(book.best_ask(), model.best_ask(), "seed {seed} step {step}");
            assert_eq!(
                book.num_levels(),
                (model.bids.len(), model.asks.len()),
                "seed {seed} step {step}"
            );
            let (bid_levels, ask_levels) = book.num_levels();
            assert_eq!(book.best_bid().is_none(), bid_levels == 0, "seed {seed} step {step}");
            assert_eq!(book.best_ask().is_none(), ask_levels == 0, "seed {seed} step {step}");
        }
    }
}

#[test]
fn depth_matches_model_order() {
    let mut rng = StdRng::seed_from_u64(42);
    let book = Orderbook::new("PROP");
    let mut model = Model::default();

    for _ in 0..5_000 {
        let (side, price, quantity) = random_level(&mut rng);
        book.apply_level(side, price, quantity);
        model.apply(side, price, quantity);
    }

    let expected_bids: Vec<_> = model.bids.iter().rev().map(|(&p, &q)| (p, q)).collect();
    let expected_asks: Vec<_> = model.asks.iter().map(|(&p, &q)| (p, q)).collect();
    assert_eq!(book.top_bids(usize::MAX), expected_bids);
    assert_eq!(book.top_asks(usize::MAX), expected_asks);
}

#[test]
fn repeated_updates_are_idempotent() {
    let mut rng = StdRng::seed_from_u64(7);
    let book = Orderbook::new("PROP");

    for _ in 0..1_000 {
        let (side, price, quantity) = random_level(&mut rng);
        book.apply_level(side, price, quantity);
        let before = (book.top_bids(usize::MAX), book.top_asks(usize::MAX));

        let again = book.apply_level(side, price, quantity);
        assert!(!matches!(again, ApplyOutcome::Inserted | ApplyOutcome::Removed));
        assert_eq!((book.top_bids(usize::MAX), book.top_asks(usize::MAX)), before);
    }
}

#[test]
fn codec_round_trips_random_values() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..10_000 {
        let value: i64 = rng.gen_range(0..=i64::MAX);
        assert_eq!(fixed::decode(&fixed::encode(value)), Ok(value));
    }
}

/// Readers must never observe a best price whose level is gone, nor a
/// best bid/ask pair taken from two different moments. The writer never
/// pulls the whole ladder, so an absent side is also a failure.
#[test]
fn concurrent_readers_see_consistent_books() {
    let book = Arc::new(Orderbook::new("RACE"));
    let done = Arc::new(AtomicBool::new(false));

    // a fixed ladder; the writer repeatedly pulls and restores its top levels
    for i in 1..=50 {
        book.apply_update(&Update::new(Side::Bid, format!("{}", 100 - i), "1"))
            .unwrap();
        book.apply_update(&Update::new(Side::Ask, format!("{}", 100 + i), "1"))
            .unwrap();
    }

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let book = Arc::clone(&book);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut reads = 0u64;
                while !done.load(Ordering::Acquire) {
                    let top = book.top_of_book();
                    let (Some((bid, bid_qty)), Some((ask, ask_qty))) = (top.bid, top.ask) else {
                        panic!("side reported absent while levels rest: {top:?}");
                    };
                    assert!(bid < ask, "crossed snapshot: {bid} >= {ask}");
                    assert!(bid_qty > 0 && ask_qty > 0);
                    assert_eq!(top.spread(), Some(ask - bid));

                    let (price, quantity) = book.best_bid().expect("bid side emptied");
                    assert!(quantity > 0);
                    assert!(price > 0);
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    let writer = {
        let book = Arc::clone(&book);
        thread::spawn(move || {
            let bids: Vec<i64> = (1..=50).map(|i| (100 - i) * fixed::SCALE).collect();
            let asks: Vec<i64> = (1..=50).map(|i| (100 + i) * fixed::SCALE).collect();
            for round in 0..2_000 {
                let depth = round % 40 + 1;
                for i in 0..depth {
                    book.apply_level(Side::Bid, bids[i], 0);
                    book.apply_level(Side::Ask, asks[i], 0);
                }
                for i in (0..depth).rev() {
                    book.apply_level(Side::Bid, bids[i], fixed::SCALE);
                    book.apply_level(Side::Ask, asks[i], fixed::SCALE);
                }
            }
        })
    };

    writer.join().unwrap();
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(book.num_levels(), (50, 50));
    assert_eq!(book.best_bid(), Some((99 * fixed::SCALE, fixed::SCALE)));
    assert_eq!(book.best_ask(), Some((101 * fixed::SCALE, fixed::SCALE)));
}
