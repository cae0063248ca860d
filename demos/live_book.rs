//! Live order book - streams Coinbase level2 data and prints top of book
//!
//! Usage:
//!   cargo run --example live_book
//!
//! Optional:
//!   COINBASE_PRODUCTS=BTC-USD,ETH-USD  # Instruments (default: BTC-USD)
//!   COINBASE_FEED_URL=wss://...        # Feed endpoint
//!   RUST_LOG=coinbase_book=debug       # Log level

use std::sync::Arc;
use std::time::Duration;

use coinbase_book::client::FeedClient;
use coinbase_book::orderbook::BookManager;
use coinbase_book::types::fixed;
use coinbase_book::Config;

fn show(level: Option<(i64, i64)>) -> String {
    match level {
        Some((price, qty)) => format!("{} @ {}", fixed::encode(qty), fixed::encode(price)),
        None => "-".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coinbase_book=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    println!("=== Coinbase Live Order Book ===\n");
    println!("Endpoint: {}", config.feed_endpoint());
    println!("Products: {}\n", config.instruments().join(", "));

    let manager = Arc::new(BookManager::with_instruments(config.instruments()));

    let mut feed = FeedClient::connect(&config).await?;
    feed.subscribe_level2(config.instruments()).await?;

    // Reader task: print top of book once per second while the feed runs
    let reader = Arc::clone(&manager);
    let printer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            let mut instruments = reader.instruments();
            instruments.sort();
            for instrument in instruments {
                let Some(book) = reader.get_orderbook(&instrument) else {
                    continue;
                };
                let top = book.top_of_book();
                let (bids, asks) = book.num_levels();
                let stats = book.stats();
                println!(
                    "{:<10} bid {:<32} ask {:<32} spread {:>16} mid {:>18} levels {}/{} dropped {}",
                    instrument,
                    show(top.bid),
                    show(top.ask),
                    top.spread().map(fixed::encode).unwrap_or_else(|| "-".into()),
                    top.mid_point().map(fixed::encode).unwrap_or_else(|| "-".into()),
                    bids,
                    asks,
                    stats.dropped + stats.parse_failures,
                );
            }
        }
    });

    tokio::select! {
        result = feed.pump(&manager) => result?,
        _ = tokio::signal::ctrl_c() => println!("\nShutting down..."),
    }

    let _ = feed.close().await;
    printer.abort();
    Ok(())
}
