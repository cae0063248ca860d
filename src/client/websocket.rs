//! WebSocket client for the Coinbase Advanced Trade market data feed.
//!
//! This module provides the [`FeedClient`] for streaming `level2` order book
//! updates. It does not reconnect: when the server closes the connection,
//! [`FeedClient::next`] returns [`Error::ConnectionClosed`] and the caller
//! decides what to do.
//!
//! # Example
//!
//! ```rust,no_run
//! use coinbase_book::client::FeedClient;
//! use coinbase_book::orderbook::BookManager;
//! use coinbase_book::Config;
//!
//! # async fn example() -> coinbase_book::Result<()> {
//! let config = Config::new().with_instruments(["BTC-USD"]);
//! let manager = BookManager::with_instruments(config.instruments());
//!
//! let mut feed = FeedClient::connect(&config).await?;
//! feed.subscribe_level2(config.instruments()).await?;
//! feed.pump(&manager).await?;
//! # Ok(())
//! # }
//! ```

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::orderbook::BookManager;
use crate::types::messages::{FeedMessage, SubscribeCommand};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket client for real-time order book data
///
/// # Thread Safety
///
/// This client is NOT thread-safe. Run it on one task and share the
/// [`BookManager`] it feeds instead.
#[derive(Debug)]
pub struct FeedClient {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
    /// Products with an outstanding `level2` subscription
    subscribed: Vec<String>,
    /// Messages decoded so far
    received: u64,
}

impl FeedClient {
    /// Connect to the configured feed endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the connection
    /// fails, or the handshake exceeds the connect timeout.
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        config.validate()?;

        let endpoint = config.feed_endpoint();
        let (ws_stream, _response) =
            tokio::time::timeout(config.connect_timeout(), tokio_tungstenite::connect_async(endpoint))
                .await
                .map_err(|_| Error::Timeout)??;
        info!(%endpoint, "connected to market data feed");

        let (write, read) = ws_stream.split();

        Ok(Self {
            write,
            read,
            subscribed: Vec::new(),
            received: 0,
        })
    }

    /// Send a command to the WebSocket server
    async fn send_command(&mut self, cmd: &SubscribeCommand) -> Result<(), Error> {
        let json = serde_json::to_string(cmd)?;
        self.write.send(Message::Text(json)).await?;
        Ok(())
    }

    /// Subscribe to `level2` updates for the given products
    pub async fn subscribe_level2<S: AsRef<str>>(&mut self, product_ids: &[S]) -> Result<(), Error> {
        let cmd = SubscribeCommand::level2(product_ids);
        self.send_command(&cmd).await?;
        info!(products = ?cmd.product_ids, "subscribed to level2");

        for product in cmd.product_ids {
            if !self.subscribed.contains(&product) {
                self.subscribed.push(product);
            }
        }
        Ok(())
    }

    /// Unsubscribe from `level2` updates for the given products
    pub async fn unsubscribe_level2<S: AsRef<str>>(&mut self, product_ids: &[S]) -> Result<(), Error> {
        let cmd = SubscribeCommand::unsubscribe_level2(product_ids);
        self.send_command(&cmd).await?;
        self.subscribed.retain(|p| !cmd.product_ids.contains(p));
        Ok(())
    }

    /// Products with an outstanding `level2` subscription
    pub fn subscriptions(&self) -> &[String] {
        &self.subscribed
    }

    /// Number of messages decoded so far
    pub fn messages_received(&self) -> u64 {
        self.received
    }

    /// Receive the next message from the WebSocket
    ///
    /// Pings are answered automatically and binary frames are skipped.
    ///
    /// # Returns
    ///
    /// The next message, or `None` if the stream ended.
    pub async fn next(&mut self) -> Option<Result<FeedMessage, Error>> {
        loop {
            match self.read.next().await? {
                Ok(Message::Text(text)) => {
                    let result: Result<FeedMessage, _> = serde_json::from_str(&text);
                    match result {
                        Ok(msg) => {
                            self.received += 1;
                            return Some(Ok(msg));
                        }
                        Err(e) => return Some(Err(Error::from(e))),
                    }
                }
                Ok(Message::Ping(data)) => {
                    // Respond to pings automatically
                    if let Err(e) = self.write.send(Message::Pong(data)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "server closed connection");
                    return Some(Err(Error::ConnectionClosed));
                }
                Ok(_) => {
                    // Ignore other message types (Binary, Pong, Frame)
                    continue;
                }
                Err(e) => {
                    return Some(Err(e.into()));
                }
            }
        }
    }

    /// Feed every received message into `manager` until the connection ends.
    ///
    /// Undecodable frames are logged and skipped. Returns `Ok(())` when the
    /// server closes the connection or the stream ends.
    ///
    /// # Errors
    ///
    /// Returns transport errors and server error reports ([`Error::Feed`]).
    pub async fn pump(&mut self, manager: &BookManager) -> Result<(), Error> {
        while let Some(result) = self.next().await {
            let msg = match result {
                Ok(msg) => msg,
                Err(Error::ConnectionClosed) => break,
                Err(Error::Json(e)) => {
                    warn!(error = %e, "skipping undecodable feed message");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let summary = manager.process_message(&msg)?;
            debug!(
                sequence = msg.sequence_num,
                applied = summary.applied,
                "processed feed message"
            );
        }

        info!(received = self.received, "feed stream ended");
        Ok(())
    }

    /// Close the WebSocket connection
    pub async fn close(&mut self) -> Result<(), Error> {
        self.write.close().await?;
        Ok(())
    }
}
