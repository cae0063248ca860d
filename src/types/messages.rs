//! WebSocket message types.
//!
//! This module contains the subscribe command sent to Coinbase Advanced Trade
//! and the messages received on the `level2` channel.
//!
//! A `level2` data message looks like:
//!
//! ```json
//! {
//!   "channel": "l2_data",
//!   "client_id": "",
//!   "timestamp": "2023-02-09T20:32:50.714964855Z",
//!   "sequence_num": 0,
//!   "events": [
//!     {
//!       "type": "snapshot",
//!       "product_id": "BTC-USD",
//!       "updates": [
//!         {"side": "bid", "event_time": "...", "price_level": "21921.73", "new_quantity": "0.06317902"}
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::update::Update;

/// Channel name used when subscribing to order book updates
pub const LEVEL2_CHANNEL: &str = "level2";

/// Channel name Coinbase puts on `level2` data messages
pub const LEVEL2_DATA_CHANNEL: &str = "l2_data";

/// Kind of subscription command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    /// Start receiving a channel
    Subscribe,
    /// Stop receiving a channel
    Unsubscribe,
}

/// Subscription command sent to the server
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeCommand {
    /// Subscribe or unsubscribe
    #[serde(rename = "type")]
    pub command: CommandType,
    /// Products (instruments) to (un)subscribe
    pub product_ids: Vec<String>,
    /// Channel name
    pub channel: String,
}

impl SubscribeCommand {
    /// Subscribe to `level2` for the given products
    pub fn level2<S: AsRef<str>>(product_ids: &[S]) -> Self {
        Self {
            command: CommandType::Subscribe,
            product_ids: product_ids.iter().map(|s| s.as_ref().to_string()).collect(),
            channel: LEVEL2_CHANNEL.to_string(),
        }
    }

    /// Unsubscribe from `level2` for the given products
    pub fn unsubscribe_level2<S: AsRef<str>>(product_ids: &[S]) -> Self {
        Self {
            command: CommandType::Unsubscribe,
            ..Self::level2(product_ids)
        }
    }
}

/// Message received from the server
///
/// Every field is optional on the wire: data messages carry `channel` and
/// `events`, errors carry `type: "error"` and `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedMessage {
    /// Channel (`l2_data`, `subscriptions`, `heartbeats`, ...)
    #[serde(default)]
    pub channel: String,
    /// Client ID echoed by the server
    #[serde(default)]
    pub client_id: String,
    /// Server timestamp (RFC 3339)
    #[serde(default)]
    pub timestamp: String,
    /// Per-connection message sequence number (not validated by the book)
    #[serde(default)]
    pub sequence_num: u64,
    /// Events carried by this message
    #[serde(default)]
    pub events: Vec<FeedEvent>,
    /// Message type, only set on error messages
    #[serde(default, rename = "type")]
    pub message_type: Option<String>,
    /// Error text, only set on error messages
    #[serde(default)]
    pub message: Option<String>,
}

impl FeedMessage {
    /// Whether this message carries order book updates
    #[must_use]
    pub fn is_level2(&self) -> bool {
        self.channel == LEVEL2_DATA_CHANNEL
    }

    /// Error text if the server rejected something
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self.message_type.as_deref() {
            Some("error") => Some(self.message.as_deref().unwrap_or("")),
            _ => None,
        }
    }
}

/// Kind of `level2` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Initial full book, one update per resting level
    Snapshot,
    /// Incremental level changes
    Update,
}

/// One event inside a [`FeedMessage`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedEvent {
    /// Snapshot or update (absent on non-`level2` channels)
    #[serde(default, rename = "type")]
    pub kind: Option<EventKind>,
    /// Product the updates belong to
    #[serde(default)]
    pub product_id: String,
    /// Level updates in feed order
    #[serde(default)]
    pub updates: Vec<Update>,
    /// Active subscriptions, only on the `subscriptions` channel
    #[serde(default)]
    pub subscriptions: Option<HashMap<String, Vec<String>>>,
}
