//! Oracle price feed: asset pairs, snapshots and the shared feed board.
//!
//! The battle engine only ever reads the latest snapshot through
//! [`OracleFeed`]. Refreshing (remote fetch or simulated drift) happens
//! elsewhere, in [`poller`], and swaps whole snapshots under a write lock so
//! price, percent change and fractional delta are never observed half-updated.

pub mod client;
pub mod endpoints;
pub mod poller;
pub mod simulate;

use std::str::FromStr;
use std::sync::{Arc, RwLock};

use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

pub use client::{OracleClient, OracleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum AssetPair {
    EthUsd,
    BtcUsd,
}

impl AssetPair {
    /// Symbol used by the remote price API.
    pub fn symbol(self) -> &'static str {
        match self {
            AssetPair::EthUsd => "ETH/USD",
            AssetPair::BtcUsd => "BTC/USD",
        }
    }
}

impl FromStr for AssetPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "ETHUSD" => Ok(AssetPair::EthUsd),
            "BTCUSD" => Ok(AssetPair::BtcUsd),
            _ => Err(format!("Unknown asset pair {}", s)),
        }
    }
}

/// One tracked asset feed reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PriceSnapshot {
    pub price: f64,
    /// Signed, percent units.
    pub percent_change: f64,
    /// Always `percent_change / 100`.
    pub fractional_delta: f64,
}

impl PriceSnapshot {
    pub fn from_change(price: f64, percent_change: f64) -> Self {
        PriceSnapshot {
            price,
            percent_change,
            fractional_delta: percent_change / 100.0,
        }
    }

    /// Snapshot for a move from `previous` to `price`.
    pub fn from_move(previous: f64, price: f64) -> Self {
        let fractional_delta = (price - previous) / previous;
        PriceSnapshot {
            price,
            percent_change: fractional_delta * 100.0,
            fractional_delta,
        }
    }

    /// A flat reading: oracle multipliers evaluate to exactly 1.0.
    pub fn flat(price: f64) -> Self {
        PriceSnapshot::from_change(price, 0.0)
    }
}

/// Read access to the latest oracle snapshots.
pub trait OracleFeed: Send {
    fn snapshot(&self, pair: AssetPair) -> PriceSnapshot;
}

/// Where the current board came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum FeedSource {
    Initial,
    Remote,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct FeedBoard {
    pub eth_usd: PriceSnapshot,
    pub btc_usd: PriceSnapshot,
    pub source: FeedSource,
    /// Milliseconds since the unix epoch of the last refresh, if any.
    pub updated_at_ms: Option<u128>,
}

impl Default for FeedBoard {
    fn default() -> Self {
        FeedBoard {
            eth_usd: PriceSnapshot::from_change(3245.67, 1.2),
            btc_usd: PriceSnapshot::from_change(96913.07, -0.8),
            source: FeedSource::Initial,
            updated_at_ms: None,
        }
    }
}

impl FeedBoard {
    pub fn get(&self, pair: AssetPair) -> PriceSnapshot {
        match pair {
            AssetPair::EthUsd => self.eth_usd,
            AssetPair::BtcUsd => self.btc_usd,
        }
    }
}

/// Feed board shared between the poller (writer) and the engine (reader).
#[derive(Debug, Clone, Default)]
pub struct SharedFeed {
    board: Arc<RwLock<FeedBoard>>,
}

impl SharedFeed {
    pub fn new(board: FeedBoard) -> Self {
        SharedFeed {
            board: Arc::new(RwLock::new(board)),
        }
    }

    pub fn board(&self) -> FeedBoard {
        match self.board.read() {
            Ok(g) => g.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }

    /// Replace both snapshots at once.
    pub fn publish(&self, eth_usd: PriceSnapshot, btc_usd: PriceSnapshot, source: FeedSource) {
        let updated_at_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .ok();
        let next = FeedBoard {
            eth_usd,
            btc_usd,
            source,
            updated_at_ms,
        };
        match self.board.write() {
            Ok(mut g) => *g = next,
            Err(e) => *e.into_inner() = next,
        }
    }
}

impl OracleFeed for SharedFeed {
    fn snapshot(&self, pair: AssetPair) -> PriceSnapshot {
        self.board().get(pair)
    }
}

/// A feed that never changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedFeed {
    pub eth_usd: PriceSnapshot,
    pub btc_usd: PriceSnapshot,
}

impl FixedFeed {
    pub fn new(eth_usd: PriceSnapshot, btc_usd: PriceSnapshot) -> Self {
        FixedFeed { eth_usd, btc_usd }
    }

    /// Zero delta on both pairs, so every oracle multiplier is 1.0.
    pub fn flat() -> Self {
        FixedFeed::new(PriceSnapshot::flat(3245.67), PriceSnapshot::flat(96913.07))
    }
}

impl OracleFeed for FixedFeed {
    fn snapshot(&self, pair: AssetPair) -> PriceSnapshot {
        match pair {
            AssetPair::EthUsd => self.eth_usd,
            AssetPair::BtcUsd => self.btc_usd,
        }
    }
}
