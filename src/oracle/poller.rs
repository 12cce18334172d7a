//! Background refresh of the shared feed board.

use std::time::Duration;

use super::simulate::simulate_step;
use super::{AssetPair, FeedSource, OracleClient, SharedFeed};
use crate::rng::RandomSource;

/// Refresh both pairs once.
///
/// With an API key the remote feed is tried first; any failure falls back to a
/// simulated step so the engine only ever sees stale-or-fresh data, never an error.
pub async fn refresh(
    feed: &SharedFeed,
    client: &OracleClient,
    rng: &mut dyn RandomSource,
) -> FeedSource {
    if client.has_api_key() {
        let (eth, btc) = rocket::futures::future::join(
            client.fetch_snapshot(AssetPair::EthUsd),
            client.fetch_snapshot(AssetPair::BtcUsd),
        )
        .await;
        match (eth, btc) {
            (Ok(eth), Ok(btc)) => {
                feed.publish(eth, btc, FeedSource::Remote);
                return FeedSource::Remote;
            }
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Oracle price feed update failed, simulating: {}", e);
            }
        }
    }
    simulate(feed, rng);
    FeedSource::Simulated
}

/// Apply one simulated drift step to both pairs.
pub fn simulate(feed: &SharedFeed, rng: &mut dyn RandomSource) {
    let board = feed.board();
    let eth = simulate_step(AssetPair::EthUsd, &board.eth_usd, rng);
    let btc = simulate_step(AssetPair::BtcUsd, &board.btc_usd, rng);
    feed.publish(eth, btc, FeedSource::Simulated);
}

/// Spawn the refresh loop on Rocket's runtime.
pub fn spawn_feed_poller(
    feed: SharedFeed,
    client: OracleClient,
    mut rng: Box<dyn RandomSource>,
    every: Duration,
) {
    rocket::tokio::spawn(async move {
        let mut interval = rocket::tokio::time::interval(every);
        loop {
            interval.tick().await;
            let source = refresh(&feed, &client, rng.as_mut()).await;
            log::debug!("Oracle feed refreshed ({:?})", source);
        }
    });
}
