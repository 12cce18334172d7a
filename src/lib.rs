//! # Oracle Arena
//!
//! A turn-based duel between a player and a computer opponent whose damage
//! and defense are scaled by live crypto price movements.
//!
//! ## Overview
//!
//! The [`battle`] module holds the match state machine and the pure damage
//! formulas. The [`oracle`] module keeps the latest ETH/USD and BTC/USD
//! snapshots, refreshed from a remote price API or by simulated drift. The
//! [`wallet`] module provides the account that stakes, payouts and loot box
//! costs are booked against.
//!
//! ## Architecture
//!
//! The API is built using the Rocket web framework with OpenAPI documentation
//! support. The engine lives behind an `Arc<Mutex<_>>` so every request and
//! the background pacing task see one consistent match.

// Rocket makes this a bit tricky to support
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::fairing::AdHoc;
use rocket::fs::FileServer;
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};

pub mod assets;
pub mod battle;
pub mod config;
pub mod health;
pub mod oracle;
pub mod pacing;
pub mod rate_limit;
pub mod rng;
pub mod security;
pub mod status_messages;
pub mod wallet;

use crate::assets::StaticDir;
use crate::battle::{BattleEngine, BattleLog};
use crate::config::ArenaConfig;
use crate::oracle::{OracleClient, SharedFeed};
use crate::pacing::Pacer;
use crate::rate_limit::RateLimiter;
use crate::rng::{PcgSource, RandomSource};
use crate::security::SecurityHeaders;
use crate::wallet::SimulatedWallet;

/// The single match shared by every request and the pacing task.
pub type SharedEngine = Arc<rocket::futures::lock::Mutex<BattleEngine>>;

/// Initializes the Rocket web server from environment configuration.
///
/// # Example
///
/// ```no_run
/// use oracle_arena::rocket_initialize;
///
/// #[rocket::main]
/// async fn main() {
///     rocket_initialize().launch().await.expect("Failed to launch rocket");
/// }
/// ```
pub fn rocket_initialize() -> rocket::Rocket<rocket::Build> {
    rocket_with_config(ArenaConfig::from_env())
}

fn random_source(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(PcgSource::from_seed(seed)),
        None => Box::new(PcgSource::from_entropy()),
    }
}

/// Builds the server with an explicit configuration.
pub fn rocket_with_config(config: ArenaConfig) -> rocket::Rocket<rocket::Build> {
    use crate::battle::endpoints::*;
    use crate::oracle::endpoints::*;
    use crate::rng::{okapi_add_operation_for_set_seed_, set_seed};
    use crate::wallet::endpoints::*;

    #[allow(clippy::no_effect_underscore_binding)]
    let _ = env_logger::try_init();

    let battle_log = Arc::new(BattleLog::new());
    let feed = SharedFeed::default();
    let engine = BattleEngine::new(
        random_source(config.seed),
        Box::new(feed.clone()),
        Box::new(SimulatedWallet::new()),
    )
    .with_log(battle_log.clone());
    let engine: SharedEngine = Arc::new(rocket::futures::lock::Mutex::new(engine));
    let client = OracleClient::new(config.oracle_api_url.clone(), config.oracle_api_key.clone());
    let static_dir = StaticDir(config.static_dir.clone());

    let figment = rocket::Config::figment().merge(("port", config.port));

    let mut rocket = rocket::custom(figment)
        .mount(
            "/",
            openapi_get_routes![
                get_battle,
                join_battle,
                submit_action,
                resolve_opponent_turn,
                tick_turn_timer,
                complete_settlement,
                open_loot_box,
                list_battle_log,
                clear_battle_log,
                get_wallet,
                connect_wallet,
                disconnect_wallet,
                get_prices,
                set_seed
            ],
        )
        .mount("/swagger", make_swagger_ui(&get_docs()))
        .mount(
            "/",
            rocket::routes![
                crate::health::health,
                proxy_price,
                crate::assets::index_fallback,
            ],
        )
        .register(
            "/",
            rocket::catchers![
                crate::rate_limit::too_many_requests,
                crate::status_messages::not_found,
                crate::status_messages::internal_error,
            ],
        );

    if static_dir.exists() {
        rocket = rocket.mount("/", FileServer::from(&static_dir.0));
    } else {
        log::warn!("Static directory {} not found, serving API only", static_dir.0.display());
    }

    rocket
        .manage(engine)
        .manage(battle_log)
        .manage(feed)
        .manage(client)
        .manage(static_dir)
        .manage(RateLimiter::new(config.rate_limit_max, config.rate_limit_window))
        .manage(config.clone())
        .attach(SecurityHeaders {
            long_static_cache: config.is_production(),
        })
        .attach(AdHoc::on_liftoff("arena-autopilot", move |rocket| {
            Box::pin(async move {
                log::info!(
                    "Oracle Arena running on port {} ({})",
                    config.port,
                    config.environment
                );
                if !config.autopilot {
                    return;
                }
                let engine = rocket.state::<SharedEngine>().cloned();
                let feed = rocket.state::<SharedFeed>().cloned();
                let client = rocket.state::<OracleClient>().cloned();
                if let (Some(engine), Some(feed), Some(client)) = (engine, feed, client) {
                    let feed_rng = random_source(config.seed.map(|s| s.wrapping_add(1)));
                    oracle::poller::spawn_feed_poller(feed, client, feed_rng, config.feed_poll);
                    pacing::spawn_pacer(
                        engine,
                        Pacer::new(config.opponent_delay, config.settlement_delay),
                    );
                }
            })
        }))
        .attach(AdHoc::on_liftoff("battle-log-shutdown", |rocket| {
            Box::pin(async move {
                // Rocket resolves this on ctrl-c, SIGTERM or an explicit notify
                if let Some(battle_log) = rocket.state::<Arc<BattleLog>>().cloned() {
                    rocket::tokio::spawn(log_shutdown(rocket.shutdown(), battle_log));
                }
            })
        }))
}

/// Wait for `signal`, then record the shutdown in the log and the battle log.
pub async fn log_shutdown<F>(signal: F, battle_log: Arc<BattleLog>)
where
    F: std::future::Future<Output = ()>,
{
    signal.await;
    log::info!("Shutdown requested, stopping Oracle Arena");
    battle_log.append("Server shutting down");
}

fn get_docs() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}
