//! Server configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ORACLE_API_URL: &str = "https://prod-kline-rest.supra.com";

#[derive(Clone, Debug, PartialEq)]
pub struct ArenaConfig {
    pub port: u16,
    /// Reported by the health check; `production` enables long static cache headers.
    pub environment: String,
    pub oracle_api_key: Option<String>,
    pub oracle_api_url: String,
    pub feed_poll: Duration,
    pub static_dir: PathBuf,
    /// Fixed RNG seed; entropy when unset.
    pub seed: Option<u64>,
    pub opponent_delay: Duration,
    pub settlement_delay: Duration,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    /// Spawn the pacing and feed tasks at liftoff.
    pub autopilot: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            environment: "development".to_string(),
            oracle_api_key: None,
            oracle_api_url: DEFAULT_ORACLE_API_URL.to_string(),
            feed_poll: Duration::from_secs(8),
            static_dir: PathBuf::from("dist"),
            seed: None,
            opponent_delay: Duration::from_millis(4500),
            settlement_delay: Duration::from_millis(5000),
            rate_limit_max: 100,
            rate_limit_window: Duration::from_secs(900),
            autopilot: true,
        }
    }
}

impl ArenaConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `PORT` (default: 3000)
    /// - `APP_ENV` (default: development)
    /// - `ORACLE_API_KEY` (default: unset, simulation only)
    /// - `ORACLE_API_URL` (default: https://prod-kline-rest.supra.com)
    /// - `FEED_POLL_SECS` (default: 8)
    /// - `STATIC_DIR` (default: dist)
    /// - `ARENA_SEED` (default: unset)
    /// - `OPPONENT_DELAY_MS` (default: 4500)
    /// - `SETTLEMENT_DELAY_MS` (default: 5000)
    /// - `RATE_LIMIT_MAX` (default: 100)
    /// - `RATE_LIMIT_WINDOW_SECS` (default: 900)
    /// - `ARENA_AUTOPILOT` (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = parse_var::<u16, _>(&lookup, "PORT") {
            config.port = port;
        }
        if let Some(env) = non_empty(&lookup, "APP_ENV") {
            config.environment = env;
        }
        config.oracle_api_key = non_empty(&lookup, "ORACLE_API_KEY");
        if let Some(url) = non_empty(&lookup, "ORACLE_API_URL") {
            config.oracle_api_url = url;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "FEED_POLL_SECS") {
            config.feed_poll = Duration::from_secs(secs.max(1));
        }
        if let Some(dir) = non_empty(&lookup, "STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        config.seed = parse_var::<u64, _>(&lookup, "ARENA_SEED");
        if let Some(ms) = parse_var::<u64, _>(&lookup, "OPPONENT_DELAY_MS") {
            config.opponent_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "SETTLEMENT_DELAY_MS") {
            config.settlement_delay = Duration::from_millis(ms);
        }
        if let Some(max) = parse_var::<u32, _>(&lookup, "RATE_LIMIT_MAX") {
            config.rate_limit_max = max;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "RATE_LIMIT_WINDOW_SECS") {
            config.rate_limit_window = Duration::from_secs(secs.max(1));
        }
        if let Some(raw) = non_empty(&lookup, "ARENA_AUTOPILOT") {
            match parse_bool(&raw) {
                Some(on) => config.autopilot = on,
                None => log::warn!("Ignoring ARENA_AUTOPILOT={:?}, expected a boolean", raw),
            }
        }

        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = non_empty(lookup, key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {}={:?}, using the default", key, raw);
            None
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
