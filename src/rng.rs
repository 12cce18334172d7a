use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Lcg64Xsh32;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::openapi;
use schemars::JsonSchema;

use crate::SharedEngine;

/// Source of uniform draws in `[0, 1)` for critical hits, opponent choices and loot.
pub trait RandomSource: Send {
    fn uniform(&mut self) -> f64;
}

/// Expand a u64 into the 16-byte PCG seed: two little-endian copies.
pub fn seed_bytes(seed: u64) -> [u8; 16] {
    let s = seed.to_le_bytes();
    let mut bytes = [0u8; 16];
    bytes[0..8].copy_from_slice(&s);
    bytes[8..16].copy_from_slice(&s);
    bytes
}

/// Seedable PCG source used by the server.
#[derive(Debug, Clone)]
pub struct PcgSource {
    rng: Lcg64Xsh32,
}

impl PcgSource {
    pub fn from_seed(seed: u64) -> Self {
        PcgSource {
            rng: Lcg64Xsh32::from_seed(seed_bytes(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        PcgSource {
            rng: Lcg64Xsh32::from_entropy(),
        }
    }
}

impl RandomSource for PcgSource {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, then returns `fallback` forever.
///
/// The default fallback of 0.99 never triggers a critical hit or any
/// low-probability opponent branch.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedSource {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        ScriptedSource {
            draws: draws.into_iter().collect(),
            fallback: 0.99,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedSource {
    fn uniform(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct SeedRequest {
    pub seed: u64,
}

/// Re-seed the engine's random source for deterministic replay.
#[openapi]
#[post("/player/seed", format = "json", data = "<seed_req>")]
pub async fn set_seed(seed_req: Json<SeedRequest>, engine: &State<SharedEngine>) -> Json<String> {
    let seed = seed_req.seed;
    engine
        .lock()
        .await
        .reseed(Box::new(PcgSource::from_seed(seed)));
    Json(format!("seed set to {}", seed))
}
