use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use schemars::JsonSchema;

use crate::config::ArenaConfig;
use crate::rate_limit::ApiRateLimit;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
    /// RFC 3339 UTC time of the check.
    pub timestamp: String,
    pub version: String,
}

#[get("/api/health")]
pub fn health(_limit: ApiRateLimit, config: &State<ArenaConfig>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        environment: config.environment.clone(),
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
