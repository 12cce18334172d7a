use rocket::http::Status as HttpStatus;
use rocket::response::status::Custom;
use rocket::serde::json::{Json, Value};
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use super::{AssetPair, FeedBoard, OracleClient, OracleError, SharedFeed};
use crate::rate_limit::ApiRateLimit;
use crate::status_messages::{new_status, Status};

/// Percent bonuses shown next to the prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DisplayMultipliers {
    /// Signed with the ETH move.
    pub attack_bonus_percent: f64,
    pub defense_bonus_percent: f64,
}

impl DisplayMultipliers {
    pub fn of(board: &FeedBoard) -> Self {
        let eth = board.eth_usd.fractional_delta;
        let attack = eth.abs() * 200.0;
        DisplayMultipliers {
            attack_bonus_percent: if eth < 0.0 { -attack } else { attack },
            defense_bonus_percent: board.btc_usd.fractional_delta.abs() * 150.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PricesResponse {
    pub board: FeedBoard,
    pub multipliers: DisplayMultipliers,
}

#[openapi]
#[get("/oracle/prices")]
pub async fn get_prices(feed: &State<SharedFeed>) -> Json<PricesResponse> {
    let board = feed.board();
    let multipliers = DisplayMultipliers::of(&board);
    Json(PricesResponse { board, multipliers })
}

/// Pass the remote API's payload for `pair` through unchanged.
#[get("/api/oracle/price/<pair>")]
pub async fn proxy_price(
    pair: &str,
    _limit: ApiRateLimit,
    client: &State<OracleClient>,
) -> Result<Json<Value>, Custom<Json<Status>>> {
    let symbol = pair
        .parse::<AssetPair>()
        .map(|p| p.symbol().to_string())
        .unwrap_or_else(|_| pair.to_string());
    match client.fetch_latest(&symbol).await {
        Ok(payload) => Ok(Json(payload)),
        Err(OracleError::MissingApiKey) => Err(Custom(
            HttpStatus::InternalServerError,
            new_status("Oracle API key not configured"),
        )),
        Err(e) => {
            log::error!("Oracle API error: {}", e);
            Err(Custom(
                HttpStatus::InternalServerError,
                new_status("Failed to fetch oracle data"),
            ))
        }
    }
}
