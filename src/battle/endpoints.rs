use std::sync::Arc;

use either::{Either, Left, Right};
use rocket::response::status::{BadRequest, Conflict, Unauthorized};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use super::{
    ActionKind, ActionReport, BattleError, BattleLog, LogEntry, LootOutcome, MatchState,
    TurnTimerEvent,
};
use crate::status_messages::{new_status, Status};
use crate::SharedEngine;

pub type BattleFailure =
    Either<BadRequest<Json<Status>>, Either<Conflict<Json<Status>>, Unauthorized<Json<Status>>>>;

/// Map a domain error onto its HTTP responder.
pub fn failure(err: BattleError) -> BattleFailure {
    let body = new_status(err.to_string());
    match err {
        BattleError::NotConnected => Right(Right(Unauthorized(body))),
        BattleError::AlreadyInBattle(_)
        | BattleError::NoActiveBattle
        | BattleError::NotPlayerTurn
        | BattleError::NotOpponentTurn => Right(Left(Conflict(body))),
        BattleError::IneligibleAction { .. }
        | BattleError::InvalidStake(_)
        | BattleError::InsufficientBalance { .. } => Left(BadRequest(body)),
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct JoinRequest {
    pub stake: f64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ActionRequest {
    pub kind: ActionKind,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct SettleResponse {
    pub settled: bool,
    pub state: MatchState,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct BattleLogResponse {
    pub entries: Vec<LogEntry>,
    pub next_seq: Option<u64>,
    pub limit: usize,
}

#[openapi]
#[get("/battle")]
pub async fn get_battle(engine: &State<SharedEngine>) -> Json<MatchState> {
    Json(engine.lock().await.state())
}

#[openapi]
#[post("/battle/join", format = "json", data = "<join>")]
pub async fn join_battle(
    join: Json<JoinRequest>,
    engine: &State<SharedEngine>,
) -> Result<Json<MatchState>, BattleFailure> {
    let mut engine = engine.lock().await;
    engine.join_battle(join.stake).map_err(failure)?;
    Ok(Json(engine.state()))
}

#[openapi]
#[post("/battle/action", format = "json", data = "<action>")]
pub async fn submit_action(
    action: Json<ActionRequest>,
    engine: &State<SharedEngine>,
) -> Result<Json<ActionReport>, BattleFailure> {
    engine
        .lock()
        .await
        .submit_action(action.kind)
        .map(Json)
        .map_err(failure)
}

/// Resolve the opponent's pending turn immediately, skipping the pacing delay.
#[openapi]
#[post("/battle/opponent")]
pub async fn resolve_opponent_turn(
    engine: &State<SharedEngine>,
) -> Result<Json<ActionReport>, BattleFailure> {
    engine
        .lock()
        .await
        .resolve_opponent_turn()
        .map(Json)
        .map_err(failure)
}

#[openapi]
#[post("/battle/tick")]
pub async fn tick_turn_timer(engine: &State<SharedEngine>) -> Json<TurnTimerEvent> {
    Json(engine.lock().await.tick_turn_timer())
}

#[openapi]
#[post("/battle/settle")]
pub async fn complete_settlement(engine: &State<SharedEngine>) -> Json<SettleResponse> {
    let mut engine = engine.lock().await;
    let settled = engine.complete_settlement();
    Json(SettleResponse {
        settled,
        state: engine.state(),
    })
}

#[openapi]
#[post("/loot/open")]
pub async fn open_loot_box(
    engine: &State<SharedEngine>,
) -> Result<Json<LootOutcome>, BattleFailure> {
    engine.lock().await.open_loot_box().map(Json).map_err(failure)
}

/// Battle log entries, optionally starting at `from_seq`.
#[openapi]
#[get("/battle/log?<from_seq>&<limit>")]
pub async fn list_battle_log(
    from_seq: Option<u64>,
    limit: Option<usize>,
    log: &State<Arc<BattleLog>>,
) -> Json<BattleLogResponse> {
    let limit = limit.unwrap_or(100);
    let (entries, next_seq) = log.page(from_seq, limit);
    Json(BattleLogResponse {
        entries,
        next_seq,
        limit,
    })
}

#[openapi]
#[delete("/battle/log")]
pub async fn clear_battle_log(log: &State<Arc<BattleLog>>) -> Json<LogEntry> {
    Json(log.clear())
}
