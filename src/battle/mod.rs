//! Turn-based duel between the player and a computer opponent.

pub mod battle_log;
pub mod endpoints;
pub mod engine;
pub mod error;
pub mod loot;
pub mod resolve;
pub mod types;

pub use battle_log::{BattleLog, LogEntry};
pub use engine::BattleEngine;
pub use error::BattleError;
pub use loot::{LootOutcome, LootResolver, LootReward};
pub use types::{
    ActionKind, ActionReport, Combatant, MatchPhase, MatchState, Settlement, Side,
    TurnTimerEvent, TURN_SECONDS,
};
