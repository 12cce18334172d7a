//! Error types for battle and loot operations.

use super::types::MatchPhase;

/// Precondition failures surfaced to the caller. None of them mutate the match.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BattleError {
    #[error("account is not connected")]
    NotConnected,

    #[error("already in battle ({0:?})")]
    AlreadyInBattle(MatchPhase),

    #[error("no battle in progress")]
    NoActiveBattle,

    #[error("it is not the player's turn")]
    NotPlayerTurn,

    #[error("it is not the opponent's turn")]
    NotOpponentTurn,

    #[error("special attack requires health below {threshold} (current {health})")]
    IneligibleAction { health: u32, threshold: u32 },

    #[error("stake must be a positive amount, got {0}")]
    InvalidStake(f64),

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: f64, available: f64 },
}
