use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Seconds a player has to act before the turn auto-resolves as a defend.
pub const TURN_SECONDS: u32 = 30;

/// One side of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    /// Display name of the fighter on this side.
    pub fn fighter_name(self) -> &'static str {
        match self {
            Side::Player => "Oracle Warrior",
            Side::Opponent => "Data Mage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum ActionKind {
    Attack,
    Defend,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum MatchPhase {
    Idle,
    InProgress,
    Settling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Combatant {
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub stake: f64,
    pub pending_defense_bonus: u32,
}

impl Combatant {
    pub fn new(max_health: u32, attack: u32, defense: u32, stake: f64) -> Self {
        Combatant {
            health: max_health,
            max_health,
            attack,
            defense,
            stake,
            pending_defense_bonus: 0,
        }
    }

    /// The player's starting fighter.
    pub fn oracle_warrior() -> Self {
        Combatant::new(100, 25, 15, 0.1)
    }

    /// The automated opponent's starting fighter.
    pub fn data_mage() -> Self {
        Combatant::new(100, 20, 20, 0.1)
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Subtract damage, saturating at zero. Returns the health left.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        self.health = self.health.saturating_sub(damage);
        self.health
    }

    pub fn restore(&mut self) {
        self.health = self.max_health;
        self.pending_defense_bonus = 0;
    }
}

/// Result of a settled match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Settlement {
    pub winner: Side,
    pub payout: f64,
    /// Amount actually credited to the player's account (zero on defeat).
    pub credited: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct MatchState {
    pub phase: MatchPhase,
    pub turn: Side,
    pub turn_deadline: u32,
    /// Incremented by every resolved action.
    pub turn_number: u64,
    pub player: Combatant,
    pub opponent: Combatant,
    pub last_settlement: Option<Settlement>,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    pub fn new() -> Self {
        MatchState {
            phase: MatchPhase::Idle,
            turn: Side::Player,
            turn_deadline: TURN_SECONDS,
            turn_number: 0,
            player: Combatant::oracle_warrior(),
            opponent: Combatant::data_mage(),
            last_settlement: None,
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    pub fn is_awaiting(&self, side: Side) -> bool {
        self.phase == MatchPhase::InProgress && self.turn == side
    }
}

/// Outcome of one resolved action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ActionReport {
    pub actor: Side,
    pub kind: ActionKind,
    pub damage_dealt: u32,
    pub was_critical: bool,
    pub defender_health_after: u32,
    /// Bonus stored by a defend action, zero otherwise.
    pub defense_bonus: u32,
    /// Oracle multiplier in effect for this action.
    pub oracle_multiplier: f64,
    pub match_ended: bool,
    pub winner: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "event")]
pub enum TurnTimerEvent {
    Ticking { seconds_left: u32 },
    TimedOut { report: ActionReport },
    /// No player turn is running, so the clock did not move.
    Inactive,
}
