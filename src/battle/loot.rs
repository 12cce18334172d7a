//! Paid random-reward draws, independent of the battle state machine.

use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

use super::error::BattleError;
use super::types::Combatant;
use crate::rng::RandomSource;
use crate::wallet::{AccountProvider, Currency};

pub const LOOT_COST: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum LootReward {
    /// +15 attack, permanent.
    LegendarySword,
    /// +50 currency.
    RareCrystal,
    /// +10 attack for the next battle. Not tracked anywhere, so it changes nothing.
    PowerCore,
    /// Player back to full health.
    HealthElixir,
    /// +5 currency.
    TokenReward,
}

impl LootReward {
    /// Map a uniform draw onto the reward bands; the first matching band wins.
    pub fn from_draw(r: f64) -> LootReward {
        if r < 0.05 {
            LootReward::LegendarySword
        } else if r < 0.15 {
            LootReward::RareCrystal
        } else if r < 0.30 {
            LootReward::PowerCore
        } else if r < 0.50 {
            LootReward::HealthElixir
        } else {
            LootReward::TokenReward
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LootReward::LegendarySword => "Legendary Sword",
            LootReward::RareCrystal => "Rare Crystal",
            LootReward::PowerCore => "Power Core",
            LootReward::HealthElixir => "Health Elixir",
            LootReward::TokenReward => "Token Reward",
        }
    }

    pub fn bonus(self) -> &'static str {
        match self {
            LootReward::LegendarySword => "+15 attack permanently",
            LootReward::RareCrystal => "+50 SUPRA tokens",
            LootReward::PowerCore => "+10 attack for next battle",
            LootReward::HealthElixir => "Full health restore",
            LootReward::TokenReward => "+5 SUPRA",
        }
    }

    /// Currency granted by this reward.
    pub fn currency(self) -> f64 {
        match self {
            LootReward::RareCrystal => 50.0,
            LootReward::TokenReward => 5.0,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct LootOutcome {
    pub reward: LootReward,
    pub draw: f64,
    pub cost: f64,
    pub balance_after: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LootResolver {
    pub cost: f64,
    pub currency: Currency,
}

impl Default for LootResolver {
    fn default() -> Self {
        LootResolver {
            cost: LOOT_COST,
            currency: Currency::Supra,
        }
    }
}

impl LootResolver {
    /// Charge the cost and apply one reward to `player`.
    ///
    /// Rejected without any charge or draw when the balance is below the cost.
    pub fn open(
        &self,
        account: &mut dyn AccountProvider,
        player: &mut Combatant,
        rng: &mut dyn RandomSource,
    ) -> Result<LootOutcome, BattleError> {
        let available = account.balance(self.currency);
        if available < self.cost {
            return Err(BattleError::InsufficientBalance {
                needed: self.cost,
                available,
            });
        }

        let draw = rng.uniform();
        let reward = LootReward::from_draw(draw);
        match reward {
            LootReward::LegendarySword => player.attack += 15,
            LootReward::HealthElixir => player.health = player.max_health,
            LootReward::RareCrystal | LootReward::TokenReward => {
                account.credit(self.currency, reward.currency())
            }
            LootReward::PowerCore => {}
        }
        let balance_after = account.debit(self.currency, self.cost)?;

        Ok(LootOutcome {
            reward,
            draw,
            cost: self.cost,
            balance_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(LootReward::from_draw(0.0), LootReward::LegendarySword);
        assert_eq!(LootReward::from_draw(0.0499), LootReward::LegendarySword);
        assert_eq!(LootReward::from_draw(0.05), LootReward::RareCrystal);
        assert_eq!(LootReward::from_draw(0.15), LootReward::PowerCore);
        assert_eq!(LootReward::from_draw(0.30), LootReward::HealthElixir);
        assert_eq!(LootReward::from_draw(0.50), LootReward::TokenReward);
        assert_eq!(LootReward::from_draw(0.999), LootReward::TokenReward);
    }
}
