//! Pure damage and decision formulas.
//!
//! Every multiplication step is floored to an integer before the next one, so
//! results match the turn-by-turn numbers shown to players. The two sides use
//! deliberately different constants; see [`SideRules`].

use super::types::{ActionKind, Side};
use crate::oracle::PriceSnapshot;
use crate::rng::RandomSource;

/// Per-side combat constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideRules {
    /// How strongly the ETH delta moves damage.
    pub eth_amplifier: f64,
    pub crit_chance: f64,
    pub attack_crit: f64,
    pub special_base: f64,
    pub special_floor: f64,
    pub special_scale: f64,
}

pub const ATTACK_FLOOR: f64 = 0.5;
pub const SPECIAL_CRIT: f64 = 1.3;
/// Player special is only allowed below this health.
pub const SPECIAL_HEALTH_THRESHOLD: u32 = 50;

pub const PLAYER_RULES: SideRules = SideRules {
    eth_amplifier: 15.0,
    crit_chance: 0.15,
    attack_crit: 1.5,
    special_base: 50.0,
    special_floor: 0.8,
    special_scale: 1.8,
};

pub const OPPONENT_RULES: SideRules = SideRules {
    eth_amplifier: 12.0,
    crit_chance: 0.12,
    attack_crit: 1.4,
    special_base: 40.0,
    special_floor: 0.7,
    special_scale: 1.6,
};

impl SideRules {
    pub fn for_side(side: Side) -> SideRules {
        match side {
            Side::Player => PLAYER_RULES,
            Side::Opponent => OPPONENT_RULES,
        }
    }

    pub fn eth_multiplier(&self, eth: &PriceSnapshot) -> f64 {
        1.0 + eth.fractional_delta * self.eth_amplifier
    }

    pub fn roll_critical(&self, rng: &mut dyn RandomSource) -> bool {
        rng.uniform() < self.crit_chance
    }
}

pub fn btc_multiplier(btc: &PriceSnapshot) -> f64 {
    1.0 + btc.fractional_delta.abs() * 10.0
}

fn floor_u32(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else {
        value.floor() as u32
    }
}

/// Raw attack damage before any defense is applied.
pub fn base_attack_damage(attack: u32, eth_multiplier: f64) -> u32 {
    floor_u32(attack as f64 * eth_multiplier.max(ATTACK_FLOOR))
}

pub fn apply_critical(damage: u32, factor: f64) -> u32 {
    floor_u32(damage as f64 * factor)
}

/// Damage left after a pending defense bonus; a bonus never blocks the last point.
pub fn absorb(damage: u32, bonus: u32) -> u32 {
    if bonus == 0 {
        damage
    } else {
        damage.saturating_sub(bonus).max(1)
    }
}

pub fn special_damage(rules: &SideRules, eth_multiplier: f64, critical: bool) -> u32 {
    let scaled = rules.special_base * eth_multiplier.max(rules.special_floor) * rules.special_scale;
    let damage = floor_u32(scaled);
    if critical {
        apply_critical(damage, SPECIAL_CRIT)
    } else {
        damage
    }
}

pub fn player_defense_bonus(defense: u32, btc_multiplier: f64) -> u32 {
    floor_u32(defense as f64 * btc_multiplier * 0.2)
}

pub fn opponent_defense_bonus(defense: u32) -> u32 {
    floor_u32(defense as f64 * 0.3)
}

/// The opponent's decision tree. Draws are only consumed by branches that are reached.
pub fn choose_opponent_action(
    opponent_health: u32,
    player_health: u32,
    rng: &mut dyn RandomSource,
) -> ActionKind {
    if opponent_health < 30 && rng.uniform() < 0.6 {
        return ActionKind::Special;
    }
    if player_health < 40 && rng.uniform() < 0.4 {
        return ActionKind::Attack;
    }
    const WEIGHTED: [ActionKind; 3] = [ActionKind::Attack, ActionKind::Defend, ActionKind::Attack];
    let idx = ((rng.uniform() * WEIGHTED.len() as f64) as usize).min(WEIGHTED.len() - 1);
    WEIGHTED[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;

    #[test]
    fn flat_oracle_attack_equals_attack_stat() {
        let flat = PriceSnapshot::flat(3000.0);
        let m = PLAYER_RULES.eth_multiplier(&flat);
        assert_eq!(m, 1.0);
        assert_eq!(base_attack_damage(25, m), 25);
        assert_eq!(base_attack_damage(20, OPPONENT_RULES.eth_multiplier(&flat)), 20);
    }

    #[test]
    fn attack_multiplier_has_floor() {
        // A -10% move would give 1 - 1.5 = -0.5; the floor keeps it at 0.5.
        let crash = PriceSnapshot::from_change(3000.0, -10.0);
        let m = PLAYER_RULES.eth_multiplier(&crash);
        assert_eq!(base_attack_damage(25, m), 12);
    }

    #[test]
    fn sides_amplify_differently() {
        let up = PriceSnapshot::from_change(3000.0, 2.0);
        assert!((PLAYER_RULES.eth_multiplier(&up) - 1.3).abs() < 1e-12);
        assert!((OPPONENT_RULES.eth_multiplier(&up) - 1.24).abs() < 1e-12);
    }

    #[test]
    fn criticals_floor_after_scaling() {
        assert_eq!(apply_critical(25, PLAYER_RULES.attack_crit), 37);
        assert_eq!(apply_critical(30, OPPONENT_RULES.attack_crit), 42);
    }

    #[test]
    fn absorb_keeps_one_point() {
        assert_eq!(absorb(20, 0), 20);
        assert_eq!(absorb(20, 3), 17);
        assert_eq!(absorb(2, 10), 1);
    }

    #[test]
    fn special_damage_by_side() {
        assert_eq!(special_damage(&PLAYER_RULES, 1.0, false), 90);
        assert_eq!(special_damage(&PLAYER_RULES, 1.0, true), 117);
        assert_eq!(special_damage(&PLAYER_RULES, 0.2, false), 72);
        assert_eq!(special_damage(&OPPONENT_RULES, 1.0, false), 64);
        assert_eq!(special_damage(&OPPONENT_RULES, 0.2, true), 57);
    }

    #[test]
    fn defense_bonuses() {
        assert_eq!(player_defense_bonus(15, 1.0), 3);
        let btc = PriceSnapshot::from_change(90000.0, -5.0);
        assert_eq!(player_defense_bonus(15, btc_multiplier(&btc)), 4);
        assert_eq!(opponent_defense_bonus(20), 6);
    }

    #[test]
    fn opponent_prefers_special_when_low() {
        let mut rng = ScriptedSource::new([0.5]);
        assert_eq!(choose_opponent_action(29, 100, &mut rng), ActionKind::Special);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn opponent_goes_for_kill() {
        // first draw fails the special branch, second passes the kill branch
        let mut rng = ScriptedSource::new([0.7, 0.3]);
        assert_eq!(choose_opponent_action(20, 39, &mut rng), ActionKind::Attack);
    }

    #[test]
    fn healthy_opponent_uses_weighted_pick_only() {
        let mut rng = ScriptedSource::new([0.0]);
        assert_eq!(choose_opponent_action(100, 100, &mut rng), ActionKind::Attack);
        let mut rng = ScriptedSource::new([0.4]);
        assert_eq!(choose_opponent_action(100, 100, &mut rng), ActionKind::Defend);
        let mut rng = ScriptedSource::new([0.9]);
        assert_eq!(choose_opponent_action(100, 100, &mut rng), ActionKind::Attack);
    }
}
