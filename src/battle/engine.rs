//! The battle state machine.
//!
//! `Idle -> InProgress(Player) <-> InProgress(Opponent) -> Settling -> Idle`.
//! All transitions are synchronous; pacing delays belong to the caller.

use std::sync::Arc;

use super::battle_log::BattleLog;
use super::error::BattleError;
use super::loot::{LootOutcome, LootResolver};
use super::resolve::{self, SideRules, SPECIAL_HEALTH_THRESHOLD};
use super::types::{
    ActionKind, ActionReport, MatchPhase, MatchState, Settlement, Side, TurnTimerEvent,
    TURN_SECONDS,
};
use crate::oracle::{AssetPair, OracleFeed};
use crate::rng::RandomSource;
use crate::wallet::{AccountProvider, AccountView, Currency};

/// Owns one match and the collaborators it reads from.
pub struct BattleEngine {
    state: MatchState,
    rng: Box<dyn RandomSource>,
    feed: Box<dyn OracleFeed>,
    account: Box<dyn AccountProvider>,
    loot: LootResolver,
    log: Arc<BattleLog>,
}

impl std::fmt::Debug for BattleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleEngine")
            .field("state", &self.state)
            .field("account", &AccountView::of(self.account.as_ref()))
            .finish()
    }
}

impl BattleEngine {
    pub fn new(
        rng: Box<dyn RandomSource>,
        feed: Box<dyn OracleFeed>,
        account: Box<dyn AccountProvider>,
    ) -> Self {
        BattleEngine {
            state: MatchState::new(),
            rng,
            feed,
            account,
            loot: LootResolver::default(),
            log: Arc::new(BattleLog::new()),
        }
    }

    /// Share an externally owned log (the server exposes it without taking the engine lock).
    pub fn with_log(mut self, log: Arc<BattleLog>) -> Self {
        self.log = log;
        self
    }

    /// Start from an arbitrary state, e.g. a mid-match position.
    pub fn with_state(mut self, state: MatchState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> MatchState {
        self.state.clone()
    }

    pub fn log(&self) -> &Arc<BattleLog> {
        &self.log
    }

    pub fn account(&self) -> AccountView {
        AccountView::of(self.account.as_ref())
    }

    pub fn reseed(&mut self, rng: Box<dyn RandomSource>) {
        self.rng = rng;
        log::info!("Random source re-seeded");
    }

    pub fn connect_account(&mut self) -> AccountView {
        self.account.connect();
        let view = self.account();
        if let Some(address) = view.address.as_deref() {
            self.log
                .append(format!("Wallet connected: {}...", &address[..address.len().min(8)]));
        }
        view
    }

    /// Disconnecting cancels any match in flight.
    pub fn disconnect_account(&mut self) -> AccountView {
        self.account.disconnect();
        if self.state.phase != MatchPhase::Idle {
            log::info!("Account disconnected mid-match, resetting");
            self.reset();
        }
        self.log.append("Wallet disconnected");
        self.account()
    }

    pub fn join_battle(&mut self, stake: f64) -> Result<(), BattleError> {
        if !self.account.is_connected() {
            log::debug!("join rejected: not connected");
            return Err(BattleError::NotConnected);
        }
        if self.state.phase != MatchPhase::Idle {
            log::debug!("join rejected: phase {:?}", self.state.phase);
            return Err(BattleError::AlreadyInBattle(self.state.phase));
        }
        if !stake.is_finite() || stake <= 0.0 {
            return Err(BattleError::InvalidStake(stake));
        }
        let available = self.account.balance(Currency::Eth);
        if available < stake {
            return Err(BattleError::InsufficientBalance {
                needed: stake,
                available,
            });
        }

        let state = &mut self.state;
        state.player.restore();
        state.opponent.restore();
        state.player.stake = stake;
        state.opponent.stake = stake;
        state.phase = MatchPhase::InProgress;
        state.turn = Side::Player;
        state.turn_deadline = TURN_SECONDS;

        log::info!("Battle joined with stake {}", stake);
        self.log.append(format!(
            "Opponent found! Stakes locked: {} ETH each (Total pool: {:.2} ETH)",
            stake,
            stake * 2.0
        ));
        Ok(())
    }

    pub fn submit_action(&mut self, kind: ActionKind) -> Result<ActionReport, BattleError> {
        if self.state.phase != MatchPhase::InProgress {
            return Err(BattleError::NoActiveBattle);
        }
        if self.state.turn != Side::Player {
            return Err(BattleError::NotPlayerTurn);
        }
        if kind == ActionKind::Special && self.state.player.health >= SPECIAL_HEALTH_THRESHOLD {
            log::debug!("special rejected at health {}", self.state.player.health);
            return Err(BattleError::IneligibleAction {
                health: self.state.player.health,
                threshold: SPECIAL_HEALTH_THRESHOLD,
            });
        }
        Ok(self.resolve(Side::Player, kind))
    }

    pub fn resolve_opponent_turn(&mut self) -> Result<ActionReport, BattleError> {
        if self.state.phase != MatchPhase::InProgress {
            return Err(BattleError::NoActiveBattle);
        }
        if self.state.turn != Side::Opponent {
            return Err(BattleError::NotOpponentTurn);
        }
        let kind = resolve::choose_opponent_action(
            self.state.opponent.health,
            self.state.player.health,
            self.rng.as_mut(),
        );
        Ok(self.resolve(Side::Opponent, kind))
    }

    /// Advance the player's turn clock by one second, auto-defending at zero.
    pub fn tick_turn_timer(&mut self) -> TurnTimerEvent {
        if !self.state.is_awaiting(Side::Player) {
            return TurnTimerEvent::Inactive;
        }
        self.state.turn_deadline = self.state.turn_deadline.saturating_sub(1);
        if self.state.turn_deadline > 0 {
            return TurnTimerEvent::Ticking {
                seconds_left: self.state.turn_deadline,
            };
        }
        log::info!("Player turn timed out");
        self.log.append("Turn timeout - auto-defend activated");
        match self.submit_action(ActionKind::Defend) {
            Ok(report) => TurnTimerEvent::TimedOut { report },
            Err(_) => TurnTimerEvent::Inactive,
        }
    }

    /// `Settling -> Idle`. Returns false when there was nothing to settle.
    pub fn complete_settlement(&mut self) -> bool {
        if self.state.phase != MatchPhase::Settling {
            return false;
        }
        self.reset();
        self.log.append("Battle reset - Ready for next match!");
        true
    }

    pub fn open_loot_box(&mut self) -> Result<LootOutcome, BattleError> {
        if !self.account.is_connected() {
            return Err(BattleError::NotConnected);
        }
        let outcome = self.loot.open(
            self.account.as_mut(),
            &mut self.state.player,
            self.rng.as_mut(),
        )?;
        log::info!("Loot box opened: {:?}", outcome.reward);
        self.log.append(format!(
            "Loot box opened! Reward: {} ({})",
            outcome.reward.label(),
            outcome.reward.bonus()
        ));
        Ok(outcome)
    }

    fn resolve(&mut self, actor: Side, kind: ActionKind) -> ActionReport {
        let rules = SideRules::for_side(actor);
        let eth = rules.eth_multiplier(&self.feed.snapshot(AssetPair::EthUsd));
        // Drawn for every action to keep the draw sequence fixed; only damage uses it.
        let critical = rules.roll_critical(self.rng.as_mut()) && kind != ActionKind::Defend;
        let defender = actor.other();

        // The player's bonus only lasts through the opponent's next turn.
        let incoming_bonus = match actor {
            Side::Opponent => std::mem::take(&mut self.state.player.pending_defense_bonus),
            Side::Player => 0,
        };

        let mut damage = 0;
        let mut defense_bonus = 0;
        match kind {
            ActionKind::Attack => {
                let attack = self.state.combatant(actor).attack;
                damage = resolve::absorb(resolve::base_attack_damage(attack, eth), incoming_bonus);
                if critical {
                    damage = resolve::apply_critical(damage, rules.attack_crit);
                }
            }
            ActionKind::Defend => {
                let defense = self.state.combatant(actor).defense;
                defense_bonus = match actor {
                    Side::Player => {
                        let btc = resolve::btc_multiplier(&self.feed.snapshot(AssetPair::BtcUsd));
                        resolve::player_defense_bonus(defense, btc)
                    }
                    Side::Opponent => resolve::opponent_defense_bonus(defense),
                };
                self.state.combatant_mut(actor).pending_defense_bonus = defense_bonus;
            }
            ActionKind::Special => {
                damage = resolve::special_damage(&rules, eth, critical);
            }
        }

        let defender_health_after = self.state.combatant_mut(defender).take_damage(damage);
        self.state.turn_number += 1;
        self.log.append(describe(actor, kind, damage, defense_bonus, critical, eth));
        log::info!(
            "{:?} {:?}: damage {} crit {} defender at {}",
            actor,
            kind,
            damage,
            critical,
            defender_health_after
        );

        let mut report = ActionReport {
            actor,
            kind,
            damage_dealt: damage,
            was_critical: critical,
            defender_health_after,
            defense_bonus,
            oracle_multiplier: eth,
            match_ended: false,
            winner: None,
        };

        if self.state.combatant(defender).is_defeated() {
            self.settle(actor);
            report.match_ended = true;
            report.winner = Some(actor);
        } else {
            self.state.turn = defender;
            if defender == Side::Player {
                self.state.turn_deadline = TURN_SECONDS;
            }
        }
        report
    }

    fn settle(&mut self, winner: Side) {
        let payout = self.state.player.stake + self.state.opponent.stake;
        let credited = match winner {
            Side::Player => {
                self.account.credit(Currency::Eth, payout);
                payout
            }
            Side::Opponent => 0.0,
        };
        self.state.phase = MatchPhase::Settling;
        self.state.last_settlement = Some(Settlement {
            winner,
            payout,
            credited,
        });
        log::info!("Match settled: {:?} wins {} ETH", winner, payout);
        match winner {
            Side::Player => self.log.append(format!("VICTORY! You won {:.2} ETH!", payout)),
            Side::Opponent => self
                .log
                .append(format!("DEFEAT! Opponent won {:.2} ETH.", payout)),
        };
    }

    fn reset(&mut self) {
        let state = &mut self.state;
        state.player.restore();
        state.opponent.restore();
        state.phase = MatchPhase::Idle;
        state.turn = Side::Player;
        state.turn_deadline = TURN_SECONDS;
    }
}

fn describe(
    actor: Side,
    kind: ActionKind,
    damage: u32,
    defense_bonus: u32,
    critical: bool,
    eth_multiplier: f64,
) -> String {
    let name = actor.fighter_name();
    let crit = if critical { " CRITICAL HIT!" } else { "" };
    match kind {
        ActionKind::Attack => format!(
            "{} attacks for {} damage!{} (ETH oracle: {:+.1}%)",
            name,
            damage,
            crit,
            (eth_multiplier - 1.0) * 100.0
        ),
        ActionKind::Defend => format!("{} defends (+{} defense)", name, defense_bonus),
        ActionKind::Special => {
            let strike = match actor {
                Side::Player => "Price Surge Strike",
                Side::Opponent => "Chaos Surge",
            };
            format!("{} uses {} for {} damage!{}", name, strike, damage, crit)
        }
    }
}
