//! Drives time-based transitions: the player's turn clock, the opponent's
//! delayed reply, and the settlement grace period.

use std::time::{Duration, Instant};

use crate::battle::{ActionReport, BattleEngine, MatchPhase, Side, TurnTimerEvent};
use crate::SharedEngine;

/// What a single pacing step did.
#[derive(Debug, Clone, PartialEq)]
pub enum PaceStep {
    Idle,
    Waiting,
    Ticked(TurnTimerEvent),
    OpponentActed(ActionReport),
    Settled,
}

#[derive(Debug, Clone)]
pub struct Pacer {
    opponent_delay: Duration,
    settlement_delay: Duration,
    /// `(turn_number, phase)` of the position being waited on, and when it was first seen.
    marker: Option<((u64, MatchPhase), Instant)>,
}

impl Pacer {
    pub fn new(opponent_delay: Duration, settlement_delay: Duration) -> Self {
        Pacer {
            opponent_delay,
            settlement_delay,
            marker: None,
        }
    }

    fn elapsed_in(&mut self, key: (u64, MatchPhase), now: Instant) -> Duration {
        match self.marker {
            Some((seen, since)) if seen == key => now.saturating_duration_since(since),
            _ => {
                self.marker = Some((key, now));
                Duration::ZERO
            }
        }
    }

    /// Advance `engine` by one step. Expected to be called about once a second.
    pub fn step(&mut self, engine: &mut BattleEngine, now: Instant) -> PaceStep {
        let state = engine.state();
        let elapsed = self.elapsed_in((state.turn_number, state.phase), now);

        match state.phase {
            MatchPhase::Idle => PaceStep::Idle,
            MatchPhase::InProgress if state.turn == Side::Player => {
                PaceStep::Ticked(engine.tick_turn_timer())
            }
            MatchPhase::InProgress => {
                if elapsed < self.opponent_delay {
                    return PaceStep::Waiting;
                }
                match engine.resolve_opponent_turn() {
                    Ok(report) => PaceStep::OpponentActed(report),
                    Err(e) => {
                        log::debug!("Opponent turn skipped: {}", e);
                        PaceStep::Waiting
                    }
                }
            }
            MatchPhase::Settling => {
                if elapsed < self.settlement_delay {
                    return PaceStep::Waiting;
                }
                if engine.complete_settlement() {
                    PaceStep::Settled
                } else {
                    PaceStep::Waiting
                }
            }
        }
    }
}

/// Spawn the once-a-second pacing loop on Rocket's runtime.
pub fn spawn_pacer(engine: SharedEngine, mut pacer: Pacer) {
    rocket::tokio::spawn(async move {
        let mut interval = rocket::tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            let mut guard = engine.lock().await;
            match pacer.step(&mut guard, Instant::now()) {
                PaceStep::Idle
                | PaceStep::Waiting
                | PaceStep::Ticked(TurnTimerEvent::Ticking { .. }) => {}
                other => log::debug!("Pacer: {:?}", other),
            }
        }
    });
}
