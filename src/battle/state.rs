//! Turn-based battle state machine
//!
//! ```text
//! Idle ─begin→ Turn(Boss, Question) ─answer→ Turn(Boss, Attack) ─resolve→ Turn(Boss, Resolution)
//!      ─next_turn→ Turn(Player, Question) → … ─resolve (health 0)→ Finished(outcome)
//! ```
//!
//! Input is only accepted in the `Question` stage, so a second answer during
//! the attack window is rejected by construction.

use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::consts::PLAYER_MAX_HEALTH;
use crate::error::{EngineError, EngineResult};
use crate::sim::Combatant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Boss,
    Player,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Boss => Side::Player,
            Side::Player => Side::Boss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Waiting for an answer
    Question,
    /// Answer graded, attack animating; damage not yet applied
    Attack,
    /// Damage applied, waiting for the next turn
    Resolution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    BossDefeated,
    PlayerDefeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Idle,
    Turn { side: Side, stage: Stage },
    Finished(Outcome),
}

impl BattlePhase {
    /// True for the whole attack/resolution window
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            BattlePhase::Turn {
                stage: Stage::Attack | Stage::Resolution,
                ..
            }
        )
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            BattlePhase::Turn { side, .. } => Some(*side),
            _ => None,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            BattlePhase::Turn { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// What an answer turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackReport {
    pub side: Side,
    pub correct: bool,
    /// Who takes the damage
    pub target: Side,
    pub damage: u32,
    pub super_attack: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BattleState {
    pub phase: BattlePhase,
    pub boss: Option<Combatant>,
    pub player: Option<Combatant>,
    pub correct_streak: u32,
    pub super_attack_charge: u32,
    pub super_attack_ready: bool,
    /// Player chose the super attack for the current question
    pub super_attack_armed: bool,
    pending: Option<AttackReport>,
}

impl BattleState {
    /// Bind the combatants and open the boss's first question
    pub fn begin(&mut self, boss: Combatant, player: Combatant) {
        let boss_health = boss.health;
        self.boss = Some(Combatant {
            health: boss_health,
            max_health: boss_health,
            ..boss
        });
        self.player = Some(Combatant {
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            ..player
        });
        self.clear_progress();
        self.phase = BattlePhase::Turn {
            side: Side::Boss,
            stage: Stage::Question,
        };
    }

    /// Back to idle. Combatants stay bound for display.
    pub fn reset(&mut self) {
        self.clear_progress();
        self.phase = BattlePhase::Idle;
    }

    fn clear_progress(&mut self) {
        self.correct_streak = 0;
        self.super_attack_charge = 0;
        self.super_attack_ready = false;
        self.super_attack_armed = false;
        self.pending = None;
    }

    pub fn is_processing(&self) -> bool {
        self.phase.is_processing()
    }

    pub fn boss_health(&self) -> u32 {
        self.boss.as_ref().map_or(0, |b| b.health)
    }

    pub fn max_boss_health(&self) -> u32 {
        self.boss.as_ref().map_or(0, |b| b.max_health)
    }

    pub fn player_health(&self) -> u32 {
        self.player.as_ref().map_or(0, |p| p.health)
    }

    /// The graded attack waiting to be resolved
    pub fn pending(&self) -> Option<AttackReport> {
        self.pending
    }

    /// Choose the super attack for the player's open question
    pub fn arm_super_attack(&mut self) -> bool {
        let player_question = self.phase
            == BattlePhase::Turn {
                side: Side::Player,
                stage: Stage::Question,
            };
        if player_question && self.super_attack_ready {
            self.super_attack_armed = true;
        }
        self.super_attack_armed
    }

    /// Bonus damage for the current streak
    pub fn streak_bonus(&self, config: &BattleConfig) -> u32 {
        self.correct_streak
            .saturating_sub(2)
            .saturating_mul(config.streak_bonus)
            .min(config.max_streak_bonus)
    }

    /// Grade the open question and enter the attack stage. `None` when no
    /// question is open.
    pub fn answer(&mut self, correct: bool, config: &BattleConfig) -> Option<AttackReport> {
        let BattlePhase::Turn {
            side,
            stage: Stage::Question,
        } = self.phase
        else {
            return None;
        };

        // Boss-turn answers leave the streak alone
        if side == Side::Player {
            self.correct_streak = if correct {
                self.correct_streak.saturating_add(1)
            } else {
                0
            };
        }

        let report = match (side, correct) {
            (Side::Player, true) => {
                let base = config.player_damage.saturating_add(self.streak_bonus(config));
                let super_attack = self.super_attack_armed;
                let damage = if super_attack {
                    self.super_attack_charge = 0;
                    self.super_attack_ready = false;
                    (base as f32 * config.super_attack_multiplier).round() as u32
                } else {
                    self.super_attack_charge =
                        (self.super_attack_charge + 1).min(config.super_attack_threshold);
                    self.super_attack_ready =
                        self.super_attack_charge >= config.super_attack_threshold;
                    base
                };
                AttackReport {
                    side,
                    correct,
                    target: Side::Boss,
                    damage,
                    super_attack,
                }
            }
            (Side::Player, false) => AttackReport {
                side,
                correct,
                target: Side::Boss,
                damage: 0,
                super_attack: false,
            },
            (Side::Boss, _) => AttackReport {
                side,
                correct,
                target: Side::Player,
                damage: if correct {
                    config.blocked_damage
                } else {
                    config.boss_damage
                },
                super_attack: false,
            },
        };

        self.super_attack_armed = false;
        self.pending = Some(report);
        self.phase = BattlePhase::Turn {
            side,
            stage: Stage::Attack,
        };
        Some(report)
    }

    /// Apply the pending attack. Ends the battle when a health pool hits zero.
    pub fn resolve(&mut self) -> EngineResult<Option<Outcome>> {
        let BattlePhase::Turn {
            side,
            stage: Stage::Attack,
        } = self.phase
        else {
            return Err(EngineError::InvalidState(format!(
                "no attack to resolve in {:?}",
                self.phase
            )));
        };
        let report = self.pending.take().ok_or_else(|| {
            EngineError::InvalidState("attack stage without a pending attack".into())
        })?;

        let (target, outcome) = match report.target {
            Side::Boss => (self.boss.as_mut(), Outcome::BossDefeated),
            Side::Player => (self.player.as_mut(), Outcome::PlayerDefeated),
        };
        let target = target.ok_or_else(|| {
            EngineError::InvalidState(format!("{:?} is not bound", report.target))
        })?;
        target.health = target.health.saturating_sub(report.damage).min(target.max_health);

        if target.health == 0 {
            self.phase = BattlePhase::Finished(outcome);
            return Ok(Some(outcome));
        }
        self.phase = BattlePhase::Turn {
            side,
            stage: Stage::Resolution,
        };
        Ok(None)
    }

    /// Hand the turn to the other side. Returns whether a new turn opened.
    pub fn next_turn(&mut self) -> bool {
        let BattlePhase::Turn {
            side,
            stage: Stage::Resolution,
        } = self.phase
        else {
            return false;
        };
        self.phase = BattlePhase::Turn {
            side: side.other(),
            stage: Stage::Question,
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn started(boss_health: u32) -> BattleState {
        let mut state = BattleState::default();
        state.begin(
            Combatant::new("Zorg", "👾", boss_health),
            Combatant::new("Cadet", "🧑‍🚀", 40),
        );
        state
    }

    /// Answer, resolve and move on; returns the report
    fn play_turn(state: &mut BattleState, correct: bool, config: &BattleConfig) -> AttackReport {
        let report = state.answer(correct, config).unwrap();
        if state.resolve().unwrap().is_none() {
            assert!(state.next_turn());
        }
        report
    }

    #[test]
    fn test_begin_resets_pools() {
        let state = started(150);
        assert_eq!(state.boss_health(), 150);
        assert_eq!(state.max_boss_health(), 150);
        assert_eq!(state.player_health(), 100);
        assert_eq!(
            state.phase,
            BattlePhase::Turn {
                side: Side::Boss,
                stage: Stage::Question
            }
        );
        assert!(!state.is_processing());
    }

    #[test]
    fn test_turns_alternate_through_stages() {
        let config = BattleConfig::default();
        let mut state = started(150);

        state.answer(true, &config).unwrap();
        assert!(state.is_processing());
        assert_eq!(state.phase.stage(), Some(Stage::Attack));
        // Second input during the attack window is refused
        assert!(state.answer(true, &config).is_none());
        assert!(!state.next_turn());

        assert_eq!(state.resolve().unwrap(), None);
        assert_eq!(state.phase.stage(), Some(Stage::Resolution));
        assert!(state.is_processing());

        assert!(state.next_turn());
        assert_eq!(state.phase.side(), Some(Side::Player));
        assert_eq!(state.phase.stage(), Some(Stage::Question));
    }

    #[test]
    fn test_boss_turn_damage() {
        let config = BattleConfig::default();
        let mut state = started(150);
        let report = play_turn(&mut state, false, &config);
        assert_eq!(report.target, Side::Player);
        assert_eq!(state.player_health(), 100 - config.boss_damage);
        assert_eq!(state.boss_health(), 150);
    }

    #[test]
    fn test_player_hits_and_streak_bonus() {
        let config = BattleConfig::default();
        let mut state = started(500);
        let mut hits = Vec::new();
        for _ in 0..3 {
            play_turn(&mut state, true, &config); // boss turn
            hits.push(play_turn(&mut state, true, &config).damage);
        }
        // Bonus starts at the third player hit
        assert_eq!(hits, vec![20, 20, 25]);
        assert_eq!(state.correct_streak, 3);
        assert_eq!(state.boss_health(), 500 - 65);
    }

    #[test]
    fn test_boss_turn_answers_leave_streak_alone() {
        let config = BattleConfig::default();
        let mut state = started(500);
        play_turn(&mut state, true, &config);
        assert_eq!(state.correct_streak, 0);

        play_turn(&mut state, true, &config);
        play_turn(&mut state, true, &config);
        let second = play_turn(&mut state, true, &config);
        assert_eq!(state.correct_streak, 2);
        assert_eq!(second.damage, 20);

        // A missed block costs health, not the streak
        play_turn(&mut state, false, &config);
        assert_eq!(state.correct_streak, 2);
    }

    #[test]
    fn test_huge_streak_bonus_saturates() {
        let config = BattleConfig {
            player_damage: u32::MAX - 1,
            streak_bonus: u32::MAX,
            max_streak_bonus: u32::MAX,
            ..BattleConfig::default()
        };
        let mut state = started(u32::MAX);
        state.correct_streak = 10;
        assert_eq!(state.streak_bonus(&config), u32::MAX);

        play_turn(&mut state, true, &config);
        let report = play_turn(&mut state, true, &config);
        assert_eq!(report.damage, u32::MAX);
    }

    #[test]
    fn test_wrong_answer_breaks_streak() {
        let config = BattleConfig::default();
        let mut state = started(500);
        for _ in 0..2 {
            play_turn(&mut state, true, &config);
            play_turn(&mut state, true, &config);
        }
        assert_eq!(state.correct_streak, 2);
        play_turn(&mut state, true, &config); // boss turn
        play_turn(&mut state, false, &config);
        assert_eq!(state.correct_streak, 0);
    }

    #[test]
    fn test_super_attack_charges_and_fires() {
        let config = BattleConfig::default();
        let mut state = started(1000);

        for _ in 0..config.super_attack_threshold {
            play_turn(&mut state, false, &config); // boss turn
            assert!(!state.arm_super_attack() || state.super_attack_ready);
            play_turn(&mut state, true, &config); // player turn
        }
        assert!(state.super_attack_ready);
        assert_eq!(state.super_attack_charge, config.super_attack_threshold);

        // Only on the player's question
        assert!(!state.arm_super_attack());
        play_turn(&mut state, false, &config);
        assert!(state.arm_super_attack());

        let report = play_turn(&mut state, true, &config);
        assert!(report.super_attack);
        // Streak 4 after the three charging hits: (20 + 10) × 2.5
        assert_eq!(report.damage, 75);
        assert!(!state.super_attack_ready);
        assert_eq!(state.super_attack_charge, 0);
    }

    #[test]
    fn test_boss_defeat_finishes_battle() {
        let config = BattleConfig::default();
        let mut state = started(30);
        state.answer(true, &config);
        state.resolve().unwrap();
        state.next_turn();
        state.answer(true, &config);
        assert_eq!(state.resolve().unwrap(), None);
        state.next_turn();
        state.answer(true, &config);
        state.resolve().unwrap();
        state.next_turn();
        state.answer(true, &config);
        assert_eq!(state.resolve().unwrap(), Some(Outcome::BossDefeated));
        assert_eq!(state.boss_health(), 0);
        assert_eq!(state.phase, BattlePhase::Finished(Outcome::BossDefeated));
        assert!(state.answer(true, &config).is_none());
        assert!(state.resolve().is_err());
    }

    #[test]
    fn test_reset_clears_progress() {
        let config = BattleConfig::default();
        let mut state = started(150);
        play_turn(&mut state, true, &config);
        state.answer(true, &config);
        state.reset();
        assert_eq!(state.phase, BattlePhase::Idle);
        assert_eq!(state.correct_streak, 0);
        assert_eq!(state.super_attack_charge, 0);
        assert!(!state.super_attack_ready);
        assert!(!state.is_processing());
        assert!(state.resolve().is_err());
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_bounds(
            boss_health in 1u32..400,
            answers in proptest::collection::vec(any::<bool>(), 1..200),
            arm in any::<bool>(),
        ) {
            let config = BattleConfig::default();
            let mut state = started(boss_health);
            let mut finished = 0;
            for correct in answers {
                if arm {
                    state.arm_super_attack();
                }
                if state.answer(correct, &config).is_none() {
                    break;
                }
                match state.resolve() {
                    Ok(Some(_)) => finished += 1,
                    Ok(None) => { state.next_turn(); }
                    Err(e) => prop_assert!(false, "{e}"),
                }
                prop_assert!(state.boss_health() <= state.max_boss_health());
                prop_assert!(state.player_health() <= 100);
            }
            prop_assert!(finished <= 1);
            if let BattlePhase::Finished(outcome) = state.phase {
                let zero = match outcome {
                    Outcome::BossDefeated => state.boss_health(),
                    Outcome::PlayerDefeated => state.player_health(),
                };
                prop_assert_eq!(zero, 0);
            }
        }
    }
}
