//! Scripted opponent policies.
//!
//! The learning agent trains against a table of fixed policies. Each policy
//! implements [`OpponentPolicy`]: a decision callback plus notification
//! hooks the emulator invokes as the round progresses. The notification
//! hooks default to no-ops; only policies that track table state need them.

use super::card::{HoleCards, Street};
use super::hand_eval::estimate_win_rate;
use super::state::{ActionRecord, GameRule, PokerAction, RoundView, ValidActions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A fixed (non-learning) player driven by the emulator.
pub trait OpponentPolicy {
    /// Choose an action at a decision point.
    fn declare_action(
        &mut self,
        valid: &ValidActions,
        hole: &HoleCards,
        view: &RoundView,
    ) -> PokerAction;

    /// Called once when a game (episode) begins.
    fn receive_game_start(&mut self, _rule: &GameRule) {}

    /// Called when a new round is dealt.
    fn receive_round_start(&mut self, _round_count: u32) {}

    /// Called when a betting street begins.
    fn receive_street_start(&mut self, _street: Street) {}

    /// Called after any seat acts.
    fn receive_game_update(&mut self, _record: &ActionRecord) {}

    /// Called when the round is resolved.
    fn receive_round_result(&mut self, _winners: &[String]) {}
}

/// Calls every bet, no matter the size.
#[derive(Debug, Default)]
pub struct FishPlayer;

impl OpponentPolicy for FishPlayer {
    fn declare_action(
        &mut self,
        valid: &ValidActions,
        _hole: &HoleCards,
        _view: &RoundView,
    ) -> PokerAction {
        PokerAction::Call(valid.call_amount)
    }
}

/// Folds every hand immediately.
#[derive(Debug, Default)]
pub struct FoldPlayer;

impl OpponentPolicy for FoldPlayer {
    fn declare_action(
        &mut self,
        _valid: &ValidActions,
        _hole: &HoleCards,
        _view: &RoundView,
    ) -> PokerAction {
        PokerAction::Fold
    }
}

/// Picks a uniformly random legal action; raises pick a uniform amount
/// inside the legal window.
pub struct RandomPlayer {
    rng: StdRng,
}

impl RandomPlayer {
    /// Create with a fixed seed for reproducible play.
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Create with an entropy-seeded RNG.
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl OpponentPolicy for RandomPlayer {
    fn declare_action(
        &mut self,
        valid: &ValidActions,
        _hole: &HoleCards,
        _view: &RoundView,
    ) -> PokerAction {
        let options = if valid.raise_legal() { 3 } else { 2 };
        match self.rng.gen_range(0..options) {
            0 => PokerAction::Fold,
            1 => PokerAction::Call(valid.call_amount),
            _ => PokerAction::Raise(self.rng.gen_range(valid.raise_min..=valid.raise_max)),
        }
    }
}

/// Plays straightforwardly from estimated showdown equity: calls whenever
/// the Monte-Carlo win rate clears the 1-in-`num_players` break-even line,
/// folds otherwise.
pub struct HonestPlayer {
    num_players: usize,
    trials: u32,
    rng: StdRng,
}

impl HonestPlayer {
    /// Create for a table of `num_players`, estimating with `trials`
    /// Monte-Carlo deals per decision.
    pub fn new(num_players: usize, trials: u32, seed: u64) -> Self {
        Self { num_players, trials, rng: StdRng::seed_from_u64(seed) }
    }
}

impl OpponentPolicy for HonestPlayer {
    fn declare_action(
        &mut self,
        valid: &ValidActions,
        hole: &HoleCards,
        view: &RoundView,
    ) -> PokerAction {
        let win_rate =
            estimate_win_rate(self.trials, self.num_players, hole, &view.community, &mut self.rng);
        if win_rate >= 1.0 / self.num_players as f64 {
            PokerAction::Call(valid.call_amount)
        } else {
            PokerAction::Fold
        }
    }
}

/// The default training table: the lineup the trainer seats when no custom
/// opponents are supplied (two calling stations, one equity player, one
/// random player, repeating for larger tables).
pub fn default_lineup(
    num_players: usize,
    honest_trials: u32,
    seed: u64,
) -> Vec<(String, Box<dyn OpponentPolicy>)> {
    let mut lineup: Vec<(String, Box<dyn OpponentPolicy>)> = Vec::new();
    for i in 0..num_players.saturating_sub(1) {
        let opponent: (String, Box<dyn OpponentPolicy>) = match i % 4 {
            0 | 1 => (format!("fish-{}", i + 1), Box::new(FishPlayer)),
            2 => (
                format!("honest-{}", i + 1),
                Box::new(HonestPlayer::new(num_players, honest_trials, seed.wrapping_add(i as u64))),
            ),
            _ => (
                format!("random-{}", i + 1),
                Box::new(RandomPlayer::with_seed(seed.wrapping_add(i as u64))),
            ),
        };
        lineup.push(opponent);
    }
    lineup
}
