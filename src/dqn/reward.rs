//! Round-outcome reward shaping.
//!
//! Poker pays off at round boundaries, so the shaper converts each round's
//! signed stack delta into a scalar training signal. Losses early in an
//! episode are penalized more heavily than late ones, and wins late in an
//! episode earn more credit than early ones. A round with no stack change
//! falls back to a fixed ±5 judgment of the latest hand-strength estimate.
//! That heuristic is load-bearing for training dynamics and is kept as-is.

/// Outcome of shaping one round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundOutcome {
    /// A scalar reward for the round.
    Reward(f64),
    /// The agent entered the round with no chips: no reward, and the
    /// episode records its bust round.
    Busted,
}

/// Converts round outcomes into scalar rewards.
#[derive(Debug, Clone)]
pub struct RewardShaper {
    start_stack: i64,
    max_rounds: u32,
    num_players: usize,
}

impl RewardShaper {
    /// Create a shaper for a fixed game configuration.
    pub fn new(start_stack: i64, max_rounds: u32, num_players: usize) -> Self {
        Self { start_stack, max_rounds, num_players }
    }

    /// Shape one round's outcome.
    ///
    /// `delta` is the agent's signed stack change over the round,
    /// `round_index` the 1-based round number within the episode,
    /// `stack_begin_of_round` the agent's stack when the round was dealt,
    /// and `latest_hand_strength` the most recent featurized estimate.
    pub fn shape(
        &self,
        delta: i64,
        round_index: u32,
        stack_begin_of_round: i64,
        latest_hand_strength: f64,
    ) -> RoundOutcome {
        if delta != 0 {
            // A degenerate starting stack substitutes a neutral default
            // instead of failing the round.
            let normalized = if self.start_stack > 0 {
                delta as f64 / self.start_stack as f64
            } else {
                0.5
            };
            let reward = if delta < 0 {
                normalized * (self.max_rounds + 1 - round_index) as f64
            } else {
                normalized * round_index as f64
            };
            return RoundOutcome::Reward(reward);
        }

        if stack_begin_of_round > 0 {
            // A walk or a fold with nothing invested: judge whether sitting
            // out was right for the hand we held.
            let threshold = 1.0 / self.num_players as f64;
            let reward = if latest_hand_strength < threshold { 5.0 } else { -5.0 };
            RoundOutcome::Reward(reward)
        } else {
            RoundOutcome::Busted
        }
    }
}
