//! Round-state featurization.
//!
//! Converts the public round state at a decision point into the fixed
//! numeric vector the Q-network consumes. The schema is position-sensitive
//! and must match the network input layer exactly:
//!
//! ```text
//! [ hand_strength,            // Monte-Carlo win rate / num_players, in [0, 1]
//!   call_amount,              // live call amount (min raise when call is 0)
//!   pot,                      // total pot in chips
//!   aggressiveness,           // running opponent-aggression average
//!   round_ratio,              // round_count / max_round, in [0, 1]
//!   preflop, flop, turn, river, // one-hot street
//!   own_stack_ratio,          // stack / starting stack
//!   opp_stack_ratio ... ]     // one per opponent, seat order
//! ```
//!
//! Vector length is `10 + (num_players - 1)`.

use crate::engine::card::{HoleCards, Street};
use crate::engine::hand_eval::estimate_win_rate;
use crate::engine::state::{ActionKind, ActionRecord, RoundView, ValidActions};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of schema slots before the per-opponent stack ratios.
pub const BASE_FEATURES: usize = 10;

/// Feature vector length for a table of `num_players`.
pub fn feature_len(num_players: usize) -> usize {
    BASE_FEATURES + num_players - 1
}

/// A fixed-length feature vector for one decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap a raw vector. The caller guarantees schema order.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// The raw values in schema order.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Vector length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Featurization output: the vector plus the scalars worth reporting.
#[derive(Debug, Clone)]
pub struct Features {
    /// The network input vector.
    pub vector: FeatureVector,
    /// Estimated hand strength (already divided by the player count).
    pub hand_strength: f64,
    /// Pot divided by the live call amount; 0 when nothing is live.
    pub pot_odds: f64,
}

/// Featurization failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    /// The agent's seat is missing from the round state. Fatal for the
    /// decision; the episode must abort rather than continue on malformed
    /// features.
    SeatNotFound {
        /// The identifier that failed to match any seat.
        uuid: String,
    },
}

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureError::SeatNotFound { uuid } => {
                write!(f, "agent seat '{}' not found in round state", uuid)
            }
        }
    }
}

impl std::error::Error for FeatureError {}

/// Builds feature vectors from round snapshots.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    num_players: usize,
    start_stack: i64,
    max_round: u32,
    mc_trials: u32,
}

impl FeatureExtractor {
    /// Create an extractor for a fixed table configuration.
    pub fn new(num_players: usize, start_stack: i64, max_round: u32, mc_trials: u32) -> Self {
        Self { num_players, start_stack, max_round, mc_trials }
    }

    /// Featurize a decision point.
    ///
    /// # Errors
    /// [`FeatureError::SeatNotFound`] when `agent_uuid` matches no seat.
    pub fn extract<R: Rng>(
        &self,
        agent_uuid: &str,
        hole: &HoleCards,
        view: &RoundView,
        valid: &ValidActions,
        aggressiveness: f64,
        rng: &mut R,
    ) -> Result<Features, FeatureError> {
        let seat = view
            .seats
            .iter()
            .find(|s| s.uuid == agent_uuid)
            .ok_or_else(|| FeatureError::SeatNotFound { uuid: agent_uuid.to_string() })?;

        let win_rate =
            estimate_win_rate(self.mc_trials, self.num_players, hole, &view.community, rng);
        let hand_strength = win_rate / self.num_players as f64;

        // When no live call is offered, price the decision off the minimum
        // raise instead (this may carry the illegal-raise sentinel).
        let live_call = if valid.call_amount > 0 { valid.call_amount } else { valid.raise_min };
        let pot_odds = if live_call != 0 { view.pot as f64 / live_call as f64 } else { 0.0 };

        let round_ratio = view.round_count as f64 / self.max_round as f64;
        let start_stack = self.start_stack as f64;

        let mut values = Vec::with_capacity(feature_len(self.num_players));
        values.push(hand_strength);
        values.push(live_call as f64);
        values.push(view.pot as f64);
        values.push(aggressiveness);
        values.push(round_ratio);
        for street in Street::ALL {
            values.push(if street == view.street { 1.0 } else { 0.0 });
        }
        values.push(seat.stack as f64 / start_stack);
        for other in view.seats.iter().filter(|s| s.uuid != agent_uuid) {
            values.push(other.stack as f64 / start_stack);
        }

        Ok(Features { vector: FeatureVector(values), hand_strength, pot_odds })
    }
}

/// Running average of opponent betting pressure over an episode.
///
/// Updated once per completed street from that street's action history.
/// Each opponent call or raise contributes its amount divided by the
/// current reference call amount; a fold contributes zero but still counts.
/// A raise moves the reference to its own amount. The exposed value is the
/// cumulative average across the whole episode.
#[derive(Debug, Clone)]
pub struct AggressivenessTracker {
    initial_reference: f64,
    reference_call: f64,
    sum: f64,
    count: u64,
    average: f64,
}

impl AggressivenessTracker {
    /// Create a tracker whose reference call starts at the big blind.
    pub fn new(big_blind: i64) -> Self {
        Self {
            initial_reference: big_blind as f64,
            reference_call: big_blind as f64,
            sum: 0.0,
            count: 0,
            average: 0.0,
        }
    }

    /// Reset for a new episode.
    pub fn reset(&mut self) {
        self.reference_call = self.initial_reference;
        self.sum = 0.0;
        self.count = 0;
        self.average = 0.0;
    }

    /// Fold one completed street's history into the running average.
    /// The agent's own actions and forced bets are excluded.
    pub fn record_street(&mut self, agent_uuid: &str, records: &[ActionRecord]) {
        for record in records {
            if record.uuid == agent_uuid {
                continue;
            }
            match record.kind {
                ActionKind::Fold => {
                    self.count += 1;
                }
                ActionKind::Call => {
                    self.sum += record.amount as f64 / self.reference_call;
                    self.count += 1;
                }
                ActionKind::Raise => {
                    self.sum += record.amount as f64 / self.reference_call;
                    self.count += 1;
                    self.reference_call = record.amount as f64;
                }
                ActionKind::SmallBlind | ActionKind::BigBlind | ActionKind::Ante => {}
            }
        }
        if self.count > 0 {
            self.average = self.sum / self.count as f64;
        }
    }

    /// The current running average.
    pub fn value(&self) -> f64 {
        self.average
    }
}
