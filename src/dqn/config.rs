//! Trainer configuration and run statistics.
//!
//! `TrainerConfig` collects every knob of the training loop: table rules,
//! network hyperparameters, exploration schedule, replay sizing, and
//! checkpointing. Configs validate before use and can be loaded from JSON.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::engine::state::GameRule;

/// Configuration for a training run.
///
/// # Example
/// ```
/// use poker_dqn::dqn::TrainerConfig;
///
/// let config = TrainerConfig::default().with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Number of seats, learning agent included.
    pub num_players: usize,

    /// Starting stack for every seat.
    pub start_stack: i64,

    /// Rounds per episode before the game ends.
    pub max_rounds: u32,

    /// Small blind amount; the big blind is twice this.
    pub small_blind: i64,

    /// Ante posted by every seated player, 0 to disable.
    pub ante: i64,

    /// Transitions per training batch.
    pub batch_size: usize,

    /// Train every this many decision steps past the warm-up window.
    pub update_freq: u64,

    /// Adam learning rate for the online network.
    pub learning_rate: f64,

    /// Discount factor for bootstrapped targets.
    pub discount: f64,

    /// Initial chance of a random action.
    pub start_epsilon: f64,

    /// Final chance of a random action.
    pub end_epsilon: f64,

    /// Decisions over which epsilon anneals from start to end.
    pub annealing_steps: u64,

    /// Decisions of forced exploration before training begins.
    pub pre_train_steps: u64,

    /// Soft-update rate blending the target network toward the online one.
    pub tau: f64,

    /// Episodes to run.
    pub num_episodes: u64,

    /// Replay buffer capacity.
    pub buffer_capacity: usize,

    /// Monte-Carlo trials per win-rate estimate.
    pub mc_trials: u32,

    /// Save a checkpoint every this many episodes; 0 disables periodic
    /// checkpoints (a final one is still written when a directory is set).
    pub checkpoint_interval: u64,

    /// Directory for episode-indexed checkpoints; `None` disables
    /// persistence entirely.
    pub checkpoint_dir: Option<PathBuf>,

    /// Random seed for reproducibility. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            num_players: 5,
            start_stack: 1500,
            max_rounds: 10,
            small_blind: 5,
            ante: 0,
            batch_size: 128,
            update_freq: 50,
            learning_rate: 0.0001,
            discount: 0.99,
            start_epsilon: 1.0,
            end_epsilon: 0.1,
            annealing_steps: 10_000,
            pre_train_steps: 0,
            tau: 0.01,
            num_episodes: 20_000,
            buffer_capacity: 50_000,
            mc_trials: 1000,
            checkpoint_interval: 200,
            checkpoint_dir: None,
            seed: None,
        }
    }
}

impl TrainerConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A small configuration for quick runs and tests: a short table,
    /// few rounds, and a cheap win-rate estimate.
    pub fn fast() -> Self {
        Self {
            num_players: 3,
            start_stack: 200,
            max_rounds: 3,
            batch_size: 16,
            update_freq: 10,
            annealing_steps: 500,
            num_episodes: 20,
            buffer_capacity: 2000,
            mc_trials: 30,
            checkpoint_interval: 0,
            ..Default::default()
        }
    }

    /// Builder method: set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: set the number of episodes.
    pub fn with_episodes(mut self, episodes: u64) -> Self {
        self.num_episodes = episodes;
        self
    }

    /// Builder method: set the checkpoint directory.
    pub fn with_checkpoint_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = Some(dir.into());
        self
    }

    /// The table rules implied by this config.
    pub fn game_rule(&self) -> GameRule {
        GameRule {
            num_players: self.num_players,
            max_round: self.max_rounds,
            small_blind: self.small_blind,
            ante: self.ante,
            start_stack: self.start_stack,
        }
    }

    /// Feature vector length implied by the player count.
    pub fn num_inputs(&self) -> usize {
        super::features::feature_len(self.num_players)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=10).contains(&self.num_players) {
            return Err(ConfigError::PlayerCount(self.num_players));
        }
        for (name, value) in [
            ("start_stack", self.start_stack),
            ("small_blind", self.small_blind),
        ] {
            if value <= 0 {
                return Err(ConfigError::NotPositive { name, value: value as f64 });
            }
        }
        if self.ante < 0 {
            return Err(ConfigError::NotPositive { name: "ante", value: self.ante as f64 });
        }
        for (name, value) in [
            ("max_rounds", self.max_rounds as f64),
            ("batch_size", self.batch_size as f64),
            ("update_freq", self.update_freq as f64),
            ("annealing_steps", self.annealing_steps as f64),
            ("mc_trials", self.mc_trials as f64),
            ("learning_rate", self.learning_rate),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        for (name, value) in [
            ("discount", self.discount),
            ("tau", self.tau),
            ("start_epsilon", self.start_epsilon),
            ("end_epsilon", self.end_epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }
        if self.end_epsilon > self.start_epsilon {
            return Err(ConfigError::EpsilonOrder {
                start: self.start_epsilon,
                end: self.end_epsilon,
            });
        }
        if self.batch_size > self.buffer_capacity {
            return Err(ConfigError::BatchExceedsCapacity {
                batch: self.batch_size,
                capacity: self.buffer_capacity,
            });
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors from validating or loading a trainer configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A value that must be strictly positive is not.
    NotPositive {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A probability-like value is outside [0, 1].
    OutOfRange {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// The final epsilon exceeds the starting epsilon.
    EpsilonOrder {
        /// Starting epsilon.
        start: f64,
        /// Final epsilon.
        end: f64,
    },
    /// The batch size exceeds the replay capacity.
    BatchExceedsCapacity {
        /// Configured batch size.
        batch: usize,
        /// Configured replay capacity.
        capacity: usize,
    },
    /// Player count outside the supported 2-10 table sizes.
    PlayerCount(usize),
    /// Registered opponents do not fill the table.
    OpponentCount {
        /// Opponents the table needs.
        expected: usize,
        /// Opponents supplied.
        actual: usize,
    },
    /// Reading the config file failed.
    Io(String),
    /// Parsing the config file failed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotPositive { name, value } => {
                write!(f, "{} must be positive, got {}", name, value)
            }
            ConfigError::OutOfRange { name, value } => {
                write!(f, "{} must be in [0, 1], got {}", name, value)
            }
            ConfigError::EpsilonOrder { start, end } => {
                write!(f, "end epsilon {} exceeds start epsilon {}", end, start)
            }
            ConfigError::BatchExceedsCapacity { batch, capacity } => {
                write!(f, "batch size {} exceeds replay capacity {}", batch, capacity)
            }
            ConfigError::PlayerCount(n) => {
                write!(f, "player count {} outside supported range 2-10", n)
            }
            ConfigError::OpponentCount { expected, actual } => {
                write!(f, "table needs {} opponents, got {}", expected, actual)
            }
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Window of recent action indices kept for telemetry.
const ACTION_WINDOW: usize = 50;

/// Statistics tracked across a training run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainerStats {
    /// Episodes completed.
    pub episodes: u64,

    /// Total agent decisions taken.
    pub total_steps: u64,

    /// Training updates performed.
    pub updates: u64,

    /// Loss of the most recent update.
    pub last_loss: Option<f64>,

    /// Accumulated shaped reward per episode.
    pub episode_rewards: Vec<f64>,

    /// Rounds played per episode.
    pub episode_rounds: Vec<u32>,

    /// Most recent action indices, newest last.
    pub recent_actions: VecDeque<usize>,

    /// Wall-clock seconds spent in the run loop.
    pub elapsed_seconds: f64,
}

impl TrainerStats {
    /// Create empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Note one selected action index.
    pub fn note_action(&mut self, action: usize) {
        if self.recent_actions.len() == ACTION_WINDOW {
            self.recent_actions.pop_front();
        }
        self.recent_actions.push_back(action);
    }

    /// Mean reward over the most recent `n` episodes (0 when empty).
    pub fn mean_recent_reward(&self, n: usize) -> f64 {
        mean_tail(&self.episode_rewards, n)
    }

    /// Mean round count over the most recent `n` episodes (0 when empty).
    pub fn mean_recent_rounds(&self, n: usize) -> f64 {
        let rounds: Vec<f64> = self.episode_rounds.iter().map(|&r| r as f64).collect();
        mean_tail(&rounds, n)
    }

    /// Mean of the recent action window (0 when empty).
    pub fn mean_recent_actions(&self) -> f64 {
        if self.recent_actions.is_empty() {
            return 0.0;
        }
        self.recent_actions.iter().sum::<usize>() as f64 / self.recent_actions.len() as f64
    }
}

fn mean_tail(values: &[f64], n: usize) -> f64 {
    if values.is_empty() || n == 0 {
        return 0.0;
    }
    let tail = &values[values.len().saturating_sub(n)..];
    tail.iter().sum::<f64>() / tail.len() as f64
}
