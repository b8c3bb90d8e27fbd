//! Deep Q-learning core.
//!
//! Everything the training loop is made of lives here:
//!
//! - [`features`]: round-state featurization and the opponent-aggression
//!   tracker
//! - [`actions`]: the discrete action space and its resolution against
//!   engine descriptors
//! - [`explore`]: the annealed epsilon-greedy policy
//! - [`replay`]: bounded experience replay with uniform sampling
//! - [`network`]: the Q-value approximator and target-network soft update
//! - [`reward`]: round-outcome reward shaping
//! - [`trainer`]: the orchestrator wiring it all to the game emulator
//! - [`config`]: run configuration and statistics
//! - [`telemetry`]: scalar sample sinks
//!
//! The loop follows the classic double-DQN recipe: the online network
//! selects next-state actions, the target network values them, and the
//! target blends toward the online network after every update.

pub mod actions;
pub mod config;
pub mod explore;
pub mod features;
pub mod network;
pub mod replay;
pub mod reward;
pub mod telemetry;
pub mod trainer;

// Re-export the main types for convenient access.
pub use actions::{resolve, ActionError, ActionIndex, NUM_ACTIONS};
pub use config::{ConfigError, TrainerConfig, TrainerStats};
pub use explore::ExplorationPolicy;
pub use features::{
    feature_len, AggressivenessTracker, FeatureError, FeatureExtractor, FeatureVector, Features,
};
pub use network::{NetworkCheckpoint, QNetwork, TargetSynchronizer, HIDDEN_SIZE};
pub use replay::{ReplayBuffer, ReplayError, Transition, TransitionBatch};
pub use reward::{RewardShaper, RoundOutcome};
pub use telemetry::{JsonlSink, NullSink, TelemetrySink};
pub use trainer::{
    EpisodeSummary, EvaluationReport, Trainer, TrainerError, AGENT_UUID,
};
