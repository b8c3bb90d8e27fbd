//! # Poker DQN
//!
//! A Deep Q-Network trainer for multi-player no-limit hold'em. One
//! learning agent plays against a table of scripted opponents inside a
//! compact simulation engine; the training loop turns delayed,
//! variable-length round outcomes into scalar signals and fits two
//! interdependent value networks with the double-DQN bootstrap.
//!
//! ## Features
//!
//! - **Fixed feature schema**: Monte-Carlo hand strength, pot and call
//!   sizing, opponent aggression, street one-hot, stack ratios
//! - **Double-network targets**: the online network picks next-state
//!   actions, the target network values them
//! - **Soft target sync**: exponential blend of target parameters toward
//!   the online network after every update
//! - **Bounded replay**: FIFO buffer of the newest transitions with
//!   uniform sampling
//! - **Reproducibility**: a single seed fixes dealing, exploration,
//!   simulation and initialization
//! - **Checkpointing**: episode-indexed JSON snapshots of the online
//!   network
//!
//! ## Quick Start
//!
//! ```no_run
//! use poker_dqn::dqn::{NullSink, Trainer, TrainerConfig};
//!
//! let config = TrainerConfig::default().with_seed(7).with_episodes(100);
//! let mut trainer = Trainer::with_default_opponents(config, Box::new(NullSink)).unwrap();
//! let stats = trainer.run().unwrap();
//! println!("trained {} episodes, {} updates", stats.episodes, stats.updates);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Trainer (orchestrator)                    │
//! │  - episode loop           - pending-transition state machine    │
//! │  - double-Q targets       - soft target sync                    │
//! │  - reward shaping         - checkpoints & telemetry             │
//! └─────────────────────────────────────────────────────────────────┘
//!        │ features/actions                 │ decision points
//!        ▼                                  ▼
//! ┌──────────────┐  ┌──────────────┐  ┌───────────────────────────┐
//! │  QNetwork ×2 │  │ ReplayBuffer │  │  Emulator (engine module) │
//! │ online/target│  │  FIFO store  │  │  scripted opponent table  │
//! └──────────────┘  └──────────────┘  └───────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod dqn;
pub mod engine;

// Re-export the entry points at the crate root.
pub use dqn::{Trainer, TrainerConfig, TrainerStats};
pub use engine::{Emulator, GameRule};
