//! Evaluation binary: play greedy episodes from a saved checkpoint.
//!
//! Usage:
//!   cargo run --release --bin evaluate -- --checkpoint <FILE> [OPTIONS]
//!
//! Options:
//!   --checkpoint <FILE>   Checkpoint JSON to restore (required)
//!   --config <FILE>       Configuration JSON file (optional)
//!   --episodes <N>        Episodes to play (default: 100)
//!   --seed <N>            Random seed

use std::env;

use poker_dqn::dqn::{NetworkCheckpoint, NullSink, Trainer, TrainerConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut checkpoint_file: Option<String> = None;
    let mut config_file: Option<String> = None;
    let mut episodes: u64 = 100;
    let mut seed: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--checkpoint" | "-k" => {
                i += 1;
                if i < args.len() {
                    checkpoint_file = Some(args[i].clone());
                }
            }
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            }
            "--episodes" | "-e" => {
                i += 1;
                if i < args.len() {
                    episodes = args[i].parse().unwrap_or(100);
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return;
            }
        }
        i += 1;
    }

    let checkpoint_file = match checkpoint_file {
        Some(path) => path,
        None => {
            eprintln!("--checkpoint is required");
            print_help();
            return;
        }
    };

    println!("=================================================");
    println!("  Poker DQN Evaluation");
    println!("=================================================");
    println!();

    let mut config = if let Some(path) = &config_file {
        match TrainerConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return;
            }
        }
    } else {
        TrainerConfig::default()
    };
    if let Some(s) = seed {
        config = config.with_seed(s);
    }

    println!("Restoring checkpoint: {}", checkpoint_file);
    let checkpoint = match NetworkCheckpoint::load_json(&checkpoint_file) {
        Ok(ckpt) => ckpt,
        Err(e) => {
            eprintln!("Error loading checkpoint: {}", e);
            return;
        }
    };
    println!(
        "Checkpoint from episode {} ({} decisions)",
        checkpoint.episode, checkpoint.total_steps
    );

    if checkpoint.num_inputs != config.num_inputs() {
        eprintln!(
            "Checkpoint expects {} inputs but the table configuration implies {}",
            checkpoint.num_inputs,
            config.num_inputs()
        );
        return;
    }

    let mut trainer = match Trainer::with_default_opponents(config, Box::new(NullSink)) {
        Ok(trainer) => trainer,
        Err(e) => {
            eprintln!("Error building trainer: {}", e);
            return;
        }
    };
    trainer.load_checkpoint(&checkpoint);

    println!("Playing {} greedy episodes...", episodes);
    println!();

    match trainer.evaluate(episodes) {
        Ok(report) => {
            println!("Episodes: {}", report.episodes);
            println!("Mean reward: {:.3}", report.mean_reward);
            println!("Mean rounds survived: {:.2}", report.mean_rounds);
        }
        Err(e) => {
            eprintln!("Evaluation failed: {}", e);
        }
    }
}

fn print_help() {
    println!("Poker DQN Evaluation");
    println!();
    println!("Usage: evaluate --checkpoint <FILE> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -k, --checkpoint <FILE>   Checkpoint JSON to restore (required)");
    println!("  -c, --config <FILE>       Configuration JSON file");
    println!("  -e, --episodes <N>        Episodes to play (default: 100)");
    println!("  -s, --seed <N>            Random seed");
    println!("  -h, --help                Show this help");
}
