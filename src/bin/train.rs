//! Training binary.
//!
//! Usage:
//!   cargo run --release --bin train -- [OPTIONS]
//!
//! Options:
//!   --config <FILE>          Configuration JSON file (optional)
//!   --episodes <N>           Episodes to run (overrides config)
//!   --seed <N>               Random seed (overrides config)
//!   --checkpoint-dir <DIR>   Directory for episode-indexed checkpoints
//!   --telemetry <FILE>       JSON-lines telemetry output
//!   --fast                   Use the small testing configuration

use std::env;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use poker_dqn::dqn::{JsonlSink, NullSink, TelemetrySink, Trainer, TrainerConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut config_file: Option<String> = None;
    let mut episodes: Option<u64> = None;
    let mut seed: Option<u64> = None;
    let mut checkpoint_dir: Option<String> = None;
    let mut telemetry_file: Option<String> = None;
    let mut fast_mode = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            }
            "--episodes" | "-e" => {
                i += 1;
                if i < args.len() {
                    episodes = args[i].parse().ok();
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            }
            "--checkpoint-dir" | "-d" => {
                i += 1;
                if i < args.len() {
                    checkpoint_dir = Some(args[i].clone());
                }
            }
            "--telemetry" | "-t" => {
                i += 1;
                if i < args.len() {
                    telemetry_file = Some(args[i].clone());
                }
            }
            "--fast" | "-f" => {
                fast_mode = true;
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

    println!("=================================================");
    println!("  Poker DQN Trainer");
    println!("=================================================");
    println!();

    // Load or build the configuration.
    let mut config = if let Some(path) = &config_file {
        println!("Loading configuration from: {}", path);
        match TrainerConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return;
            }
        }
    } else if fast_mode {
        println!("Using fast testing configuration");
        TrainerConfig::fast()
    } else {
        TrainerConfig::default()
    };

    if let Some(n) = episodes {
        config.num_episodes = n;
    }
    if let Some(s) = seed {
        config = config.with_seed(s);
    }
    if let Some(dir) = checkpoint_dir {
        config = config.with_checkpoint_dir(dir);
    }

    println!("Players: {} ({} opponents)", config.num_players, config.num_players - 1);
    println!("Episodes: {}", config.num_episodes);
    println!("Rounds per episode: {}", config.max_rounds);
    println!("Stack: {} (blinds {}/{})", config.start_stack, config.small_blind, config.small_blind * 2);
    println!("Batch: {} every {} steps, buffer {}", config.batch_size, config.update_freq, config.buffer_capacity);
    println!("Epsilon: {} -> {} over {} steps", config.start_epsilon, config.end_epsilon, config.annealing_steps);
    if let Some(s) = config.seed {
        println!("Seed: {}", s);
    }
    if let Some(dir) = &config.checkpoint_dir {
        println!("Checkpoints: {}", dir.display());
    }
    println!();

    let telemetry: Box<dyn TelemetrySink> = match &telemetry_file {
        Some(path) => match JsonlSink::create(path) {
            Ok(sink) => {
                println!("Telemetry: {}", path);
                Box::new(sink)
            }
            Err(e) => {
                eprintln!("Error opening telemetry file: {}", e);
                return;
            }
        },
        None => Box::new(NullSink),
    };

    let mut trainer = match Trainer::with_default_opponents(config.clone(), telemetry) {
        Ok(trainer) => trainer,
        Err(e) => {
            eprintln!("Error building trainer: {}", e);
            return;
        }
    };

    println!("Starting training...");
    println!();

    let start_time = Instant::now();
    let bar = ProgressBar::new(config.num_episodes);
    bar.set_style(
        ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos:>6}/{len:6} [{elapsed_precise}] {msg}",
        )
        .expect("static template is valid"),
    );

    let result = trainer.run_with_callback(|summary, stats| {
        bar.inc(1);
        bar.set_message(format!(
            "reward {:>7.2} | rounds {:>2} | loss {}",
            stats.mean_recent_reward(10),
            summary.rounds,
            stats
                .last_loss
                .map(|l| format!("{:.4}", l))
                .unwrap_or_else(|| "-".to_string()),
        ));
    });
    bar.finish();

    match result {
        Ok(stats) => {
            println!();
            println!("Training complete!");
            println!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
            println!("Episodes: {}", stats.episodes);
            println!("Decisions: {}", stats.total_steps);
            println!("Updates: {}", stats.updates);
            println!("Mean reward (last 100): {:.3}", stats.mean_recent_reward(100));
            println!("Mean rounds (last 100): {:.2}", stats.mean_recent_rounds(100));
            if let Some(loss) = stats.last_loss {
                println!("Final loss: {:.5}", loss);
            }
        }
        Err(e) => {
            eprintln!();
            eprintln!("Training failed: {}", e);
        }
    }
}

fn print_help() {
    println!("Poker DQN Trainer");
    println!();
    println!("Usage: train [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <FILE>          Configuration JSON file");
    println!("  -e, --episodes <N>           Episodes to run (overrides config)");
    println!("  -s, --seed <N>               Random seed");
    println!("  -d, --checkpoint-dir <DIR>   Directory for checkpoints");
    println!("  -t, --telemetry <FILE>       JSON-lines telemetry output");
    println!("  -f, --fast                   Small testing configuration");
    println!("  -h, --help                   Show this help");
    println!();
    println!("Examples:");
    println!("  # Quick smoke run");
    println!("  train --fast --seed 7");
    println!();
    println!("  # Full run with checkpoints and telemetry");
    println!("  train --episodes 20000 --checkpoint-dir ./checkpoints --telemetry stats.jsonl");
}
