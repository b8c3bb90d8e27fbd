//! Benchmarks for the DQN training loop hot paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use poker_dqn::dqn::{FeatureVector, QNetwork, ReplayBuffer, Transition, NUM_ACTIONS};
use poker_dqn::engine::card::HoleCards;
use poker_dqn::engine::hand_eval::estimate_win_rate;

const INPUTS: usize = 14;

fn win_rate_benchmark(c: &mut Criterion) {
    let hole = HoleCards::from_str("AhKh").unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    c.bench_function("win_rate_1000_trials", |b| {
        b.iter(|| black_box(estimate_win_rate(1000, 5, &hole, &[], &mut rng)))
    });
}

fn replay_sample_benchmark(c: &mut Criterion) {
    let mut buffer = ReplayBuffer::new(50_000);
    let transitions: Vec<Transition> = (0..10_000)
        .map(|i| Transition {
            state: FeatureVector::from_vec(vec![i as f64; INPUTS]),
            action: i % NUM_ACTIONS,
            reward: 0.0,
            next_state: FeatureVector::from_vec(vec![i as f64 + 0.5; INPUTS]),
            terminal: i % 9 == 0,
        })
        .collect();
    buffer.add(transitions);
    let mut rng = StdRng::seed_from_u64(42);

    c.bench_function("replay_sample_128", |b| {
        b.iter(|| black_box(buffer.sample(128, &mut rng).unwrap()))
    });
}

fn network_update_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut net = QNetwork::new(INPUTS, NUM_ACTIONS, 0.0001, &mut rng);
    let states = Array2::from_shape_fn((128, INPUTS), |(i, j)| (i * j) as f64 * 0.001);
    let actions: Vec<usize> = (0..128).map(|i| i % NUM_ACTIONS).collect();
    let targets = vec![0.5; 128];

    c.bench_function("network_update_128", |b| {
        b.iter(|| black_box(net.update(&states, &actions, &targets)))
    });
}

criterion_group!(
    benches,
    win_rate_benchmark,
    replay_sample_benchmark,
    network_update_benchmark
);
criterion_main!(benches);
