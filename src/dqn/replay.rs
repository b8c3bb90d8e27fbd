//! Bounded experience replay storage.
//!
//! Transitions accumulate per episode and are flushed into a circular
//! buffer that always holds the most recently added `capacity` entries.
//! Training samples uniformly without replacement and returns the batch as
//! parallel arrays ready for batched numeric processing.

use super::features::FeatureVector;
use ndarray::Array2;
use rand::Rng;
use std::collections::VecDeque;
use std::fmt;

/// One step of experience.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Features at the decision point.
    pub state: FeatureVector,
    /// Selected action index.
    pub action: usize,
    /// Reward attributed to the step (0 for non-terminal steps).
    pub reward: f64,
    /// Features at the next decision point, or a repeat of `state` on
    /// terminal steps (masked out by `terminal` during bootstrapping).
    pub next_state: FeatureVector,
    /// Whether this step ended a round.
    pub terminal: bool,
}

/// Replay sampling failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// More samples were requested than the buffer holds. Callers gate
    /// sampling behind the warm-up threshold instead of retrying.
    SampleExceedsSize {
        /// Requested sample size.
        requested: usize,
        /// Entries currently stored.
        available: usize,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::SampleExceedsSize { requested, available } => write!(
                f,
                "cannot sample {} transitions from a buffer of {}",
                requested, available
            ),
        }
    }
}

impl std::error::Error for ReplayError {}

/// A sampled batch as parallel arrays.
#[derive(Debug, Clone)]
pub struct TransitionBatch {
    /// Stacked states, one row per sample.
    pub states: Array2<f64>,
    /// Selected action index per sample.
    pub actions: Vec<usize>,
    /// Reward per sample.
    pub rewards: Vec<f64>,
    /// Stacked next states, one row per sample.
    pub next_states: Array2<f64>,
    /// Terminal flag per sample.
    pub terminals: Vec<bool>,
}

impl TransitionBatch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Bounded FIFO store of transitions with uniform sampling.
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    /// Create a buffer holding at most `capacity` transitions.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay capacity must be positive");
        Self { buffer: VecDeque::with_capacity(capacity.min(4096)), capacity }
    }

    /// Append a batch, evicting the oldest entries first so the buffer
    /// always keeps the newest `capacity` transitions in arrival order.
    pub fn add(&mut self, batch: Vec<Transition>) {
        let incoming = batch.len();
        let overflow = (self.buffer.len() + incoming).saturating_sub(self.capacity);
        for _ in 0..overflow.min(self.buffer.len()) {
            self.buffer.pop_front();
        }
        // A single batch larger than the whole buffer keeps only its tail.
        let skip = incoming.saturating_sub(self.capacity);
        self.buffer.extend(batch.into_iter().skip(skip));
    }

    /// Sample `n` distinct transitions uniformly at random.
    ///
    /// # Errors
    /// [`ReplayError::SampleExceedsSize`] when `n` exceeds the current
    /// size.
    pub fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Result<TransitionBatch, ReplayError> {
        if n > self.buffer.len() {
            return Err(ReplayError::SampleExceedsSize {
                requested: n,
                available: self.buffer.len(),
            });
        }
        if n == 0 {
            return Ok(TransitionBatch {
                states: Array2::zeros((0, 0)),
                actions: Vec::new(),
                rewards: Vec::new(),
                next_states: Array2::zeros((0, 0)),
                terminals: Vec::new(),
            });
        }

        let picks = rand::seq::index::sample(rng, self.buffer.len(), n);
        let dim = self.buffer[picks.index(0)].state.len();

        let mut states = Array2::zeros((n, dim));
        let mut next_states = Array2::zeros((n, dim));
        let mut actions = Vec::with_capacity(n);
        let mut rewards = Vec::with_capacity(n);
        let mut terminals = Vec::with_capacity(n);

        for (row, pick) in picks.iter().enumerate() {
            let t = &self.buffer[pick];
            states
                .row_mut(row)
                .assign(&ndarray::ArrayView1::from(t.state.values()));
            next_states
                .row_mut(row)
                .assign(&ndarray::ArrayView1::from(t.next_state.values()));
            actions.push(t.action);
            rewards.push(t.reward);
            terminals.push(t.terminal);
        }

        Ok(TransitionBatch { states, actions, rewards, next_states, terminals })
    }

    /// Number of stored transitions.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Maximum number of stored transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over stored transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn transition(tag: f64) -> Transition {
        Transition {
            state: FeatureVector::from_vec(vec![tag, 0.0]),
            action: tag as usize % 7,
            reward: tag,
            next_state: FeatureVector::from_vec(vec![tag + 0.5, 0.0]),
            terminal: false,
        }
    }

    fn tags(buffer: &ReplayBuffer) -> Vec<f64> {
        buffer.iter().map(|t| t.state.values()[0]).collect()
    }

    #[test]
    fn test_add_under_capacity_keeps_order() {
        let mut buffer = ReplayBuffer::new(10);
        buffer.add((0..4).map(|i| transition(i as f64)).collect());
        buffer.add((4..7).map(|i| transition(i as f64)).collect());

        assert_eq!(buffer.len(), 7);
        assert_eq!(tags(&buffer), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut buffer = ReplayBuffer::new(5);
        buffer.add((0..4).map(|i| transition(i as f64)).collect());
        buffer.add((4..8).map(|i| transition(i as f64)).collect());

        // 8 added into capacity 5: entries 3..8 survive, in order.
        assert_eq!(buffer.len(), 5);
        assert_eq!(tags(&buffer), vec![3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_exact_capacity_keeps_everything() {
        let mut buffer = ReplayBuffer::new(6);
        buffer.add((0..3).map(|i| transition(i as f64)).collect());
        buffer.add((3..6).map(|i| transition(i as f64)).collect());
        assert_eq!(buffer.len(), 6);
        assert_eq!(tags(&buffer), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_giant_batch_keeps_tail() {
        let mut buffer = ReplayBuffer::new(3);
        buffer.add((0..10).map(|i| transition(i as f64)).collect());
        assert_eq!(buffer.len(), 3);
        assert_eq!(tags(&buffer), vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_sample_returns_distinct_entries() {
        let mut buffer = ReplayBuffer::new(100);
        buffer.add((0..20).map(|i| transition(i as f64)).collect());

        let mut rng = StdRng::seed_from_u64(3);
        let batch = buffer.sample(10, &mut rng).unwrap();

        assert_eq!(batch.len(), 10);
        assert_eq!(batch.states.nrows(), 10);
        assert_eq!(batch.next_states.nrows(), 10);

        let mut seen: Vec<f64> = (0..10).map(|i| batch.states[[i, 0]]).collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        seen.dedup();
        assert_eq!(seen.len(), 10, "sampling is without replacement");
        for &tag in &seen {
            assert!((0.0..20.0).contains(&tag), "samples come from stored entries");
        }
    }

    #[test]
    fn test_sample_parallel_arrays_line_up() {
        let mut buffer = ReplayBuffer::new(100);
        buffer.add((0..8).map(|i| transition(i as f64)).collect());

        let mut rng = StdRng::seed_from_u64(9);
        let batch = buffer.sample(8, &mut rng).unwrap();
        for i in 0..8 {
            let tag = batch.states[[i, 0]];
            assert_eq!(batch.rewards[i], tag);
            assert_eq!(batch.actions[i], tag as usize % 7);
            assert_eq!(batch.next_states[[i, 0]], tag + 0.5);
        }
    }

    #[test]
    fn test_oversized_sample_fails() {
        let mut buffer = ReplayBuffer::new(100);
        buffer.add((0..5).map(|i| transition(i as f64)).collect());

        let mut rng = StdRng::seed_from_u64(3);
        let err = buffer.sample(6, &mut rng).unwrap_err();
        assert_eq!(err, ReplayError::SampleExceedsSize { requested: 6, available: 5 });
    }
}
