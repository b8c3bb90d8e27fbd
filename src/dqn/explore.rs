//! Epsilon-greedy exploration schedule.
//!
//! Epsilon anneals linearly from a start value to an end value over a fixed
//! number of decisions. During an initial warm-up window of pre-train
//! steps, exploration is forced regardless of epsilon.

use rand::Rng;

/// Epsilon-greedy wrapper around the estimator's greedy choice.
#[derive(Debug, Clone)]
pub struct ExplorationPolicy {
    epsilon: f64,
    end_epsilon: f64,
    step_drop: f64,
    pre_train_steps: u64,
    num_actions: usize,
}

impl ExplorationPolicy {
    /// Create a schedule annealing from `start_epsilon` to `end_epsilon`
    /// over `annealing_steps` decisions, with `pre_train_steps` of forced
    /// exploration up front.
    pub fn new(
        start_epsilon: f64,
        end_epsilon: f64,
        annealing_steps: u64,
        pre_train_steps: u64,
        num_actions: usize,
    ) -> Self {
        Self {
            epsilon: start_epsilon,
            end_epsilon,
            step_drop: (start_epsilon - end_epsilon) / annealing_steps as f64,
            pre_train_steps,
            num_actions,
        }
    }

    /// Choose between the greedy action and a uniformly random one.
    ///
    /// Draws exactly one uniform value per decision; a draw below epsilon,
    /// or a total step count still inside the warm-up window, overrides the
    /// greedy choice. The two outcomes are mutually exclusive per decision.
    pub fn choose<R: Rng>(&self, rng: &mut R, greedy: usize, total_steps: u64) -> usize {
        if rng.gen::<f64>() < self.epsilon || total_steps < self.pre_train_steps {
            rng.gen_range(0..self.num_actions)
        } else {
            greedy
        }
    }

    /// Step the schedule down once, flooring at the end value. The caller
    /// invokes this after each decision past the warm-up window.
    pub fn anneal(&mut self) {
        if self.epsilon > self.end_epsilon {
            self.epsilon -= self.step_drop;
        }
    }

    /// Current epsilon.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_full_epsilon_is_uniform() {
        let policy = ExplorationPolicy::new(1.0, 0.1, 10_000, 0, 7);
        let mut rng = StdRng::seed_from_u64(17);

        let draws = 14_000;
        let mut counts = [0usize; 7];
        for step in 0..draws {
            counts[policy.choose(&mut rng, 3, step)] += 1;
        }

        // Every action should land near draws/7 = 2000.
        for (action, &count) in counts.iter().enumerate() {
            assert!(
                (1700..=2300).contains(&count),
                "action {} drawn {} times, outside uniform tolerance",
                action,
                count
            );
        }
    }

    #[test]
    fn test_zero_epsilon_defers_to_greedy() {
        let policy = ExplorationPolicy::new(0.0, 0.0, 1, 0, 7);
        let mut rng = StdRng::seed_from_u64(17);
        for step in 0..100 {
            assert_eq!(policy.choose(&mut rng, 4, step), 4);
        }
    }

    #[test]
    fn test_warm_up_forces_exploration() {
        // Epsilon 0 but a warm-up window: choices must still be random,
        // which over many draws means the greedy action is not exclusive.
        let policy = ExplorationPolicy::new(0.0, 0.0, 1, 1000, 7);
        let mut rng = StdRng::seed_from_u64(17);

        let mut non_greedy = 0;
        for step in 0..500 {
            if policy.choose(&mut rng, 4, step) != 4 {
                non_greedy += 1;
            }
        }
        assert!(non_greedy > 300, "warm-up must override the greedy choice");

        // Past the window the greedy choice comes back.
        assert_eq!(policy.choose(&mut rng, 4, 1000), 4);
    }

    #[test]
    fn test_anneal_floors_at_end_value() {
        let mut policy = ExplorationPolicy::new(1.0, 0.1, 9, 0, 7);
        for _ in 0..9 {
            policy.anneal();
        }
        assert!((policy.epsilon() - 0.1).abs() < 1e-9);

        // Further steps stay at the floor.
        policy.anneal();
        assert!(policy.epsilon() >= 0.1 - 1e-9);
    }
}
