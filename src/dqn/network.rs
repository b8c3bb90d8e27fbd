//! Q-value function approximator and target-network synchronization.
//!
//! The estimator is deliberately small: a two-layer perceptron (ReLU
//! hidden layer of 32 units, Glorot-uniform init) trained with Adam on a
//! squared error over the *chosen* action's value only — the gradient for
//! every other action in a sample is zero. Everything behind this module's
//! public surface is an implementation detail; the trainer depends only on
//! `values`, `best_actions` and `update`.
//!
//! Two instances exist per run, Online and Target. They never share
//! parameters; [`TargetSynchronizer`] blends Target toward Online by
//! pairing the four named parameters field by field.

use ndarray::{Array, Array1, Array2, ArrayView1, Axis, Dimension, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use super::features::FeatureVector;

/// Hidden layer width.
pub const HIDDEN_SIZE: usize = 32;

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-8;

/// A two-layer action-value network.
pub struct QNetwork {
    w1: Array2<f64>,
    b1: Array1<f64>,
    w2: Array2<f64>,
    b2: Array1<f64>,
    opt: AdamState,
    learning_rate: f64,
    num_inputs: usize,
    num_actions: usize,
}

/// Adam optimizer moments, one pair per parameter.
struct AdamState {
    m_w1: Array2<f64>,
    v_w1: Array2<f64>,
    m_b1: Array1<f64>,
    v_b1: Array1<f64>,
    m_w2: Array2<f64>,
    v_w2: Array2<f64>,
    m_b2: Array1<f64>,
    v_b2: Array1<f64>,
    t: u64,
}

impl AdamState {
    fn new(num_inputs: usize, num_actions: usize) -> Self {
        Self {
            m_w1: Array2::zeros((num_inputs, HIDDEN_SIZE)),
            v_w1: Array2::zeros((num_inputs, HIDDEN_SIZE)),
            m_b1: Array1::zeros(HIDDEN_SIZE),
            v_b1: Array1::zeros(HIDDEN_SIZE),
            m_w2: Array2::zeros((HIDDEN_SIZE, num_actions)),
            v_w2: Array2::zeros((HIDDEN_SIZE, num_actions)),
            m_b2: Array1::zeros(num_actions),
            v_b2: Array1::zeros(num_actions),
            t: 0,
        }
    }
}

impl QNetwork {
    /// Create a freshly initialized network.
    pub fn new<R: Rng>(num_inputs: usize, num_actions: usize, learning_rate: f64, rng: &mut R) -> Self {
        Self {
            w1: glorot(num_inputs, HIDDEN_SIZE, rng),
            b1: Array1::zeros(HIDDEN_SIZE),
            w2: glorot(HIDDEN_SIZE, num_actions, rng),
            b2: Array1::zeros(num_actions),
            opt: AdamState::new(num_inputs, num_actions),
            learning_rate,
            num_inputs,
            num_actions,
        }
    }

    /// Input vector length the network expects.
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Size of the action space.
    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// Per-row action values for a batch of states.
    pub fn values(&self, states: &Array2<f64>) -> Array2<f64> {
        self.forward(states).2
    }

    /// Per-row greedy action index for a batch of states.
    pub fn best_actions(&self, states: &Array2<f64>) -> Vec<usize> {
        let out = self.values(states);
        out.rows().into_iter().map(argmax).collect()
    }

    /// Greedy action index for a single state.
    pub fn best_action(&self, state: &FeatureVector) -> usize {
        let row = Array2::from_shape_vec((1, state.len()), state.values().to_vec())
            .expect("a single row always matches its own length");
        self.best_actions(&row)[0]
    }

    /// One training step on a batch.
    ///
    /// Fits each sample's chosen action value toward its target; the
    /// gradient for unchosen actions is zero. Returns the mean squared
    /// error before the step.
    pub fn update(&mut self, states: &Array2<f64>, actions: &[usize], targets: &[f64]) -> f64 {
        let n = states.nrows();
        debug_assert!(n > 0, "cannot update on an empty batch");
        debug_assert_eq!(actions.len(), n, "one action per sample");
        debug_assert_eq!(targets.len(), n, "one target per sample");

        let (hidden_pre, hidden, out) = self.forward(states);

        // Error on the chosen action only.
        let mut d_out = Array2::zeros((n, self.num_actions));
        let mut loss = 0.0;
        for i in 0..n {
            let err = out[[i, actions[i]]] - targets[i];
            loss += err * err;
            d_out[[i, actions[i]]] = 2.0 * err / n as f64;
        }
        loss /= n as f64;

        let grad_w2 = hidden.t().dot(&d_out);
        let grad_b2 = d_out.sum_axis(Axis(0));
        let mut d_hidden = d_out.dot(&self.w2.t());
        d_hidden.zip_mut_with(&hidden_pre, |d, &pre| {
            if pre <= 0.0 {
                *d = 0.0;
            }
        });
        let grad_w1 = states.t().dot(&d_hidden);
        let grad_b1 = d_hidden.sum_axis(Axis(0));

        self.opt.t += 1;
        let t = self.opt.t as f64;
        let lr = self.learning_rate;
        adam_update(&mut self.w1, &grad_w1, &mut self.opt.m_w1, &mut self.opt.v_w1, lr, t);
        adam_update(&mut self.b1, &grad_b1, &mut self.opt.m_b1, &mut self.opt.v_b1, lr, t);
        adam_update(&mut self.w2, &grad_w2, &mut self.opt.m_w2, &mut self.opt.v_w2, lr, t);
        adam_update(&mut self.b2, &grad_b2, &mut self.opt.m_b2, &mut self.opt.v_b2, lr, t);

        loss
    }

    /// Snapshot the parameters for persistence.
    pub fn checkpoint(&self, episode: u64, total_steps: u64) -> NetworkCheckpoint {
        NetworkCheckpoint {
            episode,
            total_steps,
            num_inputs: self.num_inputs,
            num_actions: self.num_actions,
            learning_rate: self.learning_rate,
            w1: self.w1.clone(),
            b1: self.b1.clone(),
            w2: self.w2.clone(),
            b2: self.b2.clone(),
        }
    }

    /// Rebuild a network from a checkpoint. Optimizer moments restart from
    /// zero; a resumed run re-warms Adam.
    pub fn from_checkpoint(ckpt: &NetworkCheckpoint) -> Self {
        Self {
            w1: ckpt.w1.clone(),
            b1: ckpt.b1.clone(),
            w2: ckpt.w2.clone(),
            b2: ckpt.b2.clone(),
            opt: AdamState::new(ckpt.num_inputs, ckpt.num_actions),
            learning_rate: ckpt.learning_rate,
            num_inputs: ckpt.num_inputs,
            num_actions: ckpt.num_actions,
        }
    }

    /// Forward pass: (hidden pre-activation, hidden, output).
    fn forward(&self, states: &Array2<f64>) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
        debug_assert_eq!(states.ncols(), self.num_inputs, "feature schema mismatch");

        let mut hidden_pre = states.dot(&self.w1);
        for mut row in hidden_pre.rows_mut() {
            row += &self.b1;
        }
        let hidden = hidden_pre.mapv(|x| x.max(0.0));
        let mut out = hidden.dot(&self.w2);
        for mut row in out.rows_mut() {
            row += &self.b2;
        }
        (hidden_pre, hidden, out)
    }
}

/// Soft-update rule blending Target parameters toward Online.
///
/// Parameters are paired by name (`w1` with `w1`, and so on), never by
/// position in a flattened collection.
pub struct TargetSynchronizer {
    tau: f64,
}

impl TargetSynchronizer {
    /// Create a synchronizer with blend factor `tau` in [0, 1].
    pub fn new(tau: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&tau), "tau must be in [0, 1]");
        Self { tau }
    }

    /// The blend factor.
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Blend every Target parameter toward its Online counterpart:
    /// `target = tau * online + (1 - tau) * target`.
    pub fn sync(&self, online: &QNetwork, target: &mut QNetwork) {
        debug_assert_eq!(online.num_inputs, target.num_inputs);
        debug_assert_eq!(online.num_actions, target.num_actions);
        blend(&mut target.w1, &online.w1, self.tau);
        blend(&mut target.b1, &online.b1, self.tau);
        blend(&mut target.w2, &online.w2, self.tau);
        blend(&mut target.b2, &online.b2, self.tau);
    }
}

/// Blend `target` toward `online` in place:
/// `target = tau * online + (1 - tau) * target`, element by element.
fn blend<D: Dimension>(target: &mut Array<f64, D>, online: &Array<f64, D>, tau: f64) {
    Zip::from(target).and(online).for_each(|t, &o| {
        *t = tau * o + (1.0 - tau) * *t;
    });
}

/// Serializable network snapshot, keyed by episode index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkCheckpoint {
    /// Episode at which the snapshot was taken.
    pub episode: u64,
    /// Total decision steps taken so far.
    pub total_steps: u64,
    /// Input vector length.
    pub num_inputs: usize,
    /// Action space size.
    pub num_actions: usize,
    /// Learning rate in force when the snapshot was taken.
    pub learning_rate: f64,
    /// First-layer weights.
    pub w1: Array2<f64>,
    /// First-layer bias.
    pub b1: Array1<f64>,
    /// Output-layer weights.
    pub w2: Array2<f64>,
    /// Output-layer bias.
    pub b2: Array1<f64>,
}

impl NetworkCheckpoint {
    /// Write the checkpoint as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    /// Read a checkpoint from JSON.
    pub fn load_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Glorot-uniform weight initialization.
fn glorot<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Array2<f64> {
    let limit = (6.0 / (rows + cols) as f64).sqrt();
    Array2::from_shape_fn((rows, cols), |_| rng.gen_range(-limit..limit))
}

/// Row-wise argmax.
fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in row.iter().enumerate() {
        if v > best_value {
            best_value = v;
            best = i;
        }
    }
    best
}

/// One Adam step for a single parameter tensor.
fn adam_update<D: Dimension>(
    param: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    m: &mut Array<f64, D>,
    v: &mut Array<f64, D>,
    learning_rate: f64,
    t: f64,
) {
    m.zip_mut_with(grad, |m, &g| *m = BETA1 * *m + (1.0 - BETA1) * g);
    v.zip_mut_with(grad, |v, &g| *v = BETA2 * *v + (1.0 - BETA2) * g * g);
    let m_corr = 1.0 - BETA1.powf(t);
    let v_corr = 1.0 - BETA2.powf(t);
    Zip::from(param).and(&*m).and(&*v).for_each(|p, &m, &v| {
        *p -= learning_rate * (m / m_corr) / ((v / v_corr).sqrt() + ADAM_EPSILON);
    });
}
