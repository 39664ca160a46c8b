//! Parameter store: the one owned copy of the network's weights, biases and
//! probe input.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  error::{RangeError, StoreError},
  topology::{Layer, ParamKind, HIDDEN},
};

/// Range `randomize` samples from unless configured otherwise.
pub const DEFAULT_RANDOM_RANGE: (f32, f32) = (-2.0, 2.0);

/// Probe value the explorer starts with.
pub const DEFAULT_INPUT: f32 = 1.0;

/// Connection weights, rows indexed by source node and columns by destination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
  pub w1: [[f32; HIDDEN]; 1],
  pub w2: [[f32; HIDDEN]; HIDDEN],
  pub w3: [[f32; 1]; HIDDEN],
}

impl Weights {
  pub fn baseline() -> Self {
    Self {
      w1: [[1.0, -1.0, 0.5]],
      w2: [[1.0, 0.5, -0.5], [-0.5, 1.0, 0.5], [0.5, -0.5, 1.0]],
      w3: [[1.0], [-1.0], [0.5]],
    }
  }

  pub fn get(&self, layer: Layer, source: usize, dest: usize) -> Option<f32> {
    match layer {
      Layer::One => self.w1.get(source)?.get(dest).copied(),
      Layer::Two => self.w2.get(source)?.get(dest).copied(),
      Layer::Three => self.w3.get(source)?.get(dest).copied(),
    }
  }

  pub fn get_mut(&mut self, layer: Layer, source: usize, dest: usize) -> Option<&mut f32> {
    match layer {
      Layer::One => self.w1.get_mut(source)?.get_mut(dest),
      Layer::Two => self.w2.get_mut(source)?.get_mut(dest),
      Layer::Three => self.w3.get_mut(source)?.get_mut(dest),
    }
  }

  /// `(source, dest, weight)` for every connection of `layer`, row-major.
  pub fn entries(&self, layer: Layer) -> Vec<(usize, usize, f32)> {
    fn flatten<const R: usize, const C: usize>(m: &[[f32; C]; R]) -> Vec<(usize, usize, f32)> {
      m.iter()
        .enumerate()
        .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, &w)| (i, j, w)))
        .collect()
    }
    match layer {
      Layer::One => flatten(&self.w1),
      Layer::Two => flatten(&self.w2),
      Layer::Three => flatten(&self.w3),
    }
  }

  pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
    self.w1
      .iter()
      .flatten()
      .chain(self.w2.iter().flatten())
      .chain(self.w3.iter().flatten())
      .copied()
  }

  pub fn values_mut(&mut self) -> impl Iterator<Item = &mut f32> {
    self.w1
      .iter_mut()
      .flatten()
      .chain(self.w2.iter_mut().flatten())
      .chain(self.w3.iter_mut().flatten())
  }
}

/// One bias per non-input node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Biases {
  pub b1: [f32; HIDDEN],
  pub b2: [f32; HIDDEN],
  pub b3: [f32; 1],
}

impl Biases {
  pub fn baseline() -> Self {
    Self {
      b1: [0.0, 1.0, -0.5],
      b2: [0.0, 0.0, 0.0],
      b3: [0.0],
    }
  }

  pub fn layer(&self, layer: Layer) -> &[f32] {
    match layer {
      Layer::One => &self.b1,
      Layer::Two => &self.b2,
      Layer::Three => &self.b3,
    }
  }

  pub fn get(&self, layer: Layer, node: usize) -> Option<f32> {
    self.layer(layer).get(node).copied()
  }

  pub fn get_mut(&mut self, layer: Layer, node: usize) -> Option<&mut f32> {
    match layer {
      Layer::One => self.b1.get_mut(node),
      Layer::Two => self.b2.get_mut(node),
      Layer::Three => self.b3.get_mut(node),
    }
  }

  pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
    self.b1.iter().chain(self.b2.iter()).chain(self.b3.iter()).copied()
  }

  pub fn values_mut(&mut self) -> impl Iterator<Item = &mut f32> {
    self.b1
      .iter_mut()
      .chain(self.b2.iter_mut())
      .chain(self.b3.iter_mut())
  }
}

/// Snapshot of everything a user can edit. `input` is the probe value and plays
/// no part in the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkParameters {
  pub weights: Weights,
  pub biases: Biases,
  pub input: f32,
}

impl NetworkParameters {
  pub fn baseline() -> Self {
    Self {
      weights: Weights::baseline(),
      biases: Biases::baseline(),
      input: DEFAULT_INPUT,
    }
  }
}

impl Default for NetworkParameters {
  fn default() -> Self {
    Self::baseline()
  }
}

/// Owns the canonical parameters. Views only ever see copies from `get`;
/// edits go through the setters, which mark the state dirty when the sweep
/// needs recomputing.
#[derive(Debug)]
pub struct ParameterStore {
  current: NetworkParameters,
  dirty: bool,
  random_range: (f32, f32),
  rng: StdRng,
}

impl ParameterStore {
  pub fn new() -> Self {
    Self::with_rng(StdRng::from_entropy())
  }

  /// Deterministic `randomize`, for tests and reproducible sessions.
  pub fn seeded(seed: u64) -> Self {
    Self::with_rng(StdRng::seed_from_u64(seed))
  }

  fn with_rng(rng: StdRng) -> Self {
    Self {
      current: NetworkParameters::baseline(),
      dirty: false,
      random_range: DEFAULT_RANDOM_RANGE,
      rng,
    }
  }

  /// Bounds are reordered if given backwards. Both bounds and the distance
  /// between them must be finite.
  pub fn with_random_range(mut self, low: f32, high: f32) -> Result<Self, RangeError> {
    // the sampler scales the width by slightly more than one
    let width = (high - low).abs() * 2.0;
    if !low.is_finite() || !high.is_finite() || !width.is_finite() {
      return Err(RangeError { low, high });
    }
    self.random_range = (low.min(high), low.max(high));
    Ok(self)
  }

  pub fn random_range(&self) -> (f32, f32) {
    self.random_range
  }

  pub fn get(&self) -> NetworkParameters {
    self.current
  }

  pub fn set_weight(
    &mut self,
    layer: Layer,
    source: usize,
    dest: usize,
    value: f32,
  ) -> Result<(), StoreError> {
    let slot = self
      .current
      .weights
      .get_mut(layer, source, dest)
      .ok_or(StoreError::OutOfBoundsIndex {
        kind: ParamKind::Weight,
        layer,
        index: (source, dest),
        shape: layer.weight_shape(),
      })?;
    *slot = value;
    self.dirty = true;
    Ok(())
  }

  pub fn set_bias(&mut self, layer: Layer, node: usize, value: f32) -> Result<(), StoreError> {
    let slot = self
      .current
      .biases
      .get_mut(layer, node)
      .ok_or(StoreError::OutOfBoundsIndex {
        kind: ParamKind::Bias,
        layer,
        index: (node, 0),
        shape: (layer.bias_len(), 1),
      })?;
    *slot = value;
    self.dirty = true;
    Ok(())
  }

  /// Moves the probe. The sweep does not depend on it, so this never dirties.
  pub fn set_input(&mut self, value: f32) {
    self.current.input = value;
  }

  /// Restores the baseline weights and biases. The probe is left alone.
  pub fn reset_to_initial(&mut self) {
    self.current.weights = Weights::baseline();
    self.current.biases = Biases::baseline();
    self.dirty = true;
    debug!("parameters reset to baseline");
  }

  pub fn randomize(&mut self) {
    let (low, high) = self.random_range;
    let rng = &mut self.rng;
    for w in self.current.weights.values_mut() {
      *w = rng.gen_range(low..=high);
    }
    for b in self.current.biases.values_mut() {
      *b = rng.gen_range(low..=high);
    }
    self.dirty = true;
    debug!(low, high, "parameters randomized");
  }

  pub fn is_dirty(&self) -> bool {
    self.dirty
  }

  /// Returns whether weights or biases changed since the last call.
  pub fn take_dirty(&mut self) -> bool {
    std::mem::replace(&mut self.dirty, false)
  }
}

impl Default for ParameterStore {
  fn default() -> Self {
    Self::new()
  }
}
