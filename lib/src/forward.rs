//! Forward pass over an input sweep.

use serde::{Deserialize, Serialize};

use crate::{
  error::OracleError,
  params::{Biases, Weights},
  topology::HIDDEN,
};

/// Evenly spaced probe inputs the charts are drawn over, both ends included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
  pub start: f32,
  pub end: f32,
  pub count: usize,
}

impl Default for Sweep {
  fn default() -> Self {
    Self {
      start: -5.0,
      end: 5.0,
      count: 50,
    }
  }
}

impl Sweep {
  pub fn new(start: f32, end: f32, count: usize) -> Self {
    Self { start, end, count }
  }

  pub fn values(&self) -> Vec<f32> {
    match self.count {
      0 => Vec::new(),
      1 => vec![self.start],
      n => {
        let span = self.end - self.start;
        let last = (n - 1) as f32;
        (0..n).map(|i| self.start + span * i as f32 / last).collect()
      }
    }
  }
}

/// Every activation of one sweep. All series have one entry per `x_values`
/// entry; instances are built whole and replaced whole.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComputationResult {
  pub x_values: Vec<f32>,
  pub hidden1_pre: Vec<[f32; HIDDEN]>,
  pub hidden1_post: Vec<[f32; HIDDEN]>,
  pub hidden2_pre: Vec<[f32; HIDDEN]>,
  pub hidden2_post: Vec<[f32; HIDDEN]>,
  pub outputs: Vec<f32>,
}

impl ComputationResult {
  pub fn len(&self) -> usize {
    self.x_values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.x_values.is_empty()
  }

  /// Checks that every series matches `x_values` in length. Results built by
  /// `forward` always pass; this is for ones decoded off the wire.
  pub fn validate(&self) -> Result<(), OracleError> {
    let n = self.len();
    let series = [
      ("hidden1_pre", self.hidden1_pre.len()),
      ("hidden1_post", self.hidden1_post.len()),
      ("hidden2_pre", self.hidden2_pre.len()),
      ("hidden2_post", self.hidden2_post.len()),
      ("outputs", self.outputs.len()),
    ];
    match series.iter().find(|(_, len)| *len != n) {
      Some((name, len)) => Err(OracleError::Malformed(format!(
        "{} has {} entries, expected {}",
        name, len, n
      ))),
      None => Ok(()),
    }
  }

  /// Index of the sweep input closest to `probe`. Ties go to the earlier index,
  /// and a NaN probe stays on the first one.
  pub fn nearest_index(&self, probe: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, x) in self.x_values.iter().enumerate() {
      let diff = (x - probe).abs();
      match best {
        Some((_, min)) if diff < min => best = Some((i, diff)),
        None => best = Some((i, diff)),
        Some(_) => {}
      }
    }
    best.map(|(i, _)| i)
  }

  /// The probe readout: nearest sweep index and its network output.
  pub fn nearest_output(&self, probe: f32) -> Option<(usize, f32)> {
    let i = self.nearest_index(probe)?;
    self.outputs.get(i).map(|y| (i, *y))
  }
}

pub fn relu(z: f32) -> f32 {
  z.max(0.0)
}

/// Runs the network once per input in `xs`.
pub fn forward(weights: &Weights, biases: &Biases, xs: &[f32]) -> ComputationResult {
  let mut result = ComputationResult {
    x_values: xs.to_vec(),
    hidden1_pre: Vec::with_capacity(xs.len()),
    hidden1_post: Vec::with_capacity(xs.len()),
    hidden2_pre: Vec::with_capacity(xs.len()),
    hidden2_post: Vec::with_capacity(xs.len()),
    outputs: Vec::with_capacity(xs.len()),
  };

  for &x in xs {
    let z1: [f32; HIDDEN] = std::array::from_fn(|j| x * weights.w1[0][j] + biases.b1[j]);
    let a1 = z1.map(relu);
    let z2: [f32; HIDDEN] = std::array::from_fn(|j| {
      (0..HIDDEN).map(|i| a1[i] * weights.w2[i][j]).sum::<f32>() + biases.b2[j]
    });
    let a2 = z2.map(relu);
    let y = (0..HIDDEN).map(|i| a2[i] * weights.w3[i][0]).sum::<f32>() + biases.b3[0];

    result.hidden1_pre.push(z1);
    result.hidden1_post.push(a1);
    result.hidden2_pre.push(z2);
    result.hidden2_post.push(a2);
    result.outputs.push(y);
  }
  result
}
