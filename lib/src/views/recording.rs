use std::sync::{Arc, Mutex};

use super::ViewAdapter;
use crate::{
  error::OracleError,
  forward::ComputationResult,
  params::{Biases, Weights},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Render {
  Topology(Weights, Biases),
  Charts(ComputationResult),
  Sliders(Weights, Biases),
  Probe(f32, Option<f32>),
  Failure(OracleError),
}

/// Shares its log between clones, so a test can keep one clone while the
/// other is moved into a controller.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
  log: Arc<Mutex<Vec<Render>>>,
}

impl RecordingView {
  pub fn renders(&self) -> Vec<Render> {
    self.log.lock().unwrap().clone()
  }

  pub fn clear(&self) {
    self.log.lock().unwrap().clear();
  }

  pub fn charts(&self) -> Vec<ComputationResult> {
    self
      .renders()
      .into_iter()
      .filter_map(|r| match r {
        Render::Charts(result) => Some(result),
        _ => None,
      })
      .collect()
  }

  pub fn topologies(&self) -> Vec<Weights> {
    self
      .renders()
      .into_iter()
      .filter_map(|r| match r {
        Render::Topology(weights, _) => Some(weights),
        _ => None,
      })
      .collect()
  }

  pub fn failures(&self) -> usize {
    self
      .renders()
      .iter()
      .filter(|r| matches!(r, Render::Failure(_)))
      .count()
  }

  pub fn probes(&self) -> Vec<(f32, Option<f32>)> {
    self
      .renders()
      .into_iter()
      .filter_map(|r| match r {
        Render::Probe(input, output) => Some((input, output)),
        _ => None,
      })
      .collect()
  }

  fn push(&self, render: Render) {
    self.log.lock().unwrap().push(render);
  }
}

impl ViewAdapter for RecordingView {
  fn render_topology(&mut self, weights: &Weights, biases: &Biases) {
    self.push(Render::Topology(*weights, *biases));
  }

  fn render_charts(&mut self, result: &ComputationResult) {
    self.push(Render::Charts(result.clone()));
  }

  fn render_sliders(&mut self, weights: &Weights, biases: &Biases) {
    self.push(Render::Sliders(*weights, *biases));
  }

  fn render_probe(&mut self, input: f32, output: Option<f32>) {
    self.push(Render::Probe(input, output));
  }

  fn notify_failure(&mut self, error: &OracleError) {
    self.push(Render::Failure(error.clone()));
  }
}
