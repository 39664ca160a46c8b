//! Render contract between the controller and whatever draws the network.

pub mod charts;
pub mod diagram;
pub mod terminal;

#[cfg(test)]
pub(crate) mod recording;

use tracing::{error, info};

use crate::{
  error::OracleError,
  forward::ComputationResult,
  params::{Biases, Weights},
};

pub use charts::{Chart, ChartKind, Dataset};
pub use diagram::TopologyDiagram;
pub use terminal::TerminalView;

/// Receives renders from the controller. Adapters only implement the parts
/// they draw; the rest default to no-ops.
pub trait ViewAdapter {
  /// Redraw nodes and edges.
  fn render_topology(&mut self, _weights: &Weights, _biases: &Biases) {}

  /// Redraw the five activation charts.
  fn render_charts(&mut self, _result: &ComputationResult) {}

  /// Resync every slider to the stored values.
  fn render_sliders(&mut self, _weights: &Weights, _biases: &Biases) {}

  /// Probe readout; `output` is `None` until a result has been applied.
  fn render_probe(&mut self, _input: f32, _output: Option<f32>) {}

  fn notify_failure(&mut self, _error: &OracleError) {}
}

impl<V: ViewAdapter + ?Sized> ViewAdapter for Box<V> {
  fn render_topology(&mut self, weights: &Weights, biases: &Biases) {
    (**self).render_topology(weights, biases)
  }

  fn render_charts(&mut self, result: &ComputationResult) {
    (**self).render_charts(result)
  }

  fn render_sliders(&mut self, weights: &Weights, biases: &Biases) {
    (**self).render_sliders(weights, biases)
  }

  fn render_probe(&mut self, input: f32, output: Option<f32>) {
    (**self).render_probe(input, output)
  }

  fn notify_failure(&mut self, error: &OracleError) {
    (**self).notify_failure(error)
  }
}

/// Fans every render out to a list of adapters, in insertion order.
#[derive(Default)]
pub struct Views {
  adapters: Vec<Box<dyn ViewAdapter + Send>>,
}

impl Views {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, adapter: impl ViewAdapter + Send + 'static) -> Self {
    self.push(adapter);
    self
  }

  pub fn push(&mut self, adapter: impl ViewAdapter + Send + 'static) {
    self.adapters.push(Box::new(adapter));
  }

  pub fn len(&self) -> usize {
    self.adapters.len()
  }

  pub fn is_empty(&self) -> bool {
    self.adapters.is_empty()
  }
}

impl ViewAdapter for Views {
  fn render_topology(&mut self, weights: &Weights, biases: &Biases) {
    for adapter in self.adapters.iter_mut() {
      adapter.render_topology(weights, biases);
    }
  }

  fn render_charts(&mut self, result: &ComputationResult) {
    for adapter in self.adapters.iter_mut() {
      adapter.render_charts(result);
    }
  }

  fn render_sliders(&mut self, weights: &Weights, biases: &Biases) {
    for adapter in self.adapters.iter_mut() {
      adapter.render_sliders(weights, biases);
    }
  }

  fn render_probe(&mut self, input: f32, output: Option<f32>) {
    for adapter in self.adapters.iter_mut() {
      adapter.render_probe(input, output);
    }
  }

  fn notify_failure(&mut self, error: &OracleError) {
    for adapter in self.adapters.iter_mut() {
      adapter.notify_failure(error);
    }
  }
}

/// Logs renders instead of drawing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingView;

impl ViewAdapter for TracingView {
  fn render_topology(&mut self, weights: &Weights, biases: &Biases) {
    info!(?weights, ?biases, "network visualization updated");
  }

  fn render_charts(&mut self, result: &ComputationResult) {
    info!(points = result.len(), "charts updated");
  }

  fn render_sliders(&mut self, _weights: &Weights, _biases: &Biases) {
    info!("sliders resynced");
  }

  fn render_probe(&mut self, input: f32, output: Option<f32>) {
    info!(input, ?output, "probe updated");
  }

  fn notify_failure(&mut self, error: &OracleError) {
    error!(%error, "error computing network results");
  }
}
