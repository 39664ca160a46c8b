use std::io::Write;

use tracing::warn;

use super::{charts::charts, diagram::TopologyDiagram, Dataset, ViewAdapter};
use crate::{
  controls::{bindings, SliderBinding},
  error::OracleError,
  forward::ComputationResult,
  params::{Biases, NetworkParameters, Weights},
};

const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Plain-text rendering for the interactive explorer.
pub struct TerminalView<W> {
  out: W,
  spark_width: usize,
}

impl<W: Write> TerminalView<W> {
  pub fn new(out: W) -> Self {
    Self {
      out,
      spark_width: 50,
    }
  }

  pub fn with_spark_width(mut self, width: usize) -> Self {
    self.spark_width = width.max(1);
    self
  }

  pub fn into_inner(self) -> W {
    self.out
  }

  fn emit(&mut self, text: &str) {
    if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
      warn!("terminal view write failed: {}", e);
    }
  }

  fn sparkline(&self, dataset: &Dataset, lo: f32, hi: f32) -> String {
    let values = &dataset.values;
    if values.is_empty() {
      return String::new();
    }
    let stride = (values.len() + self.spark_width - 1) / self.spark_width;
    let span = hi - lo;
    values
      .iter()
      .step_by(stride.max(1))
      .map(|v| {
        let level = if span > 0.0 {
          ((v - lo) / span * (SPARKS.len() - 1) as f32).round() as usize
        } else {
          0
        };
        SPARKS[level.min(SPARKS.len() - 1)]
      })
      .collect()
  }
}

impl<W: Write> ViewAdapter for TerminalView<W> {
  fn render_topology(&mut self, weights: &Weights, biases: &Biases) {
    let text = format!("{}", TopologyDiagram::new(weights, biases));
    self.emit(&text);
  }

  fn render_charts(&mut self, result: &ComputationResult) {
    let mut text = String::new();
    for chart in charts(result) {
      text.push_str(chart.title());
      text.push('\n');
      let (lo, hi) = chart.range().unwrap_or((0.0, 0.0));
      for dataset in &chart.datasets {
        text.push_str(&format!(
          "  {:<15} {} [{:.2}, {:.2}]\n",
          dataset.label,
          self.sparkline(dataset, lo, hi),
          lo,
          hi
        ));
      }
    }
    self.emit(&text);
  }

  fn render_sliders(&mut self, weights: &Weights, biases: &Biases) {
    let params = NetworkParameters {
      weights: *weights,
      biases: *biases,
      input: 0.0,
    };
    let mut text = String::new();
    for binding in bindings() {
      if let Some(value) = binding.target.read(&params) {
        text.push_str(&format!(
          "  {:<8} {:<16} {:>6}\n",
          binding.id,
          binding.label,
          SliderBinding::display(value)
        ));
      }
    }
    self.emit(&text);
  }

  fn render_probe(&mut self, input: f32, output: Option<f32>) {
    let output = output
      .map(SliderBinding::display)
      .unwrap_or_else(|| "-".to_string());
    self.emit(&format!(
      "input {} -> output {}\n",
      SliderBinding::display(input),
      output
    ));
  }

  fn notify_failure(&mut self, error: &OracleError) {
    self.emit(&format!("! could not compute network results: {}\n", error));
  }
}
