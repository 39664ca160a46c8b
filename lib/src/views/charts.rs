//! The five activation charts as plain series, ready for a plotting backend.

use itertools::{Itertools, MinMaxResult};

use crate::{forward::ComputationResult, topology::HIDDEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
  Output,
  Hidden1Pre,
  Hidden1Post,
  Hidden2Pre,
  Hidden2Post,
}

impl ChartKind {
  pub const ALL: [ChartKind; 5] = [
    ChartKind::Output,
    ChartKind::Hidden1Pre,
    ChartKind::Hidden1Post,
    ChartKind::Hidden2Pre,
    ChartKind::Hidden2Post,
  ];

  pub fn title(self) -> &'static str {
    match self {
      ChartKind::Output => "Neural Network Output (y)",
      ChartKind::Hidden1Pre => "Hidden Layer 1 (Before ReLU)",
      ChartKind::Hidden1Post => "Hidden Layer 1 (After ReLU Activation)",
      ChartKind::Hidden2Pre => "Hidden Layer 2 (Before ReLU)",
      ChartKind::Hidden2Post => "Hidden Layer 2 (After ReLU Activation)",
    }
  }

  fn series(self, result: &ComputationResult) -> Option<&[[f32; HIDDEN]]> {
    match self {
      ChartKind::Output => None,
      ChartKind::Hidden1Pre => Some(result.hidden1_pre.as_slice()),
      ChartKind::Hidden1Post => Some(result.hidden1_post.as_slice()),
      ChartKind::Hidden2Pre => Some(result.hidden2_pre.as_slice()),
      ChartKind::Hidden2Post => Some(result.hidden2_post.as_slice()),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
  pub label: String,
  pub values: Vec<f32>,
}

impl Dataset {
  pub fn range(&self) -> Option<(f32, f32)> {
    match self.values.iter().copied().minmax_by(|a, b| a.total_cmp(b)) {
      MinMaxResult::NoElements => None,
      MinMaxResult::OneElement(v) => Some((v, v)),
      MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
  pub kind: ChartKind,
  pub labels: Vec<f32>,
  pub datasets: Vec<Dataset>,
}

impl Chart {
  pub fn build(kind: ChartKind, result: &ComputationResult) -> Self {
    let datasets = match kind.series(result) {
      None => vec![Dataset {
        label: "Network Output".to_string(),
        values: result.outputs.iter().copied().map(round2).collect(),
      }],
      Some(series) => (0..HIDDEN)
        .map(|node| Dataset {
          label: format!("Node {}", node + 1),
          values: series.iter().map(|v| round2(v[node])).collect(),
        })
        .collect(),
    };
    Self {
      kind,
      labels: result.x_values.clone(),
      datasets,
    }
  }

  pub fn title(&self) -> &'static str {
    self.kind.title()
  }

  /// Combined value range over all datasets.
  pub fn range(&self) -> Option<(f32, f32)> {
    self
      .datasets
      .iter()
      .filter_map(Dataset::range)
      .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
  }
}

/// All five charts, output first.
pub fn charts(result: &ComputationResult) -> Vec<Chart> {
  ChartKind::ALL
    .iter()
    .map(|&kind| Chart::build(kind, result))
    .collect()
}

/// Charts show two decimals.
pub fn round2(v: f32) -> f32 {
  (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    forward::{forward, Sweep},
    params::{Biases, Weights},
  };

  #[test]
  fn five_charts_with_one_dataset_per_node() {
    let result = forward(&Weights::baseline(), &Biases::baseline(), &Sweep::default().values());
    let all = charts(&result);
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].kind, ChartKind::Output);
    assert_eq!(all[0].datasets.len(), 1);
    assert_eq!(all[0].datasets[0].label, "Network Output");
    for chart in &all[1..] {
      assert_eq!(chart.datasets.len(), HIDDEN);
      assert_eq!(chart.labels.len(), 50);
      assert!(chart.datasets.iter().all(|d| d.values.len() == 50));
    }
  }

  #[test]
  fn post_activation_charts_are_non_negative() {
    let result = forward(&Weights::baseline(), &Biases::baseline(), &Sweep::default().values());
    let post = Chart::build(ChartKind::Hidden1Post, &result);
    let (lo, _) = post.range().unwrap();
    assert!(lo >= 0.0);
  }

  #[test]
  fn values_are_rounded_to_two_decimals() {
    let result = ComputationResult {
      x_values: vec![0.0],
      outputs: vec![1.23456],
      hidden1_pre: vec![[0.005, -0.126, 3.0]],
      hidden1_post: vec![[0.0; HIDDEN]],
      hidden2_pre: vec![[0.0; HIDDEN]],
      hidden2_post: vec![[0.0; HIDDEN]],
    };
    assert_eq!(Chart::build(ChartKind::Output, &result).datasets[0].values, vec![1.23]);
    let pre = Chart::build(ChartKind::Hidden1Pre, &result);
    assert_eq!(pre.datasets[1].values, vec![-0.13]);
    assert_eq!(pre.range(), Some((-0.13, 3.0)));
  }

  #[test]
  fn empty_result_has_no_range() {
    let chart = Chart::build(ChartKind::Output, &ComputationResult::default());
    assert_eq!(chart.range(), None);
  }
}
