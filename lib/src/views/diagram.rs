//! Layout of the topology drawing: node positions, edge styling and labels,
//! derived from `LAYER_SIZES` so every layer goes through the same code.

use std::fmt;

use crate::{
  params::{Biases, Weights},
  topology::{Layer, LAYER_NAMES, LAYER_SIZES},
};

/// Canvas geometry, in drawing units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramConfig {
  pub width: f32,
  pub height: f32,
  pub node_radius: f32,
  pub layer_spacing: f32,
  pub node_spacing: f32,
  pub margin_top: f32,
  pub margin_left: f32,
}

impl Default for DiagramConfig {
  fn default() -> Self {
    Self {
      width: 800.0,
      height: 250.0,
      node_radius: 20.0,
      layer_spacing: 160.0,
      node_spacing: 60.0,
      margin_top: 30.0,
      margin_left: 40.0,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
  Input,
  Hidden,
  Output,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
  /// Index into `LAYER_SIZES`.
  pub position: usize,
  pub index: usize,
  pub x: f32,
  pub y: f32,
  pub kind: NodeKind,
  pub label: String,
  pub bias: Option<f32>,
}

impl Node {
  pub fn bias_label(&self) -> Option<String> {
    self.bias.map(|b| format!("b: {:.2}", b))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
  Positive,
  Negative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
  pub layer: Layer,
  /// Indices into `TopologyDiagram::nodes`.
  pub source: usize,
  pub target: usize,
  pub weight: f32,
}

impl Edge {
  pub fn polarity(&self) -> Polarity {
    if self.weight >= 0.0 {
      Polarity::Positive
    } else {
      Polarity::Negative
    }
  }

  /// Stroke class 0..=5, saturating at |w| = 2.
  pub fn magnitude(&self) -> u8 {
    (self.weight.abs() * 2.5).ceil().min(5.0) as u8
  }

  pub fn label(&self) -> String {
    format!("{:.2}", self.weight)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyDiagram {
  pub config: DiagramConfig,
  pub nodes: Vec<Node>,
  pub edges: Vec<Edge>,
}

impl TopologyDiagram {
  pub fn new(weights: &Weights, biases: &Biases) -> Self {
    Self::with_config(DiagramConfig::default(), weights, biases)
  }

  pub fn with_config(config: DiagramConfig, weights: &Weights, biases: &Biases) -> Self {
    let last = LAYER_SIZES.len() - 1;
    let mut nodes = Vec::new();
    let mut offsets = Vec::with_capacity(LAYER_SIZES.len());

    for (position, &count) in LAYER_SIZES.iter().enumerate() {
      offsets.push(nodes.len());
      let x = config.margin_left + config.layer_spacing * position as f32;
      let start_y = (config.height - (count - 1) as f32 * config.node_spacing) / 2.0;
      let bias_layer = Layer::from_number(position);
      for index in 0..count {
        let (kind, label) = match position {
          0 => (NodeKind::Input, "x".to_string()),
          p if p == last => (NodeKind::Output, "y".to_string()),
          _ => (NodeKind::Hidden, (index + 1).to_string()),
        };
        nodes.push(Node {
          position,
          index,
          x,
          y: start_y + index as f32 * config.node_spacing,
          kind,
          label,
          bias: bias_layer.and_then(|l| biases.get(l, index)),
        });
      }
    }

    let edges = Layer::ALL
      .iter()
      .flat_map(|&layer| {
        let from = offsets[layer.number() - 1];
        let to = offsets[layer.number()];
        weights
          .entries(layer)
          .into_iter()
          .map(move |(i, j, weight)| Edge {
            layer,
            source: from + i,
            target: to + j,
            weight,
          })
      })
      .collect();

    Self {
      config,
      nodes,
      edges,
    }
  }

  pub fn layer_x(&self, position: usize) -> f32 {
    self.config.margin_left + self.config.layer_spacing * position as f32
  }
}

impl fmt::Display for TopologyDiagram {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for layer in Layer::ALL {
      writeln!(
        f,
        "{} -> {}",
        LAYER_NAMES[layer.number() - 1],
        LAYER_NAMES[layer.number()]
      )?;
      for edge in self.edges.iter().filter(|e| e.layer == layer) {
        let source = &self.nodes[edge.source];
        let target = &self.nodes[edge.target];
        let sign = match edge.polarity() {
          Polarity::Positive => '+',
          Polarity::Negative => '-',
        };
        let bar: String = std::iter::repeat(sign)
          .take(edge.magnitude() as usize)
          .collect();
        writeln!(
          f,
          "  {:>6} -> {:<6} {:>6}  {:<5}",
          layer.source_label(source.index),
          layer.destination_label(target.index),
          edge.label(),
          bar
        )?;
      }
      let biases: Vec<String> = self
        .nodes
        .iter()
        .filter(|n| n.position == layer.number())
        .filter_map(|n| n.bias_label())
        .collect();
      writeln!(f, "  {}", biases.join("  "))?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn one_node_per_unit_and_one_edge_per_weight() {
    let diagram = TopologyDiagram::new(&Weights::baseline(), &Biases::baseline());
    assert_eq!(diagram.nodes.len(), 8);
    assert_eq!(diagram.edges.len(), 3 + 9 + 3);
    assert_eq!(diagram.nodes[0].kind, NodeKind::Input);
    assert_eq!(diagram.nodes[7].kind, NodeKind::Output);
    assert_eq!(diagram.nodes[0].bias, None);
    assert_eq!(diagram.nodes[7].bias_label(), Some("b: 0.00".to_string()));
  }

  #[test]
  fn layers_are_centred_vertically() {
    let diagram = TopologyDiagram::new(&Weights::baseline(), &Biases::baseline());
    let input = &diagram.nodes[0];
    assert_eq!((input.x, input.y), (40.0, 125.0));
    let hidden: Vec<f32> = diagram.nodes[1..4].iter().map(|n| n.y).collect();
    assert_eq!(hidden, vec![65.0, 125.0, 185.0]);
    assert_eq!(diagram.nodes[4].x, diagram.layer_x(2));
  }

  #[test]
  fn edges_follow_weights() {
    let mut weights = Weights::baseline();
    weights.w2[1][2] = -0.3;
    weights.w3[0][0] = 7.0;
    let diagram = TopologyDiagram::new(&weights, &Biases::baseline());

    let edge = diagram
      .edges
      .iter()
      .find(|e| e.layer == Layer::Two && e.source == 2 && e.target == 6)
      .unwrap();
    assert_eq!(edge.weight, -0.3);
    assert_eq!(edge.polarity(), Polarity::Negative);
    assert_eq!(edge.magnitude(), 1);
    assert_eq!(edge.label(), "-0.30");

    let out = diagram.edges.iter().find(|e| e.layer == Layer::Three).unwrap();
    assert_eq!((out.source, out.target), (4, 7));
    assert_eq!(out.magnitude(), 5);
  }

  #[test]
  fn text_rendering_lists_every_layer() {
    let text = TopologyDiagram::new(&Weights::baseline(), &Biases::baseline()).to_string();
    assert!(text.contains("Input -> Hidden 1"));
    assert!(text.contains("Hidden 2 -> Output"));
    assert!(text.contains("H1.1 -> H2.2"));
  }
}
