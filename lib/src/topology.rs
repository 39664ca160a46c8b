//! The fixed shape of the explored network: one input, two hidden layers of
//! three ReLU units each, one output.
//!
//! Every other module derives its loops from the sizes here instead of
//! spelling out each layer by hand.

use std::fmt;

/// Node count per layer, input first.
pub const LAYER_SIZES: [usize; 4] = [1, 3, 3, 1];

/// Width of both hidden layers.
pub const HIDDEN: usize = 3;

pub const LAYER_NAMES: [&str; 4] = ["Input", "Hidden 1", "Hidden 2", "Output"];

/// One of the three parameterised layers. `Layer::One` owns `w1`/`b1`, i.e. the
/// connections from the input into hidden layer 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
  One,
  Two,
  Three,
}

impl Layer {
  pub const ALL: [Layer; 3] = [Layer::One, Layer::Two, Layer::Three];

  pub fn from_number(n: usize) -> Option<Self> {
    match n {
      1 => Some(Layer::One),
      2 => Some(Layer::Two),
      3 => Some(Layer::Three),
      _ => None,
    }
  }

  /// 1-based number, as used in `w1`, `b2`, ...
  pub fn number(self) -> usize {
    match self {
      Layer::One => 1,
      Layer::Two => 2,
      Layer::Three => 3,
    }
  }

  pub fn sources(self) -> usize {
    LAYER_SIZES[self.number() - 1]
  }

  pub fn destinations(self) -> usize {
    LAYER_SIZES[self.number()]
  }

  /// Weight matrix shape as (rows, cols) = (source nodes, destination nodes).
  pub fn weight_shape(self) -> (usize, usize) {
    (self.sources(), self.destinations())
  }

  pub fn bias_len(self) -> usize {
    self.destinations()
  }

  pub fn source_label(self, index: usize) -> String {
    node_label(self.number() - 1, index)
  }

  pub fn destination_label(self, index: usize) -> String {
    node_label(self.number(), index)
  }
}

impl fmt::Display for Layer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.number())
  }
}

/// Which kind of parameter an index addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
  Weight,
  Bias,
}

impl fmt::Display for ParamKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ParamKind::Weight => f.write_str("weight"),
      ParamKind::Bias => f.write_str("bias"),
    }
  }
}

/// Short node label, `position` being the index into `LAYER_SIZES`.
pub fn node_label(position: usize, index: usize) -> String {
  match position {
    0 => "Input".to_string(),
    p if p == LAYER_SIZES.len() - 1 => "Output".to_string(),
    p => format!("H{}.{}", p, index + 1),
  }
}
