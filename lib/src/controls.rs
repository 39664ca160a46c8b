//! Slider bindings. Each slider is data: a target parameter plus a display
//! range, generated from the topology instead of written out per slider.

use itertools::iproduct;

use crate::{
  controller::Event,
  params::NetworkParameters,
  topology::{Layer, LAYER_NAMES},
};

pub const SLIDER_MIN: f32 = -5.0;
pub const SLIDER_MAX: f32 = 5.0;
pub const SLIDER_STEP: f32 = 0.1;

/// Id of the probe slider.
pub const INPUT_ID: &str = "input";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamTarget {
  Weight {
    layer: Layer,
    source: usize,
    dest: usize,
  },
  Bias {
    layer: Layer,
    node: usize,
  },
}

impl ParamTarget {
  /// `w{layer}_{source}_{dest}` or `b{layer}_{node}`.
  pub fn id(&self) -> String {
    match *self {
      ParamTarget::Weight {
        layer,
        source,
        dest,
      } => format!("w{}_{}_{}", layer, source, dest),
      ParamTarget::Bias { layer, node } => format!("b{}_{}", layer, node),
    }
  }

  pub fn label(&self) -> String {
    match *self {
      ParamTarget::Weight {
        layer,
        source,
        dest,
      } => format!(
        "{} → {}",
        layer.source_label(source),
        layer.destination_label(dest)
      ),
      ParamTarget::Bias { layer, node: _ } if layer.destinations() == 1 => {
        LAYER_NAMES[layer.number()].to_string()
      }
      ParamTarget::Bias { layer, node } => format!("Hidden {}.{}", layer, node + 1),
    }
  }

  /// Inverse of `id`. Ids naming a parameter outside the topology are `None`.
  pub fn parse(id: &str) -> Option<Self> {
    Self::parse_unchecked(id).filter(ParamTarget::in_bounds)
  }

  pub fn in_bounds(&self) -> bool {
    match *self {
      ParamTarget::Weight {
        layer,
        source,
        dest,
      } => source < layer.sources() && dest < layer.destinations(),
      ParamTarget::Bias { layer, node } => node < layer.bias_len(),
    }
  }

  fn parse_unchecked(id: &str) -> Option<Self> {
    let (kind, rest) = id.split_at(id.char_indices().nth(1)?.0);
    let parts: Vec<usize> = rest
      .split('_')
      .map(|p| p.parse().ok())
      .collect::<Option<_>>()?;
    match (kind, parts.as_slice()) {
      ("w", [layer, source, dest]) => Some(ParamTarget::Weight {
        layer: Layer::from_number(*layer)?,
        source: *source,
        dest: *dest,
      }),
      ("b", [layer, node]) => Some(ParamTarget::Bias {
        layer: Layer::from_number(*layer)?,
        node: *node,
      }),
      _ => None,
    }
  }

  pub fn read(&self, params: &NetworkParameters) -> Option<f32> {
    match *self {
      ParamTarget::Weight {
        layer,
        source,
        dest,
      } => params.weights.get(layer, source, dest),
      ParamTarget::Bias { layer, node } => params.biases.get(layer, node),
    }
  }

  /// The edit event committing `value` to this target.
  pub fn event(&self, value: f32) -> Event {
    match *self {
      ParamTarget::Weight {
        layer,
        source,
        dest,
      } => Event::SetWeight {
        layer,
        source,
        dest,
        value,
      },
      ParamTarget::Bias { layer, node } => Event::SetBias { layer, node, value },
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliderBinding {
  pub id: String,
  pub label: String,
  pub target: ParamTarget,
  pub min: f32,
  pub max: f32,
  pub step: f32,
}

impl SliderBinding {
  pub fn new(target: ParamTarget) -> Self {
    Self {
      id: target.id(),
      label: target.label(),
      target,
      min: SLIDER_MIN,
      max: SLIDER_MAX,
      step: SLIDER_STEP,
    }
  }

  /// Where the slider knob sits for `value`; the stored value may lie outside.
  pub fn clamp(&self, value: f32) -> f32 {
    value.clamp(self.min, self.max)
  }

  pub fn display(value: f32) -> String {
    format!("{:.2}", value)
  }
}

/// Every weight slider, layer by layer, then every bias slider.
pub fn bindings() -> Vec<SliderBinding> {
  let weights = Layer::ALL.iter().flat_map(|&layer| {
    iproduct!(0..layer.sources(), 0..layer.destinations()).map(move |(source, dest)| {
      ParamTarget::Weight {
        layer,
        source,
        dest,
      }
    })
  });
  let biases = Layer::ALL
    .iter()
    .flat_map(|&layer| (0..layer.bias_len()).map(move |node| ParamTarget::Bias { layer, node }));
  weights.chain(biases).map(SliderBinding::new).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::params::ParameterStore;

  #[test]
  fn one_binding_per_parameter() {
    let all = bindings();
    assert_eq!(all.len(), 3 + 9 + 3 + 3 + 3 + 1);
    assert_eq!(all[0].id, "w1_0_0");
    assert_eq!(all[0].label, "Input → H1.1");
    assert_eq!(all[4].id, "w2_0_1");
    assert_eq!(all[4].label, "H1.1 → H2.2");
    assert_eq!(all[14].label, "H2.3 → Output");
    assert_eq!(all[15].id, "b1_0");
    assert_eq!(all[15].label, "Hidden 1.1");
    assert_eq!(all.last().unwrap().id, "b3_0");
    assert_eq!(all.last().unwrap().label, "Output");
  }

  #[test]
  fn ids_parse_back() {
    for binding in bindings() {
      assert_eq!(ParamTarget::parse(&binding.id), Some(binding.target));
    }
    assert_eq!(ParamTarget::parse("w4_0_0"), None);
    assert_eq!(ParamTarget::parse("w1_0"), None);
    assert_eq!(ParamTarget::parse("b2_x"), None);
    assert_eq!(ParamTarget::parse("q1_0"), None);
    assert_eq!(ParamTarget::parse(""), None);
    assert_eq!(ParamTarget::parse("w1_9_9"), None);
    assert_eq!(ParamTarget::parse("w1_1_0"), None);
    assert_eq!(ParamTarget::parse("w3_0_1"), None);
    assert_eq!(ParamTarget::parse("b3_1"), None);
    assert!(bindings().iter().all(|b| b.target.in_bounds()));
  }

  #[test]
  fn bindings_read_what_the_store_holds() {
    let mut store = ParameterStore::seeded(5);
    store.randomize();
    let params = store.get();
    let all = bindings();
    let read: Vec<f32> = all.iter().filter_map(|b| b.target.read(&params)).collect();
    let stored: Vec<f32> = params
      .weights
      .values()
      .chain(params.biases.values())
      .collect();
    assert_eq!(read, stored);
  }

  #[test]
  fn clamp_keeps_knob_in_range() {
    let binding = SliderBinding::new(ParamTarget::Bias {
      layer: Layer::Two,
      node: 1,
    });
    assert_eq!(binding.clamp(12.0), SLIDER_MAX);
    assert_eq!(binding.clamp(-0.5), -0.5);
    assert_eq!(SliderBinding::display(0.456), "0.46");
  }
}
