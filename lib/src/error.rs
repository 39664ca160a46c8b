use thiserror::Error;

use crate::topology::{Layer, ParamKind};

/// Rejected parameter edit. Indices come from slider bindings generated off the
/// topology, so hitting this means a caller built a bad target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
  #[error("{kind} index {index:?} is out of bounds for layer {layer} with shape {shape:?}")]
  OutOfBoundsIndex {
    kind: ParamKind,
    layer: Layer,
    index: (usize, usize),
    shape: (usize, usize),
  },
}

/// `randomize` bounds that cannot be sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("random range [{low}, {high}] must have finite bounds and a finite width")]
pub struct RangeError {
  pub low: f32,
  pub high: f32,
}

/// A failed compute exchange. The controller goes back to idle and keeps the
/// last good views on any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
  #[error("oracle unavailable: {0}")]
  Unavailable(String),
  #[error("oracle rejected the request with status {status}")]
  Rejected { status: u16 },
  #[error("malformed oracle response: {0}")]
  Malformed(String),
}

/// The controller task has stopped and no longer accepts events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("controller is no longer running")]
pub struct ControllerGone;

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("cannot read {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("invalid json: {0}")]
  Json(#[from] serde_json::Error),
}
