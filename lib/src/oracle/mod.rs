//! The compute seam: something that turns a parameter snapshot into a full
//! `ComputationResult`. Each request carries the whole snapshot; no session
//! state lives on the other side.

pub mod http;

use std::{future::Future, pin::Pin, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
  error::OracleError,
  forward::{forward, ComputationResult, Sweep},
  params::{Biases, NetworkParameters, Weights},
};

pub use http::HttpOracle;

pub type OracleFuture =
  Pin<Box<dyn Future<Output = Result<ComputationResult, OracleError>> + Send + 'static>>;

/// Body of a compute exchange. Omitted halves fall back to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComputeRequest {
  #[serde(default = "Weights::baseline")]
  pub weights: Weights,
  #[serde(default = "Biases::baseline")]
  pub biases: Biases,
}

impl From<&NetworkParameters> for ComputeRequest {
  fn from(params: &NetworkParameters) -> Self {
    Self {
      weights: params.weights,
      biases: params.biases,
    }
  }
}

impl Default for ComputeRequest {
  fn default() -> Self {
    Self::from(&NetworkParameters::baseline())
  }
}

pub trait Oracle: Send + Sync {
  fn compute(&self, request: ComputeRequest) -> OracleFuture;
}

impl<O: Oracle + ?Sized> Oracle for Arc<O> {
  fn compute(&self, request: ComputeRequest) -> OracleFuture {
    (**self).compute(request)
  }
}

/// Evaluates in-process over a fixed sweep. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOracle {
  sweep: Sweep,
}

impl LocalOracle {
  pub fn new(sweep: Sweep) -> Self {
    Self { sweep }
  }

  pub fn sweep(&self) -> Sweep {
    self.sweep
  }

  pub fn evaluate(&self, request: &ComputeRequest) -> ComputationResult {
    forward(&request.weights, &request.biases, &self.sweep.values())
  }
}

impl Oracle for LocalOracle {
  fn compute(&self, request: ComputeRequest) -> OracleFuture {
    let result = self.evaluate(&request);
    Box::pin(async move { Ok(result) })
  }
}
