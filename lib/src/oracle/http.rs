use reqwest::Client;
use tracing::debug;

use super::{ComputeRequest, Oracle, OracleFuture};
use crate::{error::OracleError, forward::ComputationResult};

/// Talks to a `serve` instance over `POST /compute`.
#[derive(Debug, Clone)]
pub struct HttpOracle {
  url: String,
  client: Client,
}

impl HttpOracle {
  /// `url` is the server root, e.g. `http://localhost:4545`.
  pub fn new(url: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      client: Client::new(),
    }
  }

  pub fn with_client(url: impl Into<String>, client: Client) -> Self {
    Self {
      url: url.into(),
      client,
    }
  }

  pub fn endpoint(&self) -> String {
    format!("{}/compute", self.url.trim_end_matches('/'))
  }
}

impl Oracle for HttpOracle {
  fn compute(&self, request: ComputeRequest) -> OracleFuture {
    let client = self.client.clone();
    let endpoint = self.endpoint();
    Box::pin(async move {
      debug!(%endpoint, "requesting sweep");
      let response = client
        .post(&endpoint)
        .json(&request)
        .send()
        .await
        .map_err(|e| OracleError::Unavailable(e.to_string()))?;

      let status = response.status();
      if !status.is_success() {
        return Err(OracleError::Rejected {
          status: status.as_u16(),
        });
      }

      let result: ComputationResult = response
        .json()
        .await
        .map_err(|e| OracleError::Malformed(e.to_string()))?;
      result.validate()?;
      Ok(result)
    })
  }
}
