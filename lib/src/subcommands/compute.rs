use std::path::{Path, PathBuf};

use crate::{
  error::LoadError,
  forward::{ComputationResult, Sweep},
  oracle::{ComputeRequest, LocalOracle},
};

/// One-shot evaluation of a request file, printed as JSON.
pub struct Compute {
  params_path: Option<PathBuf>,
  sweep: Sweep,
}

impl Compute {
  /// Without a path the baseline parameters are used.
  pub fn new(params_path: Option<&Path>, sweep: Sweep) -> Self {
    Self {
      params_path: params_path.map(PathBuf::from),
      sweep,
    }
  }

  pub fn evaluate(&self) -> Result<ComputationResult, LoadError> {
    let request = match &self.params_path {
      Some(path) => read_request(path)?,
      None => ComputeRequest::default(),
    };
    Ok(LocalOracle::new(self.sweep).evaluate(&request))
  }

  pub fn run(self) -> Result<(), LoadError> {
    let result = self.evaluate()?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
  }
}

pub fn read_request(path: &Path) -> Result<ComputeRequest, LoadError> {
  let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
    path: path.display().to_string(),
    source,
  })?;
  Ok(serde_json::from_str(&content)?)
}
