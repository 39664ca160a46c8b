use std::{error::Error, path::Path};

use nnexplorer::Sweep;
use serde::Deserialize;

/// Config file format. Every field is optional; CLI flags win over the file.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
  /// Port of the compute server
  pub port: Option<u16>,
  /// Host of a running `serve`; the explorer computes in-process without it
  pub url: Option<String>,
  pub sweep_start: Option<f32>,
  pub sweep_end: Option<f32>,
  pub sweep_points: Option<usize>,
  /// Bounds `random` samples weights and biases from
  pub random_range: Option<(f32, f32)>,
  /// Seed for `random`, for reproducible sessions
  pub seed: Option<u64>,
}

impl AppConfig {
  pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
  }

  // merge configs where the second overwrites the first
  pub fn merge(self, other: Self) -> Self {
    Self {
      port: other.port.or(self.port),
      url: other.url.or(self.url),
      sweep_start: other.sweep_start.or(self.sweep_start),
      sweep_end: other.sweep_end.or(self.sweep_end),
      sweep_points: other.sweep_points.or(self.sweep_points),
      random_range: other.random_range.or(self.random_range),
      seed: other.seed.or(self.seed),
    }
  }

  pub fn sweep(&self) -> Sweep {
    let default = Sweep::default();
    Sweep::new(
      self.sweep_start.unwrap_or(default.start),
      self.sweep_end.unwrap_or(default.end),
      self.sweep_points.unwrap_or(default.count),
    )
  }
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      port: None,
      url: None,
      sweep_start: None,
      sweep_end: None,
      sweep_points: None,
      random_range: None,
      seed: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn later_config_wins() {
    let file: AppConfig = serde_yaml::from_str("port: 8000\nsweep_points: 100\nrandom_range: [-1.0, 1.0]\n").unwrap();
    let cli = AppConfig {
      port: Some(9000),
      ..AppConfig::default()
    };
    let merged = AppConfig::default().merge(file).merge(cli);
    assert_eq!(merged.port, Some(9000));
    assert_eq!(merged.random_range, Some((-1.0, 1.0)));
    assert_eq!(merged.sweep(), Sweep::new(-5.0, 5.0, 100));
  }
}
