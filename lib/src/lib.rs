pub mod controller;
pub mod controls;
pub mod error;
pub mod forward;
pub mod oracle;
pub mod params;
pub mod runtime;
pub mod subcommands;
pub mod topology;
pub mod utils;
pub mod views;

pub use controller::{Controller, Dispatch, Event, Phase, RequestId, Status};
pub use error::{ControllerGone, LoadError, OracleError, RangeError, StoreError};
pub use forward::{ComputationResult, Sweep};
pub use oracle::{ComputeRequest, HttpOracle, LocalOracle, Oracle};
pub use params::{Biases, NetworkParameters, ParameterStore, Weights};
pub use topology::Layer;

/// Port `serve` listens on and `explore --url` connects to by default.
pub const DEFAULT_PORT: u16 = 4545;
