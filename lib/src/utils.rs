#[cfg(not(debug_assertions))]
use human_panic::setup_panic;
use tracing::subscriber::{DefaultGuard, SetGlobalDefaultError};

#[cfg(debug_assertions)]
extern crate better_panic;

use tracing_subscriber::EnvFilter;

// [NOTE] tracing
//
// Filtering follows RUST_LOG, e.g. `RUST_LOG=nnexplorer=debug` shows every
// controller transition. Without it only info and above is printed.

fn env_filter() -> EnvFilter {
  EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn install_logger() -> Result<(), SetGlobalDefaultError> {
  let subscriber = tracing_subscriber::fmt()
    .compact()
    .with_env_filter(env_filter())
    .finish();
  tracing::subscriber::set_global_default(subscriber)
}

pub fn init_logging() -> Result<(), SetGlobalDefaultError> {
  // Human Panic. Only enabled when *not* debugging.
  #[cfg(not(debug_assertions))]
  {
    setup_panic!();
  }

  // Better Panic. Only enabled *when* debugging.
  #[cfg(debug_assertions)]
  {
    better_panic::Settings::debug()
      .most_recent_first(false)
      .lineno_suffix(true)
      .verbosity(better_panic::Verbosity::Full)
      .install();
  }

  install_logger()
}

/// Thread-local subscriber writing through the test harness. Keep the guard
/// alive for the duration of the test.
pub fn init_logging_tests() -> DefaultGuard {
  let subscriber = tracing_subscriber::fmt()
    .compact()
    .with_test_writer()
    .with_env_filter(env_filter())
    .finish();
  tracing::subscriber::set_default(subscriber)
}
