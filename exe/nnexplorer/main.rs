mod app_config;

use nnexplorer::*;

use app_config::AppConfig;
use clap::{Parser, Subcommand};
use std::{error::Error, path::PathBuf, sync::Arc};

#[derive(Parser)]
struct Cli {
  /// YAML config file
  #[arg(long, value_name = "PATH", global = true)]
  config: Option<PathBuf>,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the forward pass over HTTP
  Serve {
    #[arg(short, long)]
    port: Option<u16>,
  },
  /// Edit the network interactively from the terminal
  Explore {
    /// Host of a running `serve`; computes in-process when omitted
    #[arg(long)]
    url: Option<String>,
    #[arg(short, long)]
    port: Option<u16>,
    /// Seed for `random`
    #[arg(long)]
    seed: Option<u64>,
  },
  /// Evaluate one set of parameters and print the result as JSON
  Compute {
    /// JSON file with `weights` and/or `biases`; baseline when omitted
    #[arg(long, value_name = "PATH")]
    params: Option<PathBuf>,
  },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
  utils::init_logging()?;
  let args = Cli::parse();

  let config = match &args.config {
    Some(path) => AppConfig::default().merge(AppConfig::load(path)?),
    None => AppConfig::default(),
  };

  match args.command {
    Command::Serve { port } => {
      let port = port.or(config.port).unwrap_or(DEFAULT_PORT);
      let app = subcommands::Server::new(port, config.sweep());
      app.run().await?;
    }
    Command::Explore { url, port, seed } => {
      let port = port.or(config.port).unwrap_or(DEFAULT_PORT);
      let oracle: Arc<dyn Oracle> = match url.or_else(|| config.url.clone()) {
        Some(host) => {
          let true_url = format!("http://{}:{}", host, port);
          tracing::info!(%true_url, "computing remotely");
          Arc::new(HttpOracle::new(true_url))
        }
        None => Arc::new(LocalOracle::new(config.sweep())),
      };
      let mut store = match seed.or(config.seed) {
        Some(seed) => ParameterStore::seeded(seed),
        None => ParameterStore::new(),
      };
      if let Some((low, high)) = config.random_range {
        store = store.with_random_range(low, high)?;
      }
      let app = subcommands::Explore::new(oracle, store);
      app.run().await?;
    }
    Command::Compute { params } => {
      let app = subcommands::Compute::new(params.as_deref(), config.sweep());
      app.run()?;
    }
  }
  Ok(())
}
