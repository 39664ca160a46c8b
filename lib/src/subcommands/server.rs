use axum::{
  extract::State,
  routing::{get, post},
  Json, Router,
};
use tracing::info;

use crate::{
  forward::{ComputationResult, Sweep},
  oracle::{ComputeRequest, LocalOracle},
  params::NetworkParameters,
};

/// Serves the forward pass over HTTP: `GET /` hands out the starting
/// parameters, `POST /compute` evaluates a request over the server's sweep.
pub struct Server {
  port: u16,
  sweep: Sweep,
}

impl Server {
  pub fn new(port: u16, sweep: Sweep) -> Self {
    Self { port, sweep }
  }

  pub fn router(sweep: Sweep) -> Router {
    Router::new()
      .route("/", get(Self::initial_parameters))
      .route("/compute", post(Self::handle_compute))
      .with_state(LocalOracle::new(sweep))
  }

  pub async fn run(self) -> std::io::Result<()> {
    let server_addr = format!("0.0.0.0:{}", self.port);
    let tcp_listener = tokio::net::TcpListener::bind(&server_addr).await?;
    info!(%server_addr, points = self.sweep.count, "serving forward pass");
    axum::serve(tcp_listener, Self::router(self.sweep)).await
  }

  async fn initial_parameters() -> Json<NetworkParameters> {
    Json(NetworkParameters::baseline())
  }

  #[tracing::instrument(skip_all)]
  async fn handle_compute(
    State(oracle): State<LocalOracle>,
    Json(request): Json<ComputeRequest>,
  ) -> Json<ComputationResult> {
    let result = oracle.evaluate(&request);
    info!(points = result.len(), "computed sweep");
    Json(result)
  }
}
