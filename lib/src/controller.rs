//! Synchronization controller: keeps the views consistent with the store while
//! at most one oracle request is in flight.
//!
//! Edits that arrive while a request is out are collapsed into a single owed
//! recompute, issued with whatever the store holds when the outstanding reply
//! lands. Only one reply is ever pending, so results are applied in issue order.

use tracing::{debug, error, info, warn};

use crate::{
  error::{OracleError, StoreError},
  forward::ComputationResult,
  oracle::ComputeRequest,
  params::{NetworkParameters, ParameterStore},
  topology::Layer,
  views::ViewAdapter,
};

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Idle,
  Computing { id: RequestId },
  /// Parameters changed after request `id` went out; one more recompute is owed.
  ComputingStale { id: RequestId },
}

impl Phase {
  pub fn in_flight(&self) -> Option<RequestId> {
    match *self {
      Phase::Idle => None,
      Phase::Computing { id } | Phase::ComputingStale { id } => Some(id),
    }
  }
}

/// Controller mailbox message.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
  SetWeight {
    layer: Layer,
    source: usize,
    dest: usize,
    value: f32,
  },
  SetBias {
    layer: Layer,
    node: usize,
    value: f32,
  },
  SetInput(f32),
  Reset,
  Randomize,
  /// Recompute with the current parameters, e.g. on startup.
  Refresh,
  Reply {
    id: RequestId,
    outcome: Result<ComputationResult, OracleError>,
  },
}

/// A request the driver must hand to the oracle, answering with `Event::Reply`
/// carrying the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
  pub id: RequestId,
  pub request: ComputeRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
  pub phase: Phase,
  pub parameters: NetworkParameters,
  pub last_result: Option<ComputationResult>,
  pub last_applied: Option<RequestId>,
  pub issued: u64,
}

pub struct Controller<V> {
  store: ParameterStore,
  views: V,
  phase: Phase,
  issued: u64,
  /// Snapshot the in-flight request was built from.
  in_flight: Option<NetworkParameters>,
  last_result: Option<ComputationResult>,
  last_applied: Option<RequestId>,
}

impl<V: ViewAdapter> Controller<V> {
  pub fn new(store: ParameterStore, views: V) -> Self {
    Self {
      store,
      views,
      phase: Phase::Idle,
      issued: 0,
      in_flight: None,
      last_result: None,
      last_applied: None,
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn parameters(&self) -> NetworkParameters {
    self.store.get()
  }

  pub fn last_result(&self) -> Option<&ComputationResult> {
    self.last_result.as_ref()
  }

  pub fn last_applied(&self) -> Option<RequestId> {
    self.last_applied
  }

  /// Number of oracle requests issued so far.
  pub fn issued(&self) -> u64 {
    self.issued
  }

  pub fn views(&self) -> &V {
    &self.views
  }

  pub fn status(&self) -> Status {
    Status {
      phase: self.phase,
      parameters: self.store.get(),
      last_result: self.last_result.clone(),
      last_applied: self.last_applied,
      issued: self.issued,
    }
  }

  /// Applies one event. A returned `Dispatch` must be sent to the oracle.
  /// Rejected edits leave every piece of state untouched.
  pub fn handle(&mut self, event: Event) -> Result<Option<Dispatch>, StoreError> {
    match event {
      Event::SetWeight {
        layer,
        source,
        dest,
        value,
      } => {
        self.store.set_weight(layer, source, dest, value)?;
        Ok(self.after_edit())
      }
      Event::SetBias { layer, node, value } => {
        self.store.set_bias(layer, node, value)?;
        Ok(self.after_edit())
      }
      Event::SetInput(value) => {
        self.store.set_input(value);
        self.render_probe();
        Ok(None)
      }
      Event::Reset => {
        self.store.reset_to_initial();
        info!("network reset to initial values");
        self.render_sliders();
        Ok(self.after_edit())
      }
      Event::Randomize => {
        self.store.randomize();
        info!("network randomized with new values");
        self.render_sliders();
        Ok(self.after_edit())
      }
      Event::Refresh => Ok(self.parameters_changed()),
      Event::Reply { id, outcome } => Ok(self.resolve(id, outcome)),
    }
  }

  fn after_edit(&mut self) -> Option<Dispatch> {
    if self.store.take_dirty() {
      self.parameters_changed()
    } else {
      None
    }
  }

  fn parameters_changed(&mut self) -> Option<Dispatch> {
    match self.phase {
      Phase::Idle => Some(self.issue()),
      Phase::Computing { id } | Phase::ComputingStale { id } => {
        debug!(id, "parameters changed while computing, recompute owed");
        self.phase = Phase::ComputingStale { id };
        None
      }
    }
  }

  fn issue(&mut self) -> Dispatch {
    self.issued += 1;
    let id = self.issued;
    let snapshot = self.store.get();
    self.in_flight = Some(snapshot);
    self.phase = Phase::Computing { id };
    debug!(id, "issuing compute request");
    Dispatch {
      id,
      request: ComputeRequest::from(&snapshot),
    }
  }

  fn resolve(
    &mut self,
    id: RequestId,
    outcome: Result<ComputationResult, OracleError>,
  ) -> Option<Dispatch> {
    let (pending, owed) = match self.phase {
      Phase::Computing { id } => (id, false),
      Phase::ComputingStale { id } => (id, true),
      Phase::Idle => {
        warn!(id, "discarding reply, nothing in flight");
        return None;
      }
    };
    if id != pending {
      warn!(id, pending, "discarding reply to an outdated request");
      return None;
    }

    let snapshot = match self.in_flight.take() {
      Some(snapshot) => snapshot,
      None => self.store.get(),
    };
    match outcome {
      Ok(result) => {
        self.apply(id, &snapshot, result);
        if owed {
          Some(self.issue())
        } else {
          self.phase = Phase::Idle;
          None
        }
      }
      Err(err) => {
        error!(id, %err, "error computing network results");
        self.phase = Phase::Idle;
        self.views.notify_failure(&err);
        None
      }
    }
  }

  fn apply(&mut self, id: RequestId, snapshot: &NetworkParameters, result: ComputationResult) {
    self.views.render_topology(&snapshot.weights, &snapshot.biases);
    self.views.render_charts(&result);
    self.last_result = Some(result);
    self.last_applied = Some(id);
    self.render_probe();
    info!(id, "network computation and visualization updated");
  }

  fn render_probe(&mut self) {
    let input = self.store.get().input;
    let output = self
      .last_result
      .as_ref()
      .and_then(|r| r.nearest_output(input))
      .map(|(_, y)| y);
    self.views.render_probe(input, output);
  }

  fn render_sliders(&mut self) {
    let params = self.store.get();
    self.views.render_sliders(&params.weights, &params.biases);
  }
}
