//! Drives a `Controller` from a mailbox on its own task. Oracle calls run on
//! separate tasks and post their outcome back into the same mailbox, so every
//! state transition happens on the controller task.

use std::sync::Arc;

use tokio::{
  sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender},
    oneshot,
  },
  task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
  controller::{Controller, Dispatch, Event, Status},
  error::ControllerGone,
  oracle::Oracle,
  topology::Layer,
  views::ViewAdapter,
};

enum Message {
  Event(Event),
  Status(oneshot::Sender<Status>),
  Shutdown,
}

/// Cheap to clone; the controller stops once every handle is gone.
#[derive(Clone)]
pub struct ControllerHandle {
  tx: UnboundedSender<Message>,
  task: Arc<JoinHandle<()>>,
}

pub fn spawn<V>(controller: Controller<V>, oracle: Arc<dyn Oracle>) -> ControllerHandle
where
  V: ViewAdapter + Send + 'static,
{
  let (tx, rx) = mpsc::unbounded_channel();
  let task = tokio::spawn(run(controller, oracle, tx.downgrade(), rx));
  ControllerHandle {
    tx,
    task: Arc::new(task),
  }
}

async fn run<V: ViewAdapter>(
  mut controller: Controller<V>,
  oracle: Arc<dyn Oracle>,
  mailbox: WeakUnboundedSender<Message>,
  mut rx: UnboundedReceiver<Message>,
) {
  while let Some(message) = rx.recv().await {
    match message {
      Message::Event(event) => match controller.handle(event) {
        Ok(Some(dispatch)) => send_to_oracle(&oracle, &mailbox, dispatch),
        Ok(None) => {}
        Err(err) => error!(%err, "rejected parameter edit"),
      },
      Message::Status(reply) => {
        // the asker may have given up waiting
        let _ = reply.send(controller.status());
      }
      Message::Shutdown => break,
    }
  }
  info!("controller stopped");
}

fn send_to_oracle(
  oracle: &Arc<dyn Oracle>,
  mailbox: &WeakUnboundedSender<Message>,
  dispatch: Dispatch,
) {
  let Some(tx) = mailbox.upgrade() else {
    return;
  };
  let oracle = Arc::clone(oracle);
  tokio::spawn(async move {
    let Dispatch { id, request } = dispatch;
    let outcome = oracle.compute(request).await;
    if tx.send(Message::Event(Event::Reply { id, outcome })).is_err() {
      debug!(id, "controller gone before reply arrived");
    }
  });
}

impl ControllerHandle {
  /// Queues a user event. Replies only come from the runtime's own oracle
  /// tasks, so a `Reply` passed here is dropped.
  pub(crate) fn send(&self, event: Event) -> Result<(), ControllerGone> {
    if let Event::Reply { id, .. } = event {
      warn!(id, "ignoring reply not produced by the oracle");
      return Ok(());
    }
    self
      .tx
      .send(Message::Event(event))
      .map_err(|_| ControllerGone)
  }

  pub fn set_weight(
    &self,
    layer: Layer,
    source: usize,
    dest: usize,
    value: f32,
  ) -> Result<(), ControllerGone> {
    self.send(Event::SetWeight {
      layer,
      source,
      dest,
      value,
    })
  }

  pub fn set_bias(&self, layer: Layer, node: usize, value: f32) -> Result<(), ControllerGone> {
    self.send(Event::SetBias { layer, node, value })
  }

  pub fn set_input(&self, value: f32) -> Result<(), ControllerGone> {
    self.send(Event::SetInput(value))
  }

  pub fn reset(&self) -> Result<(), ControllerGone> {
    self.send(Event::Reset)
  }

  pub fn randomize(&self) -> Result<(), ControllerGone> {
    self.send(Event::Randomize)
  }

  pub fn refresh(&self) -> Result<(), ControllerGone> {
    self.send(Event::Refresh)
  }

  /// Snapshot of the controller once every earlier message has been handled.
  pub async fn status(&self) -> Result<Status, ControllerGone> {
    let (reply, rx) = oneshot::channel();
    self
      .tx
      .send(Message::Status(reply))
      .map_err(|_| ControllerGone)?;
    rx.await.map_err(|_| ControllerGone)
  }

  /// Stops the controller after the messages already queued. Replies still
  /// in flight are dropped.
  pub fn shutdown(&self) {
    let _ = self.tx.send(Message::Shutdown);
  }

  pub fn is_finished(&self) -> bool {
    self.task.is_finished()
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::Mutex, time::Duration};

  use tokio::sync::Semaphore;

  use super::*;
  use crate::{
    controller::Phase,
    error::OracleError,
    forward::{ComputationResult, Sweep},
    oracle::{ComputeRequest, LocalOracle, OracleFuture},
    params::ParameterStore,
    views::recording::RecordingView,
  };

  /// Holds every request until the test hands out a permit.
  struct GatedOracle {
    gate: Arc<Semaphore>,
    seen: Arc<Mutex<Vec<ComputeRequest>>>,
  }

  impl GatedOracle {
    fn new() -> Self {
      Self {
        gate: Arc::new(Semaphore::new(0)),
        seen: Arc::new(Mutex::new(Vec::new())),
      }
    }
  }

  impl Oracle for GatedOracle {
    fn compute(&self, request: ComputeRequest) -> OracleFuture {
      self.seen.lock().unwrap().push(request);
      let gate = Arc::clone(&self.gate);
      Box::pin(async move {
        let permit = gate.acquire().await.map_err(|e| OracleError::Unavailable(e.to_string()))?;
        permit.forget();
        Ok(LocalOracle::new(Sweep::default()).evaluate(&request))
      })
    }
  }

  struct FailingOracle;

  impl Oracle for FailingOracle {
    fn compute(&self, _request: ComputeRequest) -> OracleFuture {
      Box::pin(async { Err(OracleError::Unavailable("no route to host".into())) })
    }
  }

  async fn wait_for(handle: &ControllerHandle, done: impl Fn(&Status) -> bool) -> Status {
    for _ in 0..400 {
      let status = handle.status().await.unwrap();
      if done(&status) {
        return status;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("controller never reached the expected state");
  }

  #[tokio::test]
  async fn burst_during_request_costs_one_more_request() {
    let scope = crate::utils::init_logging_tests();
    let oracle = Arc::new(GatedOracle::new());
    let gate = Arc::clone(&oracle.gate);
    let seen = Arc::clone(&oracle.seen);
    let view = RecordingView::default();
    let handle = spawn(Controller::new(ParameterStore::seeded(2), view.clone()), oracle);

    handle.refresh().unwrap();
    wait_for(&handle, |s| s.phase == Phase::Computing { id: 1 }).await;

    for i in 0..20 {
      handle.set_weight(Layer::One, 0, 1, i as f32 / 10.0).unwrap();
    }
    let status = wait_for(&handle, |s| s.phase == Phase::ComputingStale { id: 1 }).await;
    assert_eq!(status.issued, 1);

    gate.add_permits(1);
    wait_for(&handle, |s| s.phase == Phase::Computing { id: 2 }).await;
    gate.add_permits(1);
    let status = wait_for(&handle, |s| s.phase == Phase::Idle).await;

    assert_eq!(status.issued, 2);
    assert_eq!(status.last_applied, Some(2));
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].weights.w1[0][1], 1.9);
    assert_eq!(view.charts().len(), 2);
    assert_eq!(view.topologies().last().unwrap().w1[0][1], 1.9);

    handle.shutdown();
    drop(scope);
  }

  #[tokio::test]
  async fn replies_cannot_be_injected_through_the_handle() {
    let oracle = Arc::new(GatedOracle::new());
    let gate = Arc::clone(&oracle.gate);
    let view = RecordingView::default();
    let handle = spawn(Controller::new(ParameterStore::seeded(3), view.clone()), oracle);

    handle.refresh().unwrap();
    wait_for(&handle, |s| s.phase == Phase::Computing { id: 1 }).await;
    handle
      .send(Event::Reply {
        id: 1,
        outcome: Ok(ComputationResult::default()),
      })
      .unwrap();
    let status = handle.status().await.unwrap();
    assert_eq!(status.phase, Phase::Computing { id: 1 });
    assert_eq!(status.last_result, None);

    gate.add_permits(1);
    let status = wait_for(&handle, |s| s.phase == Phase::Idle).await;
    assert_eq!(status.last_result.map(|r| r.len()), Some(Sweep::default().count));
    assert_eq!(view.charts().len(), 1);
    handle.shutdown();
  }

  #[tokio::test]
  async fn failed_exchange_goes_idle_with_one_notice() {
    let view = RecordingView::default();
    let handle = spawn(
      Controller::new(ParameterStore::seeded(2), view.clone()),
      Arc::new(FailingOracle),
    );

    handle.refresh().unwrap();
    let status = wait_for(&handle, |s| s.phase == Phase::Idle && s.issued == 1).await;
    assert_eq!(status.last_result, None);
    assert_eq!(view.failures(), 1);
    assert!(view.charts().is_empty());
  }

  #[tokio::test]
  async fn probe_and_reset_through_handle() {
    let view = RecordingView::default();
    let handle = spawn(
      Controller::new(ParameterStore::seeded(9), view.clone()),
      Arc::new(LocalOracle::default()),
    );

    handle.randomize().unwrap();
    wait_for(&handle, |s| s.phase == Phase::Idle && s.last_applied == Some(1)).await;
    handle.reset().unwrap();
    let status = wait_for(&handle, |s| s.phase == Phase::Idle && s.last_applied == Some(2)).await;
    assert_eq!(status.parameters, crate::params::NetworkParameters::baseline());

    handle.set_input(-5.0).unwrap();
    let status = handle.status().await.unwrap();
    assert_eq!(status.issued, 2);
    let expected = status.last_result.unwrap().outputs[0];
    assert_eq!(view.probes().last(), Some(&(-5.0, Some(expected))));
  }

  #[tokio::test]
  async fn shutdown_stops_accepting_events() {
    let handle = spawn(
      Controller::new(ParameterStore::seeded(0), RecordingView::default()),
      Arc::new(LocalOracle::default()),
    );
    handle.shutdown();
    for _ in 0..400 {
      if handle.is_finished() {
        break;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(handle.is_finished());
    assert_eq!(handle.status().await, Err(ControllerGone));
  }
}
