use std::{io, sync::Arc, time::Duration};

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::{
  controller::{Controller, Event, Phase, Status},
  controls::{ParamTarget, INPUT_ID},
  error::ControllerGone,
  oracle::Oracle,
  params::ParameterStore,
  runtime::{self, ControllerHandle},
  views::{TerminalView, TracingView, ViewAdapter, Views},
};

const HELP: &str = "\
commands:
  <slider> <value>   set a weight or bias, e.g. `w2_0_1 0.5`, `b3_0 -1`
  input <value>      move the probe input
  reset              restore the initial weights and biases
  random             randomize every weight and bias
  show               print the controller state and every slider
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
  Edit(Event),
  Show,
  Help,
  Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
  #[error("unknown command `{0}`, try `help`")]
  Unknown(String),
  #[error("`{0}` needs a value")]
  MissingValue(String),
  #[error("cannot read `{0}` as a number")]
  BadValue(String),
}

/// Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
  let mut words = line.split_whitespace();
  let Some(head) = words.next() else {
    return Ok(None);
  };
  let mut value = || -> Result<f32, CommandError> {
    let word = words
      .next()
      .ok_or_else(|| CommandError::MissingValue(head.to_string()))?;
    word
      .parse::<f32>()
      .ok()
      .filter(|v| v.is_finite())
      .ok_or_else(|| CommandError::BadValue(word.to_string()))
  };

  let command = match head {
    "quit" | "exit" | "q" => Command::Quit,
    "help" | "?" => Command::Help,
    "show" => Command::Show,
    "reset" => Command::Edit(Event::Reset),
    "random" | "randomize" => Command::Edit(Event::Randomize),
    INPUT_ID | "x" => Command::Edit(Event::SetInput(value()?)),
    id => match ParamTarget::parse(id) {
      Some(target) => Command::Edit(target.event(value()?)),
      None => return Err(CommandError::Unknown(id.to_string())),
    },
  };
  Ok(Some(command))
}

/// Line-driven explorer: every command becomes a controller event, renders go
/// to the terminal.
pub struct Explore {
  oracle: Arc<dyn Oracle>,
  store: ParameterStore,
}

impl Explore {
  pub fn new(oracle: Arc<dyn Oracle>, store: ParameterStore) -> Self {
    Self { oracle, store }
  }

  pub async fn run(self) -> io::Result<()> {
    let views = Views::new()
      .with(TracingView)
      .with(TerminalView::new(io::stdout()));
    self.run_with(BufReader::new(tokio::io::stdin()), views).await
  }

  pub async fn run_with<R, V>(self, input: R, views: V) -> io::Result<()>
  where
    R: AsyncBufRead + Unpin,
    V: ViewAdapter + Send + 'static,
  {
    let handle = runtime::spawn(Controller::new(self.store, views), self.oracle);
    handle.refresh().map_err(gone)?;
    println!("{}", HELP);

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
      match parse_command(&line) {
        Ok(None) => {}
        Ok(Some(Command::Quit)) => break,
        Ok(Some(Command::Help)) => println!("{}", HELP),
        Ok(Some(Command::Show)) => print_status(&handle.status().await.map_err(gone)?),
        Ok(Some(Command::Edit(event))) => handle.send(event).map_err(gone)?,
        Err(err) => eprintln!("{}", err),
      }
    }

    settle(&handle).await.map_err(gone)?;
    handle.shutdown();
    info!("explorer finished");
    Ok(())
  }
}

/// Waits for an outstanding recompute so the last edit gets drawn.
async fn settle(handle: &ControllerHandle) -> Result<(), ControllerGone> {
  for _ in 0..200 {
    if handle.status().await?.phase == Phase::Idle {
      return Ok(());
    }
    tokio::time::sleep(Duration::from_millis(25)).await;
  }
  warn!("recompute still in flight, leaving without it");
  Ok(())
}

fn print_status(status: &Status) {
  println!(
    "{:?}, {} requests issued, probe input {:.2}",
    status.phase, status.issued, status.parameters.input
  );
  let mut view = TerminalView::new(io::stdout());
  view.render_sliders(&status.parameters.weights, &status.parameters.biases);
}

fn gone(err: ControllerGone) -> io::Error {
  io::Error::new(io::ErrorKind::BrokenPipe, err)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{oracle::LocalOracle, topology::Layer, views::recording::RecordingView};

  #[test]
  fn parses_commands() {
    assert_eq!(parse_command("   "), Ok(None));
    assert_eq!(parse_command("quit"), Ok(Some(Command::Quit)));
    assert_eq!(parse_command("reset"), Ok(Some(Command::Edit(Event::Reset))));
    assert_eq!(
      parse_command("input 0.05"),
      Ok(Some(Command::Edit(Event::SetInput(0.05))))
    );
    assert_eq!(
      parse_command("w2_0_1 -1.5"),
      Ok(Some(Command::Edit(Event::SetWeight {
        layer: Layer::Two,
        source: 0,
        dest: 1,
        value: -1.5
      })))
    );
    assert_eq!(
      parse_command("b3_0 2"),
      Ok(Some(Command::Edit(Event::SetBias {
        layer: Layer::Three,
        node: 0,
        value: 2.0
      })))
    );
  }

  #[test]
  fn reports_bad_commands() {
    assert_eq!(
      parse_command("jump 3"),
      Err(CommandError::Unknown("jump".to_string()))
    );
    assert_eq!(
      parse_command("b1_0"),
      Err(CommandError::MissingValue("b1_0".to_string()))
    );
    assert_eq!(
      parse_command("input lots"),
      Err(CommandError::BadValue("lots".to_string()))
    );
    assert_eq!(
      parse_command("input NaN"),
      Err(CommandError::BadValue("NaN".to_string()))
    );
    assert_eq!(
      parse_command("w2_0_0 inf"),
      Err(CommandError::BadValue("inf".to_string()))
    );
    // ids outside the topology never become edits
    assert_eq!(
      parse_command("w1_7_0 1"),
      Err(CommandError::Unknown("w1_7_0".to_string()))
    );
    assert_eq!(
      parse_command("b3_1 1"),
      Err(CommandError::Unknown("b3_1".to_string()))
    );
  }

  #[tokio::test]
  async fn script_drives_the_controller() {
    let view = RecordingView::default();
    let script: &[u8] = b"w1_0_0 2\nnonsense\nw1_7_0 1\ninput 0.05\nquit\nw1_0_0 9\n";
    Explore::new(Arc::new(LocalOracle::default()), ParameterStore::seeded(4))
      .run_with(script, view.clone())
      .await
      .unwrap();

    let topologies = view.topologies();
    assert!(!topologies.is_empty());
    assert_eq!(topologies.last().unwrap().w1[0][0], 2.0);
    assert_eq!(view.probes().last().map(|p| p.0), Some(0.05));
  }
}
