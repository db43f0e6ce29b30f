use super::display::DisplayTerminal;
use scheduling_simulator::SchedulingEngine;
use std::{io, time::Duration};
use tracing::warn;

pub enum RunnerEvent {
    Quit,
    Pause,
    Resume,
    Step,
    Restart,
    Tick,
    None,
}

/// Paces a [`SchedulingEngine`] for a human viewer: one simulation tick per
/// display tick, with keys to pause, resume, step and restart.
pub struct SimulationRunner {
    terminal: DisplayTerminal,
    engine: SchedulingEngine,
    status: String,
}

impl SimulationRunner {
    pub fn new(engine: SchedulingEngine, tick_rate: Duration) -> io::Result<Self> {
        let terminal = DisplayTerminal::new(tick_rate)?;
        let mut runner = Self {
            terminal,
            engine,
            status: String::new(),
        };
        runner.start();
        Ok(runner)
    }

    fn start(&mut self) {
        self.status = match self.engine.start() {
            Ok(()) => self.engine.algorithm().drawback().to_owned(),
            Err(err) => {
                warn!(%err, "cannot start simulation");
                err.to_string()
            }
        };
    }

    // Returns false if the program should quit
    pub fn run(&mut self) -> io::Result<bool> {
        self.terminal.draw(&self.engine, &self.status)?;

        match self.terminal.get_input() {
            RunnerEvent::Quit => return Ok(false),
            RunnerEvent::Tick => {
                self.engine.tick();
            }
            RunnerEvent::Pause => {
                self.engine.pause();
            }
            RunnerEvent::Resume => {
                self.engine.resume();
            }
            RunnerEvent::Step => {
                if self.engine.resume() {
                    self.engine.tick();
                    self.engine.pause();
                }
            }
            RunnerEvent::Restart => {
                self.engine.reset();
                self.start();
            }
            RunnerEvent::None => {}
        }
        Ok(true)
    }

    pub fn into_engine(self) -> SchedulingEngine {
        self.engine
    }
}
