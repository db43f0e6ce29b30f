mod display;
mod runner;

pub use runner::SimulationRunner;
