//! Tick engine and the worker task that drives it.

mod engine;
mod worker;

pub use engine::TickEngine;
pub use worker::{Command, SimulationWorker};
