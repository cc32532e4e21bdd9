//! Simulation state and the tick loop that drives it

pub mod state;
pub mod tick;

pub use state::{Agent, AgentStatus, SimulationState};
pub use tick::{Simulation, TickOutcome, TickPhase, LOOP_ERROR_MESSAGE};
