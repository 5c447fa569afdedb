//! Pure computation engine for the historical trading simulator.

pub mod display;
pub mod simulation;

pub use display::ResultDisplay;
pub use simulation::{
    simulate, ExitReason, PositionParameters, SimulationError, SimulationResult, ThresholdLevels,
};
