pub mod board;
pub mod refresh;
pub mod simulate;

pub use board::{MarketBoard, MarketSnapshot};
pub use refresh::{RefreshError, Refresher};
pub use simulate::{SimulateError, SimulationOutcome, SimulationRequest, SimulationService};
