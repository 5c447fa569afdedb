pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::{Config, ProviderKind, SimulationLimits};
pub use datasource::{
    CsvQuoteProvider, LiveQuoteProvider, MockQuoteProvider, QuoteProvider, QuoteProviderError,
    SyntheticQuoteProvider,
};
pub use domain::{
    Decimal, Direction, Instrument, InstrumentCatalog, PairId, PricePoint, PriceSeries, Quote,
};
pub use engine::{simulate, ExitReason, PositionParameters, SimulationError, SimulationResult};
pub use error::AppError;
