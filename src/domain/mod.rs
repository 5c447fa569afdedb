//! Domain types for the Euro FX dashboard.
//!
//! This module provides:
//! - Exact decimal handling via the Decimal wrapper
//! - Primitives: PairId, Direction
//! - The instrument catalog with pip-unit conventions
//! - PriceSeries and current Quote types

pub mod decimal;
pub mod instrument;
pub mod primitives;
pub mod quote;
pub mod series;

pub use decimal::Decimal;
pub use instrument::{pip_unit_for, price_scale_for, Instrument, InstrumentCatalog};
pub use primitives::{Direction, PairId};
pub use quote::{Quote, Trend};
pub use series::{PricePoint, PriceSeries, SeriesError};
