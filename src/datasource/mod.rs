//! Quote provider abstraction: current quotes and daily history per pair.

use crate::domain::{Instrument, PriceSeries, Quote};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

pub mod csv_file;
pub mod live;
pub mod mock;
pub mod synthetic;

pub use csv_file::CsvQuoteProvider;
pub use live::LiveQuoteProvider;
pub use mock::MockQuoteProvider;
pub use synthetic::SyntheticQuoteProvider;

/// Source of current and historical prices.
///
/// Implementations make a single attempt per call. A failure is returned to
/// the caller as-is; the user decides whether to retry.
#[async_trait]
pub trait QuoteProvider: Send + Sync + fmt::Debug {
    /// Short label for logs ("live", "synthetic", ...).
    fn name(&self) -> &'static str;

    /// Latest price and the previous close for an instrument.
    async fn current_quote(&self, instrument: &Instrument) -> Result<Quote, QuoteProviderError>;

    /// Daily closes for an instrument with `from <= date <= to`.
    async fn historical_series(
        &self,
        instrument: &Instrument,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, QuoteProviderError>;
}

/// Error type for quote provider operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteProviderError {
    /// Connection failure, timeout, DNS.
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    /// Malformed response or file contents.
    #[error("Parse error: {0}")]
    Parse(String),
    /// The source does not know the instrument.
    #[error("Unknown instrument: {0}")]
    NotFound(String),
    /// The source answered but had no usable data.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
}
