//! Mock quote provider for testing without network calls.

use super::{QuoteProvider, QuoteProviderError};
use crate::domain::{Instrument, PairId, PriceSeries, Quote};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Mock provider that serves predefined quotes and series.
#[derive(Debug, Clone, Default)]
pub struct MockQuoteProvider {
    quotes: HashMap<PairId, Quote>,
    series: HashMap<PairId, PriceSeries>,
    failure: Option<QuoteProviderError>,
}

impl MockQuoteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quotes.insert(quote.pair.clone(), quote);
        self
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.series.insert(series.pair().clone(), series);
        self
    }

    /// Make every call fail with `error`.
    pub fn failing(mut self, error: QuoteProviderError) -> Self {
        self.failure = Some(error);
        self
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn current_quote(&self, instrument: &Instrument) -> Result<Quote, QuoteProviderError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.quotes
            .get(&instrument.id)
            .cloned()
            .ok_or_else(|| QuoteProviderError::NotFound(instrument.id.to_string()))
    }

    async fn historical_series(
        &self,
        instrument: &Instrument,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, QuoteProviderError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.series
            .get(&instrument.id)
            .map(|s| s.window(from, to))
            .ok_or_else(|| QuoteProviderError::NotFound(instrument.id.to_string()))
    }
}
