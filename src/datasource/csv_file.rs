//! File-backed quote provider reading daily closes from CSV files.
//!
//! Layout: one file per pair named after its compact id, either plain
//! (`EURUSD.csv`) or lz4-framed (`EURUSD.csv.lz4`), with a `date,price` header.

use super::{QuoteProvider, QuoteProviderError};
use crate::domain::{Decimal, Instrument, PairId, PricePoint, PriceSeries, Quote};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CsvQuoteProvider {
    dir: PathBuf,
}

impl CsvQuoteProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn decompress_lz4_frame(lz4_bytes: &[u8]) -> Result<Vec<u8>, QuoteProviderError> {
        let mut decoder = lz4_flex::frame::FrameDecoder::new(lz4_bytes);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| QuoteProviderError::Parse(format!("lz4 decode error: {}", e)))?;
        Ok(out)
    }

    pub fn parse_csv(pair: &PairId, csv_bytes: &[u8]) -> Result<PriceSeries, QuoteProviderError> {
        #[derive(Debug, serde::Deserialize)]
        struct Row {
            date: String,
            price: String,
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(csv_bytes);

        let mut points = Vec::new();
        for record in reader.deserialize::<Row>() {
            let row = record.map_err(|e| QuoteProviderError::Parse(e.to_string()))?;
            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
                QuoteProviderError::Parse(format!("invalid date {}: {}", row.date, e))
            })?;
            let price = Decimal::from_str_canonical(&row.price).map_err(|e| {
                QuoteProviderError::Parse(format!("invalid price {}: {}", row.price, e))
            })?;
            let point =
                PricePoint::new(date, price).map_err(|e| QuoteProviderError::Parse(e.to_string()))?;
            points.push(point);
        }

        Ok(PriceSeries::from_unsorted(pair.clone(), points))
    }

    async fn load(&self, pair: &PairId) -> Result<PriceSeries, QuoteProviderError> {
        let stem = pair.compact();
        let plain = self.dir.join(format!("{}.csv", stem));
        let compressed = self.dir.join(format!("{}.csv.lz4", stem));

        let bytes = if tokio::fs::try_exists(&plain).await.unwrap_or(false) {
            debug!("Reading {}", plain.display());
            read_file(&plain).await?
        } else if tokio::fs::try_exists(&compressed).await.unwrap_or(false) {
            debug!("Reading {}", compressed.display());
            Self::decompress_lz4_frame(&read_file(&compressed).await?)?
        } else {
            return Err(QuoteProviderError::NotFound(format!(
                "no history file for {} in {}",
                pair,
                self.dir.display()
            )));
        };

        Self::parse_csv(pair, &bytes)
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, QuoteProviderError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| QuoteProviderError::DataUnavailable(format!("{}: {}", path.display(), e)))
}

#[async_trait]
impl QuoteProvider for CsvQuoteProvider {
    fn name(&self) -> &'static str {
        "csv"
    }

    /// Latest close against the close before it.
    async fn current_quote(&self, instrument: &Instrument) -> Result<Quote, QuoteProviderError> {
        let series = self.load(&instrument.id).await?;
        let n = series.len();
        if n < 2 {
            return Err(QuoteProviderError::DataUnavailable(format!(
                "{} has {} closes, need 2 for a quote",
                instrument.id, n
            )));
        }
        let (prev, last) = match (series.get(n - 2), series.get(n - 1)) {
            (Some(prev), Some(last)) => (prev.price, last.price),
            _ => return Err(QuoteProviderError::DataUnavailable(instrument.id.to_string())),
        };
        Ok(Quote::new(instrument.id.clone(), last, prev))
    }

    async fn historical_series(
        &self,
        instrument: &Instrument,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, QuoteProviderError> {
        Ok(self.load(&instrument.id).await?.window(from, to))
    }
}
