//! Synthetic quote provider: seeded random-walk history, no network.

use super::{QuoteProvider, QuoteProviderError};
use crate::domain::{
    price_scale_for, Decimal, Instrument, PairId, PricePoint, PriceSeries, Quote,
};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Mutex;
use tracing::debug;

/// Pull back toward the instrument's base price per day.
const MEAN_REVERSION: f64 = 0.02;
/// Daily log-return stdev as a fraction of the instrument's volatility figure.
const STEP_SCALE: f64 = 0.25;
const SEASONAL_AMPLITUDE: f64 = 0.003;
/// Spread of the first quote around the last close, percent.
const OPENING_JITTER_PCT: f64 = 2.0;
/// Chance a quote moves on each poll, and the size of the move in percent.
const TICK_PROBABILITY: f64 = 0.6;
const TICK_MOVE_PCT: f64 = 1.0;

#[derive(Debug)]
struct SyntheticState {
    histories: HashMap<PairId, PriceSeries>,
    quotes: HashMap<PairId, Quote>,
    tick_rng: StdRng,
}

/// Generates a plausible daily history per instrument from its base price and
/// volatility. The same seed always produces the same history.
#[derive(Debug)]
pub struct SyntheticQuoteProvider {
    seed: u64,
    start: NaiveDate,
    as_of: NaiveDate,
    state: Mutex<SyntheticState>,
}

impl SyntheticQuoteProvider {
    /// History runs from 2020-01-01 through today.
    pub fn new(seed: u64) -> Self {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();
        Self::with_range(seed, start, Utc::now().date_naive())
    }

    pub fn with_range(seed: u64, start: NaiveDate, as_of: NaiveDate) -> Self {
        Self {
            seed,
            start,
            as_of,
            state: Mutex::new(SyntheticState {
                histories: HashMap::new(),
                quotes: HashMap::new(),
                tick_rng: StdRng::seed_from_u64(seed ^ 0x5eed_0f_71c4),
            }),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Per-instrument seed so pairs do not share a path.
    fn instrument_seed(&self, pair: &PairId) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(pair.as_str().as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash[..8]);
        u64::from_le_bytes(bytes)
    }

    fn generate_history(&self, instrument: &Instrument) -> Result<PriceSeries, QuoteProviderError> {
        let base = instrument.base_price.to_f64();
        if base <= 0.0 {
            return Err(QuoteProviderError::DataUnavailable(format!(
                "no base price for {}",
                instrument.id
            )));
        }

        let sigma = instrument.volatility_pct.to_f64() / 100.0 * STEP_SCALE;
        let noise = Normal::new(0.0, sigma)
            .map_err(|e| QuoteProviderError::DataUnavailable(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(self.instrument_seed(&instrument.id));
        let scale = price_scale_for(&instrument.id);

        let anchor = base.ln();
        let mut log_price = anchor;
        let mut points = Vec::new();

        for date in self.start.iter_days().take_while(|d| *d <= self.as_of) {
            log_price += MEAN_REVERSION * (anchor - log_price) + noise.sample(&mut rng);
            let seasonal =
                1.0 + SEASONAL_AMPLITUDE * (2.0 * PI * f64::from(date.ordinal()) / 365.0).sin();
            let price = Decimal::from_f64(log_price.exp() * seasonal)
                .map(|p| p.round_dp(scale))
                .ok_or_else(|| {
                    QuoteProviderError::DataUnavailable(format!(
                        "generator diverged for {}",
                        instrument.id
                    ))
                })?;
            let point = PricePoint::new(date, price)
                .map_err(|e| QuoteProviderError::DataUnavailable(e.to_string()))?;
            points.push(point);
        }

        PriceSeries::new(instrument.id.clone(), points)
            .map_err(|e| QuoteProviderError::DataUnavailable(e.to_string()))
    }

    fn history(&self, instrument: &Instrument) -> Result<PriceSeries, QuoteProviderError> {
        let mut state = self.lock()?;
        if let Some(series) = state.histories.get(&instrument.id) {
            return Ok(series.clone());
        }
        debug!("Generating synthetic history for {}", instrument.id);
        let series = self.generate_history(instrument)?;
        state.histories.insert(instrument.id.clone(), series.clone());
        Ok(series)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SyntheticState>, QuoteProviderError> {
        self.state
            .lock()
            .map_err(|_| QuoteProviderError::DataUnavailable("synthetic state poisoned".to_string()))
    }
}

fn scaled(value: f64, pair: &PairId) -> Result<Decimal, QuoteProviderError> {
    Decimal::from_f64(value)
        .map(|p| p.round_dp(price_scale_for(pair)))
        .filter(|p| p.is_positive())
        .ok_or_else(|| QuoteProviderError::DataUnavailable(format!("invalid price for {}", pair)))
}

#[async_trait]
impl QuoteProvider for SyntheticQuoteProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    /// First call opens within ±2% of the last synthetic close; later calls
    /// drift the quote like a live feed.
    async fn current_quote(&self, instrument: &Instrument) -> Result<Quote, QuoteProviderError> {
        let history = self.history(instrument)?;
        let last_close = history
            .last()
            .map(|p| p.price)
            .ok_or_else(|| QuoteProviderError::DataUnavailable(instrument.id.to_string()))?;

        let mut state = self.lock()?;
        let SyntheticState {
            quotes, tick_rng, ..
        } = &mut *state;

        let next = match quotes.get(&instrument.id) {
            None => {
                let change = tick_rng.gen_range(-OPENING_JITTER_PCT..=OPENING_JITTER_PCT);
                let price = scaled(last_close.to_f64() * (1.0 + change / 100.0), &instrument.id)?;
                Quote::new(instrument.id.clone(), price, last_close)
            }
            Some(prev) if tick_rng.gen_bool(TICK_PROBABILITY) => {
                let change = tick_rng.gen_range(-TICK_MOVE_PCT..=TICK_MOVE_PCT);
                let price = scaled(prev.price.to_f64() * (1.0 + change / 100.0), &instrument.id)?;
                Quote::new(instrument.id.clone(), price, prev.price)
            }
            Some(prev) => prev.clone(),
        };

        quotes.insert(instrument.id.clone(), next.clone());
        Ok(next)
    }

    async fn historical_series(
        &self,
        instrument: &Instrument,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, QuoteProviderError> {
        Ok(self.history(instrument)?.window(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InstrumentCatalog;

    fn provider(seed: u64) -> SyntheticQuoteProvider {
        SyntheticQuoteProvider::with_range(
            seed,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        )
    }

    fn full_range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2100, 1, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_history_is_deterministic_per_seed() {
        let catalog = InstrumentCatalog::standard();
        let eurusd = catalog.lookup("EUR/USD").unwrap();
        let (from, to) = full_range();

        let a = provider(7).historical_series(eurusd, from, to).await.unwrap();
        let b = provider(7).historical_series(eurusd, from, to).await.unwrap();
        let c = provider(8).historical_series(eurusd, from, to).await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 365);
    }

    #[tokio::test]
    async fn test_history_stays_near_base_price() {
        let catalog = InstrumentCatalog::standard();
        let (from, to) = full_range();
        let p = provider(42);

        for instrument in catalog.iter() {
            let series = p.historical_series(instrument, from, to).await.unwrap();
            let base = instrument.base_price.to_f64();
            for point in series.iter() {
                let ratio = point.price.to_f64() / base;
                assert!(
                    (0.7..1.3).contains(&ratio),
                    "{} drifted to {} on {}",
                    instrument.id,
                    point.price,
                    point.date
                );
            }
        }
    }

    #[tokio::test]
    async fn test_pairs_get_independent_paths() {
        let catalog = InstrumentCatalog::standard();
        let (from, to) = full_range();
        let p = provider(1);

        let usd = p
            .historical_series(catalog.lookup("EUR/USD").unwrap(), from, to)
            .await
            .unwrap();
        let chf = p
            .historical_series(catalog.lookup("EUR/CHF").unwrap(), from, to)
            .await
            .unwrap();

        let usd_moves: Vec<bool> = usd.points().windows(2).map(|w| w[1].price > w[0].price).collect();
        let chf_moves: Vec<bool> = chf.points().windows(2).map(|w| w[1].price > w[0].price).collect();
        assert_ne!(usd_moves, chf_moves);
    }

    #[tokio::test]
    async fn test_first_quote_near_last_close() {
        let catalog = InstrumentCatalog::standard();
        let eurjpy = catalog.lookup("EUR/JPY").unwrap();
        let p = provider(3);
        let (from, to) = full_range();

        let last = p
            .historical_series(eurjpy, from, to)
            .await
            .unwrap()
            .last()
            .unwrap()
            .price;
        let quote = p.current_quote(eurjpy).await.unwrap();

        assert_eq!(quote.previous_close, last);
        assert!(quote.change_pct().abs().to_f64() <= 2.01);
    }

    #[tokio::test]
    async fn test_subsequent_quotes_move_at_most_one_percent() {
        let catalog = InstrumentCatalog::standard();
        let eurgbp = catalog.lookup("EUR/GBP").unwrap();
        let p = provider(5);

        let mut prev = p.current_quote(eurgbp).await.unwrap();
        for _ in 0..20 {
            let next = p.current_quote(eurgbp).await.unwrap();
            let step = (next.price.to_f64() - prev.price.to_f64()) / prev.price.to_f64() * 100.0;
            assert!(step.abs() <= 1.01);
            prev = next;
        }
    }

    #[tokio::test]
    async fn test_window_is_applied() {
        let catalog = InstrumentCatalog::standard();
        let eurcad = catalog.lookup("EUR/CAD").unwrap();
        let from = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();

        let series = provider(9).historical_series(eurcad, from, to).await.unwrap();
        assert_eq!(series.len(), 30);
        assert_eq!(series.first().unwrap().date, from);
        assert_eq!(series.last().unwrap().date, to);
    }
}
