//! Live market-data client for a Yahoo-Finance-compatible chart API.

use super::{QuoteProvider, QuoteProviderError};
use crate::domain::{price_scale_for, Decimal, Instrument, PairId, PricePoint, PriceSeries, Quote};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Live data source using the public chart endpoint
/// (`{base}/v8/finance/chart/{ticker}`).
///
/// One request per call; there is no retry loop.
#[derive(Debug, Clone)]
pub struct LiveQuoteProvider {
    client: Client,
    base_url: String,
}

impl LiveQuoteProvider {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("eurofx/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn default_url() -> Self {
        Self::new("https://query1.finance.yahoo.com".to_string())
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, ticker)
    }

    async fn get_chart(
        &self,
        ticker: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, QuoteProviderError> {
        let response = self
            .client
            .get(self.chart_url(ticker))
            .query(query)
            .send()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(QuoteProviderError::NotFound(ticker.to_string()));
        }
        if !status.is_success() {
            return Err(QuoteProviderError::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| QuoteProviderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl QuoteProvider for LiveQuoteProvider {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn current_quote(&self, instrument: &Instrument) -> Result<Quote, QuoteProviderError> {
        debug!("Fetching current quote for {} ({})", instrument.id, instrument.ticker);

        let query = [
            ("range", "5d".to_string()),
            ("interval", "1d".to_string()),
        ];
        let response = self.get_chart(&instrument.ticker, &query).await?;
        parse_quote(&response, &instrument.id)
    }

    async fn historical_series(
        &self,
        instrument: &Instrument,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, QuoteProviderError> {
        debug!(
            "Fetching history for {} ({}) from {} to {}",
            instrument.id, instrument.ticker, from, to
        );

        // period2 is exclusive upstream; ask for the whole `to` day.
        let period1 = from.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = to.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_400;
        let query = [
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", "1d".to_string()),
        ];

        let response = self.get_chart(&instrument.ticker, &query).await?;
        let series = parse_series(&response, &instrument.id)?;
        Ok(series.window(from, to))
    }
}

/// Extract `chart.result[0]`, mapping `chart.error` to a provider error.
fn chart_result(response: &serde_json::Value) -> Result<&serde_json::Value, QuoteProviderError> {
    let chart = response
        .get("chart")
        .ok_or_else(|| QuoteProviderError::Parse("Missing chart field".to_string()))?;

    if let Some(error) = chart.get("error").filter(|e| !e.is_null()) {
        let description = error
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(QuoteProviderError::DataUnavailable(description));
    }

    chart
        .get("result")
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .ok_or_else(|| QuoteProviderError::DataUnavailable("Empty chart result".to_string()))
}

fn to_price(value: f64, pair: &PairId, field: &str) -> Result<Decimal, QuoteProviderError> {
    Decimal::from_f64(value)
        .filter(|d| d.is_positive())
        .map(|d| d.round_dp(price_scale_for(pair)))
        .ok_or_else(|| QuoteProviderError::Parse(format!("Invalid {}: {}", field, value)))
}

fn parse_quote(response: &serde_json::Value, pair: &PairId) -> Result<Quote, QuoteProviderError> {
    let meta = chart_result(response)?
        .get("meta")
        .ok_or_else(|| QuoteProviderError::Parse("Missing meta field".to_string()))?;

    let price = meta
        .get("regularMarketPrice")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| {
            QuoteProviderError::DataUnavailable("Missing regularMarketPrice".to_string())
        })?;

    let previous_close = meta
        .get("previousClose")
        .or_else(|| meta.get("chartPreviousClose"))
        .and_then(|v| v.as_f64())
        .ok_or_else(|| QuoteProviderError::DataUnavailable("Missing previousClose".to_string()))?;

    Ok(Quote::new(
        pair.clone(),
        to_price(price, pair, "regularMarketPrice")?,
        to_price(previous_close, pair, "previousClose")?,
    ))
}

fn parse_series(
    response: &serde_json::Value,
    pair: &PairId,
) -> Result<PriceSeries, QuoteProviderError> {
    let result = chart_result(response)?;

    let timestamps = result
        .get("timestamp")
        .and_then(|v| v.as_array())
        .ok_or_else(|| QuoteProviderError::DataUnavailable("No timestamps".to_string()))?;

    let closes = result
        .get("indicators")
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.as_array())
        .and_then(|q| q.first())
        .and_then(|q| q.get("close"))
        .and_then(|c| c.as_array())
        .ok_or_else(|| QuoteProviderError::Parse("Missing close prices".to_string()))?;

    if timestamps.len() != closes.len() {
        return Err(QuoteProviderError::Parse(format!(
            "{} timestamps but {} closes",
            timestamps.len(),
            closes.len()
        )));
    }

    let mut points = Vec::with_capacity(closes.len());
    for (ts, close) in timestamps.iter().zip(closes) {
        // Holidays come back as null closes.
        let Some(close) = close.as_f64() else {
            continue;
        };
        let date = ts
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive())
            .ok_or_else(|| QuoteProviderError::Parse(format!("Invalid timestamp: {}", ts)))?;

        match to_price(close, pair, "close").and_then(|price| {
            PricePoint::new(date, price).map_err(|e| QuoteProviderError::Parse(e.to_string()))
        }) {
            Ok(point) => points.push(point),
            Err(e) => warn!("Skipping close for {} on {}: {}", pair, date, e),
        }
    }

    Ok(PriceSeries::from_unsorted(pair.clone(), points))
}
