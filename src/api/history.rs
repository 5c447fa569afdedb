use axum::extract::{Query, State};
use axum::Json;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::{Instrument, PriceSeries};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Comma-separated pairs; all pairs when absent.
    pub pairs: Option<String>,
    pub period: Option<String>,
}

/// Look-back window of the price overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    /// Everything loaded.
    TwoYears,
}

impl Period {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" => Some(Period::OneMonth),
            "3m" => Some(Period::ThreeMonths),
            "6m" => Some(Period::SixMonths),
            "1y" => Some(Period::OneYear),
            "2y" => Some(Period::TwoYears),
            _ => None,
        }
    }

    /// Months count as 30 days and years as 365.
    pub fn days(&self) -> Option<i64> {
        match self {
            Period::OneMonth => Some(30),
            Period::ThreeMonths => Some(90),
            Period::SixMonths => Some(180),
            Period::OneYear => Some(365),
            Period::TwoYears => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub period: String,
    pub series: Vec<SeriesDto>,
}

#[derive(Debug, Serialize)]
pub struct SeriesDto {
    pub pair: String,
    pub name: String,
    pub points: Vec<PointDto>,
}

#[derive(Debug, Serialize)]
pub struct PointDto {
    pub date: String,
    pub price: String,
}

impl SeriesDto {
    fn from_series(instrument: &Instrument, series: &PriceSeries) -> Self {
        Self {
            pair: instrument.id.to_string(),
            name: instrument.name.clone(),
            points: series
                .iter()
                .map(|p| PointDto {
                    date: p.date.to_string(),
                    price: p.price.to_fixed(5),
                })
                .collect(),
        }
    }
}

/// The period is measured back from the newest loaded close, which is today's
/// date whenever the data is current.
pub async fn get_history(
    Query(params): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, AppError> {
    let period_str = params.period.as_deref().unwrap_or("1y");
    let period = Period::parse(period_str).ok_or_else(|| {
        AppError::BadRequest(format!(
            "invalid period {}, expected one of 1m, 3m, 6m, 1y, 2y",
            period_str
        ))
    })?;

    let instruments: Vec<&Instrument> = match params.pairs.as_deref().map(str::trim) {
        None | Some("") => state.catalog.iter().collect(),
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|p| {
                state
                    .catalog
                    .lookup(p)
                    .ok_or_else(|| AppError::NotFound(format!("unknown currency pair: {}", p)))
            })
            .collect::<Result<_, _>>()?,
    };

    let snapshot = state.board.snapshot();
    let loaded: Vec<(&Instrument, &PriceSeries)> = instruments
        .into_iter()
        .filter_map(|i| snapshot.series(&i.id).map(|s| (i, s.as_ref())))
        .collect();

    if loaded.is_empty() {
        return Err(AppError::DataUnavailable(
            "historical data is not loaded yet; refresh market data".to_string(),
        ));
    }

    let newest = loaded.iter().filter_map(|(_, s)| s.last()).map(|p| p.date).max();
    let cutoff = match (period.days(), newest) {
        (Some(days), Some(newest)) => Some(newest - Duration::days(days)),
        _ => None,
    };

    let series = loaded
        .into_iter()
        .map(|(instrument, s)| match cutoff {
            Some(cutoff) => SeriesDto::from_series(instrument, &s.since(cutoff)),
            None => SeriesDto::from_series(instrument, s),
        })
        .collect();

    Ok(Json(HistoryResponse {
        period: period_str.to_string(),
        series,
    }))
}
