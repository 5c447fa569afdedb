//! Date-indexed price series for a single instrument.

use crate::domain::{Decimal, PairId};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// One observed daily price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

impl PricePoint {
    /// Create a point, rejecting zero and negative prices.
    pub fn new(date: NaiveDate, price: Decimal) -> Result<Self, SeriesError> {
        if !price.is_positive() {
            return Err(SeriesError::NonPositivePrice { date, price });
        }
        Ok(Self { date, price })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("price must be positive, got {price} on {date}")]
    NonPositivePrice { date: NaiveDate, price: Decimal },
    #[error("dates must be strictly increasing: {next} follows {prev}")]
    Unordered { prev: NaiveDate, next: NaiveDate },
}

/// Ordered price points for one instrument.
///
/// Dates are strictly increasing and unique; constructors enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSeries {
    pair: PairId,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(pair: PairId, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for w in points.windows(2) {
            if w[1].date <= w[0].date {
                return Err(SeriesError::Unordered {
                    prev: w[0].date,
                    next: w[1].date,
                });
            }
        }
        Ok(Self { pair, points })
    }

    /// Build from unsorted rows: sorts by date, keeps the last price seen for a
    /// repeated date.
    pub fn from_unsorted(pair: PairId, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        Self {
            pair,
            points: deduped,
        }
    }

    pub fn empty(pair: PairId) -> Self {
        Self {
            pair,
            points: Vec::new(),
        }
    }

    pub fn pair(&self) -> &PairId {
        &self.pair
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Points with `from <= date <= to`.
    pub fn window(&self, from: NaiveDate, to: NaiveDate) -> PriceSeries {
        let start = self.points.partition_point(|p| p.date < from);
        let end = self.points.partition_point(|p| p.date <= to);
        let points = if start < end {
            self.points[start..end].to_vec()
        } else {
            Vec::new()
        };
        PriceSeries {
            pair: self.pair.clone(),
            points,
        }
    }

    /// Points on or after `cutoff`.
    pub fn since(&self, cutoff: NaiveDate) -> PriceSeries {
        let start = self.points.partition_point(|p| p.date < cutoff);
        PriceSeries {
            pair: self.pair.clone(),
            points: self.points[start..].to_vec(),
        }
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
