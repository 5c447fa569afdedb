//! Current quote for a pair.

use crate::domain::{Decimal, PairId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub pair: PairId,
    pub price: Decimal,
    pub previous_close: Decimal,
}

/// Direction of the day's move, used to colour dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Positive,
    Negative,
    Neutral,
}

impl Quote {
    pub fn new(pair: PairId, price: Decimal, previous_close: Decimal) -> Self {
        Self {
            pair,
            price,
            previous_close,
        }
    }

    /// Percent move from the previous close; zero when there is no usable close.
    pub fn change_pct(&self) -> Decimal {
        if !self.previous_close.is_positive() {
            return Decimal::zero();
        }
        (self.price - self.previous_close) / self.previous_close * Decimal::hundred()
    }

    pub fn trend(&self) -> Trend {
        let change = self.change_pct();
        if change.is_positive() {
            Trend::Positive
        } else if change.is_negative() {
            Trend::Negative
        } else {
            Trend::Neutral
        }
    }
}
