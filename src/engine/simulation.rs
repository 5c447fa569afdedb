use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{Decimal, Direction, PriceSeries};

/// Caller-chosen position. Bounds are checked by the caller; `simulate` only
/// rejects degenerate values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionParameters {
    pub direction: Direction,
    pub investment: Decimal,
    pub leverage: u32,
    pub stop_loss_pct: Decimal,
    pub take_profit_pct: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitReason {
    NaturalEnd,
    StopLossHit,
    TakeProfitHit,
}

impl ExitReason {
    pub fn is_triggered(&self) -> bool {
        !matches!(self, ExitReason::NaturalEnd)
    }
}

/// Outcome of one simulated position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub entry_price: Decimal,
    pub entry_date: NaiveDate,
    pub exit_price: Decimal,
    pub exit_date: NaiveDate,
    /// Index of the exit point within the simulated series.
    pub exit_index: usize,
    pub exit_reason: ExitReason,
    /// Positive when the move favours the position.
    pub pip_change: Decimal,
    /// Direction-adjusted percent move of the price.
    pub price_change_pct: Decimal,
    pub leveraged_notional: Decimal,
    pub profit_loss: Decimal,
    /// Profit/loss as a percent of the amount invested, not of the notional.
    pub roi: Decimal,
    pub stop_loss_level: Decimal,
    pub take_profit_level: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("insufficient data: need at least 2 price points, got {points}")]
    InsufficientData { points: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Stop-loss and take-profit price levels for a position entered at `entry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdLevels {
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

impl ThresholdLevels {
    pub fn for_position(
        direction: Direction,
        entry: Decimal,
        stop_loss_pct: Decimal,
        take_profit_pct: Decimal,
    ) -> Self {
        let one = Decimal::one();
        let sl = stop_loss_pct / Decimal::hundred();
        let tp = take_profit_pct / Decimal::hundred();
        match direction {
            Direction::Long => Self {
                stop_loss: entry * (one - sl),
                take_profit: entry * (one + tp),
            },
            Direction::Short => Self {
                stop_loss: entry * (one + sl),
                take_profit: entry * (one - tp),
            },
        }
    }

    /// Which threshold `price` breaches, stop-loss first. Both comparisons are
    /// inclusive.
    pub fn breach(&self, direction: Direction, price: Decimal) -> Option<ExitReason> {
        let (stop_hit, take_hit) = match direction {
            Direction::Long => (price <= self.stop_loss, price >= self.take_profit),
            Direction::Short => (price >= self.stop_loss, price <= self.take_profit),
        };
        if stop_hit {
            Some(ExitReason::StopLossHit)
        } else if take_hit {
            Some(ExitReason::TakeProfitHit)
        } else {
            None
        }
    }
}

fn validate(params: &PositionParameters, pip_unit: Decimal) -> Result<(), SimulationError> {
    if !params.investment.is_positive() {
        return Err(SimulationError::InvalidParameter(format!(
            "investment must be positive, got {}",
            params.investment
        )));
    }
    if params.leverage < 1 {
        return Err(SimulationError::InvalidParameter(
            "leverage must be at least 1".to_string(),
        ));
    }
    if !params.stop_loss_pct.is_positive() {
        return Err(SimulationError::InvalidParameter(format!(
            "stop-loss percent must be positive, got {}",
            params.stop_loss_pct
        )));
    }
    if !params.take_profit_pct.is_positive() {
        return Err(SimulationError::InvalidParameter(format!(
            "take-profit percent must be positive, got {}",
            params.take_profit_pct
        )));
    }
    if !pip_unit.is_positive() {
        return Err(SimulationError::InvalidParameter(format!(
            "pip unit must be positive, got {}",
            pip_unit
        )));
    }
    Ok(())
}

/// Walk `series` from its first point and close the position on the first bar
/// that touches a threshold, or on the last bar if none does.
///
/// Pure: no I/O, no hidden state, same inputs give the same result.
pub fn simulate(
    series: &PriceSeries,
    params: &PositionParameters,
    pip_unit: Decimal,
) -> Result<SimulationResult, SimulationError> {
    validate(params, pip_unit)?;

    let (entry, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() >= 2 => (*first, *last),
        _ => {
            return Err(SimulationError::InsufficientData {
                points: series.len(),
            })
        }
    };

    let levels = ThresholdLevels::for_position(
        params.direction,
        entry.price,
        params.stop_loss_pct,
        params.take_profit_pct,
    );

    let mut exit = last;
    let mut exit_index = series.len() - 1;
    let mut exit_reason = ExitReason::NaturalEnd;

    for (index, point) in series.iter().enumerate().skip(1) {
        if let Some(reason) = levels.breach(params.direction, point.price) {
            exit = *point;
            exit_index = index;
            exit_reason = reason;
            break;
        }
    }

    let favourable_move = match params.direction {
        Direction::Long => exit.price - entry.price,
        Direction::Short => entry.price - exit.price,
    };
    let pip_change = favourable_move / pip_unit;
    let price_change_pct = favourable_move / entry.price * Decimal::hundred();

    let leveraged_notional = params.investment * Decimal::from_i64(i64::from(params.leverage));
    let profit_loss = leveraged_notional * price_change_pct / Decimal::hundred();
    let roi = profit_loss / params.investment * Decimal::hundred();

    Ok(SimulationResult {
        entry_price: entry.price,
        entry_date: entry.date,
        exit_price: exit.price,
        exit_date: exit.date,
        exit_index,
        exit_reason,
        pip_change,
        price_change_pct,
        leveraged_notional,
        profit_loss,
        roi,
        stop_loss_level: levels.stop_loss,
        take_profit_level: levels.take_profit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PairId, PricePoint};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn series(prices: &[&str]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, px)| PricePoint::new(start + chrono::Duration::days(i as i64), d(px)).unwrap())
            .collect();
        PriceSeries::new(PairId::new("EUR/USD".to_string()), points).unwrap()
    }

    fn params(direction: Direction) -> PositionParameters {
        PositionParameters {
            direction,
            investment: d("1000"),
            leverage: 10,
            stop_loss_pct: d("2"),
            take_profit_pct: d("5"),
        }
    }

    #[test]
    fn test_levels_long_and_short() {
        let long = ThresholdLevels::for_position(Direction::Long, d("1.0850"), d("2"), d("5"));
        assert_eq!(long.stop_loss, d("1.0633"));
        assert_eq!(long.take_profit, d("1.13925"));

        let short = ThresholdLevels::for_position(Direction::Short, d("1.0850"), d("2"), d("5"));
        assert_eq!(short.stop_loss, d("1.1067"));
        assert_eq!(short.take_profit, d("1.03075"));
    }

    #[test]
    fn test_stop_loss_wins_when_levels_overlap() {
        // Only degenerate levels let both conditions hold on one bar.
        let levels = ThresholdLevels {
            stop_loss: d("1.2"),
            take_profit: d("1.0"),
        };
        assert_eq!(
            levels.breach(Direction::Long, d("1.1")),
            Some(ExitReason::StopLossHit)
        );
    }

    #[test]
    fn test_rejects_zero_pip_unit() {
        let err = simulate(&series(&["1.0", "1.1"]), &params(Direction::Long), Decimal::zero())
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParameter(_)));
    }

    #[test]
    fn test_exit_index_points_at_breach() {
        let result = simulate(
            &series(&["1.0000", "0.9900", "0.9700", "0.9500"]),
            &params(Direction::Long),
            d("0.0001"),
        )
        .unwrap();
        assert_eq!(result.exit_index, 2);
        assert_eq!(result.exit_reason, ExitReason::StopLossHit);
        assert!(result.exit_reason.is_triggered());
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = SimulationError::InsufficientData { points: 1 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 2 price points, got 1"
        );
    }
}
