//! Human-facing rendering of a simulation result.

use serde::Serialize;

use super::{ExitReason, SimulationResult};
use crate::domain::Decimal;

/// Display strings for one result, with the precision each figure is shown at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDisplay {
    pub entry_price: String,
    pub exit_price: String,
    pub pip_change: String,
    pub price_change_pct: String,
    pub profit_loss: String,
    pub roi: String,
    pub leveraged_notional: String,
    /// One-line note naming the threshold that closed the position, if any.
    pub exit_note: Option<String>,
}

/// Sign prefix for a money amount shown at `dp` places: `+` when the rounded
/// value is >= 0, so it agrees with [`Decimal::to_signed_fixed`].
fn sign_prefix(value: Decimal, dp: u32) -> &'static str {
    if value.round_dp(dp).is_negative() {
        "-"
    } else {
        "+"
    }
}

impl ResultDisplay {
    pub fn render(result: &SimulationResult, currency_symbol: &str) -> Self {
        let exit_price = result.exit_price.to_fixed(5);
        let exit_note = match result.exit_reason {
            ExitReason::NaturalEnd => None,
            ExitReason::StopLossHit => Some(format!("Stop loss triggered at {}", exit_price)),
            ExitReason::TakeProfitHit => Some(format!("Take profit triggered at {}", exit_price)),
        };

        Self {
            entry_price: result.entry_price.to_fixed(5),
            exit_price,
            pip_change: result.pip_change.to_fixed(1),
            price_change_pct: format!("{}%", result.price_change_pct.to_signed_fixed(2)),
            profit_loss: format!(
                "{}{}{}",
                sign_prefix(result.profit_loss, 2),
                currency_symbol,
                result.profit_loss.abs().to_fixed(2)
            ),
            roi: format!("{}%", result.roi.to_signed_fixed(2)),
            leveraged_notional: format!(
                "{}{}",
                currency_symbol,
                result.leveraged_notional.to_fixed(2)
            ),
            exit_note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn result(profit_loss: &str, roi: &str, reason: ExitReason) -> SimulationResult {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        SimulationResult {
            entry_price: d("1.085"),
            entry_date: day,
            exit_price: d("1.1"),
            exit_date: day,
            exit_index: 3,
            exit_reason: reason,
            pip_change: d("150.0000001"),
            price_change_pct: d("1.38248847926"),
            leveraged_notional: d("10000"),
            profit_loss: d(profit_loss),
            roi: d(roi),
            stop_loss_level: d("1.0633"),
            take_profit_level: d("1.13925"),
        }
    }

    #[test]
    fn test_render_gain() {
        let display = ResultDisplay::render(
            &result("138.248847926", "13.8248847926", ExitReason::NaturalEnd),
            "€",
        );
        assert_eq!(display.entry_price, "1.08500");
        assert_eq!(display.exit_price, "1.10000");
        assert_eq!(display.pip_change, "150.0");
        assert_eq!(display.price_change_pct, "+1.38%");
        assert_eq!(display.profit_loss, "+€138.25");
        assert_eq!(display.roi, "+13.82%");
        assert_eq!(display.leveraged_notional, "€10000.00");
        assert_eq!(display.exit_note, None);
    }

    #[test]
    fn test_render_loss_with_stop() {
        let display =
            ResultDisplay::render(&result("-200.5", "-20.05", ExitReason::StopLossHit), "€");
        assert_eq!(display.profit_loss, "-€200.50");
        assert_eq!(display.roi, "-20.05%");
        assert_eq!(
            display.exit_note.as_deref(),
            Some("Stop loss triggered at 1.10000")
        );
    }

    #[test]
    fn test_render_loss_that_rounds_to_zero_is_unsigned_zero() {
        // Long 1.08500 -> 1.08499 on 100 at 1x loses about a tenth of a cent.
        let display = ResultDisplay::render(
            &result("-0.000921658986", "-0.000921658986", ExitReason::NaturalEnd),
            "€",
        );
        assert_eq!(display.profit_loss, "+€0.00");
        assert_eq!(display.roi, "+0.00%");

        let display = ResultDisplay::render(&result("-0.005", "-0.005", ExitReason::NaturalEnd), "€");
        assert_eq!(display.profit_loss, "-€0.01");
        assert_eq!(display.roi, "-0.01%");
    }
}
