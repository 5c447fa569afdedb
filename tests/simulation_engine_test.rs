use chrono::NaiveDate;
use eurofx::engine::ThresholdLevels;
use eurofx::{
    simulate, Decimal, Direction, ExitReason, InstrumentCatalog, PairId, PositionParameters,
    PricePoint, PriceSeries, SimulationError,
};

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
}

fn series_for(pair: &str, prices: &[&str]) -> PriceSeries {
    let points = prices
        .iter()
        .enumerate()
        .map(|(i, px)| PricePoint::new(day(i), d(px)).unwrap())
        .collect();
    PriceSeries::new(PairId::new(pair.to_string()), points).unwrap()
}

fn series(prices: &[&str]) -> PriceSeries {
    series_for("EUR/USD", prices)
}

fn params(direction: Direction, sl: &str, tp: &str) -> PositionParameters {
    PositionParameters {
        direction,
        investment: d("1000"),
        leverage: 10,
        stop_loss_pct: d(sl),
        take_profit_pct: d(tp),
    }
}

fn pip() -> Decimal {
    d("0.0001")
}

#[test]
fn test_worked_example_long_natural_end() {
    let s = series(&["1.0850", "1.0900", "1.0700", "1.1000"]);
    let r = simulate(&s, &params(Direction::Long, "2.0", "5.0"), pip()).unwrap();

    assert_eq!(r.exit_reason, ExitReason::NaturalEnd);
    assert_eq!(r.entry_price, d("1.0850"));
    assert_eq!(r.entry_date, day(0));
    assert_eq!(r.exit_price, d("1.1000"));
    assert_eq!(r.exit_date, day(3));
    assert_eq!(r.stop_loss_level, d("1.0633"));
    assert_eq!(r.take_profit_level, d("1.13925"));
    assert_eq!(r.pip_change, d("150"));
    assert_eq!(r.price_change_pct.round_dp(3), d("1.382"));
    assert_eq!(r.leveraged_notional, d("10000"));
    assert_eq!(r.profit_loss.round_dp(2), d("138.25"));
    assert_eq!(r.roi.round_dp(3), d("13.825"));
}

#[test]
fn test_long_stop_loss_first_touch() {
    // Stop at 0.98; both day 2 and day 3 breach, day 2 wins.
    let s = series(&["1.0000", "0.9900", "0.9750", "0.9500", "1.2000"]);
    let r = simulate(&s, &params(Direction::Long, "2", "5"), pip()).unwrap();

    assert_eq!(r.exit_reason, ExitReason::StopLossHit);
    assert_eq!(r.exit_price, d("0.9750"));
    assert_eq!(r.exit_date, day(2));
    assert_eq!(r.exit_index, 2);
    assert_eq!(r.pip_change, d("-250"));
    assert!(r.profit_loss.is_negative());
}

#[test]
fn test_long_take_profit() {
    let s = series(&["1.0000", "1.0200", "1.0600", "0.9000"]);
    let r = simulate(&s, &params(Direction::Long, "2", "5"), pip()).unwrap();

    assert_eq!(r.exit_reason, ExitReason::TakeProfitHit);
    assert_eq!(r.exit_price, d("1.0600"));
    assert_eq!(r.price_change_pct, d("6"));
    assert_eq!(r.profit_loss, d("600"));
    assert_eq!(r.roi, d("60"));
}

#[test]
fn test_short_mirrors_thresholds() {
    // Short: stop at 1.02, take at 0.95.
    let stop = simulate(
        &series(&["1.0000", "1.0100", "1.0200", "0.9000"]),
        &params(Direction::Short, "2", "5"),
        pip(),
    )
    .unwrap();
    assert_eq!(stop.exit_reason, ExitReason::StopLossHit);
    assert_eq!(stop.exit_price, d("1.0200"));
    assert_eq!(stop.pip_change, d("-200"));
    assert!(stop.profit_loss.is_negative());

    let take = simulate(
        &series(&["1.0000", "0.9900", "0.9500", "1.1000"]),
        &params(Direction::Short, "2", "5"),
        pip(),
    )
    .unwrap();
    assert_eq!(take.exit_reason, ExitReason::TakeProfitHit);
    assert_eq!(take.exit_price, d("0.9500"));
    assert_eq!(take.pip_change, d("500"));
    assert_eq!(take.price_change_pct, d("5"));
    assert_eq!(take.profit_loss, d("500"));
}

#[test]
fn test_breach_exactly_at_threshold_counts() {
    let long = simulate(
        &series(&["1.0000", "0.9800", "0.5000"]),
        &params(Direction::Long, "2", "5"),
        pip(),
    )
    .unwrap();
    assert_eq!(long.exit_reason, ExitReason::StopLossHit);
    assert_eq!(long.exit_index, 1);

    let short = simulate(
        &series(&["1.0000", "0.9500", "2.0000"]),
        &params(Direction::Short, "2", "5"),
        pip(),
    )
    .unwrap();
    assert_eq!(short.exit_reason, ExitReason::TakeProfitHit);
    assert_eq!(short.exit_index, 1);
}

#[test]
fn test_entry_bar_is_never_an_exit() {
    // Only indices 1..N-1 are scanned; the last bar still closes naturally.
    let r = simulate(
        &series(&["1.0000", "1.0100"]),
        &params(Direction::Long, "0.5", "5"),
        pip(),
    )
    .unwrap();
    assert_eq!(r.exit_reason, ExitReason::NaturalEnd);
    assert_eq!(r.exit_index, 1);
}

#[test]
fn test_sign_invariant() {
    let cases = [
        (Direction::Long, "1.0100", true),
        (Direction::Long, "0.9900", false),
        (Direction::Short, "0.9900", true),
        (Direction::Short, "1.0100", false),
    ];
    for (direction, exit, profitable) in cases {
        let r = simulate(
            &series(&["1.0000", exit]),
            &params(direction, "10", "10"),
            pip(),
        )
        .unwrap();
        assert_eq!(r.profit_loss.is_positive(), profitable, "{:?} to {}", direction, exit);
        assert_eq!(r.profit_loss.is_negative(), !profitable);
    }

    for direction in [Direction::Long, Direction::Short] {
        let flat = simulate(
            &series(&["1.0000", "1.0500", "1.0000"]),
            &params(direction, "10", "10"),
            pip(),
        )
        .unwrap();
        assert!(flat.profit_loss.is_zero());
        assert!(flat.roi.is_zero());
    }
}

#[test]
fn test_roi_is_profit_over_investment() {
    let s = series(&["1.0850", "1.0910", "1.0875", "1.0932"]);
    for (amount, leverage) in [("100", 1u32), ("2500", 7), ("100000", 30)] {
        let p = PositionParameters {
            direction: Direction::Long,
            investment: d(amount),
            leverage,
            stop_loss_pct: d("3"),
            take_profit_pct: d("3"),
        };
        let r = simulate(&s, &p, pip()).unwrap();
        assert_eq!(r.roi, r.profit_loss / d(amount) * Decimal::hundred());
        assert_eq!(r.leveraged_notional, d(amount) * Decimal::from_i64(i64::from(leverage)));
    }
}

#[test]
fn test_jpy_pip_unit() {
    let catalog = InstrumentCatalog::standard();
    let jpy = PairId::new("EUR/JPY".to_string());
    let jpy_pip = catalog.pip_unit(&jpy).unwrap();

    let s = series_for("EUR/JPY", &["168.50", "169.25"]);
    let long = simulate(&s, &params(Direction::Long, "5", "5"), jpy_pip).unwrap();
    assert_eq!(long.pip_change, d("75"));

    let short = simulate(&s, &params(Direction::Short, "5", "5"), jpy_pip).unwrap();
    assert_eq!(short.pip_change, d("-75"));

    let usd = series(&["1.0850", "1.0925"]);
    let usd_pip = catalog.pip_unit(&PairId::new("EUR/USD".to_string())).unwrap();
    let r = simulate(&usd, &params(Direction::Long, "5", "5"), usd_pip).unwrap();
    assert_eq!(r.pip_change, d("75"));
}

#[test]
fn test_simulate_is_deterministic() {
    let s = series(&["1.0850", "1.0900", "1.0700", "1.1000"]);
    let p = params(Direction::Short, "1.5", "2.5");
    assert_eq!(simulate(&s, &p, pip()), simulate(&s, &p, pip()));
}

#[test]
fn test_insufficient_data() {
    let one = series(&["1.0850"]);
    assert_eq!(
        simulate(&one, &params(Direction::Long, "2", "5"), pip()),
        Err(SimulationError::InsufficientData { points: 1 })
    );

    let empty = PriceSeries::empty(PairId::new("EUR/USD".to_string()));
    assert_eq!(
        simulate(&empty, &params(Direction::Long, "2", "5"), pip()),
        Err(SimulationError::InsufficientData { points: 0 })
    );
}

#[test]
fn test_invalid_parameters() {
    let s = series(&["1.0850", "1.0900"]);
    let base = params(Direction::Long, "2", "5");

    let bad = [
        PositionParameters {
            investment: Decimal::zero(),
            ..base
        },
        PositionParameters {
            investment: d("-100"),
            ..base
        },
        PositionParameters { leverage: 0, ..base },
        PositionParameters {
            stop_loss_pct: Decimal::zero(),
            ..base
        },
        PositionParameters {
            take_profit_pct: d("-1"),
            ..base
        },
    ];

    for p in bad {
        assert!(matches!(
            simulate(&s, &p, pip()),
            Err(SimulationError::InvalidParameter(_))
        ));
    }
}

#[test]
fn test_invalid_parameters_checked_before_length() {
    let one = series(&["1.0850"]);
    let p = PositionParameters {
        leverage: 0,
        ..params(Direction::Long, "2", "5")
    };
    assert!(matches!(
        simulate(&one, &p, pip()),
        Err(SimulationError::InvalidParameter(_))
    ));
}

#[test]
fn test_threshold_levels_match_result() {
    let levels = ThresholdLevels::for_position(Direction::Short, d("168.50"), d("1"), d("2"));
    assert_eq!(levels.stop_loss, d("170.185"));
    assert_eq!(levels.take_profit, d("165.13"));
}
