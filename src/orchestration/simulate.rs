use crate::config::SimulationLimits;
use crate::domain::{Decimal, Direction, Instrument, InstrumentCatalog, PriceSeries};
use crate::engine::{simulate, PositionParameters, SimulationError, SimulationResult};
use crate::orchestration::board::MarketBoard;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// A simulation as the user asked for it, before bounds checking.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub pair: String,
    pub direction: Direction,
    pub investment: Decimal,
    pub leverage: u32,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub stop_loss_pct: Decimal,
    pub take_profit_pct: Decimal,
}

impl SimulationRequest {
    /// Stable key for a request: identical inputs give the identical key.
    pub fn request_key(&self) -> String {
        use sha2::{Digest, Sha256};

        let canonical = format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            self.pair.trim().to_ascii_uppercase(),
            self.direction,
            self.investment.to_canonical_string(),
            self.leverage,
            self.entry_date,
            self.exit_date,
            self.stop_loss_pct.to_canonical_string(),
            self.take_profit_pct.to_canonical_string(),
        );
        let hash = Sha256::digest(canonical.as_bytes());
        format!("sim:{}", hex::encode(&hash[..16]))
    }

    pub fn parameters(&self) -> PositionParameters {
        PositionParameters {
            direction: self.direction,
            investment: self.investment,
            leverage: self.leverage,
            stop_loss_pct: self.stop_loss_pct,
            take_profit_pct: self.take_profit_pct,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub request_key: String,
    pub instrument: Instrument,
    /// The window the engine walked, for charting.
    pub series: PriceSeries,
    pub result: SimulationResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulateError {
    #[error("unknown currency pair: {0}")]
    UnknownPair(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("no historical data loaded for {0}; refresh market data and retry")]
    DataUnavailable(String),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Checks a request against the configured bounds and the loaded history,
/// then runs the engine on the requested window of the current snapshot.
#[derive(Debug, Clone)]
pub struct SimulationService {
    catalog: Arc<InstrumentCatalog>,
    board: MarketBoard,
    limits: SimulationLimits,
}

impl SimulationService {
    pub fn new(catalog: Arc<InstrumentCatalog>, board: MarketBoard, limits: SimulationLimits) -> Self {
        Self {
            catalog,
            board,
            limits,
        }
    }

    pub fn limits(&self) -> &SimulationLimits {
        &self.limits
    }

    pub fn run(&self, request: &SimulationRequest) -> Result<SimulationOutcome, SimulateError> {
        let instrument = self
            .catalog
            .lookup(&request.pair)
            .ok_or_else(|| SimulateError::UnknownPair(request.pair.clone()))?;

        self.check_bounds(request)?;

        let snapshot = self.board.snapshot();
        let history = snapshot
            .series(&instrument.id)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SimulateError::DataUnavailable(instrument.id.to_string()))?;

        if let (Some(first), Some(last)) = (history.first(), history.last()) {
            if request.entry_date < first.date || request.exit_date > last.date {
                return Err(SimulateError::InvalidRequest(format!(
                    "dates must fall within available history {} to {}",
                    first.date, last.date
                )));
            }
        }

        let window = history.window(request.entry_date, request.exit_date);
        let request_key = request.request_key();
        debug!(
            "Simulating {} {} over {} points ({})",
            request.direction,
            instrument.id,
            window.len(),
            request_key
        );

        let result = simulate(&window, &request.parameters(), instrument.pip_unit)?;

        Ok(SimulationOutcome {
            request_key,
            instrument: instrument.clone(),
            series: window,
            result,
        })
    }

    fn check_bounds(&self, request: &SimulationRequest) -> Result<(), SimulateError> {
        let limits = &self.limits;

        if request.investment < limits.min_investment || request.investment > limits.max_investment
        {
            return Err(SimulateError::InvalidRequest(format!(
                "investment must be between {} and {}",
                limits.min_investment, limits.max_investment
            )));
        }
        if request.leverage < 1 || request.leverage > limits.max_leverage {
            return Err(SimulateError::InvalidRequest(format!(
                "leverage must be between 1 and {}",
                limits.max_leverage
            )));
        }
        for (name, value) in [
            ("stop-loss", request.stop_loss_pct),
            ("take-profit", request.take_profit_pct),
        ] {
            if value < limits.min_threshold_pct || value > limits.max_threshold_pct {
                return Err(SimulateError::InvalidRequest(format!(
                    "{} percent must be between {} and {}",
                    name, limits.min_threshold_pct, limits.max_threshold_pct
                )));
            }
        }
        if request.exit_date < request.entry_date {
            return Err(SimulateError::InvalidRequest(
                "exit date must not precede entry date".to_string(),
            ));
        }
        Ok(())
    }
}
