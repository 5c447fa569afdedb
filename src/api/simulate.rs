use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::{AppState, CURRENCY_SYMBOL};
use crate::engine::{ResultDisplay, SimulationResult};
use crate::error::AppError;
use crate::orchestration::SimulationRequest;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    pub request_key: String,
    pub pair: String,
    pub direction: String,
    pub leverage: u32,
    pub result: SimulationResult,
    pub display: ResultDisplay,
    pub chart: ChartDto,
}

/// Price path with entry/exit markers and the two threshold guide lines.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDto {
    pub points: Vec<ChartPoint>,
    pub entry: ChartPoint,
    pub exit: ChartPoint,
    pub stop_loss_level: String,
    pub take_profit_level: String,
}

#[derive(Debug, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub price: String,
}

pub async fn post_simulate(
    State(state): State<AppState>,
    payload: Result<Json<SimulationRequest>, JsonRejection>,
) -> Result<Json<SimulateResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let outcome = state.simulator.run(&request)?;
    let result = outcome.result;

    let chart = ChartDto {
        points: outcome
            .series
            .iter()
            .map(|p| ChartPoint {
                date: p.date.to_string(),
                price: p.price.to_fixed(5),
            })
            .collect(),
        entry: ChartPoint {
            date: result.entry_date.to_string(),
            price: result.entry_price.to_fixed(5),
        },
        exit: ChartPoint {
            date: result.exit_date.to_string(),
            price: result.exit_price.to_fixed(5),
        },
        stop_loss_level: result.stop_loss_level.to_fixed(5),
        take_profit_level: result.take_profit_level.to_fixed(5),
    };

    Ok(Json(SimulateResponse {
        request_key: outcome.request_key,
        pair: outcome.instrument.id.to_string(),
        direction: request.direction.to_string(),
        leverage: request.leverage,
        display: ResultDisplay::render(&result, CURRENCY_SYMBOL),
        chart,
        result,
    }))
}
