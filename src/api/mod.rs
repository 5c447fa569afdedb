pub mod health;
pub mod history;
pub mod instruments;
pub mod quotes;
pub mod refresh;
pub mod simulate;

use crate::domain::InstrumentCatalog;
use crate::orchestration::{MarketBoard, Refresher, SimulationService};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Currency the simulator's money figures are shown in.
pub const CURRENCY_SYMBOL: &str = "€";

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<InstrumentCatalog>,
    pub board: MarketBoard,
    pub refresher: Arc<Refresher>,
    pub simulator: SimulationService,
}

impl AppState {
    pub fn new(
        catalog: Arc<InstrumentCatalog>,
        refresher: Arc<Refresher>,
        simulator: SimulationService,
    ) -> Self {
        Self {
            catalog,
            board: refresher.board().clone(),
            refresher,
            simulator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/instruments", get(instruments::get_instruments))
        .route("/v1/quotes", get(quotes::get_quotes))
        .route("/v1/history", get(history::get_history))
        .route("/v1/simulate", post(simulate::post_simulate))
        .route("/v1/refresh", post(refresh::post_refresh))
        .layer(cors)
        .with_state(state)
}
