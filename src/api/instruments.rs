use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentDto {
    pub pair: String,
    pub name: String,
    pub icon: String,
    pub pip_unit: String,
}

pub async fn get_instruments(State(state): State<AppState>) -> Json<Vec<InstrumentDto>> {
    Json(
        state
            .catalog
            .iter()
            .map(|i| InstrumentDto {
                pair: i.id.to_string(),
                name: i.name.clone(),
                icon: i.icon.clone(),
                pip_unit: i.pip_unit.to_canonical_string(),
            })
            .collect(),
    )
}
