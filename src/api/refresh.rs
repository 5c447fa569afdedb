use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub updated_at: String,
    pub quotes: usize,
    pub series: usize,
    pub errors: Vec<String>,
}

/// Manual full refresh. Waits for any periodic refresh already running.
pub async fn post_refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, AppError> {
    let snapshot = state.refresher.refresh_all().await?;

    Ok(Json(RefreshResponse {
        updated_at: snapshot
            .updated_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
        quotes: snapshot.quotes.len(),
        series: snapshot.history.len(),
        errors: snapshot
            .errors
            .iter()
            .map(|(pair, msg)| format!("{}: {}", pair, msg))
            .collect(),
    }))
}
