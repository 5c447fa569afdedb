use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::domain::Trend;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesResponse {
    pub cards: Vec<QuoteCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One dashboard card. Pairs whose fetch failed carry `error` and no price.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCard {
    pub pair: String,
    pub name: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn get_quotes(State(state): State<AppState>) -> Json<QuotesResponse> {
    let snapshot = state.board.snapshot();

    let cards = state
        .catalog
        .iter()
        .map(|instrument| {
            let quote = snapshot.quotes.get(&instrument.id);
            QuoteCard {
                pair: instrument.id.to_string(),
                name: instrument.name.clone(),
                icon: instrument.icon.clone(),
                price: quote.map(|q| q.price.to_fixed(5)),
                change_pct: quote.map(|q| format!("{}%", q.change_pct().to_signed_fixed(2))),
                trend: quote.map(|q| q.trend()),
                error: snapshot.errors.get(&instrument.id).cloned(),
            }
        })
        .collect();

    Json(QuotesResponse {
        cards,
        updated_at: snapshot.updated_at.map(|t| t.format("%H:%M:%S").to_string()),
    })
}
