use crate::datasource::{QuoteProvider, QuoteProviderError};
use crate::domain::{Instrument, InstrumentCatalog, PairId, Quote};
use crate::orchestration::board::{MarketBoard, MarketSnapshot};
use chrono::{Duration, NaiveDate, Utc};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// Nothing could be fetched; the previous snapshot stays published.
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),
}

/// Pulls quotes and history from the provider into the market board.
///
/// Refreshes are serialised: a manual refresh that is in flight finishes
/// before the periodic task's next tick does any work, and vice versa.
pub struct Refresher {
    provider: Arc<dyn QuoteProvider>,
    catalog: Arc<InstrumentCatalog>,
    board: MarketBoard,
    history_days: i64,
    as_of: Option<NaiveDate>,
    guard: Mutex<()>,
}

impl Refresher {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        catalog: Arc<InstrumentCatalog>,
        board: MarketBoard,
        history_days: i64,
    ) -> Self {
        Self {
            provider,
            catalog,
            board,
            history_days,
            as_of: None,
            guard: Mutex::new(()),
        }
    }

    /// Pin the end of the history window instead of using today's date.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn board(&self) -> &MarketBoard {
        &self.board
    }

    fn history_window(&self) -> (NaiveDate, NaiveDate) {
        let to = self.as_of.unwrap_or_else(|| Utc::now().date_naive());
        (to - Duration::days(self.history_days), to)
    }

    /// Fetch current quotes and full history for every instrument.
    pub async fn refresh_all(&self) -> Result<Arc<MarketSnapshot>, RefreshError> {
        let _guard = self.guard.lock().await;
        let (from, to) = self.history_window();
        debug!(
            "Full refresh via {} provider, history {} to {}",
            self.provider.name(),
            from,
            to
        );

        let fetches = self.catalog.iter().map(|instrument| async move {
            let quote = self.provider.current_quote(instrument).await;
            let series = self.provider.historical_series(instrument, from, to).await;
            (instrument, quote, series)
        });
        let results = join_all(fetches).await;

        let mut snapshot = MarketSnapshot::empty();
        for (instrument, quote, series) in results {
            record_quote(&mut snapshot, instrument, quote);
            match series {
                Ok(series) => {
                    snapshot
                        .history
                        .insert(instrument.id.clone(), Arc::new(series));
                }
                Err(e) => record_error(&mut snapshot, &instrument.id, HISTORY, &e),
            }
        }

        self.finish(snapshot)
    }

    /// Fetch current quotes only; history is carried over from the current
    /// snapshot.
    pub async fn refresh_quotes(&self) -> Result<Arc<MarketSnapshot>, RefreshError> {
        let _guard = self.guard.lock().await;
        debug!("Quote refresh via {} provider", self.provider.name());

        let fetches = self.catalog.iter().map(|instrument| async move {
            (instrument, self.provider.current_quote(instrument).await)
        });
        let results = join_all(fetches).await;

        let previous = self.board.snapshot();
        let mut snapshot = MarketSnapshot {
            history: previous.history.clone(),
            errors: carried_history_errors(&previous),
            ..MarketSnapshot::empty()
        };
        for (instrument, quote) in results {
            record_quote(&mut snapshot, instrument, quote);
        }

        self.finish(snapshot)
    }

    fn finish(&self, mut snapshot: MarketSnapshot) -> Result<Arc<MarketSnapshot>, RefreshError> {
        if snapshot.quotes.is_empty() && snapshot.history.is_empty() {
            let detail = snapshot
                .errors
                .iter()
                .map(|(pair, msg)| format!("{}: {}", pair, msg))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RefreshError::DataUnavailable(detail));
        }

        snapshot.updated_at = Some(Utc::now());
        info!(
            "Market snapshot refreshed: {} quotes, {} series, {} errors",
            snapshot.quotes.len(),
            snapshot.history.len(),
            snapshot.errors.len()
        );
        Ok(self.board.publish(snapshot))
    }

    /// Refresh quotes on a fixed interval until the task is aborted. The first
    /// tick fires one interval from now.
    pub fn spawn_periodic(self: Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh_quotes().await {
                    warn!("Periodic quote refresh failed: {}", e);
                }
            }
        })
    }
}

impl std::fmt::Debug for Refresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refresher")
            .field("provider", &self.provider.name())
            .field("history_days", &self.history_days)
            .finish()
    }
}

fn record_quote(
    snapshot: &mut MarketSnapshot,
    instrument: &Instrument,
    quote: Result<Quote, QuoteProviderError>,
) {
    match quote {
        Ok(quote) => {
            snapshot.quotes.insert(instrument.id.clone(), quote);
        }
        Err(e) => record_error(snapshot, &instrument.id, "quote", &e),
    }
}

const HISTORY: &str = "history";
const ERROR_SEPARATOR: &str = "; ";

/// History errors for pairs still without a series. A quote-only refresh does
/// not retry history, so these stay until the next full refresh.
fn carried_history_errors(previous: &MarketSnapshot) -> BTreeMap<PairId, String> {
    let prefix = format!("{}: ", HISTORY);
    previous
        .errors
        .iter()
        .filter(|(pair, _)| !previous.history.contains_key(*pair))
        .filter_map(|(pair, message)| {
            let kept: Vec<&str> = message
                .split(ERROR_SEPARATOR)
                .filter(|part| part.starts_with(&prefix))
                .collect();
            (!kept.is_empty()).then(|| (pair.clone(), kept.join(ERROR_SEPARATOR)))
        })
        .collect()
}

fn record_error(snapshot: &mut MarketSnapshot, pair: &PairId, what: &str, err: &QuoteProviderError) {
    warn!("Failed to fetch {} for {}: {}", what, pair, err);
    let message = format!("{}: {}", what, err);
    snapshot
        .errors
        .entry(pair.clone())
        .and_modify(|existing| {
            existing.push_str(ERROR_SEPARATOR);
            existing.push_str(&message);
        })
        .or_insert(message);
}
