//! Immutable market snapshot shared between the refresher and readers.

use crate::domain::{PairId, PriceSeries, Quote};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Quotes and history as of one refresh. Never mutated after publication;
/// each refresh publishes a new one.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub quotes: BTreeMap<PairId, Quote>,
    pub history: BTreeMap<PairId, Arc<PriceSeries>>,
    /// Last fetch error per pair, for display next to its card.
    pub errors: BTreeMap<PairId, String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True once a refresh has produced at least one quote or series.
    pub fn is_ready(&self) -> bool {
        self.updated_at.is_some() && !(self.quotes.is_empty() && self.history.is_empty())
    }

    pub fn series(&self, pair: &PairId) -> Option<&Arc<PriceSeries>> {
        self.history.get(pair)
    }
}

/// Holder of the current snapshot. Cheap to clone; readers never block the
/// refresher and always see a complete snapshot.
#[derive(Debug, Clone)]
pub struct MarketBoard {
    tx: Arc<watch::Sender<Arc<MarketSnapshot>>>,
}

impl MarketBoard {
    pub fn new() -> Self {
        Self::with_snapshot(MarketSnapshot::empty())
    }

    pub fn with_snapshot(snapshot: MarketSnapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(snapshot));
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> Arc<MarketSnapshot> {
        self.tx.borrow().clone()
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: MarketSnapshot) -> Arc<MarketSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.tx.send_replace(snapshot.clone());
        snapshot
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<MarketSnapshot>> {
        self.tx.subscribe()
    }
}

impl Default for MarketBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Decimal;

    #[test]
    fn test_publish_replaces_without_touching_old_snapshot() {
        let board = MarketBoard::new();
        let before = board.snapshot();
        assert!(!before.is_ready());

        let pair = PairId::new("EUR/USD".to_string());
        let mut next = MarketSnapshot::empty();
        next.quotes.insert(
            pair.clone(),
            Quote::new(pair.clone(), Decimal::one(), Decimal::one()),
        );
        next.updated_at = Some(Utc::now());
        board.publish(next);

        assert!(before.quotes.is_empty());
        assert!(board.snapshot().is_ready());
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let board = MarketBoard::new();
        let mut rx = board.subscribe();

        let mut next = MarketSnapshot::empty();
        next.updated_at = Some(Utc::now());
        board.publish(next);

        rx.changed().await.unwrap();
        assert!(rx.borrow().updated_at.is_some());
    }
}
