//! Static metadata for the tradable Euro-quoted pairs.

use crate::domain::{Decimal, PairId};
use serde::Serialize;

/// A tradable currency pair. Defined once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: PairId,
    pub name: String,
    pub icon: String,
    /// Smallest conventional price increment.
    pub pip_unit: Decimal,
    /// Symbol understood by the live market-data API.
    pub ticker: String,
    /// Anchor price for the synthetic generator.
    pub base_price: Decimal,
    /// Typical daily move in percent, drives the synthetic generator.
    pub volatility_pct: Decimal,
}

/// Pip unit for a pair: 0.01 when quoted in Japanese Yen, 0.0001 otherwise.
pub fn pip_unit_for(pair: &PairId) -> Decimal {
    if pair.quote() == "JPY" {
        Decimal::from_str_canonical("0.01").unwrap_or_default()
    } else {
        Decimal::from_str_canonical("0.0001").unwrap_or_default()
    }
}

/// Decimal places a pair is quoted to (prices are stored rounded to this).
pub fn price_scale_for(pair: &PairId) -> u32 {
    if pair.quote() == "JPY" {
        3
    } else {
        5
    }
}

#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    instruments: Vec<Instrument>,
}

impl InstrumentCatalog {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    /// The six Euro pairs the dashboard trades.
    pub fn standard() -> Self {
        const PAIRS: [(&str, &str, &str, &str, &str); 6] = [
            ("EUR/USD", "Euro / US Dollar", "🇪🇺🇺🇸", "1.0850", "1.2"),
            ("EUR/GBP", "Euro / British Pound", "🇪🇺🇬🇧", "0.8520", "1.3"),
            ("EUR/JPY", "Euro / Japanese Yen", "🇪🇺🇯🇵", "168.50", "1.5"),
            ("EUR/CHF", "Euro / Swiss Franc", "🇪🇺🇨🇭", "0.9820", "1.2"),
            ("EUR/AUD", "Euro / Australian Dollar", "🇪🇺🇦🇺", "1.6320", "1.6"),
            ("EUR/CAD", "Euro / Canadian Dollar", "🇪🇺🇨🇦", "1.4820", "1.5"),
        ];

        let instruments = PAIRS
            .iter()
            .map(|(id, name, icon, base, vol)| {
                let id = PairId::new(id.to_string());
                Instrument {
                    pip_unit: pip_unit_for(&id),
                    ticker: format!("{}=X", id.compact()),
                    id,
                    name: name.to_string(),
                    icon: icon.to_string(),
                    base_price: Decimal::from_str_canonical(base).unwrap_or_default(),
                    volatility_pct: Decimal::from_str_canonical(vol).unwrap_or_default(),
                }
            })
            .collect();

        Self::new(instruments)
    }

    pub fn get(&self, id: &PairId) -> Option<&Instrument> {
        self.instruments.iter().find(|i| &i.id == id)
    }

    /// Look up by loosely formatted user input ("eurusd", "EUR/USD").
    pub fn lookup(&self, input: &str) -> Option<&Instrument> {
        PairId::parse(input).and_then(|id| self.get(&id))
    }

    pub fn pip_unit(&self, id: &PairId) -> Option<Decimal> {
        self.get(id).map(|i| i.pip_unit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter()
    }

    pub fn ids(&self) -> Vec<PairId> {
        self.instruments.iter().map(|i| i.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
