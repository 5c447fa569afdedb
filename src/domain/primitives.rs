//! Domain primitives: PairId, Direction.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Currency pair identifier in `BASE/QUOTE` form (e.g. "EUR/USD").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairId(pub String);

impl PairId {
    pub fn new(id: String) -> Self {
        PairId(id)
    }

    /// Normalise user input: accepts "EUR/USD", "eurusd", "EUR-USD".
    pub fn parse(input: &str) -> Option<Self> {
        let letters: String = input
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_uppercase();
        if letters.len() != 6 {
            return None;
        }
        Some(PairId(format!("{}/{}", &letters[..3], &letters[3..])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base currency code, the part before the slash.
    pub fn base(&self) -> &str {
        self.0.split('/').next().unwrap_or("")
    }

    /// Quote currency code, the part after the slash.
    pub fn quote(&self) -> &str {
        self.0.split('/').nth(1).unwrap_or("")
    }

    /// Compact form used for file names and tickers ("EURUSD").
    pub fn compact(&self) -> String {
        self.0.replace('/', "")
    }
}

impl std::fmt::Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Buy first, profit when the price rises.
    Long,
    /// Sell first, profit when the price falls.
    Short,
}

impl Direction {
    /// +1 for Long, -1 for Short.
    pub fn sign(&self) -> i32 {
        match self {
            Direction::Long => 1,
            Direction::Short => -1,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Ok(Direction::Long),
            "short" | "sell" => Ok(Direction::Short),
            other => Err(format!("invalid direction: {}", other)),
        }
    }
}
