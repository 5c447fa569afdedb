use crate::domain::Decimal;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub provider: ProviderKind,
    pub refresh_interval: Duration,
    /// How much history to load into the market snapshot.
    pub history_days: i64,
    pub limits: SimulationLimits,
}

/// Which quote source backs the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    /// Seeded random walk; `None` picks a fresh seed at startup.
    Synthetic { seed: Option<u64> },
    Live { api_url: String },
    Csv { dir: PathBuf },
}

/// Bounds applied to user parameters before they reach the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationLimits {
    pub min_investment: Decimal,
    pub max_investment: Decimal,
    pub max_leverage: u32,
    pub min_threshold_pct: Decimal,
    pub max_threshold_pct: Decimal,
}

impl Default for SimulationLimits {
    fn default() -> Self {
        Self {
            min_investment: Decimal::from_i64(100),
            max_investment: Decimal::from_i64(100_000),
            max_leverage: 30,
            min_threshold_pct: Decimal::from_str_canonical("0.1").unwrap_or_default(),
            max_threshold_pct: Decimal::from_i64(20),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or(&env_map, "PORT", 8080u16, "must be a valid u16")?;

        let provider = match env_map
            .get("QUOTE_PROVIDER")
            .map(|s| s.as_str())
            .unwrap_or("synthetic")
        {
            "synthetic" => {
                let seed = env_map
                    .get("SYNTHETIC_SEED")
                    .map(|s| {
                        s.parse::<u64>().map_err(|_| {
                            ConfigError::InvalidValue(
                                "SYNTHETIC_SEED".to_string(),
                                "must be a valid u64".to_string(),
                            )
                        })
                    })
                    .transpose()?;
                ProviderKind::Synthetic { seed }
            }
            "live" => {
                let api_url = env_map
                    .get("MARKET_DATA_API_URL")
                    .cloned()
                    .ok_or_else(|| ConfigError::MissingEnv("MARKET_DATA_API_URL".to_string()))?;
                ProviderKind::Live { api_url }
            }
            "csv" => {
                let dir = env_map
                    .get("HISTORY_DIR")
                    .map(PathBuf::from)
                    .ok_or_else(|| ConfigError::MissingEnv("HISTORY_DIR".to_string()))?;
                ProviderKind::Csv { dir }
            }
            other => {
                return Err(ConfigError::InvalidValue(
                    "QUOTE_PROVIDER".to_string(),
                    format!("must be synthetic, live, or csv, got {}", other),
                ))
            }
        };

        let refresh_secs = parse_or(&env_map, "REFRESH_INTERVAL_SECS", 60u64, "must be a valid u64")?;
        if refresh_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "REFRESH_INTERVAL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let history_days = parse_or(&env_map, "HISTORY_DAYS", 730i64, "must be a valid i64")?;
        if history_days < 1 {
            return Err(ConfigError::InvalidValue(
                "HISTORY_DAYS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let limits = parse_limits(&env_map)?;

        Ok(Config {
            port,
            provider,
            refresh_interval: Duration::from_secs(refresh_secs),
            history_days,
            limits,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
    expectation: &str,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), expectation.to_string())),
    }
}

fn parse_decimal_or(
    env_map: &HashMap<String, String>,
    key: &str,
    default: Decimal,
) -> Result<Decimal, ConfigError> {
    let value = parse_or(env_map, key, default, "must be a decimal number")?;
    if !value.is_positive() {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be positive".to_string(),
        ));
    }
    Ok(value)
}

fn parse_limits(env_map: &HashMap<String, String>) -> Result<SimulationLimits, ConfigError> {
    let defaults = SimulationLimits::default();

    let min_investment = parse_decimal_or(env_map, "MIN_INVESTMENT", defaults.min_investment)?;
    let max_investment = parse_decimal_or(env_map, "MAX_INVESTMENT", defaults.max_investment)?;
    if min_investment > max_investment {
        return Err(ConfigError::InvalidValue(
            "MIN_INVESTMENT".to_string(),
            "must not exceed MAX_INVESTMENT".to_string(),
        ));
    }

    let max_leverage = parse_or(env_map, "MAX_LEVERAGE", defaults.max_leverage, "must be a valid u32")?;
    if max_leverage < 1 {
        return Err(ConfigError::InvalidValue(
            "MAX_LEVERAGE".to_string(),
            "must be at least 1".to_string(),
        ));
    }

    let min_threshold_pct =
        parse_decimal_or(env_map, "MIN_THRESHOLD_PCT", defaults.min_threshold_pct)?;
    let max_threshold_pct =
        parse_decimal_or(env_map, "MAX_THRESHOLD_PCT", defaults.max_threshold_pct)?;
    if min_threshold_pct > max_threshold_pct {
        return Err(ConfigError::InvalidValue(
            "MIN_THRESHOLD_PCT".to_string(),
            "must not exceed MAX_THRESHOLD_PCT".to_string(),
        ));
    }

    Ok(SimulationLimits {
        min_investment,
        max_investment,
        max_leverage,
        min_threshold_pct,
        max_threshold_pct,
    })
}
