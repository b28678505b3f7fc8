use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub snapshot: SnapshotConfig,
    pub sentiment: SentimentConfig,
    pub scanner: ScannerConfig,
    pub logging: LoggingConfig,
}

/// Hosts tried in order by the resilient fetcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub mirror_base_url: String,
    pub rest_base_url: String,
    pub relay_prefix: String,
    pub request_timeout_ms: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            mirror_base_url: "https://data-api.binance.vision/api/v3".to_string(),
            rest_base_url: "https://api.binance.com/api/v3".to_string(),
            relay_prefix: "https://corsproxy.io/?".to_string(),
            request_timeout_ms: 8_000,
        }
    }
}

impl ExchangeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub reference_symbol: String,
    pub hourly_limit: usize,
    pub four_hour_limit: usize,
    pub daily_limit: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            reference_symbol: "BTCUSDT".to_string(),
            hourly_limit: 300,
            four_hour_limit: 50,
            daily_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub feed_url: String,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://api.alternative.me/fng/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub min_quote_volume: f64,
    pub min_abs_change_pct: f64,
    pub top_n: usize,
    pub annotate_top: usize,
    pub excluded_symbols: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_quote_volume: 10_000_000.0,
            min_abs_change_pct: 1.0,
            top_n: 15,
            annotate_top: 10,
            excluded_symbols: [
                "BUSDUSDT",
                "USDCUSDT",
                "TUSDUSDT",
                "USDPUSDT",
                "FDUSDUSDT",
                "EURUSDT",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from `path`, or from `config/default.toml` when no path is given.
    ///
    /// A missing default file yields built-in defaults; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(AppError::Io)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn validate(&self) -> Result<()> {
        let ex = &self.exchange;
        if ex.mirror_base_url.trim().is_empty() || ex.rest_base_url.trim().is_empty() {
            return Err(AppError::Config("exchange base URLs must not be empty".to_string()).into());
        }
        if ex.request_timeout_ms == 0 {
            return Err(
                AppError::Config("exchange.request_timeout_ms must be > 0".to_string()).into(),
            );
        }
        let snap = &self.snapshot;
        if snap.hourly_limit == 0 || snap.four_hour_limit == 0 || snap.daily_limit == 0 {
            bail!("snapshot candle limits must be > 0");
        }
        if snap.reference_symbol.trim().is_empty() {
            bail!("snapshot.reference_symbol must not be empty");
        }
        if self.scanner.top_n == 0 {
            bail!("scanner.top_n must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[exchange]
mirror_base_url = "http://mirror.local/api/v3"
rest_base_url = "http://origin.local/api/v3"
relay_prefix = "http://relay.local/?"
request_timeout_ms = 2500

[snapshot]
reference_symbol = "ETHUSDT"
hourly_limit = 200
four_hour_limit = 40
daily_limit = 3

[sentiment]
feed_url = "http://fng.local/"

[scanner]
min_quote_volume = 5000000.0
min_abs_change_pct = 2.0
top_n = 5
annotate_top = 3
excluded_symbols = ["USDCUSDT"]

[logging]
level = "debug"
json = true
"#;
        let config = Config::from_toml_str(toml_str).unwrap();
        assert_eq!(config.exchange.request_timeout(), Duration::from_millis(2500));
        assert_eq!(config.snapshot.reference_symbol, "ETHUSDT");
        assert_eq!(config.snapshot.daily_limit, 3);
        assert_eq!(config.scanner.top_n, 5);
        assert_eq!(config.scanner.excluded_symbols, vec!["USDCUSDT".to_string()]);
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.exchange.request_timeout_ms, 8_000);
        assert_eq!(config.snapshot.hourly_limit, 300);
        assert_eq!(config.snapshot.four_hour_limit, 50);
        assert_eq!(config.snapshot.daily_limit, 5);
        assert_eq!(config.scanner.top_n, 15);
        assert_eq!(config.scanner.excluded_symbols.len(), 6);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.exchange.request_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::Config(_))));
    }
}
