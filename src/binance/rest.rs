use anyhow::{Context, Result};
use serde_json::Value;

use super::fetcher::{HttpTransport, ResilientFetcher, Transport};
use crate::config::ExchangeConfig;
use crate::error::AppError;
use crate::model::candle::Candle;
use crate::model::ticker::TickerStat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KlineInterval {
    OneHour,
    FourHours,
    OneDay,
}

impl KlineInterval {
    pub fn as_binance_str(&self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::FourHours => "4h",
            Self::OneDay => "1d",
        }
    }
}

/// Typed market-data endpoints on top of the resilient fetcher. Raw JSON
/// never leaves this type.
pub struct BinanceRestClient<T: Transport = HttpTransport> {
    fetcher: ResilientFetcher<T>,
}

impl BinanceRestClient<HttpTransport> {
    pub fn from_config(exchange: &ExchangeConfig) -> Result<Self> {
        Ok(Self::new(ResilientFetcher::new(
            HttpTransport::new()?,
            exchange.clone(),
        )))
    }
}

impl<T: Transport> BinanceRestClient<T> {
    pub fn new(fetcher: ResilientFetcher<T>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &ResilientFetcher<T> {
        &self.fetcher
    }

    pub async fn ticker_24hr(&self, symbol: &str) -> Result<TickerStat> {
        let body = self
            .fetcher
            .fetch("/ticker/24hr", &format!("symbol={}", symbol))
            .await?;
        let ticker: TickerStat = serde_json::from_value(body)
            .map_err(AppError::Json)
            .with_context(|| format!("ticker_24hr {} decode failed", symbol))?;
        Ok(ticker)
    }

    /// The complete 24h ticker universe. Entries that fail to decode are
    /// skipped rather than failing the whole batch.
    pub async fn all_tickers(&self) -> Result<Vec<TickerStat>> {
        let body = self.fetcher.fetch("/ticker/24hr", "").await?;
        let Value::Array(items) = body else {
            return Err(
                AppError::MalformedPayload("ticker universe is not an array".to_string()).into(),
            );
        };

        let total = items.len();
        let tickers: Vec<TickerStat> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<TickerStat>(item).ok())
            .collect();
        if tickers.len() < total {
            tracing::debug!(
                skipped = total - tickers.len(),
                total,
                "Skipped undecodable tickers"
            );
        }
        Ok(tickers)
    }

    pub async fn klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let query = format!(
            "symbol={}&interval={}&limit={}",
            symbol,
            interval.as_binance_str(),
            limit
        );
        let body = self.fetcher.fetch("/klines", &query).await?;
        let rows = body.as_array().ok_or_else(|| {
            AppError::MalformedPayload(format!("klines {} response is not an array", symbol))
        })?;

        let candles = rows
            .iter()
            .map(Candle::from_kline_row)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| {
                format!(
                    "klines {} {} decode failed",
                    symbol,
                    interval.as_binance_str()
                )
            })?;
        Ok(candles)
    }
}
