use anyhow::{ensure, Result};
use tracing::Instrument;
use uuid::Uuid;

use crate::binance::fetcher::{HttpTransport, Transport};
use crate::binance::rest::{BinanceRestClient, KlineInterval};
use crate::config::{Config, SentimentConfig, SnapshotConfig};
use crate::indicator;
use crate::model::candle::{Candle, CandleSeries};
use crate::model::snapshot::{TechnicalSnapshot, Trend};
use crate::model::ticker::TickerStat;
use crate::sentiment;

const RSI_PERIOD: usize = 14;
const ATR_PERIOD: usize = 14;
const ADX_PERIOD: usize = 14;
const MOMENTUM_PERIOD: usize = 10;
const WILLIAMS_PERIOD: usize = 14;
const CCI_PERIOD: usize = 20;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_WIDTH: f64 = 2.0;
const TREND_SMA_PERIOD: usize = 10;

const QUOTE_ASSETS: [&str; 3] = ["USDT", "BTC", "ETH"];

/// Strip non-alphanumerics, uppercase, and quote in USDT unless the symbol
/// already ends in USDT, BTC or ETH.
pub fn normalize_symbol(raw: &str) -> String {
    let mut symbol: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if !QUOTE_ASSETS.iter().any(|q| symbol.ends_with(q)) {
        symbol.push_str("USDT");
    }
    symbol
}

/// Everything one snapshot is computed from.
#[derive(Debug, Clone)]
pub struct MarketInputs {
    pub ticker: TickerStat,
    pub hourly: Vec<Candle>,
    pub four_hour: Vec<Candle>,
    pub daily: Vec<Candle>,
    pub fear_greed: f64,
    pub reference: TickerStat,
}

/// Derive a live snapshot. Indicators come from the hourly series; trend
/// from the 4h series; pivots from the previous daily candle.
pub fn compute_snapshot(symbol: &str, inputs: &MarketInputs) -> Result<TechnicalSnapshot> {
    ensure!(!inputs.hourly.is_empty(), "no hourly candles for {}", symbol);
    ensure!(!inputs.four_hour.is_empty(), "no 4h candles for {}", symbol);
    ensure!(!inputs.daily.is_empty(), "no daily candles for {}", symbol);

    let price = inputs.ticker.last_price;
    ensure!(price.is_finite(), "non-finite last price for {}", symbol);

    let closes = inputs.hourly.closes();
    let highs = inputs.hourly.highs();
    let lows = inputs.hourly.lows();

    let atr = indicator::atr(&highs, &lows, &closes, ATR_PERIOD);
    let bollinger = indicator::bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_WIDTH);

    let closes_4h = inputs.four_hour.closes();
    let trend_avg = indicator::sma(&closes_4h, TREND_SMA_PERIOD);
    let last_4h = closes_4h[closes_4h.len() - 1];

    let daily = &inputs.daily;
    let prev_day = if daily.len() >= 2 {
        &daily[daily.len() - 2]
    } else {
        &daily[0]
    };
    let pivot_points =
        indicator::resolve_pivots(prev_day.high, prev_day.low, prev_day.close, price, atr);

    Ok(TechnicalSnapshot {
        symbol: symbol.to_string(),
        price,
        price_change_percent: inputs.ticker.price_change_percent,
        high_24h: inputs.ticker.high_price,
        low_24h: inputs.ticker.low_price,
        volume: inputs.ticker.quote_volume,
        rsi: indicator::rsi(&closes, RSI_PERIOD),
        stoch_rsi: indicator::stoch_rsi(&closes, RSI_PERIOD),
        sma20: indicator::sma(&closes, 20),
        sma50: indicator::sma(&closes, 50),
        sma200: indicator::sma(&closes, 200),
        atr,
        adx: indicator::adx(&highs, &lows, &closes, ADX_PERIOD),
        cci: indicator::cci(&highs, &lows, &closes, CCI_PERIOD),
        williams_r: indicator::williams_r(&highs, &lows, &closes, WILLIAMS_PERIOD),
        momentum: indicator::momentum(&closes, MOMENTUM_PERIOD),
        macd: indicator::macd(&closes),
        bollinger,
        pivot_points,
        global_sentiment: sentiment::compose(
            inputs.fear_greed,
            inputs.reference.price_change_percent,
        ),
        trend_4h: Trend::from_close_vs_average(last_4h, trend_avg),
        is_simulation: false,
    })
}

pub struct SnapshotBuilder<T: Transport = HttpTransport> {
    client: BinanceRestClient<T>,
    snapshot: SnapshotConfig,
    sentiment: SentimentConfig,
}

impl SnapshotBuilder<HttpTransport> {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            BinanceRestClient::from_config(&config.exchange)?,
            config.snapshot.clone(),
            config.sentiment.clone(),
        ))
    }
}

impl<T: Transport> SnapshotBuilder<T> {
    pub fn new(
        client: BinanceRestClient<T>,
        snapshot: SnapshotConfig,
        sentiment: SentimentConfig,
    ) -> Self {
        Self {
            client,
            snapshot,
            sentiment,
        }
    }

    /// Never fails: any fetch or compute error yields
    /// [`TechnicalSnapshot::simulated`] with `is_simulation = true`.
    pub async fn build(&self, raw_symbol: &str) -> TechnicalSnapshot {
        let symbol = normalize_symbol(raw_symbol);
        let span = tracing::info_span!("snapshot", request_id = %Uuid::new_v4(), symbol = %symbol);

        async {
            let result = self
                .fetch_inputs(&symbol)
                .await
                .and_then(|inputs| compute_snapshot(&symbol, &inputs));
            match result {
                Ok(snapshot) => {
                    tracing::info!(
                        price = snapshot.price,
                        rsi = snapshot.rsi,
                        trend = %snapshot.trend_4h,
                        pivots_valid = snapshot.pivot_points.is_valid,
                        "Snapshot built"
                    );
                    snapshot
                }
                Err(e) => {
                    tracing::warn!(
                        error = %format!("{:#}", e),
                        "Snapshot build failed, returning simulation"
                    );
                    TechnicalSnapshot::simulated(&symbol)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Fetch all inputs concurrently; the first error aborts the rest.
    pub async fn fetch_inputs(&self, symbol: &str) -> Result<MarketInputs> {
        let cfg = &self.snapshot;
        let sentiment_feed = async {
            Ok::<f64, anyhow::Error>(
                sentiment::fetch_fear_greed(self.client.fetcher(), &self.sentiment.feed_url).await,
            )
        };

        let (ticker, hourly, four_hour, daily, fear_greed, reference) = tokio::try_join!(
            self.client.ticker_24hr(symbol),
            self.client
                .klines(symbol, KlineInterval::OneHour, cfg.hourly_limit),
            self.client
                .klines(symbol, KlineInterval::FourHours, cfg.four_hour_limit),
            self.client
                .klines(symbol, KlineInterval::OneDay, cfg.daily_limit),
            sentiment_feed,
            self.client.ticker_24hr(&cfg.reference_symbol),
        )?;

        Ok(MarketInputs {
            ticker,
            hourly,
            four_hour,
            daily,
            fear_greed,
            reference,
        })
    }
}
