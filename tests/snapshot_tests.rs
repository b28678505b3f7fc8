use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use ta_scout::binance::{BinanceRestClient, ResilientFetcher, Transport};
use ta_scout::config::{ExchangeConfig, SentimentConfig, SnapshotConfig};
use ta_scout::model::{Candle, SentimentClass, TechnicalSnapshot, TickerStat, Trend};
use ta_scout::snapshot::{compute_snapshot, normalize_symbol, MarketInputs, SnapshotBuilder};

fn kline_rows(closes: &[f64]) -> Value {
    let rows: Vec<Value> = closes
        .iter()
        .enumerate()
        .map(|(i, c)| {
            json!([
                1_700_000_000_000u64 + i as u64 * 3_600_000,
                format!("{}", c - 0.02),
                format!("{}", c + 0.5),
                format!("{}", c - 0.5),
                format!("{}", c),
                "12.5",
                1_700_000_000_000u64 + (i as u64 + 1) * 3_600_000 - 1,
                "1250.0",
                42,
                "6.0",
                "600.0",
                "0"
            ])
        })
        .collect();
    Value::Array(rows)
}

fn ticker_body(symbol: &str, last: f64, change_pct: f64) -> Value {
    json!({
        "symbol": symbol,
        "lastPrice": format!("{}", last),
        "openPrice": format!("{}", last / (1.0 + change_pct / 100.0)),
        "highPrice": format!("{}", last * 1.03),
        "lowPrice": format!("{}", last * 0.95),
        "weightedAvgPrice": format!("{}", last),
        "priceChangePercent": format!("{}", change_pct),
        "quoteVolume": "250000000.0",
        "bidPrice": format!("{}", last - 0.01),
        "askPrice": format!("{}", last + 0.01),
        "count": 500000
    })
}

/// Answers by URL substring; any URL containing a `broken` marker fails.
struct MarketStub {
    hourly: Value,
    four_hour: Value,
    daily: Value,
    broken: Vec<&'static str>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl MarketStub {
    fn healthy() -> Self {
        let hourly: Vec<f64> = (0..300).map(|i| 90.0 + 0.05 * i as f64).collect();
        let four_hour: Vec<f64> = (1..=50).map(|i| i as f64).collect();
        let daily = json!([
            [1_700_000_000_000u64, "95", "105", "85", "96", "1000"],
            [1_700_086_400_000u64, "96", "106", "86", "97", "1000"],
            [1_700_172_800_000u64, "97", "107", "87", "98", "1000"],
            [1_700_259_200_000u64, "98", "110", "90", "100", "1000"],
            [1_700_345_600_000u64, "100", "106", "99", "105", "400"]
        ]);
        Self {
            hourly: kline_rows(&hourly),
            four_hour: kline_rows(&four_hour),
            daily,
            broken: Vec::new(),
            latency: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn breaking(mut self, marker: &'static str) -> Self {
        self.broken.push(marker);
        self
    }
}

#[async_trait]
impl Transport for MarketStub {
    async fn get_json(&self, url: &str) -> Result<Value> {
        self.calls.lock().unwrap().push(url.to_string());
        if !self.latency.is_zero() {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        self.respond(url)
    }
}

impl MarketStub {
    fn respond(&self, url: &str) -> Result<Value> {
        if self.broken.iter().any(|m| url.contains(m)) {
            return Err(anyhow!("HTTP 502 Bad Gateway"));
        }
        if url.contains("fng.test") {
            return Ok(json!({"data": [{"value": "80", "value_classification": "Extreme Greed"}]}));
        }
        if url.contains("/ticker/24hr") {
            if url.contains("symbol=BTCUSDT") {
                return Ok(ticker_body("BTCUSDT", 60_000.0, 2.0));
            }
            if url.contains("symbol=ETHUSDT") {
                return Ok(ticker_body("ETHUSDT", 105.0, 3.2));
            }
            return Err(anyhow!("HTTP 400 unknown symbol"));
        }
        if url.contains("/klines") {
            if url.contains("interval=1h") {
                return Ok(self.hourly.clone());
            }
            if url.contains("interval=4h") {
                return Ok(self.four_hour.clone());
            }
            if url.contains("interval=1d") {
                return Ok(self.daily.clone());
            }
        }
        Err(anyhow!("HTTP 404 no route for {}", url))
    }
}

fn builder(stub: Arc<MarketStub>) -> SnapshotBuilder<Arc<MarketStub>> {
    let exchange = ExchangeConfig {
        mirror_base_url: "http://mirror.test/api/v3".to_string(),
        rest_base_url: "http://origin.test/api/v3".to_string(),
        relay_prefix: "http://relay.test/?".to_string(),
        request_timeout_ms: 1_000,
    };
    let sentiment = SentimentConfig {
        feed_url: "http://fng.test/fng/".to_string(),
    };
    SnapshotBuilder::new(
        BinanceRestClient::new(ResilientFetcher::new(stub, exchange)),
        SnapshotConfig::default(),
        sentiment,
    )
}

#[test]
fn normalize_symbol_quotes_in_usdt_unless_already_quoted() {
    assert_eq!(normalize_symbol("btc"), "BTCUSDT");
    assert_eq!(normalize_symbol("eth-usdt"), "ETHUSDT");
    assert_eq!(normalize_symbol(" sol/usdt "), "SOLUSDT");
    assert_eq!(normalize_symbol("ethbtc"), "ETHBTC");
    assert_eq!(normalize_symbol("LINK_ETH"), "LINKETH");
}

#[tokio::test]
async fn live_snapshot_from_healthy_feeds() {
    let stub = Arc::new(MarketStub::healthy());
    let snap = builder(stub.clone()).build("eth").await;

    assert!(!snap.is_simulation);
    assert_eq!(snap.symbol, "ETHUSDT");
    assert!((snap.price - 105.0).abs() < 1e-9);
    assert!((snap.price_change_percent - 3.2).abs() < 1e-9);

    // strictly rising hourly closes
    assert!((snap.rsi - 100.0).abs() < 1e-9);
    let expected_sma20 = 90.0 + 0.05 * 289.5;
    assert!((snap.sma20 - expected_sma20).abs() < 1e-9);
    assert!(snap.atr > 0.0);
    assert!(snap.macd.value > 0.0);
    assert!((snap.macd.signal - snap.macd.value * 0.9).abs() < 1e-9);

    assert_eq!(snap.trend_4h, Trend::Up);

    // previous completed day: H 110, L 90, C 100
    assert!(snap.pivot_points.is_valid);
    assert!((snap.pivot_points.pivot - 100.0).abs() < 1e-9);
    assert!((snap.pivot_points.r1 - 107.64).abs() < 1e-9);
    assert!((snap.pivot_points.s3 - 80.0).abs() < 1e-9);

    // fear/greed 80, BTC +2% -> momentum 70 -> 75
    assert_eq!(snap.global_sentiment.value, 75);
    assert_eq!(
        snap.global_sentiment.classification,
        SentimentClass::ExtremeGreed
    );

    let calls = stub.calls.lock().unwrap().clone();
    assert!(calls.iter().any(|u| u.contains("symbol=BTCUSDT")));
    assert!(calls.iter().any(|u| u.contains("fng.test/fng/?t=")));
    // the mirror answered every market request
    assert!(!calls.iter().any(|u| u.starts_with("http://origin.test")));
}

#[tokio::test]
async fn mirror_outage_is_invisible_to_callers() {
    let stub = Arc::new(MarketStub::healthy().breaking("mirror.test"));
    let snap = builder(stub.clone()).build("ETHUSDT").await;
    assert!(!snap.is_simulation);
    assert!((snap.price - 105.0).abs() < 1e-9);
}

#[tokio::test]
async fn single_failed_series_falls_back_to_simulation() {
    let stub = Arc::new(MarketStub::healthy().breaking("interval=4h"));
    let snap = builder(stub).build("eth").await;

    assert!(snap.is_simulation);
    assert_eq!(snap.trend_4h, Trend::Flat);
    assert_eq!(snap, TechnicalSnapshot::simulated("ETHUSDT"));
}

#[tokio::test]
async fn total_outage_yields_exact_simulation() {
    let stub = Arc::new(
        MarketStub::healthy()
            .breaking("mirror.test")
            .breaking("origin.test")
            .breaking("relay.test")
            .breaking("fng.test"),
    );
    let snap = builder(stub).build("eth").await;
    assert_eq!(snap, TechnicalSnapshot::simulated("ETHUSDT"));
    assert!((snap.price - 100.0).abs() < 1e-9);
    assert!((snap.rsi - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn market_inputs_are_fetched_concurrently() {
    let latency = Duration::from_millis(200);
    let stub = Arc::new(MarketStub::healthy().with_latency(latency));
    let started = Instant::now();
    let snap = builder(stub.clone()).build("eth").await;
    let elapsed = started.elapsed();

    assert!(!snap.is_simulation);
    assert_eq!(stub.calls.lock().unwrap().len(), 6);
    assert_eq!(stub.peak_in_flight.load(Ordering::SeqCst), 6);
    // six sequential calls would take at least 1.2 s
    assert!(elapsed < latency * 3, "took {:?}", elapsed);
}

#[tokio::test]
async fn unknown_symbol_yields_simulation() {
    let stub = Arc::new(MarketStub::healthy());
    let snap = builder(stub).build("doge").await;
    assert!(snap.is_simulation);
    assert_eq!(snap.symbol, "DOGEUSDT");
}

#[tokio::test]
async fn sentiment_outage_degrades_to_neutral_feed_only() {
    let stub = Arc::new(MarketStub::healthy().breaking("fng.test"));
    let snap = builder(stub).build("eth").await;

    assert!(!snap.is_simulation);
    // 0.5 * 50 + 0.5 * 70
    assert_eq!(snap.global_sentiment.value, 60);
    assert_eq!(snap.global_sentiment.classification, SentimentClass::Greed);
}

#[tokio::test]
async fn empty_daily_series_yields_simulation() {
    let mut stub = MarketStub::healthy();
    stub.daily = json!([]);
    let snap = builder(Arc::new(stub)).build("eth").await;
    assert!(snap.is_simulation);
}

fn candle(high: f64, low: f64, close: f64) -> Candle {
    Candle {
        open_time: 0,
        open: close,
        high,
        low,
        close,
        volume: 1.0,
    }
}

fn ticker(symbol: &str, last: f64, change_pct: f64) -> TickerStat {
    serde_json::from_value(ticker_body(symbol, last, change_pct)).unwrap()
}

fn inputs(daily: Vec<Candle>, four_hour_closes: &[f64], price: f64) -> MarketInputs {
    MarketInputs {
        ticker: ticker("ETHUSDT", price, 0.0),
        hourly: (0..60)
            .map(|i| {
                let c = 100.0 + if i % 2 == 0 { 1.0 } else { -1.0 };
                candle(c + 1.0, c - 1.0, c)
            })
            .collect(),
        four_hour: four_hour_closes
            .iter()
            .map(|c| candle(c + 1.0, c - 1.0, *c))
            .collect(),
        daily,
        fear_greed: 50.0,
        reference: ticker("BTCUSDT", 60_000.0, 0.0),
    }
}

#[test]
fn single_daily_candle_serves_as_previous_day() {
    let inp = inputs(vec![candle(110.0, 90.0, 100.0)], &[100.0; 20], 101.0);
    let snap = compute_snapshot("ETHUSDT", &inp).unwrap();
    assert!(snap.pivot_points.is_valid);
    assert!((snap.pivot_points.pivot - 100.0).abs() < 1e-9);
}

#[test]
fn falling_four_hour_closes_trend_down() {
    let falling: Vec<f64> = (0..20).map(|i| 200.0 - i as f64).collect();
    let inp = inputs(vec![candle(110.0, 90.0, 100.0)], &falling, 101.0);
    let snap = compute_snapshot("ETHUSDT", &inp).unwrap();
    assert_eq!(snap.trend_4h, Trend::Down);

    let flat = inputs(vec![candle(110.0, 90.0, 100.0)], &[100.0; 20], 101.0);
    assert_eq!(
        compute_snapshot("ETHUSDT", &flat).unwrap().trend_4h,
        Trend::Flat
    );
}

#[test]
fn flat_previous_day_switches_to_atr_ladder() {
    let daily = vec![candle(100.0, 100.0, 100.0), candle(102.0, 99.0, 101.0)];
    let inp = inputs(daily, &[100.0; 20], 101.0);
    let snap = compute_snapshot("ETHUSDT", &inp).unwrap();

    assert!(!snap.pivot_points.is_valid);
    assert!((snap.pivot_points.pivot - 100.0).abs() < 1e-9);
    let step = snap.atr;
    assert!(step > 0.0);
    assert!((snap.pivot_points.r2 - (100.0 + step)).abs() < 1e-9);
    assert!((snap.pivot_points.s3 - (100.0 - 1.5 * step)).abs() < 1e-9);
}

#[test]
fn empty_hourly_series_is_an_error() {
    let mut inp = inputs(vec![candle(110.0, 90.0, 100.0)], &[100.0; 20], 101.0);
    inp.hourly.clear();
    assert!(compute_snapshot("ETHUSDT", &inp).is_err());
}
