use anyhow::Result;
use std::collections::BTreeSet;
use tracing::Instrument;
use uuid::Uuid;

use crate::binance::fetcher::{HttpTransport, Transport};
use crate::binance::rest::BinanceRestClient;
use crate::collaborator::{annotate_scan, ScanAnnotator};
use crate::config::{Config, ScannerConfig};
use crate::model::scanner::{CoinTag, ScannerCoin};
use crate::model::ticker::TickerStat;

const BASELINE_OFFSET: f64 = 15.0;
const BLOW_OFF_PENALTY: f64 = -20.0;

/// Per-factor breakdown of an opportunity score. A pure function of one
/// ticker's 24h statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityScore {
    pub vwap_deviation_pct: f64,
    pub trend: f64,
    pub whale: f64,
    pub structure: f64,
    pub momentum: f64,
    pub spread: f64,
    pub squeeze: f64,
    pub penalty: f64,
    pub score: u8,
    pub tags: BTreeSet<CoinTag>,
}

pub fn score_ticker(t: &TickerStat) -> OpportunityScore {
    let price = t.last_price;
    let change = t.price_change_percent;
    let range = t.range();
    let clv = t.close_location();

    let vwap_deviation_pct = t.vwap_deviation_pct();
    let trend = (vwap_deviation_pct * 4.0).clamp(-25.0, 25.0);
    let whale = (t.avg_trade_size().log10() * 6.0).min(20.0);
    let structure = clv * 20.0;

    let efficiency = (t.open_price - price).abs() / if range == 0.0 { 1.0 } else { range };
    let momentum = efficiency * 15.0;

    let spread = match t.spread_ratio() {
        Some(ratio) if ratio < 0.0005 => 10.0,
        Some(ratio) if ratio < 0.001 => 5.0,
        _ => 0.0,
    };

    // Tight daily range with a modest positive drift: contraction before a breakout.
    let squeeze = if range / price < 0.02 && change > 0.5 && change < 3.0 {
        15.0
    } else {
        0.0
    };

    // Big pump that closed in the lower half of its range.
    let penalty = if clv < 0.5 && change > 10.0 {
        BLOW_OFF_PENALTY
    } else {
        0.0
    };

    let raw = trend + whale + structure + momentum + spread + squeeze + penalty + BASELINE_OFFSET;
    let score = if raw.is_nan() {
        1
    } else {
        raw.round().clamp(1.0, 99.0) as u8
    };

    let mut tags = BTreeSet::new();
    if whale > 15.0 {
        tags.insert(CoinTag::Whale);
    }
    if squeeze > 10.0 {
        tags.insert(CoinTag::Squeeze);
    }
    if vwap_deviation_pct > 4.0 {
        tags.insert(CoinTag::Rally);
    }
    if spread == 10.0 {
        tags.insert(CoinTag::HftActive);
    }
    if score > 85 {
        tags.insert(CoinTag::QuantFlag);
    }

    OpportunityScore {
        vwap_deviation_pct,
        trend,
        whale,
        structure,
        momentum,
        spread,
        squeeze,
        penalty,
        score,
        tags,
    }
}

/// USDT-quoted, not a stable/fiat pair, not a leveraged token, and above
/// the quote-volume floor.
pub fn is_eligible(t: &TickerStat, cfg: &ScannerConfig) -> bool {
    t.symbol.ends_with("USDT")
        && !cfg.excluded_symbols.iter().any(|s| s == &t.symbol)
        && !t.symbol.contains("UP")
        && !t.symbol.contains("DOWN")
        && t.quote_volume > cfg.min_quote_volume
}

/// Filter, score and rank a ticker universe. Ties keep input order.
pub fn rank_universe(tickers: &[TickerStat], cfg: &ScannerConfig) -> Vec<ScannerCoin> {
    let mut coins: Vec<ScannerCoin> = tickers
        .iter()
        .filter(|t| is_eligible(t, cfg))
        .filter(|t| t.price_change_percent.abs() > cfg.min_abs_change_pct)
        .map(|t| {
            let scored = score_ticker(t);
            ScannerCoin {
                symbol: t.symbol.clone(),
                price: t.last_price,
                change_24h: t.price_change_percent,
                volume: t.quote_volume,
                score: scored.score,
                tags: scored.tags,
                ai_pick: None,
                ai_note: None,
            }
        })
        .collect();

    coins.sort_by(|a, b| b.score.cmp(&a.score));
    coins.truncate(cfg.top_n);
    coins
}

pub struct OpportunityScanner<T: Transport = HttpTransport> {
    client: BinanceRestClient<T>,
    cfg: ScannerConfig,
}

impl OpportunityScanner<HttpTransport> {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            BinanceRestClient::from_config(&config.exchange)?,
            config.scanner.clone(),
        ))
    }
}

impl<T: Transport> OpportunityScanner<T> {
    pub fn new(client: BinanceRestClient<T>, cfg: ScannerConfig) -> Self {
        Self { client, cfg }
    }

    /// Never fails: a fetch error yields an empty list.
    pub async fn scan(&self) -> Vec<ScannerCoin> {
        let span = tracing::info_span!("scan", request_id = %Uuid::new_v4());
        async {
            match self.client.all_tickers().await {
                Ok(tickers) => {
                    let ranked = rank_universe(&tickers, &self.cfg);
                    tracing::info!(
                        universe = tickers.len(),
                        ranked = ranked.len(),
                        top = ranked.first().map(|c| c.symbol.as_str()).unwrap_or("-"),
                        "Scan complete"
                    );
                    ranked
                }
                Err(e) => {
                    tracing::warn!(
                        error = %format!("{:#}", e),
                        "Scan failed, returning empty list"
                    );
                    Vec::new()
                }
            }
        }
        .instrument(span)
        .await
    }

    /// [`scan`](Self::scan), then annotate the first `annotate_top` coins.
    pub async fn scan_annotated<A: ScanAnnotator + ?Sized>(
        &self,
        annotator: &A,
    ) -> Vec<ScannerCoin> {
        let ranked = self.scan().await;
        annotate_scan(annotator, ranked, self.cfg.annotate_top).await
    }
}
