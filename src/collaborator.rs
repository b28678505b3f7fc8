//! Boundary to the external reasoning service.
//!
//! The service decides trades from a [`TechnicalSnapshot`] and may annotate
//! scan results. Nothing here talks to a model; implementations live
//! outside this crate.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::scanner::{CoinAnnotation, ScannerCoin};
use crate::model::snapshot::TechnicalSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDecision {
    pub action: TradeAction,
    pub confidence: f64,
    pub reasoning: String,
    pub stop_loss: f64,
    pub take_profit: f64,
    #[serde(default)]
    pub risk_reward: String,
}

#[async_trait]
pub trait DecisionProvider: Send + Sync {
    async fn decide(&self, symbol: &str, snapshot: &TechnicalSnapshot) -> Result<TradeDecision>;
}

#[async_trait]
pub trait ScanAnnotator: Send + Sync {
    async fn annotate(&self, candidates: &[ScannerCoin]) -> Result<Vec<CoinAnnotation>>;
}

/// Force stop-loss and take-profit onto the correct side of the price with
/// at least a 1:2 reward, then derive the risk/reward label.
///
/// Volatility is the snapshot ATR, or 5% of price when ATR is zero.
pub fn guard_levels(mut decision: TradeDecision, snapshot: &TechnicalSnapshot) -> TradeDecision {
    let price = snapshot.price;
    let vol = if snapshot.atr != 0.0 {
        snapshot.atr
    } else {
        price * 0.05
    };

    match decision.action {
        TradeAction::Buy => {
            if decision.stop_loss >= price {
                decision.stop_loss = price - vol * 1.5;
            }
            let risk = price - decision.stop_loss;
            if decision.take_profit <= price + risk * 2.0 {
                decision.take_profit = price + risk * 2.5;
            }
        }
        TradeAction::Sell => {
            if decision.stop_loss <= price {
                decision.stop_loss = price + vol * 1.5;
            }
            let risk = decision.stop_loss - price;
            if decision.take_profit >= price - risk * 2.0 {
                decision.take_profit = price - risk * 2.5;
            }
        }
        TradeAction::Hold => {}
    }

    let risk = (price - decision.stop_loss).abs();
    let reward = (price - decision.take_profit).abs();
    decision.risk_reward = if risk > 0.0 {
        format!("1:{:.2}", reward / risk)
    } else {
        "N/A".to_string()
    };
    decision
}

/// Ask the provider for a decision and sanitise its levels.
pub async fn request_decision<P: DecisionProvider + ?Sized>(
    provider: &P,
    snapshot: &TechnicalSnapshot,
) -> Result<TradeDecision> {
    if snapshot.is_simulation {
        tracing::warn!(symbol = %snapshot.symbol, "Requesting decision on simulated snapshot");
    }
    let decision = provider.decide(&snapshot.symbol, snapshot).await?;
    Ok(guard_levels(decision, snapshot))
}

/// Merge annotations onto the first `limit` coins by symbol. Ranking and
/// order are left untouched; annotations for other symbols are ignored.
pub fn apply_annotations(
    mut coins: Vec<ScannerCoin>,
    annotations: &[CoinAnnotation],
    limit: usize,
) -> Vec<ScannerCoin> {
    for coin in coins.iter_mut().take(limit) {
        if let Some(note) = annotations.iter().find(|a| a.symbol == coin.symbol) {
            coin.ai_pick = Some(note.ai_pick);
            coin.ai_note = Some(note.ai_note.clone());
        }
    }
    coins
}

/// Annotate the top `limit` coins. On annotator failure the ranking is
/// returned as-is.
pub async fn annotate_scan<A: ScanAnnotator + ?Sized>(
    annotator: &A,
    coins: Vec<ScannerCoin>,
    limit: usize,
) -> Vec<ScannerCoin> {
    let top = &coins[..coins.len().min(limit)];
    if top.is_empty() {
        return coins;
    }
    let outcome = annotator.annotate(top).await;
    match outcome {
        Ok(annotations) => apply_annotations(coins, &annotations, limit),
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "Scan annotation failed, keeping ranking");
            coins
        }
    }
}
