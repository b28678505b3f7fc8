use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Pattern markers attached by the opportunity scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoinTag {
    Whale,
    Squeeze,
    Rally,
    HftActive,
    QuantFlag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerCoin {
    pub symbol: String,
    pub price: f64,
    pub change_24h: f64,
    pub volume: f64,
    pub score: u8,
    pub tags: BTreeSet<CoinTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_pick: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_note: Option<String>,
}

/// Qualitative note returned by an external annotator for one symbol.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinAnnotation {
    pub symbol: String,
    pub ai_pick: bool,
    pub ai_note: String,
}
