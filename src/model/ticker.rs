use serde::{Deserialize, Serialize};

use crate::binance::types::{string_or_number_to_opt_f64, string_to_f64};

/// 24h rolling statistics for one symbol (GET /ticker/24hr).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerStat {
    pub symbol: String,
    #[serde(deserialize_with = "string_to_f64")]
    pub last_price: f64,
    #[serde(deserialize_with = "string_to_f64")]
    pub open_price: f64,
    #[serde(deserialize_with = "string_to_f64")]
    pub high_price: f64,
    #[serde(deserialize_with = "string_to_f64")]
    pub low_price: f64,
    #[serde(deserialize_with = "string_to_f64")]
    pub weighted_avg_price: f64,
    #[serde(deserialize_with = "string_to_f64")]
    pub price_change_percent: f64,
    #[serde(deserialize_with = "string_to_f64")]
    pub quote_volume: f64,
    #[serde(default, deserialize_with = "string_or_number_to_opt_f64")]
    pub bid_price: Option<f64>,
    #[serde(default, deserialize_with = "string_or_number_to_opt_f64")]
    pub ask_price: Option<f64>,
    #[serde(rename = "count", default)]
    pub trade_count: u64,
}

impl TickerStat {
    /// Percent distance of the last price from the 24h VWAP.
    pub fn vwap_deviation_pct(&self) -> f64 {
        (self.last_price - self.weighted_avg_price) / self.weighted_avg_price * 100.0
    }

    pub fn range(&self) -> f64 {
        self.high_price - self.low_price
    }

    /// Close-location value in [0, 1]; 0.5 when the range is flat.
    pub fn close_location(&self) -> f64 {
        let range = self.range();
        if range == 0.0 {
            0.5
        } else {
            (self.last_price - self.low_price) / range
        }
    }

    pub fn avg_trade_size(&self) -> f64 {
        // A zero count is reported for some delisted pairs.
        self.quote_volume / self.trade_count.max(1) as f64
    }

    /// Quoted spread relative to the last price. `None` when either side of
    /// the book is missing or non-positive.
    pub fn spread_ratio(&self) -> Option<f64> {
        match (self.bid_price, self.ask_price) {
            (Some(bid), Some(ask)) if bid > 0.0 && ask > 0.0 => {
                Some((ask - bid) / self.last_price)
            }
            _ => None,
        }
    }
}
