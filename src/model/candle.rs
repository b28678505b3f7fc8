use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub open_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Decode one Binance kline row `[openTime, open, high, low, close, volume, ...]`.
    pub fn from_kline_row(row: &Value) -> Result<Self, AppError> {
        let fields = row
            .as_array()
            .ok_or_else(|| AppError::MalformedPayload("kline row is not an array".to_string()))?;
        if fields.len() < 6 {
            return Err(AppError::MalformedPayload(format!(
                "kline row has {} fields, expected at least 6",
                fields.len()
            )));
        }
        let open_time = fields[0].as_u64().ok_or_else(|| {
            AppError::MalformedPayload(format!("kline open time is not an integer: {}", fields[0]))
        })?;
        Ok(Self {
            open_time,
            open: numeric_field(&fields[1], "open")?,
            high: numeric_field(&fields[2], "high")?,
            low: numeric_field(&fields[3], "low")?,
            close: numeric_field(&fields[4], "close")?,
            volume: numeric_field(&fields[5], "volume")?,
        })
    }
}

fn numeric_field(v: &Value, name: &str) -> Result<f64, AppError> {
    let parsed = match v {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        AppError::MalformedPayload(format!("kline {} is not numeric: {}", name, v))
    })
}

/// Column views over an oldest-first candle window.
pub trait CandleSeries {
    fn closes(&self) -> Vec<f64>;
    fn highs(&self) -> Vec<f64>;
    fn lows(&self) -> Vec<f64>;
}

impl CandleSeries for [Candle] {
    fn closes(&self) -> Vec<f64> {
        self.iter().map(|c| c.close).collect()
    }

    fn highs(&self) -> Vec<f64> {
        self.iter().map(|c| c.high).collect()
    }

    fn lows(&self) -> Vec<f64> {
        self.iter().map(|c| c.low).collect()
    }
}
