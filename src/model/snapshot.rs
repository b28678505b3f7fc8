use serde::Serialize;
use std::fmt;

/// Direction of the 4h close relative to its 10-period SMA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_close_vs_average(close: f64, average: f64) -> Self {
        if close > average {
            Self::Up
        } else if close < average {
            Self::Down
        } else {
            Self::Flat
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Flat => "FLAT",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentClass {
    #[serde(rename = "Extreme Greed")]
    ExtremeGreed,
    Greed,
    Neutral,
    Fear,
    #[serde(rename = "Extreme Fear")]
    ExtremeFear,
}

impl SentimentClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtremeGreed => "Extreme Greed",
            Self::Greed => "Greed",
            Self::Neutral => "Neutral",
            Self::Fear => "Fear",
            Self::ExtremeFear => "Extreme Fear",
        }
    }
}

impl fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalSentiment {
    pub value: u8,
    pub classification: SentimentClass,
}

impl GlobalSentiment {
    pub fn neutral() -> Self {
        Self {
            value: 50,
            classification: SentimentClass::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdValues {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Support/resistance ladder. `is_valid == false` means the levels are a
/// volatility fallback and should be shown with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotPoints {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
    pub is_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSnapshot {
    pub symbol: String,
    pub price: f64,
    pub price_change_percent: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub volume: f64,
    pub rsi: f64,
    pub stoch_rsi: f64,
    pub sma20: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub atr: f64,
    pub adx: f64,
    pub cci: f64,
    pub williams_r: f64,
    pub momentum: f64,
    pub macd: MacdValues,
    pub bollinger: BollingerBands,
    pub pivot_points: PivotPoints,
    pub global_sentiment: GlobalSentiment,
    pub trend_4h: Trend,
    pub is_simulation: bool,
}

impl TechnicalSnapshot {
    pub const SIMULATED_PRICE: f64 = 100.0;

    /// Fixed placeholder returned when live data could not be assembled.
    /// Every numeric field is a constant; none is derived from market data.
    pub fn simulated(symbol: &str) -> Self {
        let p = Self::SIMULATED_PRICE;
        Self {
            symbol: symbol.to_string(),
            price: p,
            price_change_percent: 0.0,
            high_24h: p * 1.1,
            low_24h: p * 0.9,
            volume: 1_000_000.0,
            rsi: 50.0,
            stoch_rsi: 0.5,
            sma20: p,
            sma50: p,
            sma200: p,
            atr: 2.0,
            adx: 25.0,
            cci: 0.0,
            williams_r: -50.0,
            momentum: 0.0,
            macd: MacdValues {
                value: 0.0,
                signal: 0.0,
                histogram: 0.0,
            },
            bollinger: BollingerBands {
                upper: 110.0,
                middle: 100.0,
                lower: 90.0,
            },
            pivot_points: PivotPoints {
                pivot: 100.0,
                r1: 110.0,
                r2: 120.0,
                r3: 130.0,
                s1: 90.0,
                s2: 80.0,
                s3: 70.0,
                is_valid: true,
            },
            global_sentiment: GlobalSentiment::neutral(),
            trend_4h: Trend::Flat,
            is_simulation: true,
        }
    }
}
