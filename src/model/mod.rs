pub mod candle;
pub mod scanner;
pub mod snapshot;
pub mod ticker;

pub use candle::{Candle, CandleSeries};
pub use scanner::{CoinAnnotation, CoinTag, ScannerCoin};
pub use snapshot::{
    BollingerBands, GlobalSentiment, MacdValues, PivotPoints, SentimentClass, TechnicalSnapshot,
    Trend,
};
pub use ticker::TickerStat;
