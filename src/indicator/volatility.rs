use super::sma::{sma, std_dev, trailing};
use crate::model::snapshot::BollingerBands;

/// True range for every bar after the first:
/// `max(high - low, |high - prev_close|, |low - prev_close|)`.
pub fn true_ranges(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let n = highs.len().min(lows.len()).min(closes.len());
    (1..n)
        .map(|i| {
            let hl = highs[i] - lows[i];
            let hc = (highs[i] - closes[i - 1]).abs();
            let lc = (lows[i] - closes[i - 1]).abs();
            hl.max(hc).max(lc)
        })
        .collect()
}

/// Mean of the last `period` true ranges; 0 when fewer are available.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let trs = true_ranges(highs, lows, closes);
    match trailing(&trs, period) {
        Some(window) => window.iter().sum::<f64>() / period as f64,
        None => 0.0,
    }
}

/// SMA(period) ± `width` standard deviations.
pub fn bollinger(closes: &[f64], period: usize, width: f64) -> BollingerBands {
    let middle = sma(closes, period);
    let dev = std_dev(closes, period);
    BollingerBands {
        upper: middle + width * dev,
        middle,
        lower: middle - width * dev,
    }
}
