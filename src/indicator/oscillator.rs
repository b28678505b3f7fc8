use super::sma::{sma, trailing};

/// Williams %R over the trailing window, in [-100, 0]. Returns -50 on a flat
/// range or short input.
pub fn williams_r(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let (Some(hs), Some(ls), Some(&close)) =
        (trailing(highs, period), trailing(lows, period), closes.last())
    else {
        return -50.0;
    };
    let highest = hs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = ls.iter().copied().fold(f64::INFINITY, f64::min);
    if highest == lowest {
        return -50.0;
    }
    (highest - close) / (highest - lowest) * -100.0
}

/// Commodity channel index on typical price `(h + l + c) / 3`.
/// Returns 0 on short input or zero mean deviation.
pub fn cci(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let n = highs.len().min(lows.len()).min(closes.len());
    if period == 0 || n < period {
        return 0.0;
    }
    let typical: Vec<f64> = (0..n)
        .map(|i| (highs[i] + lows[i] + closes[i]) / 3.0)
        .collect();

    let current = typical[n - 1];
    let mean = sma(&typical, period);
    let mean_dev = typical[n - period..]
        .iter()
        .map(|tp| (tp - mean).abs())
        .sum::<f64>()
        / period as f64;
    if mean_dev == 0.0 {
        return 0.0;
    }
    (current - mean) / (0.015 * mean_dev)
}
