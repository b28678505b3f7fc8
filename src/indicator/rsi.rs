pub const NEUTRAL_RSI: f64 = 50.0;

/// Wilder-smoothed RSI.
///
/// Averages are seeded from the first `period` deltas and then smoothed
/// recursively over the rest of the series. Returns 50 when fewer than
/// `period + 1` closes are available and 100 when the average loss is zero.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return NEUTRAL_RSI;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for w in closes[..=period].windows(2) {
        let change = w[1] - w[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses += change.abs();
        }
    }
    let p = period as f64;
    let mut avg_gain = gains / p;
    let mut avg_loss = losses / p;

    for w in closes[period..].windows(2) {
        let change = w[1] - w[0];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
    }

    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Stochastic RSI in [0, 1].
///
/// RSI is evaluated on `period` windows, each one close shorter than the
/// last (the full series first). The full-series RSI is then placed within
/// the min/max of those values; 0.5 when they are all equal.
pub fn stoch_rsi(closes: &[f64], period: usize) -> f64 {
    let rsi_series: Vec<f64> = (0..period.max(1))
        .map(|i| rsi(&closes[..closes.len().saturating_sub(i)], period))
        .collect();

    let current = rsi_series[0];
    let min = rsi_series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = rsi_series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return 0.5;
    }
    (current - min) / (max - min)
}
