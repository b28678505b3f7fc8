/// Exponential moving average over the whole series, seeded with the first
/// value (no SMA warm-up). Output has the same length as the input.
pub fn ema_series(series: &[f64], period: usize) -> Vec<f64> {
    let Some((&first, rest)) = series.split_first() else {
        return Vec::new();
    };
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    out.push(first);
    let mut prev = first;
    for &value in rest {
        prev = value * k + prev * (1.0 - k);
        out.push(prev);
    }
    out
}

/// Last value of [`ema_series`], or `None` for an empty series.
pub fn ema_last(series: &[f64], period: usize) -> Option<f64> {
    ema_series(series, period).last().copied()
}
