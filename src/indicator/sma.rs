/// Trailing `period`-element window, or `None` when the series is too short.
pub(crate) fn trailing(series: &[f64], period: usize) -> Option<&[f64]> {
    if period == 0 || series.len() < period {
        None
    } else {
        Some(&series[series.len() - period..])
    }
}

/// Simple moving average of the last `period` values; 0 when there are fewer.
pub fn sma(series: &[f64], period: usize) -> f64 {
    match trailing(series, period) {
        Some(window) => window.iter().sum::<f64>() / period as f64,
        None => 0.0,
    }
}

/// Population standard deviation of the last `period` values around their
/// own SMA; 0 when there are fewer.
pub fn std_dev(series: &[f64], period: usize) -> f64 {
    let Some(window) = trailing(series, period) else {
        return 0.0;
    };
    let mean = sma(series, period);
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
    variance.sqrt()
}
