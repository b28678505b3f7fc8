use super::ema::ema_last;
use crate::model::snapshot::MacdValues;

/// Damping applied to the MACD line to obtain the signal line.
///
/// Not the textbook 9-period EMA of the MACD line.
pub const SIGNAL_DAMPING: f64 = 0.9;

/// EMA12 - EMA26 of the closes, with `signal = line * 0.9`.
pub fn macd(closes: &[f64]) -> MacdValues {
    let fast = ema_last(closes, 12).unwrap_or(0.0);
    let slow = ema_last(closes, 26).unwrap_or(0.0);
    let value = fast - slow;
    let signal = value * SIGNAL_DAMPING;
    MacdValues {
        value,
        signal,
        histogram: value - signal,
    }
}
