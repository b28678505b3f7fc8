use crate::model::snapshot::PivotPoints;

const FIB_LEVELS: [f64; 3] = [0.382, 0.618, 1.0];
const ATR_LEVELS: [f64; 3] = [0.5, 1.0, 1.5];

/// Fibonacci pivot ladder from the previous period's high/low/close.
///
/// High and low are swapped if inverted. Supports are floored at zero. The
/// ladder is flagged invalid when the range is zero or NaN, or when the
/// current price sits above `r3 * 1.5` or below `s3 * 0.5`, which points at
/// a stale or erroneous reference candle.
pub fn fib_pivot_points(
    prev_high: f64,
    prev_low: f64,
    prev_close: f64,
    current_price: f64,
) -> PivotPoints {
    let (high, low) = if prev_low > prev_high {
        (prev_low, prev_high)
    } else {
        (prev_high, prev_low)
    };

    let pivot = (high + low + prev_close) / 3.0;
    let range = high - low;
    let [f1, f2, f3] = FIB_LEVELS;

    let r3 = pivot + f3 * range;
    let s3 = (pivot - f3 * range).max(0.0);

    let mut is_valid = range != 0.0 && !range.is_nan();
    if current_price > r3 * 1.5 || current_price < s3 * 0.5 {
        is_valid = false;
    }

    PivotPoints {
        pivot,
        r1: pivot + f1 * range,
        r2: pivot + f2 * range,
        r3,
        s1: (pivot - f1 * range).max(0.0),
        s2: (pivot - f2 * range).max(0.0),
        s3,
        is_valid,
    }
}

/// Volatility ladder around the previous close: `±{0.5, 1.0, 1.5} × ATR`.
/// Falls back to 2% of the current price when ATR is not positive. Always
/// carries `is_valid = false`.
pub fn atr_fallback_pivots(prev_close: f64, atr: f64, current_price: f64) -> PivotPoints {
    let step = if atr > 0.0 { atr } else { current_price * 0.02 };
    let [a1, a2, a3] = ATR_LEVELS;
    PivotPoints {
        pivot: prev_close,
        r1: prev_close + a1 * step,
        r2: prev_close + a2 * step,
        r3: prev_close + a3 * step,
        s1: prev_close - a1 * step,
        s2: prev_close - a2 * step,
        s3: prev_close - a3 * step,
        is_valid: false,
    }
}

/// Fibonacci ladder, replaced by the ATR ladder when it is unreliable.
pub fn resolve_pivots(
    prev_high: f64,
    prev_low: f64,
    prev_close: f64,
    current_price: f64,
    atr: f64,
) -> PivotPoints {
    let fib = fib_pivot_points(prev_high, prev_low, prev_close, current_price);
    if fib.is_valid && !fib.pivot.is_nan() {
        return fib;
    }
    tracing::info!(
        prev_high,
        prev_low,
        prev_close,
        current_price,
        atr,
        "Fibonacci pivots unreliable, using ATR ladder"
    );
    atr_fallback_pivots(prev_close, atr, current_price)
}
