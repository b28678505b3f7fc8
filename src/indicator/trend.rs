pub const NEUTRAL_ADX: f64 = 25.0;

/// Average directional index.
///
/// +DM, -DM and TR are Wilder-smoothed over the whole series (seeded with
/// the plain sum of the first `period` values); ADX is the mean of every DX
/// produced along the way. Returns 25 when fewer than `2 * period` bars are
/// available.
pub fn adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let n = highs.len().min(lows.len()).min(closes.len());
    if period == 0 || n < period * 2 {
        return NEUTRAL_ADX;
    }

    let mut trs = Vec::with_capacity(n - 1);
    let mut plus_dms = Vec::with_capacity(n - 1);
    let mut minus_dms = Vec::with_capacity(n - 1);
    for i in 1..n {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];
        let hl = highs[i] - lows[i];
        let hc = (highs[i] - closes[i - 1]).abs();
        let lc = (lows[i] - closes[i - 1]).abs();
        trs.push(hl.max(hc).max(lc));
        plus_dms.push(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        });
        minus_dms.push(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        });
    }

    let p = period as f64;
    let smooth = |prev: f64, curr: f64| prev * (p - 1.0) / p + curr / p;

    let mut tr_s: f64 = trs[..period].iter().sum();
    let mut plus_s: f64 = plus_dms[..period].iter().sum();
    let mut minus_s: f64 = minus_dms[..period].iter().sum();

    let mut dx_values = Vec::with_capacity(trs.len() - period);
    for i in period..trs.len() {
        tr_s = smooth(tr_s, trs[i]);
        plus_s = smooth(plus_s, plus_dms[i]);
        minus_s = smooth(minus_s, minus_dms[i]);
        if tr_s == 0.0 {
            dx_values.push(0.0);
            continue;
        }
        let plus_di = 100.0 * plus_s / tr_s;
        let minus_di = 100.0 * minus_s / tr_s;
        let di_sum = plus_di + minus_di;
        // No directional movement at all counts as zero trend strength.
        let dx = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };
        dx_values.push(dx);
    }

    if dx_values.is_empty() {
        NEUTRAL_ADX
    } else {
        dx_values.iter().sum::<f64>() / dx_values.len() as f64
    }
}

/// `close[last] - close[last - period]`; 0 when the series is too short.
pub fn momentum(closes: &[f64], period: usize) -> f64 {
    if closes.len() <= period {
        return 0.0;
    }
    let last = closes.len() - 1;
    closes[last] - closes[last - period]
}
