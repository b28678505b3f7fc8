//! Stateless indicator functions over oldest-first price series.
//!
//! Every function tolerates short input by returning a neutral value
//! instead of failing.

pub mod ema;
pub mod macd;
pub mod oscillator;
pub mod pivot;
pub mod rsi;
pub mod sma;
pub mod trend;
pub mod volatility;

pub use ema::{ema_last, ema_series};
pub use macd::macd;
pub use oscillator::{cci, williams_r};
pub use pivot::{atr_fallback_pivots, fib_pivot_points, resolve_pivots};
pub use rsi::{rsi, stoch_rsi};
pub use sma::{sma, std_dev};
pub use trend::{adx, momentum};
pub use volatility::{atr, bollinger, true_ranges};
