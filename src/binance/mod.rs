pub mod fetcher;
pub mod rest;
pub mod types;

pub use fetcher::{HttpTransport, ResilientFetcher, Transport};
pub use rest::{BinanceRestClient, KlineInterval};
