pub mod binance;
pub mod collaborator;
pub mod config;
pub mod error;
pub mod indicator;
pub mod model;
pub mod scanner;
pub mod sentiment;
pub mod snapshot;
