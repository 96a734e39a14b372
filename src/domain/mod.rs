//! Core domain types and logic.

pub mod candle;
pub mod config_validation;
pub mod crossover;
pub mod detector;
pub mod error;
pub mod exit;
pub mod filter;
pub mod indicator;
pub mod instrument;
pub mod observer;
pub mod ohlcv;
pub mod run_config;
pub mod setup;
pub mod summary;
pub mod timeframe;
