//! Detects and repairs currency denomination shifts (e.g. dollars vs. cents)
//! in historical OHLCV price series stored as per-instrument CSV files.

pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
