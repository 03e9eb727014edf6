//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod technical;
pub mod fundamental;
pub mod recommendation;
pub mod analysis;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod strategy;
pub mod catalog;
pub mod backtest;
pub mod optimizer;
pub mod metrics;
pub mod config_validation;
pub mod error;
