//! quantcore: quantitative stock analysis and strategy backtesting.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], command surface in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
