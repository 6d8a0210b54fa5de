//! Options strategy analytics: Black-Scholes pricing and Greeks, implied
//! volatility, expiration payoff curves, breakevens, risk metrics and
//! position sizing, plus the dashboard backend that serves them.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod feeds;
pub mod models;
pub mod risk;
pub mod server;
pub mod state;
pub mod strategy;

pub use analysis::{analyze, analyze_with, AnalysisOptions, AnalysisReport};
pub use errors::{EngineError, EngineResult};
