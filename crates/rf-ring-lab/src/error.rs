//! Error types for the ring game core

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::SpinId;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No ring symbols configured")]
    NoRings,

    #[error("Duplicate symbol id: {0}")]
    DuplicateSymbol(String),

    #[error("Ring {0} must have at least one segment")]
    NoSegments(String),

    #[error("Ring {symbol}: ladder has {actual} entries, expected {expected}")]
    LadderLength {
        symbol: String,
        expected: usize,
        actual: usize,
    },

    #[error("Ring {symbol}: multiplier {value} at segment {index} must be finite and >= 0")]
    InvalidMultiplier {
        symbol: String,
        index: usize,
        value: f64,
    },

    #[error("Ring {symbol}: multiplier at segment {index} is lower than the one before it")]
    DecreasingLadder { symbol: String, index: usize },

    #[error("Invalid multiplier label: {0}")]
    InvalidMultiplierLabel(String),

    #[error("Starting balance must be finite and >= 0, got {0}")]
    InvalidStartingBalance(f64),

    #[error("History limit must be at least 1")]
    InvalidHistoryLimit,

    #[error("Spin timeout must be at least 1 ms")]
    InvalidSpinTimeout,

    #[error("Timing {field} must be finite and within 0..=3600000 ms, got {value}")]
    InvalidTiming { field: &'static str, value: f64 },

    #[error("Reel has no symbol with a non-zero weight")]
    EmptyReel,

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a spin did not produce a landed symbol
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpinError {
    #[error("Spin timed out after {after_ms} ms")]
    TimedOut { after_ms: u64 },

    #[error("Spin source failed: {0}")]
    SourceFailed(String),

    #[error("Spin cancelled")]
    Cancelled,
}

/// Why a bet was refused
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BetRejected {
    #[error("Bet must be a positive finite amount, got {0}")]
    InvalidAmount(f64),

    #[error("Bet {amount} exceeds balance {balance}")]
    InsufficientBalance { amount: f64, balance: f64 },

    #[error("Spin {0} still in flight")]
    SpinInFlight(SpinId),
}

/// Why a cash-out was refused
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CashoutRejected {
    #[error("Cannot cash out while spin {0} is in flight")]
    SpinInFlight(SpinId),
}

/// Why a spin resolution was ignored
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("No spin in flight (got resolution for {0})")]
    NoSpinInFlight(SpinId),

    #[error("Stale resolution: spin {got} is not the in-flight spin {expected}")]
    StaleSpin { expected: SpinId, got: SpinId },
}

/// Errors surfaced when building a game
#[derive(Error, Debug)]
pub enum RingError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No tokio runtime available to drive spins")]
    NoRuntime,
}

/// Result type for ring game construction
pub type RingResult<T> = Result<T, RingError>;
