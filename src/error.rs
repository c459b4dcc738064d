//! Error taxonomy for the decision engine.
//!
//! Every variant is a local, non-retryable outcome. The "no candidate clears
//! the POP floor" case is not an error: selection returns `Ok(None)`.

use thiserror::Error;

/// Errors surfaced by pricing, classification, selection and sizing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Non-positive volatility, non-positive time to expiry, malformed legs or config.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Price history shorter than the longest lookback window.
    #[error("insufficient history: need {required} bars, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// Implied-volatility solver exhausted its iteration budget or had no bracketed root.
    #[error("implied volatility did not converge after {iterations} iterations (residual {residual:.3e})")]
    NoConvergence { iterations: usize, residual: f64 },

    /// Not even one contract fits the per-trade risk budget.
    #[error("capital too small: risk budget {risk_budget:.2} < max loss per contract {max_loss_per_contract:.2}")]
    CapitalTooSmall {
        risk_budget: f64,
        max_loss_per_contract: f64,
    },
}

impl EngineError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
