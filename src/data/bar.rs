//! Price history and the per-call market snapshot derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::probability::utils::mean_std;

/// One OHLCV candle. Sequences are chronological in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// True range against the previous close; plain high-low for the first bar.
    #[inline]
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let hl = self.high - self.low;
        match prev_close {
            Some(pc) => hl.max((self.high - pc).abs()).max((self.low - pc).abs()),
            None => hl,
        }
    }
}

/// Spot, annualized historical volatility and the time they refer to.
///
/// Rebuilt on every analysis call, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub spot: f64,
    pub volatility: f64,
    pub timestamp: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn new(spot: f64, volatility: f64, timestamp: DateTime<Utc>) -> Result<Self> {
        if !(spot.is_finite() && spot > 0.0) {
            return Err(EngineError::invalid(format!("spot must be positive, got {spot}")));
        }
        if !(volatility.is_finite() && volatility > 0.0) {
            return Err(EngineError::invalid(format!("volatility must be positive, got {volatility}")));
        }
        Ok(Self { spot, volatility, timestamp })
    }

    /// Snapshot from the tail of a bar window.
    ///
    /// Volatility is the sample standard deviation of the last `lookback` log
    /// returns, annualized by `sqrt(periods_per_year)`. `spot` defaults to the
    /// last close when the caller has no fresher quote.
    pub fn from_bars(
        bars: &[PriceBar],
        spot: Option<f64>,
        lookback: usize,
        periods_per_year: f64,
    ) -> Result<Self> {
        let volatility = historical_volatility(bars, lookback, periods_per_year)?;
        // historical_volatility guarantees at least two bars
        let last = bars[bars.len() - 1];
        Self::new(spot.unwrap_or(last.close), volatility, last.timestamp)
    }
}

/// Annualized close-to-close volatility over the last `lookback` returns.
pub fn historical_volatility(bars: &[PriceBar], lookback: usize, periods_per_year: f64) -> Result<f64> {
    if lookback < 2 {
        return Err(EngineError::invalid(format!("volatility lookback must be >= 2, got {lookback}")));
    }
    let required = lookback + 1;
    if bars.len() < required {
        return Err(EngineError::InsufficientHistory {
            required,
            available: bars.len(),
        });
    }

    let window = &bars[bars.len() - required..];
    let returns: Vec<f64> = window
        .windows(2)
        .map(|pair| (pair[1].close / pair[0].close).ln())
        .collect();
    let (_, std) = mean_std(&returns);
    Ok(std * periods_per_year.sqrt())
}
