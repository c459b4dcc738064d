//! Streaming indicators over runtime-sized windows.
//!
//! Each indicator is fed one observation at a time and answers `None` until
//! its window is full.

use std::collections::VecDeque;

use crate::data::PriceBar;
use crate::probability::utils::mean_std;

/// Simple Moving Average over a sliding window
#[derive(Debug, Clone)]
pub struct Sma {
    window: VecDeque<f64>,
    period: usize,
}

impl Sma {
    #[inline]
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be positive");
        Self {
            window: VecDeque::with_capacity(period),
            period,
        }
    }

    /// Push a value, returns the average once `period` values have been seen.
    #[inline]
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        self.value()
    }

    /// Current average without updating
    #[inline]
    pub fn value(&self) -> Option<f64> {
        if self.window.len() == self.period {
            // Recompute from the window to keep long streams free of drift
            Some(self.window.iter().sum::<f64>() / self.period as f64)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.window.len() == self.period
    }

    #[inline]
    pub fn period(&self) -> usize {
        self.period
    }
}

/// ATR (Average True Range)
///
/// Simple mean of the last `period` true ranges. The first bar has no
/// previous close, so it only seeds the state and does not count.
#[derive(Debug, Clone)]
pub struct Atr {
    ranges: Sma,
    prev_close: Option<f64>,
}

impl Atr {
    /// Standard ATR(14)
    #[inline]
    pub fn standard() -> Self {
        Self::new(14)
    }

    #[inline]
    pub fn new(period: usize) -> Self {
        Self {
            ranges: Sma::new(period),
            prev_close: None,
        }
    }

    /// Update with a bar, returns the ATR once `period` true ranges are available.
    #[inline]
    pub fn update(&mut self, bar: &PriceBar) -> Option<f64> {
        let out = match self.prev_close {
            // True Range = max of:
            // 1. high - low
            // 2. |high - prev_close|
            // 3. |low - prev_close|
            Some(pc) => self.ranges.update(bar.true_range(Some(pc))),
            None => None,
        };
        self.prev_close = Some(bar.close);
        out
    }

    #[inline]
    pub fn value(&self) -> Option<f64> {
        self.ranges.value()
    }
}

impl Default for Atr {
    fn default() -> Self {
        Self::standard()
    }
}

/// Trend strength: |mean return| / std of returns over the last `window` simple returns.
///
/// Near 0 for a random walk, large for steady drifts. Returns `None` if fewer
/// than `window + 1` closes are available.
pub fn trend_strength(closes: &[f64], window: usize) -> Option<f64> {
    if window < 2 || closes.len() < window + 1 {
        return None;
    }
    let tail = &closes[closes.len() - window - 1..];
    let returns: Vec<f64> = tail.windows(2).map(|p| p[1] / p[0] - 1.0).collect();
    let (mean, std) = mean_std(&returns);
    Some(mean.abs() / (std + 1e-10))
}
