//! Rule-based market regime classification
//!
//! A deterministic classifier over threshold constants:
//!
//! 1. ATR as % of price above `high_volatility_atr_pct` → HIGH_VOLATILITY
//! 2. short SMA above long SMA by more than `trend_threshold_pct` → BULLISH_TREND
//! 3. short SMA below long SMA by more than `trend_threshold_pct` → BEARISH_TREND
//! 4. otherwise → RANGING
//!
//! First matching rule wins. Confidence grows with how far the deciding
//! metric sits past its threshold (or, for RANGING, inside the trend band).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{EngineConfig, RegimeThresholds};
use crate::data::PriceBar;
use crate::error::{EngineError, Result};
use crate::ta::{trend_strength, Atr, Sma};

/// Discrete market regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    Ranging,
    BullishTrend,
    BearishTrend,
    HighVolatility,
}

impl Regime {
    pub const ALL: [Regime; 4] = [
        Regime::Ranging,
        Regime::BullishTrend,
        Regime::BearishTrend,
        Regime::HighVolatility,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Regime::Ranging => "Ranging",
            Regime::BullishTrend => "Bullish Trend",
            Regime::BearishTrend => "Bearish Trend",
            Regime::HighVolatility => "High Volatility",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification result with the metrics that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeAssessment {
    pub regime: Regime,
    /// 0 to 100
    pub confidence: f64,
    pub current_price: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub atr: f64,
    /// ATR as a percentage of `current_price`
    pub atr_pct: f64,
    /// (sma_short - sma_long) / sma_long, in percent
    pub trend_pct: f64,
    /// |mean return| / std over the short window (diagnostic only)
    pub trend_strength: f64,
}

impl RegimeAssessment {
    /// Coarse volatility label from ATR%, as shown to the operator.
    pub fn volatility_level(&self) -> &'static str {
        if self.atr_pct > 5.0 {
            "high"
        } else if self.atr_pct > 3.0 {
            "medium"
        } else {
            "low"
        }
    }
}

/// Confidence for a metric that exceeded `threshold`: 50 at the threshold, 100 at twice it.
#[inline]
pub fn exceedance_confidence(metric: f64, threshold: f64) -> f64 {
    (50.0 + 50.0 * (metric / threshold - 1.0)).clamp(0.0, 100.0)
}

/// Confidence for RANGING: 100 with flat averages, 50 at the edge of the trend band.
#[inline]
pub fn containment_confidence(trend_pct: f64, threshold: f64) -> f64 {
    (50.0 + 50.0 * (1.0 - trend_pct.abs() / threshold)).clamp(0.0, 100.0)
}

/// Stateless classifier; holds only its window lengths and thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeDetector {
    pub sma_short_period: usize,
    pub sma_long_period: usize,
    pub atr_period: usize,
    pub thresholds: RegimeThresholds,
}

impl Default for RegimeDetector {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl RegimeDetector {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            sma_short_period: config.sma_short_period,
            sma_long_period: config.sma_long_period,
            atr_period: config.atr_period,
            thresholds: config.regime.clone(),
        }
    }

    /// Bars needed before the first classification.
    pub fn required_history(&self) -> usize {
        self.sma_long_period
            .max(self.sma_short_period)
            .max(self.atr_period + 1)
    }

    /// Classify a chronological bar window.
    ///
    /// Fails with `InsufficientHistory` when the window is shorter than
    /// [`required_history`](Self::required_history); no partial result is produced.
    pub fn classify(&self, bars: &[PriceBar]) -> Result<RegimeAssessment> {
        if self.sma_short_period == 0 || self.atr_period == 0 || self.sma_short_period >= self.sma_long_period {
            return Err(EngineError::invalid("regime windows must satisfy 0 < short < long and atr > 0"));
        }
        let required = self.required_history();
        if bars.len() < required {
            return Err(EngineError::InsufficientHistory {
                required,
                available: bars.len(),
            });
        }

        let mut sma_short = Sma::new(self.sma_short_period);
        let mut sma_long = Sma::new(self.sma_long_period);
        let mut atr = Atr::new(self.atr_period);
        for bar in bars {
            sma_short.update(bar.close);
            sma_long.update(bar.close);
            atr.update(bar);
        }

        let insufficient = || EngineError::InsufficientHistory {
            required,
            available: bars.len(),
        };
        let sma_short = sma_short.value().ok_or_else(insufficient)?;
        let sma_long = sma_long.value().ok_or_else(insufficient)?;
        let atr = atr.value().ok_or_else(insufficient)?;

        let current_price = bars[bars.len() - 1].close;
        let atr_pct = atr / current_price * 100.0;
        let trend_pct = (sma_short - sma_long) / sma_long * 100.0;
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let strength = trend_strength(&closes, self.sma_short_period).unwrap_or(0.0);

        let t = &self.thresholds;
        let (regime, confidence) = if atr_pct > t.high_volatility_atr_pct {
            (Regime::HighVolatility, exceedance_confidence(atr_pct, t.high_volatility_atr_pct))
        } else if trend_pct > t.trend_threshold_pct {
            (Regime::BullishTrend, exceedance_confidence(trend_pct, t.trend_threshold_pct))
        } else if trend_pct < -t.trend_threshold_pct {
            (Regime::BearishTrend, exceedance_confidence(-trend_pct, t.trend_threshold_pct))
        } else {
            (Regime::Ranging, containment_confidence(trend_pct, t.trend_threshold_pct))
        };

        tracing::debug!(
            %regime,
            confidence,
            atr_pct,
            trend_pct,
            trend_strength = strength,
            "classified market regime"
        );

        Ok(RegimeAssessment {
            regime,
            confidence,
            current_price,
            sma_short,
            sma_long,
            atr,
            atr_pct,
            trend_pct,
            trend_strength: strength,
        })
    }
}
