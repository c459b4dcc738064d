//! Engine configuration.
//!
//! A single explicit value passed into every entry point. Keys are camelCase
//! on the wire; every field has a visible default through [`Default`], so a
//! partial JSON document only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Top-level configuration for one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Fraction of capital that may be lost on one trade (0.10 = 10%)
    pub max_capital_per_trade_pct: f64,
    /// POP floor below which no recommendation is returned
    pub min_probability_of_profit: f64,
    /// Advisory cap on concurrent positions, enforced by the caller
    pub max_positions: u32,
    /// When the best eligible candidate cannot be sized, try lower-ranked ones
    pub fallback_to_affordable: bool,
    pub default_capital: f64,
    /// Annual continuously compounded rate
    pub risk_free_rate: f64,
    pub monte_carlo_paths: usize,
    /// `None` seeds every simulation from entropy
    pub monte_carlo_seed: Option<u64>,
    pub sma_short_period: usize,
    pub sma_long_period: usize,
    pub atr_period: usize,
    /// Number of returns used for historical volatility
    pub volatility_lookback: usize,
    /// Bars per year, used to annualize volatility (365 for daily crypto bars)
    pub periods_per_year: f64,
    /// Units of underlying per contract
    pub contract_multiplier: f64,
    pub regime: RegimeThresholds,
    pub strikes: StrikeRule,
    pub expiries: TemplateExpiries,
    pub scoring: ScoringWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_capital_per_trade_pct: 0.10,
            min_probability_of_profit: 0.55,
            max_positions: 3,
            fallback_to_affordable: false,
            default_capital: 5_000.0,
            risk_free_rate: 0.05,
            monte_carlo_paths: 20_000,
            monte_carlo_seed: Some(42),
            sma_short_period: 20,
            sma_long_period: 50,
            atr_period: 14,
            volatility_lookback: 30,
            periods_per_year: 365.0,
            contract_multiplier: 0.01,
            regime: RegimeThresholds::default(),
            strikes: StrikeRule::default(),
            expiries: TemplateExpiries::default(),
            scoring: ScoringWeights::default(),
        }
    }
}

/// Thresholds for the rule-based regime classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegimeThresholds {
    /// ATR as a percentage of the last close above which the market is HIGH_VOLATILITY
    pub high_volatility_atr_pct: f64,
    /// Short/long SMA separation, in percent of the long SMA, that marks a trend
    pub trend_threshold_pct: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            high_volatility_atr_pct: 5.0,
            trend_threshold_pct: 1.0,
        }
    }
}

/// Strike placement: `spot * exp(k * sigma * sqrt(T))`, rounded to `strike_increment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrikeRule {
    /// Short strikes of the iron condor
    pub short_sigma: f64,
    /// Protective wings of the iron condor; also bounds the straddle's max profit
    pub wing_sigma: f64,
    /// Width unit of vertical spreads and butterfly wings
    pub spread_sigma: f64,
    /// Listed strike grid; 0 disables rounding
    pub strike_increment: f64,
}

impl Default for StrikeRule {
    fn default() -> Self {
        Self {
            short_sigma: 1.5,
            wing_sigma: 2.5,
            spread_sigma: 1.0,
            strike_increment: 500.0,
        }
    }
}

/// Days to expiry per strategy template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateExpiries {
    pub iron_condor_days: u32,
    pub butterfly_days: u32,
    pub bull_call_spread_days: u32,
    pub bear_put_spread_days: u32,
    pub credit_spread_days: u32,
    pub long_straddle_days: u32,
}

impl Default for TemplateExpiries {
    fn default() -> Self {
        Self {
            iron_condor_days: 30,
            butterfly_days: 30,
            bull_call_spread_days: 21,
            bear_put_spread_days: 21,
            credit_spread_days: 30,
            long_straddle_days: 14,
        }
    }
}

/// Weights of the candidate score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringWeights {
    pub regime_fit: f64,
    pub probability: f64,
    pub reward_to_risk: f64,
    /// Added to premium sellers above `high_iv_threshold` and to the straddle below `low_iv_threshold`
    pub volatility_bonus: f64,
    pub high_iv_threshold: f64,
    pub low_iv_threshold: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            regime_fit: 0.5,
            probability: 0.3,
            reward_to_risk: 0.2,
            volatility_bonus: 0.05,
            high_iv_threshold: 0.6,
            low_iv_threshold: 0.5,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EngineError::invalid(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Longest window the regime detector and volatility estimator need.
    pub fn required_history(&self) -> usize {
        self.sma_long_period
            .max(self.sma_short_period)
            .max(self.atr_period + 1)
            .max(self.volatility_lookback + 1)
    }

    pub fn validate(&self) -> Result<()> {
        fn fraction(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(EngineError::invalid(format!("{name} must be in (0, 1], got {value}")))
            }
        }
        fn positive(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(EngineError::invalid(format!("{name} must be positive, got {value}")))
            }
        }
        fn non_negative(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(EngineError::invalid(format!("{name} must be non-negative, got {value}")))
            }
        }

        fraction("maxCapitalPerTradePct", self.max_capital_per_trade_pct)?;
        if !(0.0..=1.0).contains(&self.min_probability_of_profit) {
            return Err(EngineError::invalid(format!(
                "minProbabilityOfProfit must be in [0, 1], got {}",
                self.min_probability_of_profit
            )));
        }
        non_negative("defaultCapital", self.default_capital)?;
        if !self.risk_free_rate.is_finite() {
            return Err(EngineError::invalid("riskFreeRate must be finite"));
        }
        if self.monte_carlo_paths == 0 {
            return Err(EngineError::invalid("monteCarloPaths must be at least 1"));
        }
        if self.sma_short_period == 0 || self.atr_period == 0 || self.volatility_lookback < 2 {
            return Err(EngineError::invalid(
                "smaShortPeriod and atrPeriod must be >= 1, volatilityLookback >= 2",
            ));
        }
        if self.sma_short_period >= self.sma_long_period {
            return Err(EngineError::invalid(format!(
                "smaShortPeriod ({}) must be shorter than smaLongPeriod ({})",
                self.sma_short_period, self.sma_long_period
            )));
        }
        positive("periodsPerYear", self.periods_per_year)?;
        positive("contractMultiplier", self.contract_multiplier)?;

        positive("regime.highVolatilityAtrPct", self.regime.high_volatility_atr_pct)?;
        positive("regime.trendThresholdPct", self.regime.trend_threshold_pct)?;

        positive("strikes.shortSigma", self.strikes.short_sigma)?;
        positive("strikes.spreadSigma", self.strikes.spread_sigma)?;
        positive("strikes.wingSigma", self.strikes.wing_sigma)?;
        non_negative("strikes.strikeIncrement", self.strikes.strike_increment)?;
        if self.strikes.wing_sigma <= self.strikes.short_sigma {
            return Err(EngineError::invalid("strikes.wingSigma must exceed strikes.shortSigma"));
        }

        let e = &self.expiries;
        if [
            e.iron_condor_days,
            e.butterfly_days,
            e.bull_call_spread_days,
            e.bear_put_spread_days,
            e.credit_spread_days,
            e.long_straddle_days,
        ]
        .contains(&0)
        {
            return Err(EngineError::invalid("every template expiry must be at least one day"));
        }

        let s = &self.scoring;
        non_negative("scoring.regimeFit", s.regime_fit)?;
        non_negative("scoring.probability", s.probability)?;
        non_negative("scoring.rewardToRisk", s.reward_to_risk)?;
        non_negative("scoring.volatilityBonus", s.volatility_bonus)?;
        non_negative("scoring.highIvThreshold", s.high_iv_threshold)?;
        non_negative("scoring.lowIvThreshold", s.low_iv_threshold)?;
        Ok(())
    }
}
