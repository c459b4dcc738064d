//! One-call analysis: bars in, recommendation (or no trade) out.
//!
//! Every entry point is a pure function of its arguments. Nothing is cached
//! between calls, so independent analyses can run concurrently with
//! different capital or configuration.

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::data::{validate_bars, MarketSnapshot, PriceBar};
use crate::error::{EngineError, Result};
use crate::recommendation::Recommendation;
use crate::regime::{RegimeAssessment, RegimeDetector};
use crate::strategy::StrategySelector;

#[derive(Debug, Clone, Default)]
pub struct StrategyEngine {
    selector: StrategySelector,
}

impl StrategyEngine {
    pub fn new(selector: StrategySelector) -> Self {
        Self { selector }
    }

    /// Analyze with historical volatility from the bars, stamped with the current time.
    ///
    /// `spot` defaults to the last close.
    pub fn analyze(
        &self,
        bars: &[PriceBar],
        spot: Option<f64>,
        capital: f64,
        config: &EngineConfig,
    ) -> Result<Option<Recommendation>> {
        self.analyze_at(bars, spot, capital, config, Utc::now())
    }

    pub fn analyze_at(
        &self,
        bars: &[PriceBar],
        spot: Option<f64>,
        capital: f64,
        config: &EngineConfig,
        generated_at: DateTime<Utc>,
    ) -> Result<Option<Recommendation>> {
        config.validate()?;
        Self::check_history(bars, config.required_history())?;
        let snapshot =
            MarketSnapshot::from_bars(bars, spot, config.volatility_lookback, config.periods_per_year)?;
        self.run(bars, &snapshot, capital, config, generated_at)
    }

    /// Analyze with a caller-supplied volatility, e.g. an implied one,
    /// stamped with the current time.
    pub fn analyze_with_volatility(
        &self,
        bars: &[PriceBar],
        spot: Option<f64>,
        volatility: f64,
        capital: f64,
        config: &EngineConfig,
    ) -> Result<Option<Recommendation>> {
        self.analyze_with_volatility_at(bars, spot, volatility, capital, config, Utc::now())
    }

    /// Only the regime detector's history is required; `volatility_lookback`
    /// does not apply.
    pub fn analyze_with_volatility_at(
        &self,
        bars: &[PriceBar],
        spot: Option<f64>,
        volatility: f64,
        capital: f64,
        config: &EngineConfig,
        generated_at: DateTime<Utc>,
    ) -> Result<Option<Recommendation>> {
        config.validate()?;
        Self::check_history(bars, RegimeDetector::from_config(config).required_history())?;
        let last = bars
            .last()
            .ok_or(EngineError::InsufficientHistory { required: 1, available: 0 })?;
        let snapshot = MarketSnapshot::new(spot.unwrap_or(last.close), volatility, last.timestamp)?;
        self.run(bars, &snapshot, capital, config, generated_at)
    }

    /// Regime read only, without pricing anything.
    pub fn classify(&self, bars: &[PriceBar], config: &EngineConfig) -> Result<RegimeAssessment> {
        config.validate()?;
        validate_bars(bars)?;
        RegimeDetector::from_config(config).classify(bars)
    }

    fn check_history(bars: &[PriceBar], required: usize) -> Result<()> {
        if bars.len() < required {
            return Err(EngineError::InsufficientHistory {
                required,
                available: bars.len(),
            });
        }
        validate_bars(bars)
    }

    fn run(
        &self,
        bars: &[PriceBar],
        snapshot: &MarketSnapshot,
        capital: f64,
        config: &EngineConfig,
        generated_at: DateTime<Utc>,
    ) -> Result<Option<Recommendation>> {
        let assessment = RegimeDetector::from_config(config).classify(bars)?;
        tracing::info!(
            regime = %assessment.regime,
            confidence = assessment.confidence,
            spot = snapshot.spot,
            volatility = snapshot.volatility,
            capital,
            "analyzing market"
        );
        self.selector.select_at(
            assessment.regime,
            assessment.confidence,
            snapshot,
            capital,
            config,
            generated_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bars(n: usize) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let close = 50_000.0 * (1.0 + 0.03 * if i % 2 == 0 { 1.0 } else { -1.0 });
                PriceBar {
                    timestamp: start + Duration::days(i as i64),
                    open: close,
                    high: close * 1.005,
                    low: close * 0.995,
                    close,
                    volume: 10.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_short_history_is_rejected() {
        let result = StrategyEngine::default().analyze(&bars(20), None, 5_000.0, &EngineConfig::default());
        assert_eq!(
            result,
            Err(EngineError::InsufficientHistory { required: 50, available: 20 })
        );
    }

    #[test]
    fn test_analyze_is_reproducible() {
        let engine = StrategyEngine::default();
        let config = EngineConfig::default();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let history = bars(60);
        let a = engine.analyze_at(&history, None, 5_000.0, &config, at).unwrap();
        let b = engine.analyze_at(&history, None, 5_000.0, &config, at).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_supplied_volatility_skips_volatility_lookback() {
        let engine = StrategyEngine::default();
        let config = EngineConfig {
            volatility_lookback: 60,
            ..EngineConfig::default()
        };
        let history = bars(55);
        assert_eq!(
            engine.analyze(&history, None, 5_000.0, &config),
            Err(EngineError::InsufficientHistory { required: 61, available: 55 })
        );

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let a = engine
            .analyze_with_volatility_at(&history, None, 0.65, 5_000.0, &config, at)
            .unwrap();
        let b = engine
            .analyze_with_volatility_at(&history, None, 0.65, 5_000.0, &config, at)
            .unwrap();
        assert_eq!(a, b);
        if let Some(rec) = a {
            assert_eq!(rec.generated_at, at);
        }

        assert_eq!(
            engine.analyze_with_volatility_at(&history[..40], None, 0.65, 5_000.0, &config, at),
            Err(EngineError::InsufficientHistory { required: 50, available: 40 })
        );
    }

    #[test]
    fn test_bad_bars_are_rejected() {
        let mut history = bars(60);
        history[10].low = history[10].high * 2.0;
        let result = StrategyEngine::default().analyze(&history, None, 5_000.0, &EngineConfig::default());
        assert!(matches!(result, Err(EngineError::InvalidParameters(_))));
    }
}
