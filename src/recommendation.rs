//! The final recommendation record.
//!
//! Assembly is pure: it packages a scored candidate, its sizing and the
//! regime read into one value. Position-level money fields are the
//! per-contract figures multiplied by the contract count.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::options::{Greeks, OptionLeg};
use crate::regime::Regime;
use crate::risk::PositionSize;
use crate::strategy::{Alternative, ScoredCandidate, StrategyKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Share of the maximum loss at which the position should be closed.
pub const STOP_LOSS_FRACTION: f64 = 0.5;

/// Distinct expirations to spread repeated entries across.
pub const SUGGESTED_EXPIRATIONS: std::ops::RangeInclusive<u32> = 2..=3;

/// Capital-at-risk and regime-uncertainty read of a sized trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// capital_at_risk / capital
    pub capital_fraction: f64,
    /// 1 - confidence / 100
    pub regime_uncertainty: f64,
    /// Position loss that triggers an exit
    pub stop_loss: f64,
}

impl RiskAssessment {
    pub fn new(capital_at_risk: f64, capital: f64, confidence: f64) -> Self {
        let capital_fraction = if capital > 0.0 { capital_at_risk / capital } else { 1.0 };
        let level = if capital_fraction <= 0.05 {
            RiskLevel::Low
        } else if capital_fraction <= 0.10 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };
        Self {
            level,
            capital_fraction,
            regime_uncertainty: (1.0 - confidence / 100.0).clamp(0.0, 1.0),
            stop_loss: capital_at_risk * STOP_LOSS_FRACTION,
        }
    }
}

/// Entry timing quality by UTC hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingWindow {
    Optimal,
    Good,
    Acceptable,
}

const OPTIMAL_HOURS: [u32; 6] = [8, 9, 10, 14, 15, 16];

impl TradingWindow {
    pub fn at(time: DateTime<Utc>) -> Self {
        match time.hour() {
            8..=10 | 14..=16 => TradingWindow::Optimal,
            7 | 11 | 13 | 17 => TradingWindow::Good,
            _ => TradingWindow::Acceptable,
        }
    }

    /// Start of the first optimal hour after the one containing `time`,
    /// rolling over to the next day's first optimal hour.
    pub fn next_optimal(time: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = time
            - Duration::seconds(i64::from(time.num_seconds_from_midnight()))
            - Duration::nanoseconds(i64::from(time.nanosecond()));
        match OPTIMAL_HOURS.iter().find(|&&h| h > time.hour()) {
            Some(&h) => midnight + Duration::hours(i64::from(h)),
            None => midnight + Duration::days(1) + Duration::hours(i64::from(OPTIMAL_HOURS[0])),
        }
    }
}

/// One recommended trade. Created once per analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub strategy: StrategyKind,
    pub legs: Vec<OptionLeg>,
    pub expiry_days: u32,
    pub probability_of_profit: f64,
    /// Whole position
    pub max_profit: f64,
    /// Whole position, equal to `capital_at_risk`
    pub max_loss: f64,
    /// Whole position, credit positive
    pub net_premium: f64,
    pub breakevens: Vec<f64>,
    /// Whole position
    pub greeks: Greeks,
    pub contracts: u32,
    pub capital_at_risk: f64,
    pub regime: Regime,
    pub regime_confidence: f64,
    pub score: f64,
    pub spot: f64,
    pub volatility: f64,
    pub alternatives: Vec<Alternative>,
    pub risk: RiskAssessment,
    pub trading_window: TradingWindow,
    pub next_optimal_window: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

/// Regime read and market state the trade was chosen under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketContext {
    pub regime: Regime,
    pub confidence: f64,
    pub spot: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationAssembler;

impl RecommendationAssembler {
    pub fn assemble(
        chosen: ScoredCandidate,
        sizing: PositionSize,
        market: MarketContext,
        capital: f64,
        alternatives: Vec<Alternative>,
        generated_at: DateTime<Utc>,
    ) -> Recommendation {
        let ScoredCandidate { candidate, score } = chosen;
        let contracts = sizing.contracts as f64;
        let units = contracts * candidate.contract_multiplier;

        Recommendation {
            strategy: candidate.kind,
            expiry_days: candidate.expiry_days,
            probability_of_profit: candidate.probability_of_profit,
            max_profit: candidate.max_profit_per_contract() * contracts,
            max_loss: sizing.capital_at_risk,
            net_premium: candidate.net_premium_per_contract() * contracts,
            breakevens: candidate.breakevens,
            greeks: candidate.greeks.scale(units),
            contracts: sizing.contracts,
            capital_at_risk: sizing.capital_at_risk,
            regime: market.regime,
            regime_confidence: market.confidence,
            score,
            spot: market.spot,
            volatility: market.volatility,
            alternatives,
            risk: RiskAssessment::new(sizing.capital_at_risk, capital, market.confidence),
            trading_window: TradingWindow::at(generated_at),
            next_optimal_window: TradingWindow::next_optimal(generated_at),
            generated_at,
            legs: candidate.legs,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} x{} ({}d) | regime {} ({:.0}% confidence)",
            self.strategy, self.contracts, self.expiry_days, self.regime, self.regime_confidence
        )?;
        for leg in &self.legs {
            writeln!(
                f,
                "  {:?} {:?} @ {:.2} premium {:.2}",
                leg.action, leg.option_type, leg.strike, leg.premium
            )?;
        }
        writeln!(
            f,
            "  POP {:.1}% | max profit {:.2} | max loss {:.2} | net premium {:+.2}",
            self.probability_of_profit * 100.0,
            self.max_profit,
            self.max_loss,
            self.net_premium
        )?;
        writeln!(
            f,
            "  risk {:?} ({:.1}% of capital) | exit at loss {:.2} | window {:?}, next optimal {}",
            self.risk.level,
            self.risk.capital_fraction * 100.0,
            self.risk.stop_loss,
            self.trading_window,
            self.next_optimal_window.format("%Y-%m-%d %H:%M UTC")
        )?;
        write!(
            f,
            "  spread entries across {}-{} expirations",
            SUGGESTED_EXPIRATIONS.start(),
            SUGGESTED_EXPIRATIONS.end()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_risk_levels() {
        assert_eq!(RiskAssessment::new(200.0, 5_000.0, 80.0).level, RiskLevel::Low);
        assert_eq!(RiskAssessment::new(500.0, 5_000.0, 80.0).level, RiskLevel::Medium);
        assert_eq!(RiskAssessment::new(900.0, 5_000.0, 80.0).level, RiskLevel::High);
        assert!((RiskAssessment::new(1.0, 5_000.0, 80.0).regime_uncertainty - 0.2).abs() < 1e-12);
        assert_eq!(RiskAssessment::new(400.0, 5_000.0, 80.0).stop_loss, 200.0);
    }

    #[test]
    fn test_trading_window() {
        let at = |h| TradingWindow::at(Utc.with_ymd_and_hms(2024, 3, 4, h, 30, 0).unwrap());
        assert_eq!(at(9), TradingWindow::Optimal);
        assert_eq!(at(15), TradingWindow::Optimal);
        assert_eq!(at(11), TradingWindow::Good);
        assert_eq!(at(12), TradingWindow::Acceptable);
        assert_eq!(at(23), TradingWindow::Acceptable);
    }

    #[test]
    fn test_next_optimal_window() {
        let day = |d, h, m| Utc.with_ymd_and_hms(2024, 3, d, h, m, 0).unwrap();
        assert_eq!(TradingWindow::next_optimal(day(4, 6, 45)), day(4, 8, 0));
        assert_eq!(TradingWindow::next_optimal(day(4, 9, 30)), day(4, 10, 0));
        assert_eq!(TradingWindow::next_optimal(day(4, 10, 59)), day(4, 14, 0));
        assert_eq!(TradingWindow::next_optimal(day(4, 16, 0)), day(5, 8, 0));
        assert_eq!(TradingWindow::next_optimal(day(4, 23, 10)), day(5, 8, 0));
    }
}
