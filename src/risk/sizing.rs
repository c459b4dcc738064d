//! Risk-bounded position sizing
//!
//! contracts = floor(capital * max_pct / max_loss_per_contract)
//!
//! The count is never rounded up: total worst-case loss always stays inside
//! the risk budget. When not even one contract fits, sizing fails with
//! `CapitalTooSmall` instead of returning zero.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::strategy::StrategyCandidate;

/// Result of sizing one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSize {
    pub contracts: u32,
    /// capital * max_pct
    pub risk_budget: f64,
    pub max_loss_per_contract: f64,
    /// contracts * max_loss_per_contract, never above `risk_budget`
    pub capital_at_risk: f64,
}

impl PositionSize {
    /// Share of the risk budget actually used.
    pub fn budget_utilization(&self) -> f64 {
        if self.risk_budget > 0.0 {
            self.capital_at_risk / self.risk_budget
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PositionSizer;

impl PositionSizer {
    /// Size a candidate against the capital and per-trade risk fraction.
    pub fn size(candidate: &StrategyCandidate, capital: f64, max_pct_per_trade: f64) -> Result<PositionSize> {
        Self::contracts_for(candidate.max_loss_per_contract(), capital, max_pct_per_trade)
    }

    /// Size from a raw per-contract max loss.
    pub fn contracts_for(max_loss_per_contract: f64, capital: f64, max_pct_per_trade: f64) -> Result<PositionSize> {
        if !(capital.is_finite() && capital >= 0.0) {
            return Err(EngineError::invalid(format!("capital must be non-negative, got {capital}")));
        }
        if !(max_pct_per_trade.is_finite() && max_pct_per_trade > 0.0 && max_pct_per_trade <= 1.0) {
            return Err(EngineError::invalid(format!(
                "max capital per trade must be in (0, 1], got {max_pct_per_trade}"
            )));
        }
        if !(max_loss_per_contract.is_finite() && max_loss_per_contract > 0.0) {
            return Err(EngineError::invalid(format!(
                "max loss per contract must be positive, got {max_loss_per_contract}"
            )));
        }

        let risk_budget = capital * max_pct_per_trade;
        let mut contracts = (risk_budget / max_loss_per_contract).floor().min(u32::MAX as f64) as u32;
        // floor of a rounded quotient can still land one contract over budget
        while contracts > 0 && contracts as f64 * max_loss_per_contract > risk_budget {
            contracts -= 1;
        }

        if contracts == 0 {
            return Err(EngineError::CapitalTooSmall {
                risk_budget,
                max_loss_per_contract,
            });
        }

        Ok(PositionSize {
            contracts,
            risk_budget,
            max_loss_per_contract,
            capital_at_risk: contracts as f64 * max_loss_per_contract,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn test_floor_never_exceeds_budget() {
        let size = PositionSizer::contracts_for(129.65, 5_000.0, 0.10).unwrap();
        assert_eq!(size.contracts, 3);
        assert!(size.capital_at_risk <= size.risk_budget);
        assert!(size.budget_utilization() > 0.7);

        let exact = PositionSizer::contracts_for(100.0, 5_000.0, 0.10).unwrap();
        assert_eq!(exact.contracts, 5);
        assert_eq!(exact.capital_at_risk, 500.0);
    }

    #[test]
    fn test_capital_too_small() {
        let result = PositionSizer::contracts_for(500.0, 10.0, 0.10);
        assert_eq!(
            result,
            Err(EngineError::CapitalTooSmall {
                risk_budget: 1.0,
                max_loss_per_contract: 500.0,
            })
        );
        assert!(matches!(
            PositionSizer::contracts_for(500.0, 0.0, 0.10),
            Err(EngineError::CapitalTooSmall { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(matches!(
            PositionSizer::contracts_for(0.0, 5_000.0, 0.1),
            Err(EngineError::InvalidParameters(_))
        ));
        assert!(PositionSizer::contracts_for(10.0, -1.0, 0.1).is_err());
        assert!(PositionSizer::contracts_for(10.0, 5_000.0, 1.5).is_err());
        assert!(PositionSizer::contracts_for(f64::NAN, 5_000.0, 0.1).is_err());
    }

    #[test]
    fn test_random_inputs_stay_within_budget() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10_000 {
            let loss = rng.gen_range(0.01..1_000.0);
            let capital = rng.gen_range(0.0..100_000.0);
            let pct = rng.gen_range(0.001..1.0);
            match PositionSizer::contracts_for(loss, capital, pct) {
                Ok(size) => {
                    assert!(size.contracts >= 1);
                    assert!(size.capital_at_risk <= capital * pct);
                    assert!((size.contracts as f64 + 1.0) * loss > capital * pct);
                }
                Err(EngineError::CapitalTooSmall { .. }) => assert!(loss > capital * pct),
                Err(other) => panic!("unexpected {other:?}"),
            }
        }
    }
}
