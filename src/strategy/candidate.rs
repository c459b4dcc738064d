use serde::{Deserialize, Serialize};

use crate::options::{Greeks, OptionLeg};

use super::templates::StrategyKind;

/// A priced template with its analytic payoff bounds and simulated POP.
///
/// Money fields are per unit of underlying; the `*_per_contract` accessors
/// apply the contract multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyCandidate {
    pub kind: StrategyKind,
    pub legs: Vec<OptionLeg>,
    pub expiry_days: u32,
    /// Years
    pub time_to_expiry: f64,
    /// Credit positive, debit negative
    pub net_premium: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub breakevens: Vec<f64>,
    /// Net Greeks of the structure, per unit of underlying
    pub greeks: Greeks,
    pub probability_of_profit: f64,
    /// Units of underlying per contract
    pub contract_multiplier: f64,
}

impl StrategyCandidate {
    #[inline]
    pub fn max_loss_per_contract(&self) -> f64 {
        self.max_loss * self.contract_multiplier
    }

    #[inline]
    pub fn max_profit_per_contract(&self) -> f64 {
        self.max_profit * self.contract_multiplier
    }

    #[inline]
    pub fn net_premium_per_contract(&self) -> f64 {
        self.net_premium * self.contract_multiplier
    }

    pub fn is_credit(&self) -> bool {
        self.net_premium > 0.0
    }

    /// Max profit over max loss.
    pub fn reward_to_risk(&self) -> f64 {
        if self.max_loss > 0.0 {
            self.max_profit / self.max_loss
        } else {
            0.0
        }
    }
}

/// Net Greeks of a leg set, quantities applied.
pub fn net_greeks(legs: &[OptionLeg]) -> Greeks {
    legs.iter()
        .fold(Greeks::default(), |acc, leg| acc.add(&leg.greeks.scale(leg.quantity as f64)))
}

/// A candidate with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: StrategyCandidate,
    pub score: f64,
}

/// A runner-up reported next to the chosen strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub strategy: StrategyKind,
    pub score: f64,
    pub probability_of_profit: f64,
}

impl From<&ScoredCandidate> for Alternative {
    fn from(scored: &ScoredCandidate) -> Self {
        Self {
            strategy: scored.candidate.kind,
            score: scored.score,
            probability_of_profit: scored.candidate.probability_of_profit,
        }
    }
}
