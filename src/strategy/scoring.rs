//! Candidate scoring
//!
//! score = w_fit * fit(regime, template) * confidence / 100
//!       + w_pop * POP
//!       + w_rr  * max_profit / (max_profit + max_loss)
//!       + volatility bonus
//!
//! Premium sellers earn the volatility bonus when volatility is rich, the
//! long straddle when it is cheap.

use crate::config::ScoringWeights;
use crate::regime::Regime;

use super::templates::StrategyKind;

/// How well a template suits a regime, in [0, 1].
pub fn regime_fit(regime: Regime, kind: StrategyKind) -> f64 {
    use StrategyKind::*;
    match (regime, kind) {
        (Regime::Ranging, IronCondor) => 1.0,
        (Regime::Ranging, CreditSpread) => 0.9,
        (Regime::Ranging, Butterfly) => 0.8,
        (Regime::Ranging, BullCallSpread | BearPutSpread) => 0.2,
        (Regime::Ranging, LongStraddle) => 0.1,

        (Regime::BullishTrend, BullCallSpread) => 1.0,
        (Regime::BullishTrend, IronCondor) => 0.4,
        (Regime::BullishTrend, Butterfly | LongStraddle) => 0.3,
        (Regime::BullishTrend, CreditSpread) => 0.2,
        (Regime::BullishTrend, BearPutSpread) => 0.0,

        (Regime::BearishTrend, BearPutSpread) => 1.0,
        (Regime::BearishTrend, CreditSpread) => 0.7,
        (Regime::BearishTrend, IronCondor) => 0.4,
        (Regime::BearishTrend, Butterfly | LongStraddle) => 0.3,
        (Regime::BearishTrend, BullCallSpread) => 0.0,

        (Regime::HighVolatility, LongStraddle) => 1.0,
        (Regime::HighVolatility, CreditSpread) => 0.4,
        (Regime::HighVolatility, IronCondor | BullCallSpread | BearPutSpread) => 0.3,
        (Regime::HighVolatility, Butterfly) => 0.2,
    }
}

/// Inputs of one score evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs {
    pub kind: StrategyKind,
    pub regime: Regime,
    /// 0 to 100
    pub confidence: f64,
    pub probability_of_profit: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub volatility: f64,
}

pub fn score(inputs: &ScoreInputs, weights: &ScoringWeights) -> f64 {
    let fit = regime_fit(inputs.regime, inputs.kind) * (inputs.confidence / 100.0).clamp(0.0, 1.0);

    let range = inputs.max_profit + inputs.max_loss;
    let reward_share = if range > 0.0 { inputs.max_profit / range } else { 0.0 };

    let bonus = if inputs.kind.sells_premium() && inputs.volatility > weights.high_iv_threshold {
        weights.volatility_bonus
    } else if inputs.kind == StrategyKind::LongStraddle && inputs.volatility < weights.low_iv_threshold {
        weights.volatility_bonus
    } else {
        0.0
    };

    weights.regime_fit * fit
        + weights.probability * inputs.probability_of_profit
        + weights.reward_to_risk * reward_share
        + bonus
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(kind: StrategyKind, regime: Regime, pop: f64) -> ScoreInputs {
        ScoreInputs {
            kind,
            regime,
            confidence: 80.0,
            probability_of_profit: pop,
            max_profit: 1.0,
            max_loss: 3.0,
            volatility: 0.55,
        }
    }

    #[test]
    fn test_each_regime_has_a_favourite() {
        let favourite = |regime: Regime| {
            StrategyKind::ALL
                .into_iter()
                .max_by(|a, b| regime_fit(regime, *a).total_cmp(&regime_fit(regime, *b)))
        };
        assert_eq!(favourite(Regime::Ranging), Some(StrategyKind::IronCondor));
        assert_eq!(favourite(Regime::BullishTrend), Some(StrategyKind::BullCallSpread));
        assert_eq!(favourite(Regime::BearishTrend), Some(StrategyKind::BearPutSpread));
        assert_eq!(favourite(Regime::HighVolatility), Some(StrategyKind::LongStraddle));
    }

    #[test]
    fn test_score_components() {
        let w = ScoringWeights::default();
        let base = score(&inputs(StrategyKind::IronCondor, Regime::Ranging, 0.8), &w);
        // 0.5 * 1.0 * 0.8 + 0.3 * 0.8 + 0.2 * 0.25
        assert!((base - 0.69).abs() < 1e-12);

        let rich = ScoreInputs {
            volatility: 0.7,
            ..inputs(StrategyKind::IronCondor, Regime::Ranging, 0.8)
        };
        assert!((score(&rich, &w) - base - w.volatility_bonus).abs() < 1e-12);

        let cheap_straddle = ScoreInputs {
            volatility: 0.3,
            ..inputs(StrategyKind::LongStraddle, Regime::Ranging, 0.4)
        };
        let straddle = inputs(StrategyKind::LongStraddle, Regime::Ranging, 0.4);
        assert!(score(&cheap_straddle, &w) > score(&straddle, &w));
    }

    #[test]
    fn test_confidence_scales_fit_only() {
        let w = ScoringWeights::default();
        let sure = inputs(StrategyKind::BullCallSpread, Regime::BullishTrend, 0.6);
        let unsure = ScoreInputs { confidence: 0.0, ..sure };
        assert!((score(&sure, &w) - score(&unsure, &w) - 0.4).abs() < 1e-12);
    }
}
