//! Strategy selection
//!
//! Every template is built, priced, simulated and scored independently, so
//! the templates are evaluated in parallel with rayon. Ranking is a stable
//! sort on (score desc, template order), which makes the outcome independent
//! of thread scheduling.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::data::MarketSnapshot;
use crate::error::{EngineError, Result};
use crate::probability::MonteCarloEngine;
use crate::recommendation::{MarketContext, Recommendation, RecommendationAssembler};
use crate::regime::Regime;
use crate::risk::PositionSizer;

use super::candidate::{net_greeks, Alternative, ScoredCandidate, StrategyCandidate};
use super::scoring::{score, ScoreInputs};
use super::templates::{construct, StrategyKind, TemplateContext};

/// Runners-up reported with a recommendation.
pub const ALTERNATIVES: usize = 2;

/// Picks the best-scoring template that clears the POP floor and fits the risk budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategySelector {
    templates: Vec<StrategyKind>,
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self {
            templates: StrategyKind::ALL.to_vec(),
        }
    }
}

impl StrategySelector {
    /// Restrict the evaluated templates.
    pub fn with_templates(templates: &[StrategyKind]) -> Self {
        let mut templates = templates.to_vec();
        templates.sort();
        templates.dedup();
        Self { templates }
    }

    pub fn templates(&self) -> &[StrategyKind] {
        &self.templates
    }

    /// Build, price and simulate one template.
    pub fn build_candidate(
        &self,
        kind: StrategyKind,
        snapshot: &MarketSnapshot,
        config: &EngineConfig,
    ) -> Result<StrategyCandidate> {
        let expiry_days = kind.expiry_days(&config.expiries);
        let time_to_expiry = expiry_days as f64 / 365.0;
        let ctx = TemplateContext {
            spot: snapshot.spot,
            volatility: snapshot.volatility,
            rate: config.risk_free_rate,
            time_to_expiry,
            rule: &config.strikes,
        };
        let construction = construct(kind, &ctx)?;
        let profile = construction.profile;
        if !(profile.max_loss > 0.0 && profile.max_profit > 0.0) {
            return Err(EngineError::invalid(format!(
                "{kind} has no positive payoff range (max profit {:.4}, max loss {:.4})",
                profile.max_profit, profile.max_loss
            )));
        }

        let mc = MonteCarloEngine::new(config.monte_carlo_seed).derive(kind.index() as u64);
        let probability_of_profit = mc.estimate_pop(
            &construction.legs,
            snapshot.spot,
            snapshot.volatility,
            time_to_expiry,
            config.risk_free_rate,
            config.monte_carlo_paths,
        )?;

        Ok(StrategyCandidate {
            kind,
            greeks: net_greeks(&construction.legs),
            legs: construction.legs,
            expiry_days,
            time_to_expiry,
            net_premium: profile.net_premium,
            max_profit: profile.max_profit,
            max_loss: profile.max_loss,
            breakevens: profile.breakevens,
            probability_of_profit,
            contract_multiplier: config.contract_multiplier,
        })
    }

    /// Score every template, best first. Templates that cannot be built
    /// around this snapshot are skipped with a warning.
    pub fn evaluate(
        &self,
        regime: Regime,
        confidence: f64,
        snapshot: &MarketSnapshot,
        config: &EngineConfig,
    ) -> Result<Vec<ScoredCandidate>> {
        config.validate()?;
        MarketSnapshot::new(snapshot.spot, snapshot.volatility, snapshot.timestamp)?;
        if !(0.0..=100.0).contains(&confidence) {
            return Err(EngineError::invalid(format!("confidence must be in [0, 100], got {confidence}")));
        }

        let built: Vec<(StrategyKind, Result<StrategyCandidate>)> = self
            .templates
            .par_iter()
            .map(|&kind| (kind, self.build_candidate(kind, snapshot, config)))
            .collect();

        let mut scored = Vec::with_capacity(built.len());
        for (kind, result) in built {
            let candidate = match result {
                Ok(candidate) => candidate,
                Err(EngineError::InvalidParameters(reason)) => {
                    tracing::warn!(strategy = %kind, %reason, "skipping degenerate candidate");
                    continue;
                }
                Err(other) => return Err(other),
            };
            let s = score(
                &ScoreInputs {
                    kind,
                    regime,
                    confidence,
                    probability_of_profit: candidate.probability_of_profit,
                    max_profit: candidate.max_profit,
                    max_loss: candidate.max_loss,
                    volatility: snapshot.volatility,
                },
                &config.scoring,
            );
            tracing::debug!(
                strategy = %kind,
                score = s,
                pop = candidate.probability_of_profit,
                max_profit = candidate.max_profit,
                max_loss = candidate.max_loss,
                "evaluated candidate"
            );
            scored.push(ScoredCandidate { candidate, score: s });
        }

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.candidate.kind.cmp(&b.candidate.kind))
        });
        Ok(scored)
    }

    /// Choose a trade, stamped with the snapshot's timestamp.
    pub fn select(
        &self,
        regime: Regime,
        confidence: f64,
        snapshot: &MarketSnapshot,
        capital: f64,
        config: &EngineConfig,
    ) -> Result<Option<Recommendation>> {
        self.select_at(regime, confidence, snapshot, capital, config, snapshot.timestamp)
    }

    /// Choose a trade.
    ///
    /// Returns `Ok(None)` when no candidate reaches `min_probability_of_profit`.
    /// The best-scoring eligible candidate is sized; if it does not fit the
    /// risk budget its `CapitalTooSmall` is returned. With
    /// `fallback_to_affordable` set, lower-ranked eligible candidates are tried
    /// instead and the first `CapitalTooSmall` is returned only when none fits.
    pub fn select_at(
        &self,
        regime: Regime,
        confidence: f64,
        snapshot: &MarketSnapshot,
        capital: f64,
        config: &EngineConfig,
        generated_at: DateTime<Utc>,
    ) -> Result<Option<Recommendation>> {
        let ranked = self.evaluate(regime, confidence, snapshot, config)?;
        let floor = config.min_probability_of_profit;

        let mut too_small = None;
        for (rank, scored) in ranked.iter().enumerate() {
            let candidate = &scored.candidate;
            if candidate.probability_of_profit < floor {
                tracing::debug!(
                    strategy = %candidate.kind,
                    pop = candidate.probability_of_profit,
                    floor,
                    "below probability floor"
                );
                continue;
            }

            let sizing = match PositionSizer::size(candidate, capital, config.max_capital_per_trade_pct) {
                Ok(sizing) => sizing,
                Err(err @ EngineError::CapitalTooSmall { .. }) => {
                    tracing::debug!(strategy = %candidate.kind, error = %err, "cannot size candidate");
                    if !config.fallback_to_affordable {
                        return Err(err);
                    }
                    too_small.get_or_insert(err);
                    continue;
                }
                Err(other) => return Err(other),
            };

            let alternatives: Vec<Alternative> = ranked
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != rank)
                .take(ALTERNATIVES)
                .map(|(_, other)| Alternative::from(other))
                .collect();

            tracing::info!(
                strategy = %candidate.kind,
                contracts = sizing.contracts,
                pop = candidate.probability_of_profit,
                capital_at_risk = sizing.capital_at_risk,
                score = scored.score,
                "selected strategy"
            );

            let market = MarketContext {
                regime,
                confidence,
                spot: snapshot.spot,
                volatility: snapshot.volatility,
            };
            return Ok(Some(RecommendationAssembler::assemble(
                scored.clone(),
                sizing,
                market,
                capital,
                alternatives,
                generated_at,
            )));
        }

        match too_small {
            Some(err) => Err(err),
            None => {
                tracing::debug!(floor, "no candidate clears the probability floor");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot() -> MarketSnapshot {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        MarketSnapshot::new(50_000.0, 0.65, at).unwrap()
    }

    #[test]
    fn test_ranging_prefers_premium_selling() {
        let config = EngineConfig::default();
        let rec = StrategySelector::default()
            .select(Regime::Ranging, 80.0, &snapshot(), 5_000.0, &config)
            .unwrap()
            .expect("a ranging market at 65% vol should produce a trade");

        assert!(matches!(rec.strategy, StrategyKind::IronCondor | StrategyKind::CreditSpread));
        assert!(rec.max_loss <= 500.0);
        assert!(rec.probability_of_profit >= 0.55);
        assert!(rec.contracts >= 1);
        assert_eq!(rec.alternatives.len(), ALTERNATIVES);
        assert!(rec.alternatives.iter().all(|a| a.strategy != rec.strategy));
    }

    #[test]
    fn test_unreachable_floor_yields_none() {
        let config = EngineConfig {
            min_probability_of_profit: 0.95,
            ..EngineConfig::default()
        };
        let rec = StrategySelector::default()
            .select(Regime::Ranging, 80.0, &snapshot(), 5_000.0, &config)
            .unwrap();
        assert!(rec.is_none());
    }

    #[test]
    fn test_capital_too_small_when_nothing_fits() {
        let config = EngineConfig::default();
        let result = StrategySelector::default().select(Regime::Ranging, 80.0, &snapshot(), 10.0, &config);
        assert!(matches!(result, Err(EngineError::CapitalTooSmall { .. })));
    }

    #[test]
    fn test_top_candidate_that_does_not_fit_is_reported() {
        let config = EngineConfig::default();
        let selector = StrategySelector::default();
        let ranked = selector.evaluate(Regime::Ranging, 80.0, &snapshot(), &config).unwrap();
        let mut eligible = ranked
            .iter()
            .map(|s| &s.candidate)
            .filter(|c| c.probability_of_profit >= config.min_probability_of_profit);
        let top = eligible.next().unwrap();
        let cheaper = eligible
            .find(|c| c.max_loss_per_contract() < top.max_loss_per_contract())
            .expect("a lower-ranked candidate with a smaller per-contract loss");
        assert_eq!(top.kind, StrategyKind::IronCondor);
        assert_eq!(cheaper.kind, StrategyKind::CreditSpread);

        // Budget sits between the two per-contract losses.
        let budget = 0.5 * (top.max_loss_per_contract() + cheaper.max_loss_per_contract());
        let capital = budget / config.max_capital_per_trade_pct;

        match selector.select(Regime::Ranging, 80.0, &snapshot(), capital, &config) {
            Err(EngineError::CapitalTooSmall { max_loss_per_contract, .. }) => {
                assert!((max_loss_per_contract - top.max_loss_per_contract()).abs() < 1e-9);
            }
            other => panic!("expected CapitalTooSmall for the top candidate, got {other:?}"),
        }

        let fallback = EngineConfig {
            fallback_to_affordable: true,
            ..config
        };
        let rec = selector
            .select(Regime::Ranging, 80.0, &snapshot(), capital, &fallback)
            .unwrap()
            .expect("the cheaper candidate fits when fallback is enabled");
        assert_eq!(rec.strategy, cheaper.kind);
        assert_eq!(rec.contracts, 1);
    }

    #[test]
    fn test_ranking_is_stable() {
        let config = EngineConfig::default();
        let selector = StrategySelector::default();
        let a = selector.evaluate(Regime::BullishTrend, 70.0, &snapshot(), &config).unwrap();
        let b = selector.evaluate(Regime::BullishTrend, 70.0, &snapshot(), &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert!(a.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_restricted_templates() {
        let selector = StrategySelector::with_templates(&[StrategyKind::LongStraddle, StrategyKind::IronCondor]);
        assert_eq!(selector.templates(), &[StrategyKind::IronCondor, StrategyKind::LongStraddle]);
        let ranked = selector
            .evaluate(Regime::HighVolatility, 90.0, &snapshot(), &EngineConfig::default())
            .unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        let result = StrategySelector::default().evaluate(Regime::Ranging, 120.0, &snapshot(), &EngineConfig::default());
        assert!(matches!(result, Err(EngineError::InvalidParameters(_))));
    }
}
