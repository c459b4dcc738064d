//! Monte Carlo probability-of-profit for arbitrary leg sets
//!
//! Closed-form POP exists only for single options (N(d2)). Spreads, condors
//! and butterflies need the distribution of the terminal price, so this
//! module samples it directly under risk-neutral GBM and evaluates the net
//! expiry P&L of every leg on each path. The payoff is leg-agnostic: nothing
//! here knows which strategy the legs came from.
//!
//! # Reproducibility
//!
//! Paths are generated in fixed-size chunks. Chunk `i` draws from its own
//! `StdRng` seeded from `(seed, i)`, and partial results are merged in chunk
//! order, so a seeded estimate is bit-identical whether rayon runs it on one
//! thread or sixteen.
//!
//! # Example: POP of a bull call spread
//!
//! ```
//! use options_advisor::options::{LegAction, OptionLeg, OptionType};
//! use options_advisor::probability::MonteCarloEngine;
//!
//! let (spot, vol, t, r) = (100.0, 0.3, 0.25, 0.05);
//! let legs = [
//!     OptionLeg::priced(OptionType::Call, LegAction::Buy, 100.0, spot, t, r, vol).unwrap(),
//!     OptionLeg::priced(OptionType::Call, LegAction::Sell, 110.0, spot, t, r, vol).unwrap(),
//! ];
//!
//! let mc = MonteCarloEngine::new(Some(42));
//! let pop = mc.estimate_pop(&legs, spot, vol, t, r, 20_000).unwrap();
//! assert!(pop > 0.0 && pop < 1.0);
//! ```

use rand::prelude::*;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::stochastic::GBM;
use super::Process;
use crate::error::{EngineError, Result};
use crate::options::leg::{net_pnl_at_expiry, validate_legs, OptionLeg};

/// Paths below this count leave more than ~0.5% standard error at POP ≈ 0.5.
pub const MIN_RECOMMENDED_PATHS: usize = 10_000;

const DEFAULT_CHUNK: usize = 4_096;

/// Summary of the simulated expiry P&L distribution, per unit of underlying.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffStatistics {
    pub paths: usize,
    pub probability_of_profit: f64,
    pub expected_pnl: f64,
    /// Standard error of `expected_pnl`
    pub std_error: f64,
    pub min_pnl: f64,
    pub max_pnl: f64,
}

impl PayoffStatistics {
    /// 95% confidence interval around the expected P&L.
    pub fn confidence_interval(&self) -> (f64, f64) {
        let half = 1.96 * self.std_error;
        (self.expected_pnl - half, self.expected_pnl + half)
    }

    /// Standard error of the POP estimate itself.
    pub fn pop_std_error(&self) -> f64 {
        let p = self.probability_of_profit;
        (p * (1.0 - p) / self.paths as f64).sqrt()
    }
}

/// Per-chunk running totals.
#[derive(Clone, Copy)]
struct Accumulator {
    profitable: usize,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn empty() -> Self {
        Self {
            profitable: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    #[inline]
    fn push(&mut self, pnl: f64) {
        if pnl > 0.0 {
            self.profitable += 1;
        }
        self.sum += pnl;
        self.sum_sq += pnl * pnl;
        self.min = self.min.min(pnl);
        self.max = self.max.max(pnl);
    }

    fn merge(self, other: Self) -> Self {
        Self {
            profitable: self.profitable + other.profitable,
            sum: self.sum + other.sum,
            sum_sq: self.sum_sq + other.sum_sq,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Monte Carlo simulation engine
///
/// # Fields
///
/// - `seed`: Optional seed for reproducible simulations; `None` draws from OS entropy
/// - `chunk_size`: Paths per independently seeded work unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonteCarloEngine {
    pub seed: Option<u64>,
    pub chunk_size: usize,
}

impl Default for MonteCarloEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MonteCarloEngine {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            chunk_size: DEFAULT_CHUNK,
        }
    }

    /// Same engine with a different stream, for independent estimates under one base seed.
    pub fn derive(&self, stream: u64) -> Self {
        Self {
            seed: self.seed.map(|s| s ^ stream.wrapping_mul(0xD1B5_4A32_D192_ED03)),
            chunk_size: self.chunk_size,
        }
    }

    fn chunk_rng(&self, chunk: usize) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s.wrapping_add((chunk as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))),
            None => StdRng::from_entropy(),
        }
    }

    /// Fraction of simulated terminal prices at which the legs' net P&L is strictly positive.
    pub fn estimate_pop(
        &self,
        legs: &[OptionLeg],
        spot: f64,
        volatility: f64,
        time_to_expiry: f64,
        rate: f64,
        paths: usize,
    ) -> Result<f64> {
        let acc = self.run(legs, spot, volatility, time_to_expiry, rate, paths)?;
        Ok(acc.profitable as f64 / paths as f64)
    }

    /// Full P&L distribution summary over `paths` simulations.
    pub fn payoff_statistics(
        &self,
        legs: &[OptionLeg],
        spot: f64,
        volatility: f64,
        time_to_expiry: f64,
        rate: f64,
        paths: usize,
    ) -> Result<PayoffStatistics> {
        let acc = self.run(legs, spot, volatility, time_to_expiry, rate, paths)?;
        let n = paths as f64;
        let mean = acc.sum / n;
        let variance = if paths > 1 {
            ((acc.sum_sq - n * mean * mean) / (n - 1.0)).max(0.0)
        } else {
            0.0
        };

        Ok(PayoffStatistics {
            paths,
            probability_of_profit: acc.profitable as f64 / n,
            expected_pnl: mean,
            std_error: (variance / n).sqrt(),
            min_pnl: acc.min,
            max_pnl: acc.max,
        })
    }

    fn run(
        &self,
        legs: &[OptionLeg],
        spot: f64,
        volatility: f64,
        time_to_expiry: f64,
        rate: f64,
        paths: usize,
    ) -> Result<Accumulator> {
        validate_legs(legs)?;
        if !(spot.is_finite() && spot > 0.0) {
            return Err(EngineError::invalid(format!("spot must be positive, got {spot}")));
        }
        if !(volatility.is_finite() && volatility > 0.0) {
            return Err(EngineError::invalid(format!("volatility must be positive, got {volatility}")));
        }
        if !(time_to_expiry.is_finite() && time_to_expiry > 0.0) {
            return Err(EngineError::invalid(format!(
                "time to expiry must be positive, got {time_to_expiry}"
            )));
        }
        if !rate.is_finite() {
            return Err(EngineError::invalid("risk-free rate must be finite"));
        }
        if paths == 0 || self.chunk_size == 0 {
            return Err(EngineError::invalid("path count and chunk size must be at least 1"));
        }
        if paths < MIN_RECOMMENDED_PATHS {
            tracing::warn!(paths, recommended = MIN_RECOMMENDED_PATHS, "low Monte Carlo path count");
        }

        let gbm = GBM::risk_neutral(rate, volatility, time_to_expiry);
        let chunk_size = self.chunk_size;
        let chunks = paths.div_ceil(chunk_size);

        let partials: Vec<Accumulator> = (0..chunks)
            .into_par_iter()
            .map(|chunk| {
                let n = chunk_size.min(paths - chunk * chunk_size);
                let mut rng = self.chunk_rng(chunk);
                let mut acc = Accumulator::empty();
                for _ in 0..n {
                    let z: f64 = rng.sample(StandardNormal);
                    acc.push(net_pnl_at_expiry(legs, gbm.step(spot, z)));
                }
                acc
            })
            .collect();

        // Merge in chunk order so floating-point totals do not depend on scheduling
        Ok(partials.into_iter().fold(Accumulator::empty(), Accumulator::merge))
    }
}
