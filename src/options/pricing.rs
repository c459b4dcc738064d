//! European Option Pricing Kernels
//!
//! Black-Scholes closed form for calls, puts via put-call parity, analytic
//! Greeks, and a bracketed implied-volatility solver.
//!
//! All inputs are annualized: `time_to_expiry` in years, `rate` and
//! `volatility` as decimals (0.65 = 65%).
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::probability::utils::{standard_normal_cdf, standard_normal_pdf};

/// Right conveyed by the option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff at expiry for one unit of underlying.
    #[inline]
    pub fn intrinsic(self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }
}

/// The Greeks - Options Sensitivities
///
/// Stored as analytic derivatives in natural units:
///
/// - **delta** ∂V/∂S: call in [0, 1], put in [-1, 0]
/// - **gamma** ∂²V/∂S²: identical for calls and puts, never negative
/// - **theta** ∂V/∂t per year of calendar time (negative for long options, mostly)
/// - **vega** ∂V/∂σ per 1.00 of volatility: identical for calls and puts, never negative
/// - **rho** ∂V/∂r per 1.00 of rate
///
/// Use the `*_per_*` helpers for the trader conventions (per day, per vol point).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

impl Greeks {
    /// Scale by a signed quantity (negative for short positions).
    #[must_use]
    pub fn scale(&self, quantity: f64) -> Self {
        Self {
            delta: self.delta * quantity,
            gamma: self.gamma * quantity,
            theta: self.theta * quantity,
            vega: self.vega * quantity,
            rho: self.rho * quantity,
        }
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self {
            delta: self.delta + other.delta,
            gamma: self.gamma + other.gamma,
            theta: self.theta + other.theta,
            vega: self.vega + other.vega,
            rho: self.rho + other.rho,
        }
    }

    /// Time decay per calendar day.
    #[inline]
    pub fn theta_per_day(&self) -> f64 {
        self.theta / 365.0
    }

    /// Value change per 1% volatility move.
    #[inline]
    pub fn vega_per_vol_point(&self) -> f64 {
        self.vega / 100.0
    }

    /// Value change per 1% rate move.
    #[inline]
    pub fn rho_per_rate_point(&self) -> f64 {
        self.rho / 100.0
    }
}

/// Fair value plus sensitivities for one option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub fair_value: f64,
    pub greeks: Greeks,
}

#[inline]
fn check_inputs(spot: f64, strike: f64, time_to_expiry: f64, rate: f64, volatility: f64) -> Result<()> {
    if !(spot.is_finite() && spot > 0.0) {
        return Err(EngineError::invalid(format!("spot must be positive, got {spot}")));
    }
    if !(strike.is_finite() && strike > 0.0) {
        return Err(EngineError::invalid(format!("strike must be positive, got {strike}")));
    }
    if !(time_to_expiry.is_finite() && time_to_expiry > 0.0) {
        return Err(EngineError::invalid(format!(
            "time to expiry must be positive, got {time_to_expiry}"
        )));
    }
    if !(volatility.is_finite() && volatility > 0.0) {
        return Err(EngineError::invalid(format!("volatility must be positive, got {volatility}")));
    }
    if !rate.is_finite() {
        return Err(EngineError::invalid("risk-free rate must be finite"));
    }
    Ok(())
}

/// Returns (d1, d2).
#[inline]
fn d1_d2(spot: f64, strike: f64, time_to_expiry: f64, rate: f64, volatility: f64) -> (f64, f64) {
    let sqrt_t = time_to_expiry.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * volatility * volatility) * time_to_expiry)
        / (volatility * sqrt_t);
    (d1, d1 - volatility * sqrt_t)
}

/// Black-Scholes call value: S·N(d1) − K·e^(−rT)·N(d2)
#[inline]
fn call_value(spot: f64, strike: f64, time_to_expiry: f64, rate: f64, volatility: f64) -> f64 {
    let (d1, d2) = d1_d2(spot, strike, time_to_expiry, rate, volatility);
    spot * standard_normal_cdf(d1) - strike * (-rate * time_to_expiry).exp() * standard_normal_cdf(d2)
}

/// Put from parity: P = C − S + K·e^(−rT)
#[inline]
fn put_value(spot: f64, strike: f64, time_to_expiry: f64, rate: f64, volatility: f64) -> f64 {
    call_value(spot, strike, time_to_expiry, rate, volatility) - spot
        + strike * (-rate * time_to_expiry).exp()
}

#[inline]
fn value(option_type: OptionType, spot: f64, strike: f64, time_to_expiry: f64, rate: f64, volatility: f64) -> f64 {
    match option_type {
        OptionType::Call => call_value(spot, strike, time_to_expiry, rate, volatility),
        OptionType::Put => put_value(spot, strike, time_to_expiry, rate, volatility),
    }
}

/// Price a European option and its Greeks.
///
/// Fails with `InvalidParameters` unless `time_to_expiry > 0`, `volatility > 0`
/// and spot and strike are positive.
///
/// ```
/// use options_advisor::options::{price, OptionType};
///
/// let quote = price(OptionType::Call, 50_000.0, 52_000.0, 30.0 / 365.0, 0.05, 0.8).unwrap();
/// assert!(quote.fair_value > 0.0);
/// assert!(quote.greeks.delta > 0.0 && quote.greeks.delta < 1.0);
/// ```
pub fn price(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    time_to_expiry: f64,
    rate: f64,
    volatility: f64,
) -> Result<OptionQuote> {
    check_inputs(spot, strike, time_to_expiry, rate, volatility)?;

    let sqrt_t = time_to_expiry.sqrt();
    let (d1, d2) = d1_d2(spot, strike, time_to_expiry, rate, volatility);
    let nd1_prime = standard_normal_pdf(d1);
    let discount = (-rate * time_to_expiry).exp();

    let gamma = nd1_prime / (spot * volatility * sqrt_t);
    let vega = spot * nd1_prime * sqrt_t;
    let decay = -spot * nd1_prime * volatility / (2.0 * sqrt_t);

    let (fair_value, delta, theta, rho) = match option_type {
        OptionType::Call => {
            let nd2 = standard_normal_cdf(d2);
            (
                call_value(spot, strike, time_to_expiry, rate, volatility),
                standard_normal_cdf(d1),
                decay - rate * strike * discount * nd2,
                strike * time_to_expiry * discount * nd2,
            )
        }
        OptionType::Put => {
            let nnd2 = standard_normal_cdf(-d2);
            (
                put_value(spot, strike, time_to_expiry, rate, volatility),
                standard_normal_cdf(d1) - 1.0,
                decay + rate * strike * discount * nnd2,
                -strike * time_to_expiry * discount * nnd2,
            )
        }
    };

    Ok(OptionQuote {
        // Deep OTM parity can round a hair below zero
        fair_value: fair_value.max(0.0),
        greeks: Greeks { delta, gamma, theta, vega, rho },
    })
}

/// Risk-neutral probability of finishing in the money: N(d2) for calls, N(−d2) for puts.
pub fn probability_itm(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    time_to_expiry: f64,
    rate: f64,
    volatility: f64,
) -> Result<f64> {
    check_inputs(spot, strike, time_to_expiry, rate, volatility)?;
    let (_, d2) = d1_d2(spot, strike, time_to_expiry, rate, volatility);
    Ok(match option_type {
        OptionType::Call => standard_normal_cdf(d2),
        OptionType::Put => standard_normal_cdf(-d2),
    })
}

/// Underlying price at expiry where a long single option breaks even.
#[inline]
pub fn breakeven(option_type: OptionType, strike: f64, premium: f64) -> f64 {
    match option_type {
        OptionType::Call => strike + premium,
        OptionType::Put => strike - premium,
    }
}

/// Solver budget and search domain for [`implied_volatility`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpliedVolSolver {
    pub min_vol: f64,
    pub max_vol: f64,
    pub max_iterations: usize,
    /// Absolute tolerance on price
    pub tolerance: f64,
}

impl Default for ImpliedVolSolver {
    fn default() -> Self {
        Self {
            min_vol: 1e-4,
            max_vol: 10.0,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// Implied volatility with the default solver settings ([0.01%, 1000%], 100 iterations, 1e-6).
pub fn implied_volatility(
    market_price: f64,
    option_type: OptionType,
    spot: f64,
    strike: f64,
    time_to_expiry: f64,
    rate: f64,
) -> Result<f64> {
    ImpliedVolSolver::default().solve(market_price, option_type, spot, strike, time_to_expiry, rate)
}

impl ImpliedVolSolver {
    /// Safeguarded Newton: each iteration tries a Newton step on vega and
    /// falls back to bisection whenever the step leaves the current bracket.
    ///
    /// Fails with `NoConvergence` when the bracket holds no root or the
    /// iteration budget runs out.
    pub fn solve(
        &self,
        market_price: f64,
        option_type: OptionType,
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        rate: f64,
    ) -> Result<f64> {
        check_inputs(spot, strike, time_to_expiry, rate, self.min_vol)?;
        if !(market_price.is_finite() && market_price >= 0.0) {
            return Err(EngineError::invalid(format!(
                "market price must be non-negative, got {market_price}"
            )));
        }

        let objective = |vol: f64| value(option_type, spot, strike, time_to_expiry, rate, vol) - market_price;

        let mut low = self.min_vol;
        let mut high = self.max_vol;
        let f_low = objective(low);
        let f_high = objective(high);

        if f_low.abs() < self.tolerance {
            return Ok(low);
        }
        if f_high.abs() < self.tolerance {
            return Ok(high);
        }
        // Price is increasing in vol, so a root needs f(low) < 0 < f(high)
        if f_low > 0.0 || f_high < 0.0 {
            let residual = if f_low > 0.0 { f_low } else { f_high };
            return Err(EngineError::NoConvergence { iterations: 0, residual });
        }

        // Brenner-Subrahmanyam seed, clamped into the bracket
        let mut vol = (market_price / spot * (2.0 * std::f64::consts::PI / time_to_expiry).sqrt())
            .clamp(low, high);
        let mut residual = objective(vol);

        for iteration in 1..=self.max_iterations {
            if residual.abs() < self.tolerance {
                return Ok(vol);
            }
            if residual > 0.0 {
                high = vol;
            } else {
                low = vol;
            }

            let (d1, _) = d1_d2(spot, strike, time_to_expiry, rate, vol);
            let vega = spot * standard_normal_pdf(d1) * time_to_expiry.sqrt();
            let newton = vol - residual / vega;

            vol = if vega > 1e-12 && newton > low && newton < high {
                newton
            } else {
                0.5 * (low + high)
            };
            residual = objective(vol);

            if iteration == self.max_iterations && residual.abs() >= self.tolerance {
                return Err(EngineError::NoConvergence { iterations: iteration, residual });
            }
        }

        if residual.abs() < self.tolerance {
            Ok(vol)
        } else {
            Err(EngineError::NoConvergence { iterations: self.max_iterations, residual })
        }
    }
}
