//! Stochastic processes for modeling the underlying
//!
//! # Geometric Brownian Motion (GBM)
//!
//! dS = μS dt + σS dW
//!
//! Where:
//! - S = asset price
//! - μ = drift (the risk-free rate under the risk-neutral measure)
//! - σ = volatility (annualized)
//! - dW = Wiener process
//!
//! GBM has an exact solution, so a terminal price over any horizon is one
//! normal draw away:
//!
//! S_T = S_0 · exp((μ − σ²/2)·T + σ·√T·Z)
//!
//! ```
//! use options_advisor::probability::stochastic::GBM;
//! use options_advisor::probability::Process;
//!
//! // Risk-neutral BTC: 5% rate, 65% vol, one 30-day step
//! let gbm = GBM::new(0.05, 0.65, 30.0 / 365.0);
//! let terminal = gbm.step(50_000.0, 0.0);
//! assert!(terminal < 50_000.0); // median sits below spot by the convexity term
//! ```

use super::Process;

/// Geometric Brownian Motion (GBM)
///
/// Prices stay strictly positive, which matches listed underlyings.
///
/// # Fields
///
/// - `mu`: Drift (expected return per unit time)
/// - `sigma`: Volatility (standard deviation of log returns per unit time)
/// - `dt`: Step size in years
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GBM {
    /// Drift parameter (μ)
    pub mu: f64,
    /// Volatility parameter (σ)
    pub sigma: f64,
    /// Time step (dt)
    pub dt: f64,
    drift: f64,
    diffusion: f64,
}

impl GBM {
    pub fn new(mu: f64, sigma: f64, dt: f64) -> Self {
        Self {
            mu,
            sigma,
            dt,
            drift: (mu - 0.5 * sigma * sigma) * dt,
            diffusion: sigma * dt.sqrt(),
        }
    }

    /// Risk-neutral dynamics over a single step to expiry.
    pub fn risk_neutral(rate: f64, sigma: f64, time_to_expiry: f64) -> Self {
        Self::new(rate, sigma, time_to_expiry)
    }
}

impl Process for GBM {
    #[inline]
    fn step(&self, state: f64, z: f64) -> f64 {
        state * (self.drift + self.diffusion * z).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_matches_closed_form() {
        let gbm = GBM::new(0.05, 0.2, 0.5);
        let expected = 100.0 * ((0.05 - 0.02) * 0.5 + 0.2 * 0.5_f64.sqrt() * 1.3).exp();
        assert!((gbm.step(100.0, 1.3) - expected).abs() < 1e-10);
    }

    #[test]
    fn test_stays_positive() {
        let gbm = GBM::risk_neutral(0.05, 3.0, 1.0);
        assert!(gbm.step(100.0, -8.0) > 0.0);
    }
}
