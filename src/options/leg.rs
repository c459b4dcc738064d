//! A single option position inside a multi-leg structure.

use serde::{Deserialize, Serialize};

use super::pricing::{price, Greeks, OptionType};
use crate::error::{EngineError, Result};

/// Whether the leg is bought (debit) or sold (credit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegAction {
    Buy,
    Sell,
}

impl LegAction {
    /// +1 for long, -1 for short.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            LegAction::Buy => 1.0,
            LegAction::Sell => -1.0,
        }
    }
}

/// One contract unit of a call or put at an absolute strike.
///
/// `premium` is the fair value per unit of underlying at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionLeg {
    pub option_type: OptionType,
    pub action: LegAction,
    pub strike: f64,
    /// Years to expiry
    pub expiry: f64,
    pub quantity: u32,
    pub premium: f64,
    /// Per unit of underlying, signed by `action`
    pub greeks: Greeks,
}

impl OptionLeg {
    /// Price a leg with the closed-form model.
    pub fn priced(
        option_type: OptionType,
        action: LegAction,
        strike: f64,
        spot: f64,
        expiry: f64,
        rate: f64,
        volatility: f64,
    ) -> Result<Self> {
        let quote = price(option_type, spot, strike, expiry, rate, volatility)?;
        Ok(Self {
            option_type,
            action,
            strike,
            expiry,
            quantity: 1,
            premium: quote.fair_value,
            greeks: quote.greeks.scale(action.sign()),
        })
    }

    /// Premium flow at entry: positive when received, negative when paid.
    #[inline]
    pub fn signed_premium(&self) -> f64 {
        -self.action.sign() * self.premium * self.quantity as f64
    }

    /// Net P&L at expiry for a terminal underlying price, per unit of underlying.
    #[inline]
    pub fn pnl_at_expiry(&self, terminal: f64) -> f64 {
        let intrinsic = self.option_type.intrinsic(terminal, self.strike);
        self.action.sign() * intrinsic * self.quantity as f64 + self.signed_premium()
    }
}

/// Net P&L at expiry of a whole leg set.
#[inline]
pub fn net_pnl_at_expiry(legs: &[OptionLeg], terminal: f64) -> f64 {
    legs.iter().map(|leg| leg.pnl_at_expiry(terminal)).sum()
}

/// Net premium flow: credit positive, debit negative.
#[inline]
pub fn net_premium(legs: &[OptionLeg]) -> f64 {
    legs.iter().map(OptionLeg::signed_premium).sum()
}

/// A leg set is well formed when it holds 1 to 4 legs with positive strikes,
/// positive quantities and a single shared expiry.
pub fn validate_legs(legs: &[OptionLeg]) -> Result<()> {
    if legs.is_empty() || legs.len() > 4 {
        return Err(EngineError::invalid(format!("expected 1 to 4 legs, got {}", legs.len())));
    }
    let expiry = legs[0].expiry;
    for leg in legs {
        if !(leg.strike.is_finite() && leg.strike > 0.0) {
            return Err(EngineError::invalid(format!("leg strike must be positive, got {}", leg.strike)));
        }
        if !(leg.premium.is_finite() && leg.premium >= 0.0) {
            return Err(EngineError::invalid(format!("leg premium must be non-negative, got {}", leg.premium)));
        }
        if leg.quantity == 0 {
            return Err(EngineError::invalid("leg quantity must be at least 1"));
        }
        if (leg.expiry - expiry).abs() > f64::EPSILON {
            return Err(EngineError::invalid("all legs must share one expiry"));
        }
    }
    if !(expiry.is_finite() && expiry > 0.0) {
        return Err(EngineError::invalid(format!("time to expiry must be positive, got {expiry}")));
    }
    Ok(())
}
