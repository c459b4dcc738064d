//! The six defined-risk strategy templates.
//!
//! Each template knows how to place its strikes around spot and how to read
//! its own closed-form payoff bounds off those strikes and the net premium.
//! Dispatch is a plain `match` on [`StrategyKind`].
//!
//! Strike placement: `round(spot * exp(k * sigma * sqrt(T)))` on the
//! configured strike grid, with `k` taken from [`StrikeRule`]. Rounding can
//! collapse two strikes onto one grid point at low volatility; the outer
//! strike is then pushed one increment further out so every structure keeps
//! its protective leg.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{StrikeRule, TemplateExpiries};
use crate::error::{EngineError, Result};
use crate::options::{net_premium, validate_legs, LegAction, OptionLeg, OptionType};

/// Template tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    IronCondor,
    Butterfly,
    BullCallSpread,
    BearPutSpread,
    CreditSpread,
    LongStraddle,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::IronCondor,
        StrategyKind::Butterfly,
        StrategyKind::BullCallSpread,
        StrategyKind::BearPutSpread,
        StrategyKind::CreditSpread,
        StrategyKind::LongStraddle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::IronCondor => "Iron Condor",
            StrategyKind::Butterfly => "Butterfly Spread",
            StrategyKind::BullCallSpread => "Bull Call Spread",
            StrategyKind::BearPutSpread => "Bear Put Spread",
            StrategyKind::CreditSpread => "Credit Spread",
            StrategyKind::LongStraddle => "Long Straddle",
        }
    }

    /// Stable index, used to derive an independent simulation stream per template.
    pub fn index(&self) -> usize {
        match self {
            StrategyKind::IronCondor => 0,
            StrategyKind::Butterfly => 1,
            StrategyKind::BullCallSpread => 2,
            StrategyKind::BearPutSpread => 3,
            StrategyKind::CreditSpread => 4,
            StrategyKind::LongStraddle => 5,
        }
    }

    /// Templates that open for a net credit.
    pub fn sells_premium(&self) -> bool {
        matches!(self, StrategyKind::IronCondor | StrategyKind::CreditSpread)
    }

    pub fn expiry_days(&self, expiries: &TemplateExpiries) -> u32 {
        match self {
            StrategyKind::IronCondor => expiries.iron_condor_days,
            StrategyKind::Butterfly => expiries.butterfly_days,
            StrategyKind::BullCallSpread => expiries.bull_call_spread_days,
            StrategyKind::BearPutSpread => expiries.bear_put_spread_days,
            StrategyKind::CreditSpread => expiries.credit_spread_days,
            StrategyKind::LongStraddle => expiries.long_straddle_days,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Market inputs for building one template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub spot: f64,
    pub volatility: f64,
    pub rate: f64,
    /// Years
    pub time_to_expiry: f64,
    pub rule: &'a StrikeRule,
}

impl TemplateContext<'_> {
    /// sigma * sqrt(T)
    #[inline]
    fn move_scale(&self) -> f64 {
        self.volatility * self.time_to_expiry.sqrt()
    }

    /// Spot shifted by `k` standard moves, unrounded.
    #[inline]
    fn shifted(&self, k: f64) -> f64 {
        self.spot * (k * self.move_scale()).exp()
    }

    fn strike(&self, k: f64) -> f64 {
        round_strike(self.shifted(k), self.rule.strike_increment)
    }

    fn atm(&self) -> f64 {
        self.strike(0.0)
    }

    /// `raw` if it lies strictly beyond `inner` in `direction`, otherwise one grid step past `inner`.
    fn beyond(&self, inner: f64, raw: f64, direction: f64) -> f64 {
        if (raw - inner) * direction > 0.0 {
            raw
        } else {
            inner + direction * self.rule.strike_increment
        }
    }

    fn leg(&self, option_type: OptionType, action: LegAction, strike: f64) -> Result<OptionLeg> {
        OptionLeg::priced(
            option_type,
            action,
            strike,
            self.spot,
            self.time_to_expiry,
            self.rate,
            self.volatility,
        )
    }
}

/// Round to the nearest listed strike. An increment of 0 leaves the price untouched.
#[inline]
pub fn round_strike(raw: f64, increment: f64) -> f64 {
    if increment > 0.0 {
        (raw / increment).round() * increment
    } else {
        raw
    }
}

/// Closed-form payoff bounds of a structure, per unit of underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffProfile {
    /// Credit positive, debit negative
    pub net_premium: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub breakevens: Vec<f64>,
}

/// Legs plus their analytic payoff profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Construction {
    pub legs: Vec<OptionLeg>,
    pub profile: PayoffProfile,
}

/// Build and price a template around spot.
pub fn construct(kind: StrategyKind, ctx: &TemplateContext<'_>) -> Result<Construction> {
    let construction = match kind {
        StrategyKind::IronCondor => iron_condor(ctx)?,
        StrategyKind::Butterfly => butterfly(ctx)?,
        StrategyKind::BullCallSpread => bull_call_spread(ctx)?,
        StrategyKind::BearPutSpread => bear_put_spread(ctx)?,
        StrategyKind::CreditSpread => credit_spread(ctx)?,
        StrategyKind::LongStraddle => long_straddle(ctx)?,
    };
    validate_legs(&construction.legs)?;
    Ok(construction)
}

fn iron_condor(ctx: &TemplateContext<'_>) -> Result<Construction> {
    let rule = ctx.rule;
    let short_call = ctx.beyond(ctx.atm(), ctx.strike(rule.short_sigma), 1.0);
    let long_call = ctx.beyond(short_call, ctx.strike(rule.wing_sigma), 1.0);
    let short_put = ctx.beyond(ctx.atm(), ctx.strike(-rule.short_sigma), -1.0);
    let long_put = ctx.beyond(short_put, ctx.strike(-rule.wing_sigma), -1.0);
    positive_strike(long_put)?;

    let legs = vec![
        ctx.leg(OptionType::Call, LegAction::Sell, short_call)?,
        ctx.leg(OptionType::Call, LegAction::Buy, long_call)?,
        ctx.leg(OptionType::Put, LegAction::Sell, short_put)?,
        ctx.leg(OptionType::Put, LegAction::Buy, long_put)?,
    ];
    let credit = net_premium(&legs);
    let widest = (long_call - short_call).max(short_put - long_put);

    Ok(Construction {
        profile: PayoffProfile {
            net_premium: credit,
            max_profit: credit,
            max_loss: widest - credit,
            breakevens: vec![short_put - credit, short_call + credit],
        },
        legs,
    })
}

fn butterfly(ctx: &TemplateContext<'_>) -> Result<Construction> {
    let body = ctx.atm();
    let increment = ctx.rule.strike_increment;
    let raw_width = ctx.spot * ((ctx.rule.spread_sigma * ctx.move_scale()).exp() - 1.0);
    let width = round_strike(raw_width, increment).max(increment);
    if !(width.is_finite() && width > 0.0) {
        return Err(EngineError::invalid("butterfly wing width collapsed to zero"));
    }
    let (lower, upper) = (body - width, body + width);
    positive_strike(lower)?;

    let legs = vec![
        ctx.leg(OptionType::Call, LegAction::Buy, lower)?,
        ctx.leg(OptionType::Call, LegAction::Sell, body)?,
        ctx.leg(OptionType::Call, LegAction::Sell, body)?,
        ctx.leg(OptionType::Call, LegAction::Buy, upper)?,
    ];
    let debit = -net_premium(&legs);

    Ok(Construction {
        profile: PayoffProfile {
            net_premium: -debit,
            max_profit: width - debit,
            max_loss: debit,
            breakevens: vec![lower + debit, upper - debit],
        },
        legs,
    })
}

fn bull_call_spread(ctx: &TemplateContext<'_>) -> Result<Construction> {
    let long = ctx.atm();
    let short = ctx.beyond(long, ctx.strike(ctx.rule.spread_sigma), 1.0);

    let legs = vec![
        ctx.leg(OptionType::Call, LegAction::Buy, long)?,
        ctx.leg(OptionType::Call, LegAction::Sell, short)?,
    ];
    let debit = -net_premium(&legs);

    Ok(Construction {
        profile: PayoffProfile {
            net_premium: -debit,
            max_profit: (short - long) - debit,
            max_loss: debit,
            breakevens: vec![long + debit],
        },
        legs,
    })
}

fn bear_put_spread(ctx: &TemplateContext<'_>) -> Result<Construction> {
    let long = ctx.atm();
    let short = ctx.beyond(long, ctx.strike(-ctx.rule.spread_sigma), -1.0);
    positive_strike(short)?;

    let legs = vec![
        ctx.leg(OptionType::Put, LegAction::Buy, long)?,
        ctx.leg(OptionType::Put, LegAction::Sell, short)?,
    ];
    let debit = -net_premium(&legs);

    Ok(Construction {
        profile: PayoffProfile {
            net_premium: -debit,
            max_profit: (long - short) - debit,
            max_loss: debit,
            breakevens: vec![long - debit],
        },
        legs,
    })
}

/// Bear call credit spread above spot.
fn credit_spread(ctx: &TemplateContext<'_>) -> Result<Construction> {
    let spread = ctx.rule.spread_sigma;
    let short = ctx.beyond(ctx.atm(), ctx.strike(spread), 1.0);
    let long = ctx.beyond(short, ctx.strike(2.0 * spread), 1.0);

    let legs = vec![
        ctx.leg(OptionType::Call, LegAction::Sell, short)?,
        ctx.leg(OptionType::Call, LegAction::Buy, long)?,
    ];
    let credit = net_premium(&legs);

    Ok(Construction {
        profile: PayoffProfile {
            net_premium: credit,
            max_profit: credit,
            max_loss: (long - short) - credit,
            breakevens: vec![short + credit],
        },
        legs,
    })
}

/// Long straddle. Upside is unbounded, so max profit is capped at the
/// payoff of a `wing_sigma` move to whichever side pays more.
fn long_straddle(ctx: &TemplateContext<'_>) -> Result<Construction> {
    let strike = ctx.atm();

    let legs = vec![
        ctx.leg(OptionType::Call, LegAction::Buy, strike)?,
        ctx.leg(OptionType::Put, LegAction::Buy, strike)?,
    ];
    let debit = -net_premium(&legs);
    let wing = ctx.rule.wing_sigma;
    let payoff_at_wing = (ctx.shifted(wing) - strike).max(strike - ctx.shifted(-wing));

    Ok(Construction {
        profile: PayoffProfile {
            net_premium: -debit,
            max_profit: payoff_at_wing - debit,
            max_loss: debit,
            breakevens: vec![strike - debit, strike + debit],
        },
        legs,
    })
}

fn positive_strike(strike: f64) -> Result<()> {
    if strike > 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid(format!(
            "strike grid too coarse for spot: lowest strike {strike}"
        )))
    }
}
