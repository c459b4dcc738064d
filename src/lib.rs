//! # Options Advisor
//!
//! Decision engine for defined-risk options strategies on a single underlying.
//!
//! ## Pipeline
//!
//! 1. **Regime**: SMA/ATR rules classify the market as ranging, trending or volatile
//! 2. **Templates**: six strategies are built around spot with volatility-scaled strikes
//! 3. **Pricing**: every leg is priced with Black-Scholes, Greeks included
//! 4. **POP**: Monte Carlo over the terminal price distribution, in parallel
//! 5. **Selection**: best score above the POP floor wins
//! 6. **Sizing**: whole contracts inside the per-trade risk budget
//!
//! ## Modules
//!
//! - `config`: `EngineConfig`, passed explicitly into every entry point
//! - `data`: Price bars, quality checks, historical volatility
//! - `ta`: SMA, ATR, trend strength
//! - `options`: Black-Scholes pricing, Greeks, implied volatility, option legs
//! - `probability`: Monte Carlo probability of profit
//! - `regime`: Rule-based regime detector
//! - `strategy`: Templates, scoring, selection
//! - `risk`: Position sizing
//! - `recommendation`: The final record
//! - `engine`: Bars in, recommendation out
//!
//! ## Example
//!
//! ```rust
//! use options_advisor::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
//! let snapshot = MarketSnapshot::new(50_000.0, 0.65, now).unwrap();
//! let config = EngineConfig::default();
//!
//! match StrategySelector::default().select(Regime::Ranging, 80.0, &snapshot, 5_000.0, &config) {
//!     Ok(Some(rec)) => println!("{rec}"),
//!     Ok(None) => println!("no trade"),
//!     Err(e) => println!("cannot trade: {e}"),
//! }
//! ```

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod options;
pub mod probability;
pub mod recommendation;
pub mod regime;
pub mod risk;
pub mod strategy;
pub mod ta;

/// Common imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::error::{EngineError, Result};

    // Data
    pub use crate::data::{historical_volatility, validate_bars, MarketSnapshot, PriceBar};

    // Options Pricing
    pub use crate::options::{
        breakeven,
        implied_volatility,
        price,
        probability_itm,
        Greeks,
        ImpliedVolSolver,
        LegAction,
        OptionLeg,
        OptionQuote,
        OptionType,
    };

    // Probability
    pub use crate::probability::{MonteCarloEngine, PayoffStatistics};

    // Regime Detection
    pub use crate::regime::{Regime, RegimeAssessment, RegimeDetector};

    // Strategy
    pub use crate::strategy::{
        Alternative,
        ScoredCandidate,
        StrategyCandidate,
        StrategyKind,
        StrategySelector,
    };

    // Risk
    pub use crate::risk::{PositionSize, PositionSizer};

    pub use crate::engine::StrategyEngine;
    pub use crate::recommendation::{
        Recommendation,
        RecommendationAssembler,
        RiskAssessment,
        RiskLevel,
        TradingWindow,
    };
}
