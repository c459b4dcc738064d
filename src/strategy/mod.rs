//! Strategy templates, scoring and selection

pub mod candidate;
pub mod scoring;
pub mod selector;
pub mod templates;

pub use candidate::{net_greeks, Alternative, ScoredCandidate, StrategyCandidate};
pub use scoring::{regime_fit, score, ScoreInputs};
pub use selector::{StrategySelector, ALTERNATIVES};
pub use templates::{construct, round_strike, Construction, PayoffProfile, StrategyKind, TemplateContext};
