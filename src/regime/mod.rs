pub mod detector;

pub use detector::{
    containment_confidence, exceedance_confidence, Regime, RegimeAssessment, RegimeDetector,
};
