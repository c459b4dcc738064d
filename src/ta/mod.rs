//! Technical indicators used by the regime detector
//!
//! ```
//! use options_advisor::ta::Sma;
//!
//! let mut sma = Sma::new(3);
//! sma.update(100.0);
//! sma.update(101.0);
//! assert_eq!(sma.update(102.0), Some(101.0));
//! ```

pub mod indicators;

pub use indicators::*;
