//! Data quality checks for supplied price history.
//!
//! The data collaborator owns fetching and retries; these checks only make
//! sure what arrived is usable before any indicator touches it.

use super::bar::PriceBar;
use crate::error::{EngineError, Result};

/// What is wrong with a single bar, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarDefect {
    NonFinite,
    NonPositivePrice,
    HighBelowBody,
    LowAboveBody,
    NegativeVolume,
    OutOfSequence,
}

/// Inspect one bar against its predecessor.
#[inline]
pub fn inspect_bar(bar: &PriceBar, prev: Option<&PriceBar>) -> Option<BarDefect> {
    let prices = [bar.open, bar.high, bar.low, bar.close];
    if prices.iter().any(|p| !p.is_finite()) || !bar.volume.is_finite() {
        return Some(BarDefect::NonFinite);
    }
    if prices.iter().any(|&p| p <= 0.0) {
        return Some(BarDefect::NonPositivePrice);
    }
    if bar.high < bar.open.max(bar.close) {
        return Some(BarDefect::HighBelowBody);
    }
    if bar.low > bar.open.min(bar.close) {
        return Some(BarDefect::LowAboveBody);
    }
    if bar.volume < 0.0 {
        return Some(BarDefect::NegativeVolume);
    }
    if let Some(prev) = prev {
        if bar.timestamp <= prev.timestamp {
            return Some(BarDefect::OutOfSequence);
        }
    }
    None
}

/// Reject the whole window on the first defective bar.
pub fn validate_bars(bars: &[PriceBar]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        let prev = if i > 0 { bars.get(i - 1) } else { None };
        if let Some(defect) = inspect_bar(bar, prev) {
            return Err(EngineError::invalid(format!("price bar {i} rejected: {defect:?}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(minutes: i64, close: f64) -> PriceBar {
        PriceBar {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn test_clean_window_passes() {
        let bars: Vec<_> = (0..5).map(|i| bar(i * 60, 100.0 + i as f64)).collect();
        assert!(validate_bars(&bars).is_ok());
        assert!(validate_bars(&[]).is_ok());
    }

    #[test]
    fn test_defects() {
        let mut b = bar(0, 100.0);
        b.high = 99.0;
        assert_eq!(inspect_bar(&b, None), Some(BarDefect::HighBelowBody));

        let mut b = bar(0, 100.0);
        b.low = f64::NAN;
        assert_eq!(inspect_bar(&b, None), Some(BarDefect::NonFinite));

        let mut b = bar(0, 100.0);
        b.volume = -1.0;
        assert_eq!(inspect_bar(&b, None), Some(BarDefect::NegativeVolume));

        let later = bar(60, 100.0);
        assert_eq!(inspect_bar(&bar(0, 100.0), Some(&later)), Some(BarDefect::OutOfSequence));
    }

    #[test]
    fn test_window_rejects_duplicate_timestamp() {
        let bars = [bar(0, 100.0), bar(0, 101.0)];
        assert!(matches!(validate_bars(&bars), Err(EngineError::InvalidParameters(_))));
    }
}
