//! Statistical utility functions
//!
//! Consolidated normal-distribution helpers shared by pricing and simulation.
//! All functions are inlined for zero-cost abstraction.

/// Standard normal probability density function
///
/// # Examples
///
/// ```
/// use options_advisor::probability::utils::standard_normal_pdf;
///
/// let pdf = standard_normal_pdf(0.0); // Peak of normal distribution
/// assert!((pdf - 0.3989422804014327).abs() < 1e-10);
/// ```
#[inline(always)]
pub fn standard_normal_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.3989422804014327; // 1 / sqrt(2π)
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal cumulative distribution function
///
/// Uses the error function approximation below.
///
/// ```
/// use options_advisor::probability::utils::standard_normal_cdf;
///
/// let cdf = standard_normal_cdf(0.0);
/// assert!((cdf - 0.5).abs() < 1e-6);
/// ```
#[inline]
pub fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Error function approximation (Abramowitz and Stegun 7.1.26)
///
/// Maximum error: 1.5e-7
#[inline]
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;

    sign * (1.0 - poly * (-x * x).exp())
}

/// Sample mean and unbiased standard deviation in one pass (Welford).
///
/// Returns `(mean, 0.0)` for fewer than two observations.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &x) in values.iter().enumerate() {
        let delta = x - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (x - mean);
    }
    let std = if values.len() > 1 {
        (m2 / (values.len() - 1) as f64).sqrt()
    } else {
        0.0
    };
    (mean, std)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_symmetry() {
        for &x in &[0.1, 0.5, 1.0, 1.96, 3.0] {
            let sum = standard_normal_cdf(x) + standard_normal_cdf(-x);
            assert!((sum - 1.0).abs() < 1e-12);
        }
        assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-4);
    }

    #[test]
    fn test_mean_std() {
        let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std - 2.138089935299395).abs() < 1e-12);

        assert_eq!(mean_std(&[3.0]), (3.0, 0.0));
    }
}
