//! Approximate-factor test
//!
//! Decides whether one price is roughly a fixed multiple of another, which is
//! how a switch between major and minor currency units (dollars vs. cents)
//! shows up in a price series.

/// Relative difference between `num1 * factor` and `num2`.
///
/// Returns `None` when `num2` is zero, since no relative difference exists.
pub fn factor_relative_difference(num1: f64, num2: f64, factor: f64) -> Option<f64> {
    if num2 == 0.0 {
        return None;
    }

    let candidate = num1 * factor;
    Some(((candidate - num2) / num2).abs())
}

/// Test if `num1 * factor` is close to `num2`, within `margin`.
///
/// `margin` is a fraction of `num2` (0.01 = 1%). A zero `num2` never matches,
/// and neither does anything involving NaN.
///
/// ```
/// use denomfix::services::is_approximate_factor;
///
/// assert!(is_approximate_factor(1.0, 100.5, 100.0, 0.01));
/// assert!(!is_approximate_factor(50.0, 50.1, 100.0, 0.01));
/// assert!(!is_approximate_factor(1.0, 0.0, 100.0, 0.5));
/// ```
pub fn is_approximate_factor(num1: f64, num2: f64, factor: f64, margin: f64) -> bool {
    match factor_relative_difference(num1, num2, factor) {
        Some(difference) => difference < margin,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dollar_to_cent_match() {
        // 1.00 * 100 = 100.00 vs 100.50 -> ~0.5% off
        assert!(is_approximate_factor(1.0, 100.5, 100.0, 0.01));
        assert!(is_approximate_factor(1.0, 99.8, 100.0, 0.005));
        assert!(!is_approximate_factor(1.0, 99.4, 100.0, 0.005));
    }

    #[test]
    fn test_same_denomination_does_not_match() {
        assert!(!is_approximate_factor(50.0, 50.1, 100.0, 0.01));
        assert!(!is_approximate_factor(50.0, 50.1, 100.0, 0.70));
    }

    #[test]
    fn test_zero_guard() {
        for num1 in [0.0, 1.0, -3.5, 1e9] {
            for factor in [1.0, 100.0, 1000.0] {
                for margin in [0.0, 0.01, 0.7, 1.0] {
                    assert!(!is_approximate_factor(num1, 0.0, factor, margin));
                }
            }
        }
        assert_eq!(factor_relative_difference(5.0, 0.0, 100.0), None);
        assert!(!is_approximate_factor(5.0, -0.0, 100.0, 1.0));
    }

    #[test]
    fn test_zero_num1_is_full_difference() {
        // 0 * 100 = 0 vs 75 -> relative difference exactly 1
        assert_eq!(factor_relative_difference(0.0, 75.0, 100.0), Some(1.0));
        assert!(!is_approximate_factor(0.0, 75.0, 100.0, 0.70));
        assert!(!is_approximate_factor(0.0, 75.0, 100.0, 1.0));
    }

    #[test]
    fn test_margin_bounds() {
        // Zero margin disables matching, even for an exact multiple
        assert!(!is_approximate_factor(1.0, 100.0, 100.0, 0.0));
        // Margin 1 matches anything strictly closer than 100% away
        assert!(is_approximate_factor(1.0, 190.0, 100.0, 1.0));
        assert!(is_approximate_factor(50.0, 50.1, 1.0, 0.01));
    }

    #[test]
    fn test_matches_absolute_form() {
        // |num1*f - num2| < m*|num2|, checked away from the boundary
        let cases: [(f64, f64, f64, f64, bool); 8] = [
            (1.0, 100.5, 100.0, 0.01, true),
            (1.0, 102.0, 100.0, 0.01, false),
            (2.5, 249.0, 100.0, 0.05, true),
            (2.5, 200.0, 100.0, 0.05, false),
            (0.3, 300.0, 1000.0, 0.02, true),
            (12.0, 1.2, 0.1, 0.01, true),
            (-1.0, 100.0, 100.0, 0.5, false),
            (-1.0, -100.0, 100.0, 0.01, true),
        ];

        for (num1, num2, factor, margin, expected) in cases {
            let absolute_form = (num1 * factor - num2).abs() < margin * f64::abs(num2);
            assert_eq!(absolute_form, expected, "absolute form for {:?}", (num1, num2));
            assert_eq!(
                is_approximate_factor(num1, num2, factor, margin),
                expected,
                "num1={} num2={} factor={} margin={}",
                num1,
                num2,
                factor,
                margin
            );
        }
    }

    #[test]
    fn test_nan_never_matches() {
        assert!(!is_approximate_factor(f64::NAN, 100.0, 100.0, 1.0));
        assert!(!is_approximate_factor(1.0, f64::NAN, 100.0, 1.0));
    }
}
