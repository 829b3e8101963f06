//! Math utility functions

/// Standard logistic sigmoid, `1 / (1 + e^-x)`
///
/// Evaluated in a form that never overflows for large |x|.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Percentage of `count` over `total`, rounded half away from zero.
/// Returns 0 for an empty total.
pub fn rounded_percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.5)]
    #[case(2.0, 0.880_797)]
    #[case(-1.0, 0.268_941)]
    #[case(100.0, 1.0)]
    #[case(-100.0, 0.0)]
    fn test_sigmoid_values(#[case] logit: f32, #[case] expected: f32) {
        assert!((sigmoid(logit) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_sigmoid_bounded_and_monotonic() {
        let logits: Vec<f32> = (-400..=400).map(|i| i as f32 * 0.25).collect();
        let probs: Vec<f32> = logits.iter().map(|&l| sigmoid(l)).collect();

        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(probs.windows(2).all(|w| w[0] <= w[1]));
        assert!(sigmoid(f32::MAX).is_finite());
        assert!(sigmoid(f32::MIN).is_finite());
    }

    #[rstest]
    #[case(2, 3, 67)]
    #[case(1, 3, 33)]
    #[case(1, 2, 50)]
    #[case(0, 24, 0)]
    #[case(24, 24, 100)]
    #[case(5, 0, 0)]
    fn test_rounded_percentage(#[case] count: usize, #[case] total: usize, #[case] expected: u32) {
        assert_eq!(rounded_percentage(count, total), expected);
    }
}
