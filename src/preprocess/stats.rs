//! Order statistics.

use ndarray::ArrayView1;

/// Finite values of `values`, sorted ascending. NaNs are dropped.
pub fn sorted_values(values: ArrayView1<'_, f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Quantile `q` of an ascending slice using linear interpolation.
///
/// The position is `q * (n - 1)`; the result interpolates between the two
/// neighbouring order statistics. Returns `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    debug_assert!((0.0..=1.0).contains(&q));
    let last = sorted.len().checked_sub(1)?;
    let pos = q * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Median of `values`, ignoring NaNs.
///
/// Even-length inputs average the two middle values.
pub fn median(values: ArrayView1<'_, f64>) -> Option<f64> {
    quantile_sorted(&sorted_values(values), 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rstest::rstest;

    #[rstest]
    #[case(0.25, 2.25)]
    #[case(0.5, 3.5)]
    #[case(0.75, 4.75)]
    #[case(0.0, 1.0)]
    #[case(1.0, 100.0)]
    fn quantile_interpolates(#[case] q: f64, #[case] expected: f64) {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert_abs_diff_eq!(quantile_sorted(&sorted, q).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn quantile_of_single_value() {
        assert_eq!(quantile_sorted(&[7.0], 0.25), Some(7.0));
        assert_eq!(quantile_sorted(&[7.0], 0.75), Some(7.0));
    }

    #[test]
    fn quantile_of_empty_is_none() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(array![3.0, 1.0, 2.0].view()), Some(2.0));
        assert_eq!(median(array![4.0, 1.0, 3.0, 2.0].view()), Some(2.5));
    }

    #[test]
    fn median_skips_nan() {
        assert_eq!(median(array![f64::NAN, 1.0, 3.0].view()), Some(2.0));
        assert_eq!(median(array![f64::NAN].view()), None);
    }
}
