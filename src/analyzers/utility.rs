/// Sums the present values. Missing values are skipped; an all-missing input sums to 0.0.
pub fn sum(values: &[Option<f64>]) -> f64 {
    values.iter().flatten().sum()
}

/// Computes the arithmetic mean of the present values.
/// Returns NaN when no value is present.
pub fn mean(values: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return f64::NAN;
    }
    present.iter().sum::<f64>() / present.len() as f64
}

/// Largest non-NaN value of a column. Returns NaN when every value is NaN or the column is empty.
pub fn column_max(values: impl IntoIterator<Item = f64>) -> f64 {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(f64::NAN, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_skips_missing() {
        assert_eq!(sum(&[Some(10.0), None, Some(20.0)]), 30.0);
        assert_eq!(sum(&[None, None]), 0.0);
        assert_eq!(sum(&[]), 0.0);
    }

    #[test]
    fn test_mean_skips_missing() {
        assert_eq!(mean(&[Some(5.0), None, Some(7.0)]), 6.0);
        assert_eq!(mean(&[Some(4.5)]), 4.5);
    }

    #[test]
    fn test_mean_all_missing_is_nan() {
        assert!(mean(&[None]).is_nan());
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_column_max_ignores_nan() {
        assert_eq!(column_max([1.0, f64::NAN, 3.0, 2.0]), 3.0);
        assert!(column_max([f64::NAN]).is_nan());
        assert!(column_max(std::iter::empty()).is_nan());
    }
}
