/// Whether `value` lies in the closed interval spanned by `x1` and `x2`,
/// in either order.
pub fn is_between(value: f64, x1: f64, x2: f64) -> bool {
    (value <= x1 && value >= x2) || (value <= x2 && value >= x1)
}

/// Whether any part of `[begin, end]` falls inside `[range_start, range_end]`.
///
/// True when either endpoint lies in the range, or when the interval strictly
/// contains the range. Used for on-screen culling.
pub fn is_in_range(begin: f64, end: f64, range_start: f64, range_end: f64) -> bool {
    is_between(begin, range_start, range_end)
        || is_between(end, range_start, range_end)
        || (begin < range_start && end > range_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_between_is_order_independent() {
        let samples = [-3.0, 0.0, 1.5, 5.0, 10.0, 12.0];
        for &v in &samples {
            for &a in &samples {
                for &b in &samples {
                    assert_eq!(is_between(v, a, b), is_between(v, b, a), "{v} {a} {b}");
                }
            }
        }
    }

    #[test]
    fn test_is_between_is_closed() {
        assert!(is_between(0.0, 0.0, 10.0));
        assert!(is_between(10.0, 0.0, 10.0));
        assert!(is_between(5.0, 5.0, 5.0));
        assert!(!is_between(10.1, 0.0, 10.0));
    }

    #[test]
    fn test_is_in_range() {
        assert!(!is_in_range(10.0, 20.0, 0.0, 5.0));
        assert!(!is_in_range(10.0, 20.0, 25.0, 30.0));
        assert!(is_in_range(10.0, 20.0, 15.0, 25.0));
        assert!(is_in_range(10.0, 20.0, 5.0, 15.0));
        assert!(is_in_range(10.0, 20.0, 12.0, 18.0));
        assert!(is_in_range(12.0, 18.0, 10.0, 20.0));
    }

    #[test]
    fn test_is_in_range_touching_edges() {
        assert!(is_in_range(10.0, 20.0, 20.0, 30.0));
        assert!(is_in_range(10.0, 20.0, 0.0, 10.0));
    }
}
