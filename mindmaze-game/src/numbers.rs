//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a count to f64, allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(f64::MAX)
}

/// Floor a non-negative f64 into usize, returning 0 for NaN or negative values.
#[must_use]
pub fn floor_f64_to_usize(value: f64) -> usize {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    cast::<f64, usize>(value.floor()).unwrap_or(usize::MAX)
}

/// `floor(total * fraction)`, the way gate counts are derived from the cell count.
#[must_use]
pub fn floor_fraction(total: usize, fraction: f64) -> usize {
    floor_f64_to_usize(usize_to_f64(total) * fraction)
}

/// Euclidean distance between two grid coordinates.
#[must_use]
pub fn grid_distance(ax: usize, ay: usize, bx: usize, by: usize) -> f64 {
    let dx = usize_to_f64(ax.abs_diff(bx));
    let dy = usize_to_f64(ay.abs_diff(by));
    dx.hypot(dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_handles_edges() {
        assert_eq!(floor_f64_to_usize(f64::NAN), 0);
        assert_eq!(floor_f64_to_usize(-3.2), 0);
        assert_eq!(floor_f64_to_usize(7.99), 7);
    }

    #[test]
    fn fraction_matches_gate_counts() {
        assert_eq!(floor_fraction(1, 0.15), 0);
        assert_eq!(floor_fraction(9, 0.15), 1);
        assert_eq!(floor_fraction(64, 0.15), 9);
        assert_eq!(floor_fraction(100, 0.15), 15);
    }

    #[test]
    fn distance_is_symmetric() {
        assert!((grid_distance(0, 0, 3, 4) - 5.0).abs() < f64::EPSILON);
        assert!((grid_distance(3, 4, 0, 0) - 5.0).abs() < f64::EPSILON);
        assert!(grid_distance(2, 2, 3, 3) < 1.5);
    }
}
