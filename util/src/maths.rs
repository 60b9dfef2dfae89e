//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a value between a minimum and a maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Return `num_points` evenly spaced values over `[start, end]`, inclusive of
/// both endpoints.
///
/// The final value is set to `end` exactly rather than accumulated, so the
/// endpoint lands on the sequence regardless of floating point drift.
///
/// # Panics
///
/// - If `num_points` is less than 2.
pub fn linspace<T>(start: T, end: T, num_points: usize) -> Vec<T>
where
    T: Float
{
    assert!(num_points >= 2, "linspace requires at least 2 points");

    let step = (end - start) / T::from(num_points - 1).unwrap();

    let mut points: Vec<T> = (0..num_points)
        .map(|i| start + step * T::from(i).unwrap())
        .collect();

    points[num_points - 1] = end;

    points
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&0.5f64, &0f64, &1f64), 0.5);
        assert_eq!(clamp(&-0.5f64, &0f64, &1f64), 0.0);
        assert_eq!(clamp(&1.5f64, &0f64, &1f64), 1.0);
    }

    #[test]
    fn test_linspace() {
        let points = linspace(0f64, 1f64, 5);

        assert_eq!(points.len(), 5);
        assert_eq!(points[0], 0.0);
        assert_eq!(points[2], 0.5);
        assert_eq!(points[4], 1.0);

        // Endpoint is exact even when the step has no exact binary
        // representation
        let points = linspace(0f64, 0.3f64, 4);
        assert_eq!(points[3], 0.3);
    }

    #[test]
    fn test_linspace_descending() {
        let points = linspace(1f64, 0f64, 3);

        assert_eq!(points, vec![1.0, 0.5, 0.0]);
    }
}
