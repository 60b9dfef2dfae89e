//! Geometry primitives for the rig kernel

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A solved pair of rod-mount positions for one actuator position sample.
///
/// Invariants for a converged solve:
/// - `mount_1.x == mount_2.x` (the platform axis pair is aligned with X)
/// - `|mount_i|` equals the rod mount length
/// - `|mount_1 - mount_2|` equals the rod mount width
#[derive(Clone, Copy, Debug, Serialize)]
pub struct MountPair {
    /// Rod mount on the positive-Z side.
    pub mount_1: Vector3<f64>,

    /// Rod mount on the negative-Z side.
    pub mount_2: Vector3<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MountPair {
    /// The nominal (neutral attitude) mount pair: the configured rod mount
    /// point and its mirror in the XY plane.
    ///
    /// Used as the initial solver guess at the neutral actuator position.
    pub fn nominal(rod_mount: Vector3<f64>) -> Self {
        MountPair {
            mount_1: rod_mount,
            mount_2: Vector3::new(rod_mount.x, rod_mount.y, -rod_mount.z),
        }
    }

    /// Midpoint of the two mounts.
    pub fn mean(&self) -> Vector3<f64> {
        (self.mount_1 + self.mount_2) / 2.0
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Euclidean distance between two points.
pub fn dist(point_1: Vector3<f64>, point_2: Vector3<f64>) -> f64 {
    (point_1 - point_2).norm()
}

/// Euclidean distance of a point from the origin (the platform pivot).
pub fn dist_from_origin(point: Vector3<f64>) -> f64 {
    point.norm()
}

/// Position of a rotary actuator's arm endpoint.
///
/// The bell-crank arm of length `arm_length` pivots at `pivot`. The motor
/// shaft is tilted by `motor_angle` in the ZX plane and the arm makes
/// `actuator_angle` with the shaft plane.
///
/// Units: radians for both angles.
pub fn actuator_endpoint(
    pivot: Vector3<f64>,
    motor_angle: f64,
    actuator_angle: f64,
    arm_length: f64,
) -> Vector3<f64> {
    Vector3::new(
        pivot.x + arm_length * motor_angle.cos() * actuator_angle.cos(),
        pivot.y + arm_length * actuator_angle.sin(),
        pivot.z + arm_length * motor_angle.sin() * actuator_angle.cos(),
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dist_properties() {
        let points = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(3.0, 4.0, 5.0),
            Vector3::new(-1.5, 0.25, 9.0),
        ];

        for &p in points.iter() {
            // Non-negative from the origin, zero between identical points
            assert!(dist_from_origin(p) >= 0.0);
            assert_eq!(dist(p, p), 0.0);

            for &q in points.iter() {
                // Symmetric
                assert_eq!(dist(p, q), dist(q, p));
            }
        }

        assert!((dist_from_origin(Vector3::new(3.0, 4.0, 5.0))
            - 7.0710678118654755)
            .abs()
            < 1e-12);
        assert!((dist(Vector3::new(3.0, 4.0, 5.0), Vector3::new(8.0, 10.0, 12.0))
            - 10.488088481701515)
            .abs()
            < 1e-12);
    }

    #[test]
    fn test_actuator_endpoint() {
        let pivot = Vector3::new(450.0, 100.0, 200.0);

        let endpoint = actuator_endpoint(
            pivot,
            45f64.to_radians(),
            30f64.to_radians(),
            100.0,
        );

        let expected = Vector3::new(511.23724357, 150.0, 261.23724357);
        assert!((endpoint - expected).norm() < 1e-6);

        // Mirroring the pivot and negating the motor angle mirrors the
        // endpoint in the XY plane
        let mut mirrored_pivot = pivot;
        mirrored_pivot.z *= -1.0;

        let mirrored = actuator_endpoint(
            mirrored_pivot,
            -(45f64.to_radians()),
            30f64.to_radians(),
            100.0,
        );

        assert!((mirrored.x - endpoint.x).abs() < 1e-9);
        assert!((mirrored.y - endpoint.y).abs() < 1e-9);
        assert!((mirrored.z + endpoint.z).abs() < 1e-9);
    }

    #[test]
    fn test_nominal_mount_pair() {
        let pair = MountPair::nominal(Vector3::new(23.0, 28.0, 8.5));

        assert_eq!(pair.mount_1.x, pair.mount_2.x);
        assert_eq!(pair.mount_1.y, pair.mount_2.y);
        assert_eq!(pair.mount_1.z, -pair.mount_2.z);
        assert_eq!(pair.mean(), Vector3::new(23.0, 28.0, 0.0));
    }
}
