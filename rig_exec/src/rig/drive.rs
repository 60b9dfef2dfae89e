//! Drive-mode abstraction
//!
//! Everything the kernel needs to know about an actuator pair (endpoint
//! locations, push-rod lengths, travel range and sweep granularity) is
//! behind [`Drive`]. The solver, continuation propagator and grid engine
//! never branch on the drive mode themselves.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
use super::geom::actuator_endpoint;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Grid spacing of a rotary sweep.
///
/// Units: radians
const ROTARY_GRID_SPACING_RAD: f64 = 2.5 * std::f64::consts::PI / 180.0;

/// Finite difference half-step of a rotary sweep.
///
/// Units: radians
const ROTARY_FD_DELTA_RAD: f64 = std::f64::consts::PI / 180.0;

/// Number of grid intervals per axis of a linear sweep.
///
/// Chosen to match the rotary grid density at its default 45 degree sweep.
const LINEAR_GRID_INTERVALS: f64 = 18.0;

/// Finite difference half-step of a linear sweep, as a fraction of travel.
const LINEAR_FD_FRACTION: f64 = 0.01;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One side of the mirrored actuator pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// The positive-Z side.
    One,

    /// The negative-Z side.
    Two,
}

/// The actuator pair fitted to a rig.
///
/// An actuator *position* is the drive's own coordinate: a crank angle in
/// radians for [`Drive::Rotary`], a push-rod length for [`Drive::Linear`].
#[derive(Clone, Debug)]
pub enum Drive {
    Rotary(RotaryDrive),
    Linear(LinearDrive),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pair of rotary bell-crank (CTC) actuators.
#[derive(Clone, Debug)]
pub struct RotaryDrive {
    /// Motor shaft position, positive-Z side.
    pub pivot_1: Vector3<f64>,

    /// Motor shaft position, negative-Z side (mirror of side one).
    pub pivot_2: Vector3<f64>,

    /// Motor shaft tilt, positive-Z side.
    ///
    /// Units: radians
    pub motor_angle_1: f64,

    /// Motor shaft tilt, negative-Z side (negated side one angle).
    ///
    /// Units: radians
    pub motor_angle_2: f64,

    /// Bell-crank arm length.
    pub ctc_length: f64,

    /// Crank angle at the neutral attitude.
    ///
    /// Units: radians
    pub neutral_angle: f64,

    /// Crank angle at the minimum travel extreme.
    ///
    /// Units: radians
    pub min_angle: f64,

    /// Crank angle at the maximum travel extreme.
    ///
    /// Units: radians
    pub max_angle: f64,

    /// Push-rod length, fixed by the geometry at neutral.
    pub pushrod_length: f64,
}

/// A pair of linear actuators driving the push-rods directly.
#[derive(Clone, Debug)]
pub struct LinearDrive {
    /// Lower rod end, positive-Z side.
    pub pivot_1: Vector3<f64>,

    /// Lower rod end, negative-Z side (mirror of side one).
    pub pivot_2: Vector3<f64>,

    /// Push-rod length at the neutral attitude.
    pub nominal_length: f64,

    /// Total actuator travel.
    pub travel: f64,

    /// Screw travel per motor radian.
    ///
    /// Units: length/radian
    pub travel_per_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RotaryDrive {
    pub fn new(
        pivot: Vector3<f64>,
        motor_angle_rad: f64,
        ctc_length: f64,
        neutral_angle_rad: f64,
        total_rotation_rad: f64,
        pushrod_length: f64,
    ) -> Self {
        RotaryDrive {
            pivot_1: pivot,
            pivot_2: Vector3::new(pivot.x, pivot.y, -pivot.z),
            motor_angle_1: motor_angle_rad,
            motor_angle_2: -motor_angle_rad,
            ctc_length,
            neutral_angle: neutral_angle_rad,
            min_angle: neutral_angle_rad - total_rotation_rad / 2.0,
            max_angle: neutral_angle_rad + total_rotation_rad / 2.0,
            pushrod_length,
        }
    }
}

impl LinearDrive {
    pub fn new(
        pivot: Vector3<f64>,
        nominal_length: f64,
        travel: f64,
        screw_pitch: f64,
    ) -> Self {
        LinearDrive {
            pivot_1: pivot,
            pivot_2: Vector3::new(pivot.x, pivot.y, -pivot.z),
            nominal_length,
            travel,
            travel_per_rad: screw_pitch / std::f64::consts::TAU,
        }
    }
}

impl Drive {
    /// Location of the push-rod's lower end for the given actuator position.
    ///
    /// For a rotary drive this is the crank arm endpoint, which moves with
    /// the position. For a linear drive it is the fixed lower pivot.
    pub fn endpoint(&self, side: Side, position: f64) -> Vector3<f64> {
        match self {
            Drive::Rotary(d) => {
                let (pivot, motor_angle) = match side {
                    Side::One => (d.pivot_1, d.motor_angle_1),
                    Side::Two => (d.pivot_2, d.motor_angle_2),
                };
                actuator_endpoint(pivot, motor_angle, position, d.ctc_length)
            }
            Drive::Linear(d) => match side {
                Side::One => d.pivot_1,
                Side::Two => d.pivot_2,
            },
        }
    }

    /// Push-rod length at the given actuator position.
    ///
    /// Fixed for a rotary drive; the position itself for a linear drive.
    pub fn pushrod_length(&self, position: f64) -> f64 {
        match self {
            Drive::Rotary(d) => d.pushrod_length,
            Drive::Linear(_) => position,
        }
    }

    /// Actuator position at the neutral attitude.
    pub fn neutral(&self) -> f64 {
        match self {
            Drive::Rotary(d) => d.neutral_angle,
            Drive::Linear(d) => d.nominal_length,
        }
    }

    /// Actuator position at the minimum travel extreme.
    pub fn min_position(&self) -> f64 {
        match self {
            Drive::Rotary(d) => d.min_angle,
            Drive::Linear(d) => d.nominal_length - d.travel / 2.0,
        }
    }

    /// Actuator position at the maximum travel extreme.
    pub fn max_position(&self) -> f64 {
        match self {
            Drive::Rotary(d) => d.max_angle,
            Drive::Linear(d) => d.nominal_length + d.travel / 2.0,
        }
    }

    /// Spacing between adjacent grid positions.
    pub fn grid_spacing(&self) -> f64 {
        match self {
            Drive::Rotary(_) => ROTARY_GRID_SPACING_RAD,
            Drive::Linear(d) => d.travel / LINEAR_GRID_INTERVALS,
        }
    }

    /// Half-step used for the central finite difference ratio estimate.
    pub fn fd_delta(&self) -> f64 {
        match self {
            Drive::Rotary(_) => ROTARY_FD_DELTA_RAD,
            Drive::Linear(d) => d.travel * LINEAR_FD_FRACTION,
        }
    }

    /// Conversion from platform-angle-per-position slope to a dimensionless
    /// platform-per-motor gear ratio.
    ///
    /// Unity for a rotary drive (positions are already radians); the screw's
    /// travel per motor radian for a linear drive.
    pub fn ratio_scale(&self) -> f64 {
        match self {
            Drive::Rotary(_) => 1.0,
            Drive::Linear(d) => d.travel_per_rad,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn rotary() -> Drive {
        Drive::Rotary(RotaryDrive::new(
            Vector3::new(45.5, -8.0, 13.0),
            10f64.to_radians(),
            2.5,
            45f64.to_radians(),
            45f64.to_radians(),
            42.22055,
        ))
    }

    fn linear() -> Drive {
        Drive::Linear(LinearDrive::new(
            Vector3::new(45.5, -8.0, 13.0),
            42.22055,
            8.0,
            5.0 / 25.4,
        ))
    }

    #[test]
    fn test_rotary_travel_range() {
        let drive = rotary();

        assert!((drive.min_position() - 22.5f64.to_radians()).abs() < 1e-12);
        assert!((drive.max_position() - 67.5f64.to_radians()).abs() < 1e-12);
        assert!((drive.neutral() - 45f64.to_radians()).abs() < 1e-12);
        assert_eq!(drive.ratio_scale(), 1.0);
        assert_eq!(drive.pushrod_length(1.0), 42.22055);
    }

    #[test]
    fn test_rotary_endpoints_mirror() {
        let drive = rotary();
        let angle = 30f64.to_radians();

        let e1 = drive.endpoint(Side::One, angle);
        let e2 = drive.endpoint(Side::Two, angle);

        assert!((e1.x - e2.x).abs() < 1e-12);
        assert!((e1.y - e2.y).abs() < 1e-12);
        assert!((e1.z + e2.z).abs() < 1e-12);
    }

    #[test]
    fn test_linear_travel_range() {
        let drive = linear();

        // Push-rod extremes are the nominal length -/+ half the travel
        assert!((drive.min_position() - (42.22055 - 4.0)).abs() < 1e-12);
        assert!((drive.max_position() - (42.22055 + 4.0)).abs() < 1e-12);

        // The push-rod length is the actuator position itself
        assert_eq!(drive.pushrod_length(40.0), 40.0);

        // travel_per_rad = screw_pitch / 2pi
        let expected = (5.0 / 25.4) / std::f64::consts::TAU;
        assert!((drive.ratio_scale() - expected).abs() < 1e-15);
    }

    #[test]
    fn test_linear_endpoint_is_fixed() {
        let drive = linear();

        let e_min = drive.endpoint(Side::One, drive.min_position());
        let e_max = drive.endpoint(Side::One, drive.max_position());

        assert_eq!(e_min, e_max);
        assert_eq!(e_min, Vector3::new(45.5, -8.0, 13.0));
    }
}
