//! Implementations for the Rig structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use nalgebra::Vector3;

// Internal
use super::attitude::{pitch_and_roll, Attitude};
use super::calc_angles::StructuralAngles;
use super::calc_grid::{AttitudeRange, PerformanceGrid};
use super::calc_max_speed::MaxSpeeds;
use super::continuation::Extreme;
use super::drive::{Drive, LinearDrive, RotaryDrive, Side};
use super::geom::{dist, dist_from_origin, MountPair};
use super::params::{DriveParams, RigParams};
use super::solver::{self, ConstraintSet};
use super::RigError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An immutable rig description with all derived geometry, built once per
/// solve request.
#[derive(Clone, Debug)]
pub struct Rig {
    /// Nominal positive-Z rod mount position.
    pub(crate) rod_mount: Vector3<f64>,

    /// Position-independent constants of the constraint system.
    pub(crate) constraints: ConstraintSet,

    /// Static pitch of the nominal rod mount above the X axis.
    ///
    /// Units: radians
    pub(crate) rod_mount_base_angle: f64,

    /// The actuator pair fitted to the rig.
    pub(crate) drive: Drive,

    /// Torque of one drive motor.
    pub(crate) motor_torque: f64,

    /// Speed of one drive motor.
    ///
    /// Units: revolutions/minute
    pub(crate) motor_rpm: f64,

    pub(crate) pitch_inertia: Option<f64>,
    pub(crate) roll_inertia: Option<f64>,
    pub(crate) pitch_lever_radius: Option<f64>,
    pub(crate) roll_lever_radius: Option<f64>,
}

/// Everything one `calculate` call produces.
#[derive(Debug)]
pub struct Performance {
    /// Per-sample metrics over the full actuator grid.
    pub grid: PerformanceGrid,

    /// Static geometric angles of the rig structure.
    pub structural: StructuralAngles,

    /// Extremes of the platform attitude over the grid.
    pub attitude_range: AttitudeRange,

    /// Maximum pitch/roll angular speed under constant-torque kinematics.
    pub max_speeds: MaxSpeeds,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Rig {
    /// Build a rig from its parameters, deriving the constraint constants.
    ///
    /// # Errors
    ///
    /// - [`RigError::DegenerateGeometry`] if the rod mount or drive
    ///   dimensions make the constraint system unsolvable (zero mount width,
    ///   zero mount X, non-positive drive dimensions).
    pub fn from_params(params: &RigParams) -> Result<Self, RigError> {
        let rod_mount = Vector3::from(params.rod_mount);
        let lower_pivot = Vector3::from(params.lower_pivot);

        if rod_mount.z == 0.0 {
            return Err(RigError::DegenerateGeometry(
                "rod mount width is zero (rod_mount.z = 0)".into(),
            ));
        }
        if rod_mount.x == 0.0 {
            return Err(RigError::DegenerateGeometry(
                "rod mount X is zero, the base pitch angle is undefined".into(),
            ));
        }

        let constraints = ConstraintSet {
            rod_mount_length: dist_from_origin(rod_mount),
            rod_mount_width: 2.0 * rod_mount.z.abs(),
        };

        let drive = match params.drive {
            DriveParams::Rotary {
                motor_angle_deg,
                ctc_length,
                ctc_neutral_angle_deg,
                ctc_total_rotation_deg,
            } => {
                if ctc_length <= 0.0 || ctc_total_rotation_deg <= 0.0 {
                    return Err(RigError::DegenerateGeometry(
                        "rotary drive needs a positive crank length and rotation".into(),
                    ));
                }

                // The push-rod length is fixed by the geometry at the
                // neutral crank angle
                let neutral_endpoint = super::geom::actuator_endpoint(
                    lower_pivot,
                    motor_angle_deg.to_radians(),
                    ctc_neutral_angle_deg.to_radians(),
                    ctc_length,
                );
                let pushrod_length = dist(rod_mount, neutral_endpoint);

                Drive::Rotary(RotaryDrive::new(
                    lower_pivot,
                    motor_angle_deg.to_radians(),
                    ctc_length,
                    ctc_neutral_angle_deg.to_radians(),
                    ctc_total_rotation_deg.to_radians(),
                    pushrod_length,
                ))
            }
            DriveParams::Linear { travel, screw_pitch } => {
                if travel <= 0.0 || screw_pitch <= 0.0 {
                    return Err(RigError::DegenerateGeometry(
                        "linear drive needs a positive travel and screw pitch".into(),
                    ));
                }

                let nominal_length = dist(rod_mount, lower_pivot);

                Drive::Linear(LinearDrive::new(
                    lower_pivot,
                    nominal_length,
                    travel,
                    screw_pitch,
                ))
            }
        };

        Ok(Rig {
            rod_mount,
            constraints,
            rod_mount_base_angle: (rod_mount.y / rod_mount.x).atan(),
            drive,
            motor_torque: params.motor_torque,
            motor_rpm: params.motor_rpm,
            pitch_inertia: params.pitch_inertia,
            roll_inertia: params.roll_inertia,
            pitch_lever_radius: params.pitch_lever_radius,
            roll_lever_radius: params.roll_lever_radius,
        })
    }

    /// Static pitch of the nominal rod mount, the zero reference for
    /// reported pitch.
    ///
    /// Units: radians
    pub fn rod_mount_base_angle(&self) -> f64 {
        self.rod_mount_base_angle
    }

    /// The drive fitted to this rig.
    pub fn drive(&self) -> &Drive {
        &self.drive
    }

    /// Compute the full performance picture of the rig.
    ///
    /// This is the single entry point: it propagates continuation seeds to
    /// both travel extremes, sweeps the actuator grid, and derives the
    /// structural angle and max-speed summaries.
    pub fn calculate(&self) -> Result<Performance, RigError> {
        debug!(
            "Calculating rig performance, actuator range [{:.6}, {:.6}]",
            self.drive.min_position(),
            self.drive.max_position()
        );

        // Continuation-propagated mounts at both paired extremes. The
        // minimum extreme seeds the grid scan, both feed the structural
        // summary.
        let mounts_min = self.propagate_seed(Extreme::Min)?;
        let mounts_max = self.propagate_seed(Extreme::Max)?;

        let grid = self.calc_performance_grid(&mounts_min)?;
        info!("Grid scan complete, {} samples", grid.samples.len());

        let structural = self.calc_structural_angles(&mounts_min, &mounts_max);
        let attitude_range = grid.attitude_range();
        let max_speeds = self.calc_max_speeds(&grid, &attitude_range);

        Ok(Performance {
            grid,
            structural,
            attitude_range,
            max_speeds,
        })
    }

    /// Solve the rod-mount pair at an actuator position pair, demanding
    /// convergence.
    pub(crate) fn solve_mounts(
        &self,
        position_1: f64,
        position_2: f64,
        guess: &MountPair,
    ) -> Result<MountPair, RigError> {
        let outcome = solver::solve_rod_mounts(
            &self.constraints,
            self.drive.endpoint(Side::One, position_1),
            self.drive.endpoint(Side::Two, position_2),
            self.drive.pushrod_length(position_1),
            self.drive.pushrod_length(position_2),
            guess,
        );

        if outcome.converged {
            Ok(outcome.mounts)
        } else {
            Err(RigError::SolverNonConvergence {
                residual: outcome.residual,
                iterations: outcome.iterations,
            })
        }
    }

    /// Solve and extract the platform attitude at an actuator position pair.
    pub(crate) fn attitude_at(
        &self,
        position_1: f64,
        position_2: f64,
        guess: &MountPair,
    ) -> Result<Attitude, RigError> {
        let mounts = self.solve_mounts(position_1, position_2, guess)?;
        pitch_and_roll(&mounts)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::params::{DriveParams, RigParams};
    use super::*;

    fn rotary_params() -> RigParams {
        RigParams {
            rod_mount: [23.0, 28.0, 8.5],
            lower_pivot: [45.5, -8.0, 13.0],
            drive: DriveParams::Rotary {
                motor_angle_deg: 10.0,
                ctc_length: 2.5,
                ctc_neutral_angle_deg: 45.0,
                ctc_total_rotation_deg: 45.0,
            },
            motor_torque: 480.0,
            motor_rpm: 70.0,
            pitch_inertia: None,
            roll_inertia: None,
            pitch_lever_radius: None,
            roll_lever_radius: None,
        }
    }

    #[test]
    fn test_derived_geometry_regression() {
        let rig = Rig::from_params(&rotary_params()).unwrap();

        assert!((rig.constraints.rod_mount_length - 37.21895).abs() < 1e-5);
        assert!((rig.constraints.rod_mount_width - 17.0).abs() < 1e-12);
        assert!(
            (rig.rod_mount_base_angle() - (28f64 / 23f64).atan()).abs() < 1e-12
        );

        match rig.drive {
            Drive::Rotary(ref d) => {
                assert!((d.pushrod_length - 42.22055).abs() < 1e-5)
            }
            _ => panic!("expected a rotary drive"),
        }
    }

    #[test]
    fn test_linear_derived_geometry() {
        let mut params = rotary_params();
        params.drive = DriveParams::Linear {
            travel: 8.0,
            screw_pitch: 5.0 / 25.4,
        };

        let rig = Rig::from_params(&params).unwrap();

        match rig.drive {
            Drive::Linear(ref d) => {
                // Nominal push-rod length is the mount to pivot distance
                let expected = dist(
                    Vector3::new(23.0, 28.0, 8.5),
                    Vector3::new(45.5, -8.0, 13.0),
                );
                assert!((d.nominal_length - expected).abs() < 1e-12);
                assert!(
                    (d.travel_per_rad - (5.0 / 25.4) / std::f64::consts::TAU)
                        .abs()
                        < 1e-15
                );
            }
            _ => panic!("expected a linear drive"),
        }
    }

    #[test]
    fn test_zero_width_rejected() {
        let mut params = rotary_params();
        params.rod_mount = [23.0, 28.0, 0.0];

        match Rig::from_params(&params) {
            Err(RigError::DegenerateGeometry(_)) => (),
            other => panic!("expected DegenerateGeometry, got {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_travel_rejected() {
        let mut params = rotary_params();
        params.drive = DriveParams::Linear {
            travel: 0.0,
            screw_pitch: 0.2,
        };

        assert!(Rig::from_params(&params).is_err());
    }
}
