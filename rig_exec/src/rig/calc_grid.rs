//! Performance grid calculations
//!
//! Sweeps the 2D actuator position grid and derives the per-sample
//! performance metrics: platform attitude, gear ratios by central finite
//! difference, torque, angular rate, and optionally angular acceleration and
//! linear acceleration/speed at the configured lever radii.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use super::attitude::pitch_and_roll;
use super::drive::Side;
use super::geom::MountPair;
use super::state::Rig;
use super::{RigError, NEUTRAL_ATTITUDE_TOL_RAD, RATIO_EPSILON};
use util::maths::linspace;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum XY moment arm below which the push-rod force is undefined.
const MIN_MOMENT_ARM: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Performance metrics at one actuator position pair.
///
/// Pitch is reported relative to the rig's neutral geometry (the rod-mount
/// base angle is already subtracted). The `alpha`, `linear_acc` and
/// `linear_speed` fields are present only when the platform inertias (and,
/// for the linear quantities, the lever radii) are configured.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PerformanceSample {
    /// Actuator positions this sample was taken at.
    pub actuator_1: f64,
    pub actuator_2: f64,

    /// Units: degrees
    pub pitch_deg: f64,

    /// Units: degrees
    pub roll_deg: f64,

    /// Units: torque
    pub pitch_torque: f64,
    pub roll_torque: f64,

    /// Units: degrees/second
    pub pitch_omega: f64,
    pub roll_omega: f64,

    /// Units: degrees/second²
    pub pitch_alpha: Option<f64>,
    pub roll_alpha: Option<f64>,

    /// Units: length/second²
    pub pitch_linear_acc: Option<f64>,
    pub roll_linear_acc: Option<f64>,

    /// Units: length/second
    pub pitch_linear_speed: Option<f64>,
    pub roll_linear_speed: Option<f64>,

    /// Tension/compression in one push-rod.
    pub pushrod_force: f64,
}

/// Motor-side torques captured at the neutral attitude sample.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct NeutralTorques {
    pub pitch_torque: f64,
    pub roll_torque: f64,
}

/// The ordered sample sequence over the full actuator grid.
#[derive(Debug, Serialize)]
pub struct PerformanceGrid {
    /// Samples in row-major order (actuator 1 outer, actuator 2 inner).
    pub samples: Vec<PerformanceSample>,

    /// Largest push-rod force magnitude over the grid.
    pub max_pushrod_force: f64,

    /// Torques at the neutral attitude, if the grid landed on it.
    pub neutral_torques: Option<NeutralTorques>,
}

/// Extremes of the platform attitude over a grid.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct AttitudeRange {
    /// Units: degrees
    pub max_pitch_deg: f64,
    pub min_pitch_deg: f64,
    pub max_roll_deg: f64,
    pub min_roll_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PerformanceGrid {
    /// Attitude extremes over all samples.
    pub fn attitude_range(&self) -> AttitudeRange {
        let mut range = AttitudeRange {
            max_pitch_deg: f64::NEG_INFINITY,
            min_pitch_deg: f64::INFINITY,
            max_roll_deg: f64::NEG_INFINITY,
            min_roll_deg: f64::INFINITY,
        };

        for sample in &self.samples {
            range.max_pitch_deg = range.max_pitch_deg.max(sample.pitch_deg);
            range.min_pitch_deg = range.min_pitch_deg.min(sample.pitch_deg);
            range.max_roll_deg = range.max_roll_deg.max(sample.roll_deg);
            range.min_roll_deg = range.min_roll_deg.min(sample.roll_deg);
        }

        range
    }
}

impl Rig {
    /// Scan the full actuator grid and compute every performance sample.
    ///
    /// `seed` must be the continuation-propagated mount pair at the paired
    /// minimum extreme ([`super::continuation`]): each row starts from it,
    /// every other point is seeded by the immediately preceding point. The
    /// previous row's last column is *not* used to seed a new row, since it
    /// is not continuous with the row start position.
    ///
    /// Any solver or geometry failure aborts the whole scan.
    pub(crate) fn calc_performance_grid(
        &self,
        seed: &MountPair,
    ) -> Result<PerformanceGrid, RigError> {
        let positions = self.grid_positions();
        debug!(
            "Grid scan: {0} x {0} actuator positions",
            positions.len()
        );

        let motor_speed_deg_s = self.motor_rpm * 360.0 / 60.0;

        let mut samples = Vec::with_capacity(positions.len() * positions.len());
        let mut max_pushrod_force = 0f64;
        let mut neutral_torques = None;

        for &actuator_1 in positions.iter() {
            // Row start: only the seed is guaranteed continuous with this
            // position
            let mut guess = *seed;

            for &actuator_2 in positions.iter() {
                let mounts = self.solve_mounts(actuator_1, actuator_2, &guess)?;

                let sample = self.calc_sample(
                    actuator_1,
                    actuator_2,
                    &mounts,
                    motor_speed_deg_s,
                )?;

                max_pushrod_force =
                    max_pushrod_force.max(sample.pushrod_force.abs());

                // Capture the motor-side torques the first time the grid
                // lands on the neutral attitude
                if neutral_torques.is_none()
                    && sample.pitch_deg.to_radians().abs() < NEUTRAL_ATTITUDE_TOL_RAD
                    && sample.roll_deg.to_radians().abs() < NEUTRAL_ATTITUDE_TOL_RAD
                {
                    neutral_torques = Some(NeutralTorques {
                        pitch_torque: sample.pitch_torque,
                        roll_torque: sample.roll_torque,
                    });
                }

                samples.push(sample);
                guess = mounts;
            }
        }

        Ok(PerformanceGrid {
            samples,
            max_pushrod_force,
            neutral_torques,
        })
    }

    /// The actuator positions of one grid axis, both endpoints included.
    pub(crate) fn grid_positions(&self) -> Vec<f64> {
        let min = self.drive.min_position();
        let max = self.drive.max_position();

        let num_steps =
            ((max - min) / self.drive.grid_spacing()).round() as usize;

        linspace(min, max, num_steps.max(1) + 1)
    }

    /// All metrics for a single grid point with an already solved mount
    /// pair.
    fn calc_sample(
        &self,
        actuator_1: f64,
        actuator_2: f64,
        mounts: &MountPair,
        motor_speed_deg_s: f64,
    ) -> Result<PerformanceSample, RigError> {
        let attitude = pitch_and_roll(mounts)?;
        let delta = self.drive.fd_delta();

        // Gear ratios by central finite difference, seeded with this point's
        // solution. Pitch responds to in-phase actuator motion, roll to
        // anti-phase motion.
        let pitch_ratio = {
            let lo = self.attitude_at(actuator_1 - delta, actuator_2 - delta, mounts)?;
            let hi = self.attitude_at(actuator_1 + delta, actuator_2 + delta, mounts)?;
            (hi.pitch_rad - lo.pitch_rad) / (2.0 * delta) * self.drive.ratio_scale()
        };
        let roll_ratio = {
            let lo = self.attitude_at(actuator_1 - delta, actuator_2 + delta, mounts)?;
            let hi = self.attitude_at(actuator_1 + delta, actuator_2 - delta, mounts)?;
            (hi.roll_rad - lo.roll_rad) / (2.0 * delta) * self.drive.ratio_scale()
        };

        if pitch_ratio.abs() < RATIO_EPSILON {
            return Err(RigError::ZeroRatio {
                axis: "pitch",
                actuator_1,
                actuator_2,
            });
        }
        if roll_ratio.abs() < RATIO_EPSILON {
            return Err(RigError::ZeroRatio {
                axis: "roll",
                actuator_1,
                actuator_2,
            });
        }

        // Two actuators act symmetrically, hence the factor 2
        let pitch_torque = self.motor_torque / pitch_ratio * 2.0;
        let roll_torque = self.motor_torque / roll_ratio * 2.0;

        let pitch_omega = motor_speed_deg_s * pitch_ratio;
        let roll_omega = motor_speed_deg_s * roll_ratio;

        // Acceleration metrics need both platform inertias
        let inertias = match (self.pitch_inertia, self.roll_inertia) {
            (Some(p), Some(r)) if p > 0.0 && r > 0.0 => Some((p, r)),
            _ => None,
        };

        let (mut pitch_alpha, mut roll_alpha) = (None, None);
        let (mut pitch_linear_acc, mut roll_linear_acc) = (None, None);
        let (mut pitch_linear_speed, mut roll_linear_speed) = (None, None);

        if let Some((pitch_inertia, roll_inertia)) = inertias {
            pitch_alpha = Some((pitch_torque / pitch_inertia).to_degrees());
            roll_alpha = Some((roll_torque / roll_inertia).to_degrees());

            if let Some(radius) = self.pitch_lever_radius {
                pitch_linear_acc = Some(pitch_torque / pitch_inertia * radius);
                pitch_linear_speed = Some(pitch_omega.to_radians() * radius);
            }
            if let Some(radius) = self.roll_lever_radius {
                roll_linear_acc = Some(roll_torque / roll_inertia * radius);
                roll_linear_speed = Some(roll_omega.to_radians() * radius);
            }
        }

        let pushrod_force =
            self.calc_pushrod_force(actuator_1, mounts, pitch_torque)?;

        Ok(PerformanceSample {
            actuator_1,
            actuator_2,
            pitch_deg: (attitude.pitch_rad - self.rod_mount_base_angle).to_degrees(),
            roll_deg: attitude.roll_rad.to_degrees(),
            pitch_torque,
            roll_torque,
            pitch_omega,
            roll_omega,
            pitch_alpha,
            roll_alpha,
            pitch_linear_acc,
            roll_linear_acc,
            pitch_linear_speed,
            roll_linear_speed,
            pushrod_force,
        })
    }

    /// Force carried by one push-rod.
    ///
    /// The moment arm is the projection of the unit push-rod vector onto the
    /// rod-mount (XY) plane; each rod carries half the pitch torque.
    fn calc_pushrod_force(
        &self,
        actuator_1: f64,
        mounts: &MountPair,
        pitch_torque: f64,
    ) -> Result<f64, RigError> {
        let endpoint = self.drive.endpoint(Side::One, actuator_1);
        let pushrod = mounts.mount_1 - endpoint;
        let unit = pushrod / pushrod.norm();

        let moment_arm = (unit.x.powi(2) + unit.y.powi(2)).sqrt();

        if moment_arm < MIN_MOMENT_ARM {
            return Err(RigError::DegenerateGeometry(
                "push-rod is normal to the rod-mount plane, force is undefined".into(),
            ));
        }

        let torque_half = pitch_torque / 2.0;
        Ok(torque_half / (2.0 * moment_arm))
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
            pitch_inertia: Some(400.0),
            roll_inertia: Some(300.0),
            pitch_lever_radius: Some(20.0),
            roll_lever_radius: Some(15.0),
        }
    }

    fn linear_params() -> RigParams {
        let mut params = rotary_params();
        params.drive = DriveParams::Linear {
            travel: 8.0,
            screw_pitch: 5.0 / 25.4,
        };
        params
    }

    fn run_grid(params: &RigParams) -> PerformanceGrid {
        let rig = Rig::from_params(params).unwrap();
        let seed = rig
            .propagate_seed(super::super::continuation::Extreme::Min)
            .expect("seed propagation failed");
        rig.calc_performance_grid(&seed).unwrap()
    }

    #[test]
    fn test_grid_positions_inclusive() {
        let rig = Rig::from_params(&rotary_params()).unwrap();

        let positions = rig.grid_positions();

        // 45 degrees of rotation at 2.5 degree spacing: 19 points
        assert_eq!(positions.len(), 19);
        assert!((positions[0] - 22.5f64.to_radians()).abs() < 1e-12);
        assert!((positions[18] - 67.5f64.to_radians()).abs() < 1e-12);

        // Neutral is on the grid
        assert!((positions[9] - 45f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_sample_rotary() {
        let grid = run_grid(&rotary_params());

        assert_eq!(grid.samples.len(), 19 * 19);

        // The centre sample of the grid is the neutral position
        let neutral = 45f64.to_radians();
        let sample = grid
            .samples
            .iter()
            .find(|s| {
                (s.actuator_1 - neutral).abs() < 1e-9
                    && (s.actuator_2 - neutral).abs() < 1e-9
            })
            .expect("neutral grid point missing");

        assert!(sample.pitch_deg.abs() < 1e-3);
        assert!(sample.roll_deg.abs() < 1e-3);

        assert!(grid.neutral_torques.is_some());
    }

    #[test]
    fn test_neutral_sample_linear() {
        let grid = run_grid(&linear_params());

        // Neutral attitude is hit in linear mode too
        assert!(grid.neutral_torques.is_some());

        let best = grid
            .samples
            .iter()
            .map(|s| s.pitch_deg.abs() + s.roll_deg.abs())
            .fold(f64::INFINITY, f64::min);
        assert!(best < 1e-3);
    }

    #[test]
    fn test_torque_omega_invariant() {
        let params = rotary_params();
        let grid = run_grid(&params);

        // torque = 2 T / ratio and omega = w ratio, so their product is
        // constant over the whole grid
        let motor_speed = params.motor_rpm * 360.0 / 60.0;
        let expected = 2.0 * params.motor_torque * motor_speed;

        for sample in &grid.samples {
            assert!(
                (sample.pitch_torque * sample.pitch_omega - expected).abs()
                    / expected.abs()
                    < 1e-9
            );
            assert!(
                (sample.roll_torque * sample.roll_omega - expected).abs()
                    / expected.abs()
                    < 1e-9
            );
        }
    }

    #[test]
    fn test_motor_scaling() {
        let params = rotary_params();
        let grid = run_grid(&params);

        let mut doubled_rpm = rotary_params();
        doubled_rpm.motor_rpm *= 2.0;
        let grid_rpm = run_grid(&doubled_rpm);

        let mut doubled_torque = rotary_params();
        doubled_torque.motor_torque *= 2.0;
        let grid_torque = run_grid(&doubled_torque);

        for ((s, s_rpm), s_torque) in grid
            .samples
            .iter()
            .zip(grid_rpm.samples.iter())
            .zip(grid_torque.samples.iter())
        {
            assert!((s_rpm.pitch_omega - 2.0 * s.pitch_omega).abs() < 1e-9);
            assert!((s_rpm.roll_omega - 2.0 * s.roll_omega).abs() < 1e-9);

            assert!(
                (s_torque.pitch_torque - 2.0 * s.pitch_torque).abs()
                    < 1e-6 * s.pitch_torque.abs()
            );
            assert!(
                (s_torque.roll_torque - 2.0 * s.roll_torque).abs()
                    < 1e-6 * s.roll_torque.abs()
            );
        }
    }

    #[test]
    fn test_dynamics_fields_follow_configuration() {
        // With inertias and radii every optional metric is present
        let grid = run_grid(&rotary_params());
        let sample = &grid.samples[0];
        assert!(sample.pitch_alpha.is_some());
        assert!(sample.roll_linear_speed.is_some());

        // Without inertias none of them are
        let mut params = rotary_params();
        params.pitch_inertia = None;
        params.roll_inertia = None;
        let grid = run_grid(&params);
        let sample = &grid.samples[0];
        assert!(sample.pitch_alpha.is_none());
        assert!(sample.pitch_linear_acc.is_none());
        assert!(sample.roll_linear_speed.is_none());
    }

    #[test]
    fn test_max_pushrod_force_bounds_samples() {
        let grid = run_grid(&rotary_params());

        assert!(grid.max_pushrod_force > 0.0);
        for sample in &grid.samples {
            assert!(sample.pushrod_force.abs() <= grid.max_pushrod_force + 1e-9);
        }
    }
}
