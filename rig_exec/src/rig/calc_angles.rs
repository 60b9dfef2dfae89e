//! Structural angle calculations
//!
//! Static geometric angles of the rig at the neutral and extreme positions.
//! These depend only on the configuration and the continuation-propagated
//! extreme mounts, not on the performance grid.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::drive::{Drive, Side};
use super::geom::{dist, dist_from_origin, MountPair};
use super::state::Rig;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Static geometric angles of the rig structure.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct StructuralAngles {
    /// Angle subtended by the two rod mounts at the pivot, in the ZX plane.
    ///
    /// Units: degrees
    pub zx_rodmount_angle_deg: f64,

    /// Angle subtended by the two push-rod lower ends at the pivot, in the
    /// ZX plane, at the neutral position.
    ///
    /// Units: degrees
    pub zx_pushrod_angle_deg: f64,

    /// Interior angle between the rod-mount vector and the push-rod at the
    /// rod mount, at the neutral position.
    ///
    /// Units: degrees
    pub rodmount_pushrod_angle_deg: f64,

    /// Push-rod length at the neutral position.
    pub pushrod_length: f64,

    /// Angle between crank arm and push-rod at the maximum travel extreme.
    /// Rotary drives only.
    ///
    /// Units: degrees
    pub max_pushrod_swing_deg: Option<f64>,

    /// Angle between crank arm and push-rod at the minimum travel extreme.
    /// Rotary drives only.
    ///
    /// Units: degrees
    pub min_pushrod_swing_deg: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Rig {
    /// Compute the structural angle summary.
    ///
    /// `mounts_min`/`mounts_max` are the solved mount pairs at the paired
    /// travel extremes, used for the rotary swing angles.
    pub(crate) fn calc_structural_angles(
        &self,
        mounts_min: &MountPair,
        mounts_max: &MountPair,
    ) -> StructuralAngles {
        let neutral = self.drive.neutral();
        let neutral_endpoint = self.drive.endpoint(Side::One, neutral);
        let pushrod_length = self.drive.pushrod_length(neutral);

        let zx_rodmount_angle_deg =
            (2.0 * (self.rod_mount.z / self.rod_mount.x).atan()).to_degrees();
        let zx_pushrod_angle_deg =
            (2.0 * (neutral_endpoint.z / neutral_endpoint.x).atan()).to_degrees();

        // Triangle pivot - rod mount - push-rod end, angle at the rod mount
        let rodmount_pushrod_angle_deg = interior_angle(
            dist_from_origin(neutral_endpoint),
            self.constraints.rod_mount_length,
            pushrod_length,
        )
        .to_degrees();

        let (max_pushrod_swing_deg, min_pushrod_swing_deg) = match &self.drive {
            Drive::Rotary(d) => {
                let swing = |position: f64, mounts: &MountPair| {
                    let endpoint = self.drive.endpoint(Side::One, position);
                    interior_angle(
                        dist(d.pivot_1, mounts.mount_1),
                        d.ctc_length,
                        dist(endpoint, mounts.mount_1),
                    )
                    .to_degrees()
                };

                (
                    Some(swing(d.max_angle, mounts_max)),
                    Some(swing(d.min_angle, mounts_min)),
                )
            }
            Drive::Linear(_) => (None, None),
        };

        StructuralAngles {
            zx_rodmount_angle_deg,
            zx_pushrod_angle_deg,
            rodmount_pushrod_angle_deg,
            pushrod_length,
            max_pushrod_swing_deg,
            min_pushrod_swing_deg,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Interior angle opposite the side `opposite` in a triangle with adjacent
/// sides `a` and `b`, by the law of cosines.
///
/// The cosine is clamped into `[-1, 1]` so that a numerically flat triangle
/// cannot push `acos` out of its domain.
fn interior_angle(opposite: f64, a: f64, b: f64) -> f64 {
    let cos = (opposite.powi(2) - a.powi(2) - b.powi(2)) / (-2.0 * a * b);
    clamp(&cos, &-1.0, &1.0).acos()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
