//! Maximum platform speed estimation
//!
//! Constant-torque kinematics from rest over half the full travel range.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::calc_grid::{AttitudeRange, PerformanceGrid};
use super::state::Rig;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Maximum pitch/roll angular speed reachable by the platform.
///
/// `NoNeutralSample` is a named outcome, not an error: the estimate needs
/// the motor-side torques at the exact neutral attitude (which the grid may
/// never land on) and both platform inertias. Callers check it explicitly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MaxSpeeds {
    Computed {
        /// Units: degrees/second
        pitch_deg_s: f64,

        /// Units: degrees/second
        roll_deg_s: f64,
    },

    /// The grid has no neutral-attitude sample, or an inertia is missing or
    /// non-positive.
    NoNeutralSample,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MaxSpeeds {
    /// The legacy `(pitch, roll)` sentinel pair: the speeds when computed,
    /// `-1` for both otherwise. Intended for display layers only.
    pub fn sentinels(&self) -> (f64, f64) {
        match *self {
            MaxSpeeds::Computed {
                pitch_deg_s,
                roll_deg_s,
            } => (pitch_deg_s, roll_deg_s),
            MaxSpeeds::NoNeutralSample => (-1.0, -1.0),
        }
    }
}

impl Rig {
    /// Estimate the maximum pitch/roll speed from the neutral torques and
    /// the observed travel range.
    pub(crate) fn calc_max_speeds(
        &self,
        grid: &PerformanceGrid,
        range: &AttitudeRange,
    ) -> MaxSpeeds {
        let torques = match grid.neutral_torques {
            Some(t) => t,
            None => return MaxSpeeds::NoNeutralSample,
        };

        let (pitch_inertia, roll_inertia) = match (self.pitch_inertia, self.roll_inertia) {
            (Some(p), Some(r)) if p > 0.0 && r > 0.0 => (p, r),
            _ => return MaxSpeeds::NoNeutralSample,
        };

        let pitch_half_range_rad =
            (range.max_pitch_deg - range.min_pitch_deg).to_radians() / 2.0;
        let roll_half_range_rad =
            (range.max_roll_deg - range.min_roll_deg).to_radians() / 2.0;

        let pitch_deg_s = speed_from_rest(
            torques.pitch_torque,
            pitch_inertia,
            pitch_half_range_rad,
        );
        let roll_deg_s =
            speed_from_rest(torques.roll_torque, roll_inertia, roll_half_range_rad);

        match (pitch_deg_s, roll_deg_s) {
            (Some(pitch_deg_s), Some(roll_deg_s)) => MaxSpeeds::Computed {
                pitch_deg_s,
                roll_deg_s,
            },
            _ => MaxSpeeds::NoNeutralSample,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Speed reached accelerating from rest at `torque / inertia` over
/// `half_range_rad`.
///
/// `None` for a degenerate zero acceleration or zero range.
fn speed_from_rest(torque: f64, inertia: f64, half_range_rad: f64) -> Option<f64> {
    let acceleration = (torque / inertia).abs();

    if acceleration <= 0.0 || half_range_rad <= 0.0 {
        return None;
    }

    let time = (2.0 * half_range_rad / acceleration).sqrt();
    Some((acceleration * time).to_degrees())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
