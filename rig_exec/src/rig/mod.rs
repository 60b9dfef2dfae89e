//! Motion rig kinematics kernel
//!
//! This module computes the motion characteristics of a two-actuator tilting
//! platform: the platform's pitch/roll response, effective gear ratio,
//! torque, angular rates, linear acceleration/speed at a chosen lever point
//! and the maximum push-rod force, swept over the full range of actuator
//! travel.
//!
//! The platform is connected to the actuators by a mirrored pair of fixed
//! length push-rods. The rod-mount positions for a given actuator position
//! pair have no closed form, so they are found with a Newton iteration on
//! the distance constraints, seeded by continuation from the neutral
//! position.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod attitude;
mod calc_angles;
mod calc_grid;
mod calc_max_speed;
mod continuation;
mod drive;
mod geom;
mod params;
mod solver;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use attitude::*;
pub use calc_angles::*;
pub use calc_grid::*;
pub use calc_max_speed::*;
pub use drive::*;
pub use geom::*;
pub use params::*;
pub use solver::SolveOutcome;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Residual below which a solved rod-mount pair is accepted.
///
/// The solver iterates to a much tighter internal target. A solve whose
/// final residual is above this value is reported as non-convergent.
pub const SOLVER_ACCEPT_RESIDUAL: f64 = 1e-6;

/// Gear ratios with an absolute value below this are treated as zero.
///
/// Guards the divisions in the torque computation.
pub const RATIO_EPSILON: f64 = 1e-9;

/// Tolerance on residual pitch and roll (radians) within which a grid sample
/// counts as the neutral attitude.
pub const NEUTRAL_ATTITUDE_TOL_RAD: f64 = 1e-4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while solving a rig.
#[derive(Debug, thiserror::Error)]
pub enum RigError {
    #[error("Degenerate rig geometry: {0}")]
    DegenerateGeometry(String),

    #[error(
        "Estimated {axis} gear ratio is zero at actuator positions \
        ({actuator_1}, {actuator_2}), torque is undefined"
    )]
    ZeroRatio {
        axis: &'static str,
        actuator_1: f64,
        actuator_2: f64,
    },

    #[error(
        "Rod mount solver failed to converge: residual {residual:e} after \
        {iterations} iterations"
    )]
    SolverNonConvergence {
        residual: f64,
        iterations: usize,
    },
}
