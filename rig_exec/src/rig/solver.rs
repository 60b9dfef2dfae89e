//! Rod-mount constraint solver
//!
//! Solves the six-unknown nonlinear system fixing the two rod-mount
//! positions for a given pair of actuator endpoints and push-rod lengths:
//!
//! 1. `|m1|^2 = rod_mount_length^2`
//! 2. `|m2|^2 = rod_mount_length^2`
//! 3. `|m2 - m1|^2 = rod_mount_width^2`
//! 4. `|m1 - e1|^2 = pushrod_1_length^2`
//! 5. `|m2 - e2|^2 = pushrod_2_length^2`
//! 6. `m1.x = m2.x`
//!
//! The system is non-convex and admits mirrored/aphysical roots; the Newton
//! iteration converges to *a* root near the guess, with no safeguard against
//! landing in the wrong basin if the guess is poor. Callers are responsible
//! for guess quality (see the continuation propagator), and must check
//! [`SolveOutcome::converged`] rather than trusting the result blindly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix6, RowVector6, Vector3, Vector6};

// Internal
use super::geom::MountPair;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Residual norm at which the iteration stops early.
pub(crate) const RESIDUAL_TARGET: f64 = 1e-9;

/// Maximum number of Newton iterations.
const MAX_ITERATIONS: usize = 50;

/// Maximum number of step halvings per iteration.
const MAX_STEP_HALVINGS: usize = 4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Constants of the constraint system that do not vary with actuator
/// position.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ConstraintSet {
    /// Distance of each rod mount from the platform pivot.
    pub rod_mount_length: f64,

    /// Distance between the two rod mounts.
    pub rod_mount_width: f64,
}

/// The result of one solver run.
///
/// `converged` is judged against the acceptance tolerance
/// [`super::SOLVER_ACCEPT_RESIDUAL`], not the tighter iteration target; a
/// solve that stalls close to the root is still usable, one that wanders is
/// not.
#[derive(Clone, Copy, Debug)]
pub struct SolveOutcome {
    /// The solved mount pair (meaningful only if `converged`).
    pub mounts: MountPair,

    /// Whether the final residual is within the acceptance tolerance.
    pub converged: bool,

    /// Final residual norm.
    pub residual: f64,

    /// Number of iterations performed.
    pub iterations: usize,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Solve for the rod-mount pair with a damped Newton iteration seeded by
/// `guess`.
pub(crate) fn solve_rod_mounts(
    constraints: &ConstraintSet,
    endpoint_1: Vector3<f64>,
    endpoint_2: Vector3<f64>,
    pushrod_1_length: f64,
    pushrod_2_length: f64,
    guess: &MountPair,
) -> SolveOutcome {
    let mut p = pack(guess);
    let mut residual_vec = residuals(
        &p,
        constraints,
        endpoint_1,
        endpoint_2,
        pushrod_1_length,
        pushrod_2_length,
    );
    let mut residual = residual_vec.norm();
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS && residual > RESIDUAL_TARGET {
        iterations += 1;

        let jac = jacobian(&p, endpoint_1, endpoint_2);

        // A singular Jacobian means a degenerate configuration (e.g. both
        // mounts coincident); stop and report the residual we got to.
        let step = match jac.lu().solve(&-residual_vec) {
            Some(s) => s,
            None => break,
        };

        // Take the full Newton step, halving it while it fails to reduce
        // the residual.
        let mut scale = 1.0;
        let mut accepted = false;

        for _ in 0..=MAX_STEP_HALVINGS {
            let candidate = p + step * scale;
            let candidate_res_vec = residuals(
                &candidate,
                constraints,
                endpoint_1,
                endpoint_2,
                pushrod_1_length,
                pushrod_2_length,
            );
            let candidate_res = candidate_res_vec.norm();

            if candidate_res < residual {
                p = candidate;
                residual_vec = candidate_res_vec;
                residual = candidate_res;
                accepted = true;
                break;
            }

            scale /= 2.0;
        }

        // No step length reduced the residual, the iteration has stalled
        if !accepted {
            break;
        }
    }

    SolveOutcome {
        mounts: unpack(&p),
        converged: residual <= super::SOLVER_ACCEPT_RESIDUAL,
        residual,
        iterations,
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Pack a mount pair into the unknown vector `(x1, y1, z1, x2, y2, z2)`.
fn pack(mounts: &MountPair) -> Vector6<f64> {
    Vector6::new(
        mounts.mount_1.x,
        mounts.mount_1.y,
        mounts.mount_1.z,
        mounts.mount_2.x,
        mounts.mount_2.y,
        mounts.mount_2.z,
    )
}

/// Unpack the unknown vector into a mount pair.
fn unpack(p: &Vector6<f64>) -> MountPair {
    MountPair {
        mount_1: Vector3::new(p[0], p[1], p[2]),
        mount_2: Vector3::new(p[3], p[4], p[5]),
    }
}

/// The six constraint residuals at `p`.
fn residuals(
    p: &Vector6<f64>,
    constraints: &ConstraintSet,
    endpoint_1: Vector3<f64>,
    endpoint_2: Vector3<f64>,
    pushrod_1_length: f64,
    pushrod_2_length: f64,
) -> Vector6<f64> {
    let (x1, y1, z1, x2, y2, z2) = (p[0], p[1], p[2], p[3], p[4], p[5]);
    let length_sq = constraints.rod_mount_length.powi(2);
    let width_sq = constraints.rod_mount_width.powi(2);

    Vector6::new(
        x1.powi(2) + y1.powi(2) + z1.powi(2) - length_sq,
        x2.powi(2) + y2.powi(2) + z2.powi(2) - length_sq,
        (x2 - x1).powi(2) + (y2 - y1).powi(2) + (z2 - z1).powi(2) - width_sq,
        (x1 - endpoint_1.x).powi(2)
            + (y1 - endpoint_1.y).powi(2)
            + (z1 - endpoint_1.z).powi(2)
            - pushrod_1_length.powi(2),
        (x2 - endpoint_2.x).powi(2)
            + (y2 - endpoint_2.y).powi(2)
            + (z2 - endpoint_2.z).powi(2)
            - pushrod_2_length.powi(2),
        x1 - x2,
    )
}

/// Analytic Jacobian of [`residuals`] with respect to the unknowns.
fn jacobian(
    p: &Vector6<f64>,
    endpoint_1: Vector3<f64>,
    endpoint_2: Vector3<f64>,
) -> Matrix6<f64> {
    let (x1, y1, z1, x2, y2, z2) = (p[0], p[1], p[2], p[3], p[4], p[5]);

    let (dx, dy, dz) = (x2 - x1, y2 - y1, z2 - z1);

    Matrix6::from_rows(&[
        RowVector6::new(2.0 * x1, 2.0 * y1, 2.0 * z1, 0.0, 0.0, 0.0),
        RowVector6::new(0.0, 0.0, 0.0, 2.0 * x2, 2.0 * y2, 2.0 * z2),
        RowVector6::new(
            -2.0 * dx,
            -2.0 * dy,
            -2.0 * dz,
            2.0 * dx,
            2.0 * dy,
            2.0 * dz,
        ),
        RowVector6::new(
            2.0 * (x1 - endpoint_1.x),
            2.0 * (y1 - endpoint_1.y),
            2.0 * (z1 - endpoint_1.z),
            0.0,
            0.0,
            0.0,
        ),
        RowVector6::new(
            0.0,
            0.0,
            0.0,
            2.0 * (x2 - endpoint_2.x),
            2.0 * (y2 - endpoint_2.y),
            2.0 * (z2 - endpoint_2.z),
        ),
        RowVector6::new(1.0, 0.0, 0.0, -1.0, 0.0, 0.0),
    ])
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::geom::{actuator_endpoint, dist, dist_from_origin};
    use super::*;

    /// The regression rig geometry at its neutral crank angle.
    fn neutral_case() -> (ConstraintSet, Vector3<f64>, Vector3<f64>, f64, MountPair) {
        let rod_mount = Vector3::new(23.0, 28.0, 8.5);
        let pivot = Vector3::new(45.5, -8.0, 13.0);
        let motor_angle = 10f64.to_radians();
        let neutral_angle = 45f64.to_radians();

        let e1 = actuator_endpoint(pivot, motor_angle, neutral_angle, 2.5);
        let e2 = actuator_endpoint(
            Vector3::new(pivot.x, pivot.y, -pivot.z),
            -motor_angle,
            neutral_angle,
            2.5,
        );

        let constraints = ConstraintSet {
            rod_mount_length: dist_from_origin(rod_mount),
            rod_mount_width: 2.0 * rod_mount.z,
        };
        let pushrod_length = dist(rod_mount, e1);

        (constraints, e1, e2, pushrod_length, MountPair::nominal(rod_mount))
    }

    #[test]
    fn test_neutral_solve_converges_to_nominal() {
        let (constraints, e1, e2, pushrod_length, guess) = neutral_case();

        let outcome =
            solve_rod_mounts(&constraints, e1, e2, pushrod_length, pushrod_length, &guess);

        assert!(outcome.converged);
        assert!(outcome.residual <= crate::rig::SOLVER_ACCEPT_RESIDUAL);

        // The nominal guess already satisfies the neutral system, the solver
        // must not wander away from it
        assert!((outcome.mounts.mount_1 - guess.mount_1).norm() < 1e-6);
        assert!((outcome.mounts.mount_2 - guess.mount_2).norm() < 1e-6);
    }

    #[test]
    fn test_solved_pair_satisfies_constraints() {
        let (constraints, _, _, pushrod_length, guess) = neutral_case();

        // Perturb the crank angle away from neutral so the solution is no
        // longer the seed itself
        let pivot = Vector3::new(45.5, -8.0, 13.0);
        let e1 = actuator_endpoint(pivot, 10f64.to_radians(), 50f64.to_radians(), 2.5);
        let e2 = actuator_endpoint(
            Vector3::new(pivot.x, pivot.y, -pivot.z),
            -(10f64.to_radians()),
            40f64.to_radians(),
            2.5,
        );

        let outcome =
            solve_rod_mounts(&constraints, e1, e2, pushrod_length, pushrod_length, &guess);

        assert!(outcome.converged);

        let m = outcome.mounts;
        assert!((dist_from_origin(m.mount_1) - constraints.rod_mount_length).abs() < 1e-6);
        assert!((dist_from_origin(m.mount_2) - constraints.rod_mount_length).abs() < 1e-6);
        assert!((dist(m.mount_1, m.mount_2) - constraints.rod_mount_width).abs() < 1e-6);
        assert!((dist(m.mount_1, e1) - pushrod_length).abs() < 1e-6);
        assert!((dist(m.mount_2, e2) - pushrod_length).abs() < 1e-6);
        assert!((m.mount_1.x - m.mount_2.x).abs() < 1e-6);
    }

    #[test]
    fn test_unsatisfiable_system_reports_non_convergence() {
        let (constraints, e1, e2, _, guess) = neutral_case();

        // Push-rods far too short to reach any point on the mount sphere
        let outcome = solve_rod_mounts(&constraints, e1, e2, 0.1, 0.1, &guess);

        assert!(!outcome.converged);
        assert!(outcome.residual > crate::rig::SOLVER_ACCEPT_RESIDUAL);
    }
}
