//! Continuation-based seed propagation
//!
//! The rod-mount trajectory is continuous in actuator position, so stepping
//! the paired actuator position in small increments and re-using each solved
//! pair as the next guess keeps every Newton solve inside the correct basin
//! of attraction. A single large jump from neutral to an extreme risks
//! convergence to a mirrored root.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::geom::MountPair;
use super::state::Rig;
use super::RigError;
use util::maths::linspace;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A travel extreme of the paired actuator position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Extreme {
    Min,
    Max,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Rig {
    /// Walk the paired actuator position from neutral to the given extreme
    /// in grid-spacing steps, solving at each step with the previous
    /// solution as the guess.
    ///
    /// Returns the solved mount pair at the extreme, a trustworthy seed for
    /// grid scanning and for extreme-position queries.
    pub(crate) fn propagate_seed(&self, extreme: Extreme) -> Result<MountPair, RigError> {
        let neutral = self.drive.neutral();
        let target = match extreme {
            Extreme::Min => self.drive.min_position(),
            Extreme::Max => self.drive.max_position(),
        };

        let num_steps =
            ((target - neutral).abs() / self.drive.grid_spacing()).round() as usize;
        let positions = linspace(neutral, target, num_steps.max(1) + 1);

        // Explicit fold: guess in, solved pair out at every step
        positions.iter().try_fold(
            MountPair::nominal(self.rod_mount),
            |guess, &position| self.solve_mounts(position, position, &guess),
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
