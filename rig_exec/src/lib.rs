//! Library part of the motion rig performance executable.
//!
//! The [`rig`] module contains the kinematics kernel, see its documentation
//! for details.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod rig;
