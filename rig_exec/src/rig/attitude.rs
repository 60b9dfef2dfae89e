//! Platform attitude extraction
//!
//! Converts a solved rod-mount pair into platform pitch and roll.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::geom::MountPair;
use super::RigError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum mount Z separation below which roll is undefined.
const MIN_MOUNT_DZ: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Platform attitude derived from a rod-mount pair.
///
/// `pitch_rad` is measured from the rig's X axis, so it includes the static
/// rod-mount base angle; callers subtract
/// [`super::Rig::rod_mount_base_angle`] to report pitch relative to the
/// neutral geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attitude {
    /// Units: radians
    pub pitch_rad: f64,

    /// Units: radians
    pub roll_rad: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Extract platform pitch and roll from a rod-mount pair.
///
/// Roll is the angle of the mount-to-mount line out of the mount plane,
/// pitch the angle of the roll-corrected mount midpoint above the X axis.
///
/// # Preconditions
///
/// - The rod-mount nominal height equals the pivot height. The formula is
///   invalid if the rig geometry violates this; it is not checked here.
///
/// # Errors
///
/// - [`RigError::DegenerateGeometry`] if the mounts have (near) zero Z
///   separation, which leaves roll undefined.
pub fn pitch_and_roll(mounts: &MountPair) -> Result<Attitude, RigError> {
    let d = mounts.mount_1 - mounts.mount_2;
    let mean = mounts.mean();

    if d.z.abs() < MIN_MOUNT_DZ {
        return Err(RigError::DegenerateGeometry(format!(
            "rod mount Z separation is {:e}, roll is undefined",
            d.z
        )));
    }

    let roll_rad = (d.y / d.z).atan();

    // Height of the mount midpoint with the roll rotation taken back out
    let corrected_height = mean.y / roll_rad.cos();
    let pitch_rad = (corrected_height / mean.x).atan();

    Ok(Attitude { pitch_rad, roll_rad })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_level_attitude() {
        let mounts = MountPair::nominal(Vector3::new(23.0, 28.0, 8.5));

        let att = pitch_and_roll(&mounts).unwrap();

        // At the nominal pair roll is exactly zero and pitch is the static
        // base angle of the rod mount
        assert_eq!(att.roll_rad, 0.0);
        assert!((att.pitch_rad - (28f64 / 23f64).atan()).abs() < 1e-12);
    }

    #[test]
    fn test_roll_antisymmetry() {
        let mounts = MountPair {
            mount_1: Vector3::new(23.0, 29.0, 8.4),
            mount_2: Vector3::new(23.0, 27.0, -8.6),
        };
        let swapped = MountPair {
            mount_1: mounts.mount_2,
            mount_2: mounts.mount_1,
        };

        let att = pitch_and_roll(&mounts).unwrap();
        let att_swapped = pitch_and_roll(&swapped).unwrap();

        assert!((att.roll_rad + att_swapped.roll_rad).abs() < 1e-12);
        assert!((att.pitch_rad - att_swapped.pitch_rad).abs() < 1e-12);
    }

    #[test]
    fn test_zero_dz_is_degenerate() {
        let mounts = MountPair {
            mount_1: Vector3::new(23.0, 28.0, 5.0),
            mount_2: Vector3::new(23.0, 27.0, 5.0),
        };

        match pitch_and_roll(&mounts) {
            Err(RigError::DegenerateGeometry(_)) => (),
            other => panic!("expected DegenerateGeometry, got {:?}", other),
        }
    }
}
