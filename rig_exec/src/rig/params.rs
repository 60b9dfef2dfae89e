//! Parameters structure for a rig solve request

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing a motion rig.
///
/// All positions are in the rig frame: origin at the platform pivot, X
/// forward along the pitch reference, Y up, Z to the side. The two actuators
/// are mirrored in the XY plane, so only the positive-Z side is given.
#[derive(Debug, Deserialize)]
pub struct RigParams {

    // ---- GEOMETRY ----

    /// Position of the positive-Z rod mount at the neutral attitude.
    ///
    /// Units: length,
    /// Frame: rig
    pub rod_mount: [f64; 3],

    /// Position of the positive-Z actuator's lower pivot (the motor shaft
    /// for a rotary drive, the fixed rod end for a linear drive).
    ///
    /// Units: length,
    /// Frame: rig
    pub lower_pivot: [f64; 3],

    /// The drive fitted to the rig.
    pub drive: DriveParams,

    // ---- MOTOR ----

    /// Torque of one drive motor.
    ///
    /// Units: torque
    pub motor_torque: f64,

    /// Speed of one drive motor.
    ///
    /// Units: revolutions/minute
    pub motor_rpm: f64,

    // ---- PLATFORM DYNAMICS (OPTIONAL) ----

    /// Moment of inertia of the platform about the pitch axis.
    ///
    /// Units: torque·time²
    pub pitch_inertia: Option<f64>,

    /// Moment of inertia of the platform about the roll axis.
    ///
    /// Units: torque·time²
    pub roll_inertia: Option<f64>,

    /// Lever radius at which pitch linear acceleration and speed are
    /// reported.
    ///
    /// Units: length
    pub pitch_lever_radius: Option<f64>,

    /// Lever radius at which roll linear acceleration and speed are
    /// reported.
    ///
    /// Units: length
    pub roll_lever_radius: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Drive-specific rig parameters.
#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DriveParams {
    /// A pair of rotary bell-crank (CTC) actuators.
    Rotary {
        /// Tilt of the motor shaft in the ZX plane.
        ///
        /// Units: degrees
        motor_angle_deg: f64,

        /// Length of the bell-crank arm.
        ///
        /// Units: length
        ctc_length: f64,

        /// Crank angle at the neutral attitude.
        ///
        /// Units: degrees
        ctc_neutral_angle_deg: f64,

        /// Total crank rotation, split evenly either side of neutral.
        ///
        /// Units: degrees
        ctc_total_rotation_deg: f64,
    },

    /// A pair of linear (ball-screw) actuators driving the push-rods
    /// directly.
    Linear {
        /// Total actuator travel, split evenly either side of the nominal
        /// push-rod length.
        ///
        /// Units: length
        travel: f64,

        /// Screw travel per motor revolution.
        ///
        /// Units: length/revolution
        screw_pitch: f64,
    },
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialise_rotary() {
        let params: RigParams = toml::from_str(
            r#"
            rod_mount = [23.0, 28.0, 8.5]
            lower_pivot = [45.5, -8.0, 13.0]
            motor_torque = 480.0
            motor_rpm = 70.0
            pitch_inertia = 400.0
            roll_inertia = 300.0

            [drive]
            mode = "rotary"
            motor_angle_deg = 10.0
            ctc_length = 2.5
            ctc_neutral_angle_deg = 45.0
            ctc_total_rotation_deg = 45.0
            "#,
        )
        .unwrap();

        assert_eq!(params.rod_mount, [23.0, 28.0, 8.5]);
        assert!(matches!(params.drive, DriveParams::Rotary { .. }));
        assert_eq!(params.pitch_inertia, Some(400.0));
        assert_eq!(params.pitch_lever_radius, None);
    }

    #[test]
    fn test_deserialise_linear() {
        let params: RigParams = toml::from_str(
            r#"
            rod_mount = [23.0, 28.0, 8.5]
            lower_pivot = [45.5, -8.0, 13.0]
            motor_torque = 480.0
            motor_rpm = 70.0

            [drive]
            mode = "linear"
            travel = 8.0
            screw_pitch = 0.1968503937007874
            "#,
        )
        .unwrap();

        match params.drive {
            DriveParams::Linear { travel, .. } => assert_eq!(travel, 8.0),
            _ => panic!("expected a linear drive"),
        }
    }
}
