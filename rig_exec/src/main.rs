//! Main motion rig performance executable entry point.
//!
//! Loads a rig parameter file given on the command line, runs the
//! performance calculation, and logs the numeric summary: structural
//! angles, attitude range, neutral torques, maximum speeds and the maximum
//! push-rod force.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use std::env;
use std::path::Path;

// Internal
use rig_lib::rig::{MaxSpeeds, Rig, RigParams};
use util::logger::{logger_init, LevelFilter};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    logger_init(LevelFilter::Debug, None)
        .wrap_err("Failed to initialise logging")?;

    info!("Motion Rig Performance Executable\n");

    // ---- LOAD PARAMETERS ----

    let args: Vec<String> = env::args().collect();

    let params_path = match args.len() {
        2 => Path::new(&args[1]),
        _ => {
            return Err(eyre!(
                "Expected exactly one argument, the rig parameter file, got: {:?}",
                &args[1..]
            ))
        }
    };

    info!("Loading rig parameters from {:?}", params_path);

    let rig_params: RigParams = util::params::load(params_path)
        .wrap_err("Could not load rig params")?;

    // ---- CALCULATE ----

    let rig = Rig::from_params(&rig_params).wrap_err("Invalid rig geometry")?;

    let performance = rig.calculate().wrap_err("Rig calculation failed")?;

    // ---- SUMMARY ----

    let structural = &performance.structural;

    info!("Structural angles:");
    info!(
        "    ZX rod mount angle: {:.2} deg",
        structural.zx_rodmount_angle_deg
    );
    info!(
        "    ZX push-rod angle: {:.2} deg",
        structural.zx_pushrod_angle_deg
    );
    info!(
        "    Rod mount/push-rod angle: {:.2} deg",
        structural.rodmount_pushrod_angle_deg
    );
    info!("    Push-rod length: {:.2}", structural.pushrod_length);

    if let (Some(max_swing), Some(min_swing)) = (
        structural.max_pushrod_swing_deg,
        structural.min_pushrod_swing_deg,
    ) {
        info!("    Push-rod swing at max travel: {:.2} deg", max_swing);
        info!("    Push-rod swing at min travel: {:.2} deg", min_swing);
    }

    let range = &performance.attitude_range;
    info!(
        "Pitch range: [{:.2}, {:.2}] deg",
        range.min_pitch_deg, range.max_pitch_deg
    );
    info!(
        "Roll range: [{:.2}, {:.2}] deg",
        range.min_roll_deg, range.max_roll_deg
    );

    match performance.grid.neutral_torques {
        Some(torques) => info!(
            "Neutral torques: pitch {:.1}, roll {:.1}",
            torques.pitch_torque, torques.roll_torque
        ),
        None => warn!("Grid did not land on the neutral attitude"),
    }

    match performance.max_speeds {
        MaxSpeeds::Computed {
            pitch_deg_s,
            roll_deg_s,
        } => {
            info!("Max pitch speed: {:.2} deg/s", pitch_deg_s);
            info!("Max roll speed: {:.2} deg/s", roll_deg_s);
        }
        MaxSpeeds::NoNeutralSample => {
            warn!("Max speeds unavailable, no neutral sample or inertia")
        }
    }

    info!(
        "Max push-rod force: {:.1} ({} grid samples)",
        performance.grid.max_pushrod_force,
        performance.grid.samples.len()
    );

    Ok(())
}
