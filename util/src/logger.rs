//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::Local;
use colored::{ColoredString, Colorize};
use log::{self, info};
use std::path::Path;
use thiserror::Error;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Output goes to stdout, and additionally to `log_file_path` if one is
/// given.
///
/// # Notes
///
/// - `min_level` must be `Info` or more verbose.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: LevelFilter,
    log_file_path: Option<&Path>
) -> Result<(), LoggerInitError> {

    if min_level < LevelFilter::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    // Setup the logger using fern's builder pattern
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {

            // If debug or trace include the target, otherwise don't include it
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{} {}] {}: {}",
                    Local::now().format("%H:%M:%S%.3f"),
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            }
            else {
                out.finish(format_args!(
                    "[{} {}] {}",
                    Local::now().format("%H:%M:%S%.3f"),
                    level_to_str(record.level()),
                    message
                ))
            }

        })
        .level(min_level)
        .chain(std::io::stdout());

    if let Some(path) = log_file_path {
        dispatch = dispatch.chain(match fern::log_file(path) {
            Ok(f) => f,
            Err(e) => return Err(LoggerInitError::LogFileInitError(e))
        });
    }

    match dispatch.apply() {
        Ok(_) => (),
        Err(e) => return Err(LoggerInitError::FernInitError(e))
    };

    info!("Logging initialised");
    info!("    Log level: {:?}", min_level);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a log level as a fixed-width coloured string.
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Error => "ERR".red(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".cyan(),
        log::Level::Debug => "DBG".green(),
        log::Level::Trace => "TRC".normal(),
    }
}
