use log::Level;
use std::{
    borrow::Borrow,
    env,
    io::{stdout, Stdout, Write},
};

use crate::logger::json::Logger;

/// A logger implementation which writes each log message as a json encoded object.
pub mod json;

/// Build a json logger writing to stdout. Looks up the `LOG_LEVEL` environment variable
/// and uses that (if it is set to any of `trace`, `debug`, `info`, `warn`, or `error`)
/// as the level, falling back to `default_log_level` otherwise.
///
/// ```
/// use log::Level;
/// use mqs_common::logger::new_json_logger;
///
/// let logger = new_json_logger(Level::Info);
/// assert!(logger.level() == Level::Info || std::env::var("LOG_LEVEL").is_ok());
/// ```
#[must_use]
pub fn new_json_logger(default_log_level: Level) -> Logger<Stdout> {
    let level = match env::var("LOG_LEVEL") {
        Err(_) => default_log_level,
        Ok(s) => match s.borrow() {
            "trace" => Level::Trace,
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" => Level::Warn,
            "error" => Level::Error,
            _ => default_log_level,
        },
    };

    Logger::new(level, stdout())
}

/// Set the given json logger as the current logger and set the log level to the level
/// specified by the json logger. Intended to be called once, near the start of a binary
/// that embeds the queue engine and wants structured logs.
///
/// # Errors
///
/// Returns an error if a global logger has already been installed.
pub fn configure_logger<W: Write + Send + Sync + 'static>(logger: &'static Logger<W>) -> Result<(), log::SetLoggerError> {
    log::set_logger(logger)?;
    log::set_max_level(logger.level().to_level_filter());
    Ok(())
}
