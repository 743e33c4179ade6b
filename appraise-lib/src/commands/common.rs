//! Logging and cache location shared by the commands.

use crate::Result;
use camino::Utf8PathBuf;
use clap::ValueEnum;
use directories::BaseDirs;
use ohno::IntoAppError;

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Initialize the logger based on the log level.
///
/// `RUST_LOG` takes precedence over `log_level`. Only the first call in a process has
/// any effect.
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// The cache directory to use: the one given, or the platform's default.
pub fn cache_dir(explicit: Option<&Utf8PathBuf>) -> Result<Utf8PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.clone());
    }

    let base = BaseDirs::new().into_app_err("could not determine cache directory")?;
    Utf8PathBuf::try_from(base.cache_dir().join("appraise")).into_app_err("cache directory is not valid UTF-8")
}
