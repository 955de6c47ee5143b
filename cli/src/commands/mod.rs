use std::{
    env,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use humantime::format_duration;
use railref_core::config::Config;
use tracing::debug;
use yansi::{Condition, Paint};

pub mod mileposts;
pub mod nearest;
pub mod recalculate;

/// Environment variable holding the path to a configuration file
pub const CONFIG_ENV: &str = "RAILREF_CONFIG";

/// Loads the configuration from `path`, from the file named by
/// [`CONFIG_ENV`], or falls back to the defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            Config::from_file(&path)
                .with_context(|| format!("Unable to load configuration `{}'", path.display()))
        }
        None => Ok(Config::default()),
    }
}

/// Formats the time elapsed since `start` with millisecond precision
pub fn elapsed(start: Instant) -> String {
    format_duration(Duration::from_millis(start.elapsed().as_millis() as u64)).to_string()
}

/// Prints a summary line to stderr, highlighted if stderr is a terminal
pub fn report(message: &str) {
    eprintln!(
        "{}",
        message.green().whenever(Condition::from(|| {
            Condition::stderr_is_tty() && Condition::clicolor() && Condition::no_color()
        }))
    );
}
