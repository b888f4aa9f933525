//! Runtime configuration and startup validation.
//!
//! The CLI layer owns parsing; this module owns the validated settings the
//! monitor consumes. Validation failures here are fatal and are surfaced
//! before the monitoring loop ever starts — everything after startup is a
//! transient, non-fatal condition handled inside the loop.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

/// Interview mode — selects which trigger phrase table the matcher uses.
///
/// This is a closed set: an unrecognized mode is a CLI parse error, never a
/// runtime branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// RED-style interview queue announcements.
    Red,
    /// ORP-style interview queue announcements.
    Orp,
}

/// Validated runtime settings for the monitor.
#[derive(Debug, Clone)]
pub struct Config {
    /// ntfy topic name notifications are POSTed to.
    pub topic: String,
    /// ntfy server base URL.
    pub server: String,
    /// Directory containing the IRC log files.
    pub log_dir: PathBuf,
    /// The user's IRC nick — the addressed party every trigger must name.
    pub nick: String,
    /// Whether lines must be attributable to one of `bot_nicks`.
    pub check_bot_nicks: bool,
    /// Bot nicks accepted by the speaker filter.
    pub bot_nicks: Vec<String>,
    /// Active interview mode.
    pub mode: Mode,
    /// How often the directory and active file are polled.
    pub poll_interval: Duration,
    /// Minimum time between two notifications for the same logical trigger.
    pub cooldown: Duration,
    /// Maximum delivery attempts per notification.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent attempt.
    pub retry_delay: Duration,
}

/// Fatal configuration problems detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The log path points at a file rather than a directory.
    #[error("log path invalid: dir expected, got file ({0})")]
    LogDirIsFile(PathBuf),
    /// The log path does not exist or is not a directory.
    #[error("log path invalid: {0}")]
    LogDirMissing(PathBuf),
    /// The log directory exists but cannot be listed.
    #[error("log dir unreadable: {dir}: {source}")]
    LogDirUnreadable {
        /// The offending directory.
        dir: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The log directory contains no log files to tail.
    #[error("no log files found in {0}")]
    NoLogFiles(PathBuf),
    /// The user nick is empty.
    #[error("nick must not be empty")]
    EmptyNick,
    /// The ntfy topic is empty.
    #[error("topic must not be empty")]
    EmptyTopic,
    /// The speaker filter is enabled but no bot nicks were given.
    #[error("bot nick filtering enabled but no bot nicks configured")]
    NoBotNicks,
    /// The poll interval is zero, which cannot drive the loop timer.
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
}

impl Config {
    /// Check that the configuration can actually drive the monitor.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered. These are fatal: the
    /// caller should exit non-zero without entering the monitoring loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nick.trim().is_empty() {
            return Err(ConfigError::EmptyNick);
        }
        if self.topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if self.check_bot_nicks && self.bot_nicks.iter().all(|n| n.trim().is_empty()) {
            return Err(ConfigError::NoBotNicks);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }

        if self.log_dir.is_file() {
            return Err(ConfigError::LogDirIsFile(self.log_dir.clone()));
        }
        if !self.log_dir.is_dir() {
            return Err(ConfigError::LogDirMissing(self.log_dir.clone()));
        }

        let entries =
            std::fs::read_dir(&self.log_dir).map_err(|source| ConfigError::LogDirUnreadable {
                dir: self.log_dir.clone(),
                source,
            })?;
        let has_logs = entries.flatten().any(|entry| {
            !entry.file_name().to_string_lossy().starts_with('.')
                && entry.metadata().is_ok_and(|m| m.is_file())
        });
        if !has_logs {
            return Err(ConfigError::NoLogFiles(self.log_dir.clone()));
        }

        Ok(())
    }
}
