//! interview-notify — IRC interview notifier.
//!
//! Watches a directory of rotating IRC log files, detects when it is your
//! turn in a private-tracker interview queue, and publishes a push
//! notification through an ntfy-compatible endpoint.
//!
//! Pipeline: [`locator`] finds the newest log file, [`tailer`] streams new
//! lines from it, [`matcher`] classifies each line against mode-specific
//! trigger phrases, [`dedup`] suppresses repeats within a cool-down window,
//! and [`notifier`] delivers the surviving events over HTTP. [`monitor`]
//! drives the whole thing on a fixed polling interval.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dedup;
pub mod locator;
pub mod logging;
pub mod matcher;
pub mod monitor;
pub mod notifier;
pub mod tailer;
