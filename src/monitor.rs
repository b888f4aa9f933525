//! The polling loop that wires the pipeline together.
//!
//! Single-threaded and cooperative: each tick runs locator → tailer →
//! matcher → dedup → notifier in sequence. Every runtime error inside the
//! loop is caught and logged at its severity; only startup configuration
//! errors terminate the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, trace, warn};

use crate::config::Config;
use crate::dedup::DedupGate;
use crate::locator::{LogLocator, Rotation};
use crate::matcher::TriggerMatcher;
use crate::notifier::{Notification, Notifier};
use crate::tailer::Tailer;

/// Owns the pipeline components and the shared shutdown flag.
pub struct Monitor {
    poll_interval: std::time::Duration,
    locator: LogLocator,
    tailer: Tailer,
    matcher: TriggerMatcher,
    gate: DedupGate,
    notifier: Notifier,
    shutdown: Arc<AtomicBool>,
}

impl Monitor {
    /// Assemble the pipeline from a validated [`Config`].
    ///
    /// # Errors
    ///
    /// Fails if the poll interval is zero (the loop timer cannot run) or if
    /// the mode's trigger patterns cannot be compiled for the configured
    /// nick.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !config.poll_interval.is_zero(),
            "poll interval must be greater than zero"
        );
        let shutdown = Arc::new(AtomicBool::new(false));
        let matcher = TriggerMatcher::new(
            config.mode,
            &config.nick,
            config.check_bot_nicks,
            &config.bot_nicks,
        )
        .context("failed to compile trigger patterns")?;

        Ok(Self {
            poll_interval: config.poll_interval,
            locator: LogLocator::new(&config.log_dir),
            tailer: Tailer::new(),
            matcher,
            gate: DedupGate::new(config.cooldown),
            notifier: Notifier::new(
                &config.server,
                &config.topic,
                config.max_attempts,
                config.retry_delay,
                Arc::clone(&shutdown),
            ),
            shutdown,
        })
    }

    /// Flag that stops the loop at the next tick and aborts any in-flight
    /// retry backoff.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run the monitoring loop until shutdown is requested.
    ///
    /// # Errors
    ///
    /// Currently infallible after startup; the `Result` is the seam for the
    /// binary's exit code.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }
            self.tick().await;
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }
        }

        info!("monitor shut down cleanly");
        Ok(())
    }

    /// One poll cycle. Never propagates errors: transient failures are
    /// logged and retried next tick.
    pub async fn tick(&mut self) {
        match self.locator.poll() {
            Ok(Some(Rotation::Initial(path))) => {
                info!(file = %path.display(), "parsing log file");
                if let Err(e) = self.tailer.seek_to_end(&path).await {
                    warn!(file = %path.display(), error = %e, "failed to seek to end of log");
                }
            }
            Ok(Some(Rotation::NewFile(path))) => {
                info!(file = %path.display(), "newer log found");
                self.tailer.reset();
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "log directory temporarily unreadable; keeping current file");
            }
        }

        let Some(path) = self.locator.active_path() else {
            return;
        };
        let path = path.to_path_buf();

        let lines = match self.tailer.read_new_lines(&path).await {
            Ok(lines) => lines,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to read log file");
                return;
            }
        };

        for line in lines {
            trace!(%line);
            let Some(event) = self.matcher.classify(&line) else {
                continue;
            };
            info!(pattern = event.pattern.id, line = %event.line, "interview trigger detected");

            if !self.gate.admit(&event) {
                continue;
            }

            let notification = Notification::from_event(&event);
            if let Err(e) = self.notifier.send(&notification).await {
                error!(error = %e, "notification delivery failed; event dropped");
            }
        }
    }
}
