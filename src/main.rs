#![allow(missing_docs)]

//! IRC Interview Notifier.
//!
//! Sends a push notification via <https://ntfy.sh/> when it's your turn to
//! interview. Subscribe to your topic in an ntfy client (web or mobile) and
//! point this at your IRC client's log directory.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing::info;

use interview_notify::config::{Config, Mode};
use interview_notify::logging;
use interview_notify::monitor::Monitor;

#[derive(Debug, Parser)]
#[command(
    name = "interview-notify",
    version,
    about = "Sends a push notification with https://ntfy.sh/ when it's your turn to interview"
)]
struct Cli {
    /// ntfy topic name to POST notifications to
    #[arg(long)]
    topic: String,

    /// ntfy server to POST notifications to
    #[arg(long, default_value = "https://ntfy.sh")]
    server: String,

    /// Path to IRC logs (continuously checks for newest file to parse)
    #[arg(long, value_name = "DIR")]
    log_dir: PathBuf,

    /// Your IRC nick
    #[arg(long)]
    nick: String,

    /// Don't require lines to come from a watched bot nick. Use this if your
    /// log files are not like '<nick> message'
    #[arg(long)]
    no_check_bot_nicks: bool,

    /// Comma-separated list of bot nicks to watch
    #[arg(long, value_name = "NICKS", value_delimiter = ',', default_value = "Gatekeeper")]
    bot_nicks: Vec<String>,

    /// Interview mode (affects triggers)
    #[arg(long, value_enum, default_value = "red")]
    mode: Mode,

    /// Seconds between poll cycles
    #[arg(long, value_name = "SECS", default_value_t = 2)]
    poll_interval: u64,

    /// Seconds before the same trigger may notify again
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    cooldown: u64,

    /// Delivery attempts per notification
    #[arg(long, value_name = "N", default_value_t = 3)]
    retries: u32,

    /// Milliseconds before the first retry (doubles each attempt)
    #[arg(long, value_name = "MS", default_value_t = 500)]
    retry_delay: u64,

    /// Verbose (invoke multiple times for more verbosity)
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            topic: self.topic,
            server: self.server,
            log_dir: self.log_dir,
            nick: self.nick,
            check_bot_nicks: !self.no_check_bot_nicks,
            bot_nicks: self.bot_nicks,
            mode: self.mode,
            poll_interval: Duration::from_secs(self.poll_interval),
            cooldown: Duration::from_secs(self.cooldown),
            max_attempts: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = cli.into_config();
    config.validate().context("invalid configuration")?;

    info!(dir = %config.log_dir.display(), "parsing logs");

    let monitor = Monitor::new(&config)?;
    let shutdown = monitor.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received shutdown signal");
            shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });

    monitor.run().await
}
