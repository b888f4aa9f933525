//! Push notification delivery over the ntfy publish protocol.
//!
//! A notification is an HTTP POST of the raw log line to
//! `{server}/{topic}`, with `Title`, `Priority` and `Tags` headers. Delivery
//! is retried with bounded exponential backoff; exhausting the attempts is
//! reported to the caller but never terminates monitoring.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::matcher::TriggerEvent;

/// Connection establishment timeout.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Total per-request timeout. A stalled endpoint must not wedge the
/// single-threaded monitor loop.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// A single push notification. Retries reuse the same body.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Notification title.
    pub title: String,
    /// Message body — the raw triggering log line.
    pub message: String,
    /// ntfy priority, 1 (min) to 5 (max).
    pub priority: u8,
    /// ntfy tags (comma-separated emoji shortcodes).
    pub tags: String,
}

impl Notification {
    /// Build the notification for a confirmed trigger.
    pub fn from_event(event: &TriggerEvent) -> Self {
        Self {
            title: event.pattern.title.to_owned(),
            message: event.line.clone(),
            priority: event.pattern.priority,
            tags: event.pattern.tags.to_owned(),
        }
    }
}

/// Delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Transport-level failure (connection refused, DNS, timeout).
    #[error("push request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The push endpoint rejected the request.
    #[error("push endpoint returned {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, if readable.
        body: String,
    },
    /// All attempts failed; the event is dropped, not requeued.
    #[error("delivery failed after {attempts} attempts")]
    Exhausted {
        /// How many attempts were made.
        attempts: u32,
        /// The failure from the final attempt.
        #[source]
        last: Box<NotifyError>,
    },
    /// Shutdown was requested between attempts.
    #[error("delivery abandoned: shutdown requested")]
    Interrupted,
}

/// Sends notifications to one ntfy topic, with retry.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    url: String,
    max_attempts: u32,
    base_delay: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Notifier {
    /// Create a notifier for `{server}/{topic}`.
    ///
    /// `shutdown` is checked between retry attempts so an interrupt does not
    /// have to wait out the backoff.
    pub fn new(
        server: &str,
        topic: &str,
        max_attempts: u32,
        base_delay: Duration,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build HTTP client with timeouts, using default");
                reqwest::Client::default()
            });
        Self {
            client,
            url: format!("{}/{}", server.trim_end_matches('/'), topic),
            max_attempts: max_attempts.max(1),
            base_delay,
            shutdown,
        }
    }

    /// Deliver a notification, retrying on transient failure.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Exhausted`] once every attempt has failed, or
    /// [`NotifyError::Interrupted`] if shutdown was requested mid-backoff.
    /// Either way the caller logs and keeps monitoring.
    pub async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut delay = self.base_delay;
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            match self.post(notification).await {
                Ok(()) => {
                    debug!(url = %self.url, attempt, "notification delivered");
                    return Ok(());
                }
                Err(e) => {
                    warn!(url = %self.url, attempt, error = %e, "push attempt failed");
                    if attempt >= self.max_attempts {
                        return Err(NotifyError::Exhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }
                }
            }

            if self.shutdown.load(Ordering::Relaxed) {
                return Err(NotifyError::Interrupted);
            }
            tokio::time::sleep(delay).await;
            // An interrupt that arrived mid-backoff must not cost another
            // HTTP attempt.
            if self.shutdown.load(Ordering::Relaxed) {
                return Err(NotifyError::Interrupted);
            }
            delay = delay.saturating_mul(2);
        }
    }

    async fn post(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .header("Title", &notification.title)
            .header("Priority", notification.priority.to_string())
            .header("Tags", &notification.tags)
            .body(notification.message.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::HttpStatus { status, body });
        }
        Ok(())
    }
}
