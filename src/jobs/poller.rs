//! Homework status poll loop.
//!
//! Each cycle:
//! 1. Fetches statuses updated since the cursor.
//! 2. Validates the payload and translates the latest homework's status.
//! 3. Notifies when the message differs from the last one delivered.
//! 4. Moves the cursor to the server's `current_date`.
//!
//! Any failure is logged, reported to the operator best-effort and leaves
//! the cursor where it was, so the next cycle re-queries the same window.
//! Nothing raised inside a cycle stops the loop.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::endpoint::StatusEndpoint;
use crate::errors::CycleError;
use crate::models::homework::validate;
use crate::models::status::translate;
use crate::notification::Notifier;

/// What a successful cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The endpoint reported no homework updates in the window.
    NoUpdates,
    /// The latest status matches the last message delivered.
    Unchanged,
    /// A new status message was delivered.
    Notified(String),
}

/// Owns the poll cursor and the last delivered message for one monitored
/// account. All state changes happen inside `run_cycle`.
pub struct Poller<E, N> {
    endpoint: E,
    notifier: N,
    interval: Duration,
    cursor: i64,
    last_message: Option<String>,
}

impl<E, N> Poller<E, N>
where
    E: StatusEndpoint,
    N: Notifier,
{
    pub fn new(endpoint: E, notifier: N, interval: Duration, cursor: i64) -> Self {
        Self {
            endpoint,
            notifier,
            interval,
            cursor,
            last_message: None,
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Run one cycle without the failure policy. State is only touched on success.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        let payload = self.endpoint.fetch(self.cursor).await?;
        let report = validate(&payload)?;

        debug!(homeworks = report.homework_count, cursor = self.cursor, "status report received");

        let Some(latest) = report.latest() else {
            debug!(cursor = self.cursor, "no homework updates");
            self.cursor = report.current_date;
            return Ok(CycleOutcome::NoUpdates);
        };

        let message = translate(latest)?;

        let outcome = if self.last_message.as_deref() == Some(message.as_str()) {
            debug!("homework status unchanged");
            CycleOutcome::Unchanged
        } else {
            self.notifier.notify(&message).await?;
            info!(message = %message, "homework status change delivered");
            self.last_message = Some(message.clone());
            CycleOutcome::Notified(message)
        };

        self.cursor = report.current_date;
        Ok(outcome)
    }

    /// Run one cycle and apply the failure policy to its result.
    pub async fn tick(&mut self) -> Result<CycleOutcome, CycleError> {
        let result = self.run_cycle().await;
        match &result {
            Ok(outcome) => {
                info!(cursor = self.cursor, outcome = ?outcome, "poll cycle completed");
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, cursor = self.cursor, "poll cycle failed");
                self.report_failure(e).await;
            }
        }
        result
    }

    async fn report_failure(&self, err: &CycleError) {
        let diagnostic = format!("Monitor failure: {}", err);
        if let Err(e) = self.notifier.notify(&diagnostic).await {
            warn!(error = %e, "failed to deliver failure report");
        }
    }

    /// Run one cycle, abandoning it if `shutdown` resolves first.
    /// Returns `None` when interrupted; state is then left untouched.
    pub async fn tick_until<F>(&mut self, shutdown: F) -> Option<Result<CycleOutcome, CycleError>>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = shutdown => {
                info!(cursor = self.cursor, "poll cycle interrupted");
                None
            }
            result = self.tick() => Some(result),
        }
    }

    /// Poll until `shutdown` resolves, sleeping the fixed interval between
    /// cycles whatever their outcome.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            cursor = self.cursor,
            interval_secs = self.interval.as_secs(),
            "homework poller started"
        );

        loop {
            if self.tick_until(&mut shutdown).await.is_none() {
                break;
            }
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(cursor = self.cursor, "homework poller stopped");
    }
}
