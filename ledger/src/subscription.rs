//! Lazy, infinite, restartable event sequence over the pull-based
//! [`LedgerGateway::events_since`] call.

use crate::{LedgerError, LedgerGateway};
use atelier_types::{LedgerEvent, SequenceMarker};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Default interval between polls when the stream is idle.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Initial reconnect backoff after an unavailable ledger.
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
/// Cap on the reconnect backoff.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// A cursor-tracking event stream.
///
/// `next()` never ends: it polls the gateway, buffers batches, and sleeps
/// between empty polls. An unavailable ledger is retried internally with
/// capped exponential backoff. A history gap is surfaced once as
/// [`LedgerError::GapDetected`] — the stream then resets its cursor to the
/// oldest retained history, so the caller can resync its own state and
/// keep pulling.
pub struct EventStream {
    gateway: Arc<dyn LedgerGateway>,
    cursor: Option<SequenceMarker>,
    poll_interval: Duration,
    backoff: Duration,
    buffered: VecDeque<LedgerEvent>,
}

impl EventStream {
    /// Start a stream resuming after `cursor` (`None` = from the oldest
    /// retained event).
    pub fn new(gateway: Arc<dyn LedgerGateway>, cursor: Option<SequenceMarker>) -> Self {
        Self {
            gateway,
            cursor,
            poll_interval: DEFAULT_POLL_INTERVAL,
            backoff: INITIAL_BACKOFF,
            buffered: VecDeque::new(),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The marker of the last event handed out.
    pub fn cursor(&self) -> Option<SequenceMarker> {
        self.cursor
    }

    /// Pull the next event.
    ///
    /// Cancel-safe: no event is lost if the returned future is dropped at
    /// an await point — fetched batches are buffered in `self` before any
    /// event is handed out.
    pub async fn next(&mut self) -> Result<LedgerEvent, LedgerError> {
        loop {
            if let Some(event) = self.buffered.pop_front() {
                self.cursor = Some(event.marker);
                return Ok(event);
            }

            match self.gateway.events_since(self.cursor).await {
                Ok(batch) => {
                    self.backoff = INITIAL_BACKOFF;
                    if batch.is_empty() {
                        tokio::time::sleep(self.poll_interval).await;
                    } else {
                        self.buffered.extend(batch);
                    }
                }
                Err(LedgerError::GapDetected { oldest_retained }) => {
                    tracing::warn!(
                        cursor = ?self.cursor,
                        %oldest_retained,
                        "event history gap, resetting cursor"
                    );
                    self.cursor = None;
                    return Err(LedgerError::GapDetected { oldest_retained });
                }
                Err(e) => {
                    tracing::warn!(error = %e, backoff = ?self.backoff, "event poll failed");
                    tokio::time::sleep(self.backoff).await;
                    self.backoff = (self.backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }
}
