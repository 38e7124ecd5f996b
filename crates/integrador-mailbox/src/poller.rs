//! Blocking wait for the response that carries a session id.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{IntegradorError, IntegradorResult};
use crate::mailbox::{Mailbox, ResponseMatcher};
use crate::session::SessionId;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How long and how often to scan for a response. `timeout: None` waits
/// indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(Duration::from_millis(45_000)),
        }
    }
}

impl PollPolicy {
    /// Maps a millisecond timeout where zero or negative means "no deadline".
    pub fn from_millis(interval_ms: u64, timeout_ms: i64) -> Self {
        let timeout = u64::try_from(timeout_ms)
            .ok()
            .filter(|value| *value > 0)
            .map(Duration::from_millis);
        Self {
            interval: Duration::from_millis(interval_ms),
            timeout,
        }
    }
}

/// Shared flag checked once per poll cycle.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct ResponsePoller {
    policy: PollPolicy,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ResponsePoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponsePoller")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for ResponsePoller {
    fn default() -> Self {
        Self::new(PollPolicy::default(), Arc::new(SystemClock))
    }
}

impl ResponsePoller {
    pub fn new(policy: PollPolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Blocks until `mailbox` yields the response for `session_id`, the
    /// deadline passes, or `cancel` is raised.
    ///
    /// The deadline is checked after each scan and the last sleep is clipped to
    /// the time remaining, so a timeout fires within one interval of the
    /// configured value.
    pub fn await_response<M: Mailbox + ?Sized>(
        &self,
        mailbox: &M,
        session_id: SessionId,
        cancel: Option<&CancelToken>,
    ) -> IntegradorResult<String> {
        mailbox.prepare_responses()?;

        let matcher = ResponseMatcher::for_session(session_id);
        let started = self.clock.now();
        // A timeout too large to represent as an instant is no deadline at all.
        let deadline = self
            .policy
            .timeout
            .and_then(|timeout| started.checked_add(timeout));
        let mut cycle: u64 = 0;

        loop {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                debug!(session_id = session_id.get(), cycle, "response wait cancelled");
                return Err(IntegradorError::Cancelled(session_id));
            }

            cycle += 1;
            if let Some(content) = mailbox.take_matching(&matcher)? {
                debug!(session_id = session_id.get(), cycle, "response found");
                return Ok(content);
            }

            let now = self.clock.now();
            let wait = match deadline {
                Some(deadline) if now >= deadline => {
                    let waited_ms = u64::try_from(now.duration_since(started).as_millis())
                        .unwrap_or(u64::MAX);
                    warn!(
                        session_id = session_id.get(),
                        waited_ms, cycle, "no response before deadline"
                    );
                    return Err(IntegradorError::Timeout {
                        session_id,
                        waited_ms,
                    });
                }
                Some(deadline) => self.policy.interval.min(deadline - now),
                None => self.policy.interval,
            };
            debug!(
                session_id = session_id.get(),
                cycle,
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "no matching response yet"
            );
            self.clock.sleep(wait);
        }
    }
}
