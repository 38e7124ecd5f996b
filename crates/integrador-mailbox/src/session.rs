//! Correlation ids linking one outgoing command to its response.

use std::fmt;

use rand::Rng;
use tracing::debug;

/// Lower bound (inclusive) of generated session ids.
pub const SESSION_ID_MIN: u64 = 1;
/// Upper bound (exclusive) of generated session ids.
pub const SESSION_ID_MAX: u64 = 999_999;

/// Correlation id valid for exactly one send/await cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Text the response document carries for this id: the value element that
    /// wraps it.
    pub fn response_marker(self) -> String {
        format!("<Valor>{}</Valor>", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SessionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Decides the session id actually used for an exchange, given the generated
/// candidate. Upstream ticketing systems plug in here.
pub trait SessionIdProvider: Send + Sync {
    fn resolve(&self, candidate: SessionId) -> SessionId;
}

impl<F> SessionIdProvider for F
where
    F: Fn(SessionId) -> SessionId + Send + Sync,
{
    fn resolve(&self, candidate: SessionId) -> SessionId {
        self(candidate)
    }
}

/// Provider that keeps the generated candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl SessionIdProvider for PassThrough {
    fn resolve(&self, candidate: SessionId) -> SessionId {
        candidate
    }
}

/// Draws pseudo-random candidates in `[SESSION_ID_MIN, SESSION_ID_MAX)` and
/// hands each one to the configured provider.
pub struct SessionIdGenerator {
    provider: Box<dyn SessionIdProvider>,
}

impl Default for SessionIdGenerator {
    fn default() -> Self {
        Self::new(PassThrough)
    }
}

impl fmt::Debug for SessionIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIdGenerator").finish_non_exhaustive()
    }
}

impl SessionIdGenerator {
    pub fn new(provider: impl SessionIdProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
        }
    }

    pub fn next(&self) -> SessionId {
        let candidate = SessionId(rand::thread_rng().gen_range(SESSION_ID_MIN..SESSION_ID_MAX));
        let resolved = self.provider.resolve(candidate);
        if resolved != candidate {
            debug!(
                candidate = candidate.get(),
                session_id = resolved.get(),
                "session id overridden by provider"
            );
        }
        resolved
    }
}
