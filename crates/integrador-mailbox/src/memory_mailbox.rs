//! In-memory mailbox with time-scheduled responses, for deterministic tests
//! and embedding without a shared directory.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::error::IntegradorResult;
use crate::mailbox::{Mailbox, ResponseMatcher};

/// Produces the processor's reply to a delivered command: how long after
/// delivery it appears, its document name and its content.
pub type Responder = dyn Fn(&str, &str) -> Option<(Duration, String, String)> + Send + Sync;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    pub file_stem: String,
    pub text: String,
}

#[derive(Debug, Clone)]
struct PendingResponse {
    name: String,
    content: String,
    visible_at: Instant,
}

#[derive(Debug, Default)]
struct MemoryMailboxState {
    sent: Vec<SentCommand>,
    pending: Vec<PendingResponse>,
    processed: Vec<(String, String)>,
}

pub struct MemoryMailbox {
    clock: Arc<dyn Clock>,
    responder: Option<Box<Responder>>,
    state: Mutex<MemoryMailboxState>,
}

impl Default for MemoryMailbox {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for MemoryMailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryMailbox")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl MemoryMailbox {
    /// Response visibility is judged against `clock`; share it with the poller.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            responder: None,
            state: Mutex::new(MemoryMailboxState::default()),
        }
    }

    /// Installs a simulated processor that answers each delivered command.
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&str, &str) -> Option<(Duration, String, String)> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    fn state(&self) -> MutexGuard<'_, MemoryMailboxState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes a response visible immediately.
    pub fn push_response(&self, name: impl Into<String>, content: impl Into<String>) {
        self.schedule_response(Duration::ZERO, name, content);
    }

    /// Makes a response visible once `delay` has passed on the mailbox clock.
    pub fn schedule_response(
        &self,
        delay: Duration,
        name: impl Into<String>,
        content: impl Into<String>,
    ) {
        let visible_at = self.clock.now() + delay;
        self.state().pending.push(PendingResponse {
            name: name.into(),
            content: content.into(),
            visible_at,
        });
    }

    pub fn sent(&self) -> Vec<SentCommand> {
        self.state().sent.clone()
    }

    /// Names of responses not yet consumed, visible or not.
    pub fn pending_names(&self) -> Vec<String> {
        self.state()
            .pending
            .iter()
            .map(|response| response.name.clone())
            .collect()
    }

    pub fn processed_names(&self) -> Vec<String> {
        self.state()
            .processed
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Mailbox for MemoryMailbox {
    fn put(&self, file_stem: &str, text: &str) -> IntegradorResult<()> {
        self.state().sent.push(SentCommand {
            file_stem: file_stem.to_string(),
            text: text.to_string(),
        });
        if let Some(responder) = &self.responder {
            if let Some((delay, name, content)) = responder(file_stem, text) {
                self.schedule_response(delay, name, content);
            }
        }
        Ok(())
    }

    fn prepare_responses(&self) -> IntegradorResult<()> {
        Ok(())
    }

    fn take_matching(&self, matcher: &ResponseMatcher) -> IntegradorResult<Option<String>> {
        let now = self.clock.now();
        let mut state = self.state();
        let position = state
            .pending
            .iter()
            .position(|response| response.visible_at <= now && matcher.matches(&response.content));
        let Some(position) = position else {
            return Ok(None);
        };
        let response = state.pending.remove(position);
        state
            .processed
            .push((response.name, response.content.clone()));
        Ok(Some(response.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::SessionId;

    #[test]
    fn scheduled_response_waits_for_clock() {
        let clock = Arc::new(ManualClock::new());
        let mailbox = MemoryMailbox::new(clock.clone());
        mailbox.schedule_response(Duration::from_millis(500), "r.xml", "<Valor>8</Valor>");
        let matcher = ResponseMatcher::for_session(SessionId::new(8));

        assert!(mailbox.take_matching(&matcher).expect("scan").is_none());
        clock.advance(Duration::from_millis(500));
        assert_eq!(
            mailbox.take_matching(&matcher).expect("scan").as_deref(),
            Some("<Valor>8</Valor>")
        );
        assert_eq!(mailbox.processed_names(), ["r.xml"]);
        assert!(mailbox.pending_names().is_empty());
    }

    #[test]
    fn responder_answers_each_put() {
        let mailbox = MemoryMailbox::default().with_responder(|stem, _text| {
            Some((Duration::ZERO, format!("{stem}-resp.xml"), "<Valor>1</Valor>".to_string()))
        });
        mailbox.put("Metodo_1", "<Integrador/>").expect("put");

        assert_eq!(mailbox.sent()[0].file_stem, "Metodo_1");
        assert_eq!(mailbox.pending_names(), ["Metodo_1-resp.xml"]);
    }
}
