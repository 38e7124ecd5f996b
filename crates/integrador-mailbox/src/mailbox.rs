//! Mailbox capability shared by the filesystem and in-memory transports.

use crate::error::IntegradorResult;
use crate::session::SessionId;

/// Decides whether a response document belongs to an in-flight exchange.
///
/// Matching is by content: the processor names response files arbitrarily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMatcher {
    session_id: SessionId,
    marker: String,
}

impl ResponseMatcher {
    pub fn for_session(session_id: SessionId) -> Self {
        Self {
            session_id,
            marker: session_id.response_marker(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn matches(&self, content: &str) -> bool {
        content.contains(&self.marker)
    }
}

/// Message-queue view of the processor's directory pair.
///
/// Implementations are not coordinated with other mailboxes sharing the same
/// storage: two clients with colliding session ids can consume each other's
/// responses.
pub trait Mailbox: Send + Sync {
    /// Delivers a command document under `{file_stem}.xml`. The processor must
    /// never see a partially written command.
    fn put(&self, file_stem: &str, text: &str) -> IntegradorResult<()>;

    /// Prepares the response side before a wait starts.
    fn prepare_responses(&self) -> IntegradorResult<()>;

    /// Runs one scan over the pending responses. The first candidate accepted
    /// by `matcher` is archived and its content returned; unreadable or
    /// unmovable candidates are skipped.
    fn take_matching(&self, matcher: &ResponseMatcher) -> IntegradorResult<Option<String>>;
}

impl<M: Mailbox + ?Sized> Mailbox for &M {
    fn put(&self, file_stem: &str, text: &str) -> IntegradorResult<()> {
        (**self).put(file_stem, text)
    }

    fn prepare_responses(&self) -> IntegradorResult<()> {
        (**self).prepare_responses()
    }

    fn take_matching(&self, matcher: &ResponseMatcher) -> IntegradorResult<Option<String>> {
        (**self).take_matching(matcher)
    }
}

impl<M: Mailbox + ?Sized> Mailbox for std::sync::Arc<M> {
    fn put(&self, file_stem: &str, text: &str) -> IntegradorResult<()> {
        (**self).put(file_stem, text)
    }

    fn prepare_responses(&self) -> IntegradorResult<()> {
        (**self).prepare_responses()
    }

    fn take_matching(&self, matcher: &ResponseMatcher) -> IntegradorResult<Option<String>> {
        (**self).take_matching(matcher)
    }
}
