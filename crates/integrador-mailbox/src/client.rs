//! The send/await exchange with the external processor.
//!
//! Each call carries its own state (session id, command text, response text)
//! and returns it in an [`Exchange`]; a client holds only configuration, so
//! one instance can serve overlapping calls from several threads.

use std::sync::Arc;

use integrador_core::current_unix_timestamp_ms;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::command_writer::write_command;
use crate::config::IntegradorConfig;
use crate::envelope::{validate_names, Envelope, ParameterValue, Parameters};
use crate::error::{IntegradorError, IntegradorResult};
use crate::fs_mailbox::FsMailbox;
use crate::mailbox::Mailbox;
use crate::poller::{CancelToken, PollPolicy, ResponsePoller};
use crate::response::{IntegradorResponseParser, ResponseParser};
use crate::session::{SessionId, SessionIdGenerator, SessionIdProvider};

/// Parameter carrying the session id when the caller asks for it.
pub const SESSION_ID_PARAMETER: &str = "numeroSessao";
/// Constructor parameter carrying the validator credential.
pub const VALIDATOR_ACCESS_KEY_PARAMETER: &str = "chaveAcessoValidador";

/// Component, method and ordered parameters for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandRequest {
    pub component: String,
    pub method: String,
    pub parameters: Parameters,
}

impl CommandRequest {
    pub fn new(component: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            method: method.into(),
            parameters: Parameters::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ParameterValue) -> Self {
        self.parameters.push(name, value);
        self
    }
}

/// Lifecycle of one exchange, used to label log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    Building,
    Written,
    Waiting,
    Matched,
    TimedOut,
}

impl ExchangePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Written => "written",
            Self::Waiting => "waiting",
            Self::Matched => "matched",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Everything one completed call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange<T> {
    pub session_id: SessionId,
    /// Command document exactly as written to the mailbox.
    pub command_text: String,
    /// Matched response document before parsing.
    pub response_text: String,
    pub response: T,
    pub sent_unix_ms: u64,
}

pub struct IntegradorClient<M, P = IntegradorResponseParser> {
    mailbox: M,
    parser: P,
    sessions: SessionIdGenerator,
    poller: ResponsePoller,
    validator_access_key: String,
}

impl<M: std::fmt::Debug, P> std::fmt::Debug for IntegradorClient<M, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegradorClient")
            .field("mailbox", &self.mailbox)
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}

impl IntegradorClient<FsMailbox> {
    /// Client over the configured directory pair.
    pub fn from_config(config: &IntegradorConfig) -> IntegradorResult<Self> {
        config.validate()?;
        Ok(Self::new(
            config.mailbox(),
            config.poll_policy(),
            config.validator_access_key.clone(),
        ))
    }
}

impl<M: Mailbox> IntegradorClient<M> {
    pub fn new(mailbox: M, policy: PollPolicy, validator_access_key: impl Into<String>) -> Self {
        Self {
            mailbox,
            parser: IntegradorResponseParser,
            sessions: SessionIdGenerator::default(),
            poller: ResponsePoller::new(policy, Arc::new(SystemClock)),
            validator_access_key: validator_access_key.into(),
        }
    }
}

impl<M: Mailbox, P: ResponseParser> IntegradorClient<M, P> {
    pub fn with_parser<Q: ResponseParser>(self, parser: Q) -> IntegradorClient<M, Q> {
        IntegradorClient {
            mailbox: self.mailbox,
            parser,
            sessions: self.sessions,
            poller: self.poller,
            validator_access_key: self.validator_access_key,
        }
    }

    /// Lets `provider` replace every generated session id.
    pub fn with_session_provider(mut self, provider: impl SessionIdProvider + 'static) -> Self {
        self.sessions = SessionIdGenerator::new(provider);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.poller = ResponsePoller::new(self.poller.policy(), clock);
        self
    }

    pub fn mailbox(&self) -> &M {
        &self.mailbox
    }

    /// Writes the command for `request` and blocks until its response arrives
    /// or the configured timeout expires.
    ///
    /// With `include_session_id` the session id is also sent as the first
    /// parameter (`numeroSessao`).
    pub fn send(
        &self,
        request: &CommandRequest,
        include_session_id: bool,
    ) -> IntegradorResult<Exchange<P::Output>> {
        self.exchange(request, include_session_id, None)
    }

    /// [`IntegradorClient::send`] that also gives up once `cancel` is raised.
    pub fn send_with_cancel(
        &self,
        request: &CommandRequest,
        include_session_id: bool,
        cancel: &CancelToken,
    ) -> IntegradorResult<Exchange<P::Output>> {
        self.exchange(request, include_session_id, Some(cancel))
    }

    fn exchange(
        &self,
        request: &CommandRequest,
        include_session_id: bool,
        cancel: Option<&CancelToken>,
    ) -> IntegradorResult<Exchange<P::Output>> {
        validate_names(&request.component, &request.method)?;

        let session_id = self.sessions.next();
        debug!(
            session_id = session_id.get(),
            phase = ExchangePhase::Building.as_str(),
            component = %request.component,
            method = %request.method,
            "exchange started"
        );
        let mut parameters = request.parameters.clone();
        if include_session_id {
            parameters.insert(0, SESSION_ID_PARAMETER, session_id);
        }
        let constructor = Parameters::new().with(
            VALIDATOR_ACCESS_KEY_PARAMETER,
            self.validator_access_key.as_str(),
        );
        let envelope = Envelope::build(
            session_id,
            &request.component,
            &request.method,
            parameters,
            Some(constructor),
        )?;

        let command_text = write_command(&self.mailbox, &envelope)?;
        let sent_unix_ms = current_unix_timestamp_ms();
        debug!(
            session_id = session_id.get(),
            phase = ExchangePhase::Written.as_str(),
            "command delivered"
        );

        debug!(
            session_id = session_id.get(),
            phase = ExchangePhase::Waiting.as_str(),
            "awaiting response"
        );
        let response_text = match self
            .poller
            .await_response(&self.mailbox, session_id, cancel)
        {
            Ok(text) => text,
            Err(error) => {
                if let IntegradorError::Timeout { waited_ms, .. } = &error {
                    warn!(
                        session_id = session_id.get(),
                        phase = ExchangePhase::TimedOut.as_str(),
                        waited_ms = *waited_ms,
                        method = %request.method,
                        "exchange timed out"
                    );
                }
                return Err(error);
            }
        };
        info!(
            session_id = session_id.get(),
            phase = ExchangePhase::Matched.as_str(),
            method = %request.method,
            "exchange matched"
        );

        let response = self.parser.parse(&response_text)?;
        Ok(Exchange {
            session_id,
            command_text,
            response_text,
            response,
            sent_unix_ms,
        })
    }
}
