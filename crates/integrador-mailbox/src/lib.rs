//! File-mailbox exchange with the fiscal integrator processor.
//!
//! Commands are dropped as XML documents into an input directory and responses
//! are picked up from an output directory, correlated by session id. This crate
//! builds the command envelope, writes it atomically (with an audit copy),
//! polls for the matching response under a deadline and archives what it
//! consumed.
//!
//! The mailbox is a trait ([`Mailbox`]) with a filesystem implementation
//! ([`FsMailbox`]) and an in-memory one ([`MemoryMailbox`]); the poller sleeps
//! through an injectable [`Clock`].

pub mod client;
pub mod clock;
pub mod command_writer;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fs_mailbox;
pub mod mailbox;
pub mod memory_mailbox;
pub mod operations;
pub mod poller;
pub mod response;
pub mod session;
mod xml_text;

pub use client::{
    CommandRequest, Exchange, ExchangePhase, IntegradorClient, SESSION_ID_PARAMETER,
    VALIDATOR_ACCESS_KEY_PARAMETER,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use command_writer::write_command;
pub use config::IntegradorConfig;
pub use envelope::{format_decimal, Envelope, Parameter, ParameterValue, Parameters};
pub use error::{IntegradorError, IntegradorResult};
pub use fs_mailbox::FsMailbox;
pub use mailbox::{Mailbox, ResponseMatcher};
pub use memory_mailbox::{MemoryMailbox, SentCommand};
pub use operations::{FiscalResponseRequest, PaymentRequest, PaymentStatusRequest};
pub use poller::{CancelToken, PollPolicy, ResponsePoller};
pub use rust_decimal::Decimal;
pub use response::{IntegradorResponse, IntegradorResponseParser, ResponseParser};
pub use session::{PassThrough, SessionId, SessionIdGenerator, SessionIdProvider};
