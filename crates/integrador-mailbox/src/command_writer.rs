use tracing::info;

use crate::envelope::Envelope;
use crate::error::IntegradorResult;
use crate::mailbox::Mailbox;

/// Serializes `envelope` and delivers it through `mailbox`, returning the
/// command text exactly as written.
///
/// Write failures are fatal: a half-delivered command is never retried under
/// the same session id.
pub fn write_command<M: Mailbox + ?Sized>(
    mailbox: &M,
    envelope: &Envelope,
) -> IntegradorResult<String> {
    let text = envelope.to_xml();
    let file_stem = envelope.file_stem();
    mailbox.put(&file_stem, &text)?;
    info!(
        session_id = envelope.identifier.get(),
        component = %envelope.component.name,
        method = %envelope.component.method.name,
        file_stem = %file_stem,
        "command written"
    );
    Ok(text)
}
