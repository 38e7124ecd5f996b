//! Filesystem mailbox: the directory pair shared with the external processor.
//!
//! ```text
//! {input}/                 active commands, consumed by the processor
//! {input}/Enviados/        permanent audit copies
//! {output}/                active responses, produced by the processor
//! {output}/Processados/    consumed responses
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use integrador_core::{move_into_dir, write_text_atomic};
use tracing::{debug, info, warn};

use crate::error::{IntegradorError, IntegradorResult};
use crate::mailbox::{Mailbox, ResponseMatcher};

pub const SENT_DIR_NAME: &str = "Enviados";
pub const PROCESSED_DIR_NAME: &str = "Processados";
pub const DOCUMENT_EXTENSION: &str = "xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsMailbox {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl FsMailbox {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn sent_dir(&self) -> PathBuf {
        self.input_dir.join(SENT_DIR_NAME)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.output_dir.join(PROCESSED_DIR_NAME)
    }

    /// Path of the active command file for `file_stem`.
    pub fn command_path(&self, file_stem: &str) -> PathBuf {
        self.input_dir
            .join(format!("{file_stem}.{DOCUMENT_EXTENSION}"))
    }

    /// Path of the audit copy for `file_stem`.
    pub fn audit_path(&self, file_stem: &str) -> PathBuf {
        self.sent_dir()
            .join(format!("{file_stem}.{DOCUMENT_EXTENSION}"))
    }

    /// Moves a consumed response into `Processados`. The base name is kept
    /// unless an earlier copy already holds it.
    pub fn archive(&self, path: &Path) -> IntegradorResult<PathBuf> {
        let archived =
            move_into_dir(path, &self.processed_dir()).map_err(|source| IntegradorError::Archive {
                path: path.to_path_buf(),
                source,
            })?;
        if archived.file_name() != path.file_name() {
            warn!(
                source = %path.display(),
                archived = %archived.display(),
                "processed name already taken, archived under a new name"
            );
        }
        Ok(archived)
    }

    /// Response documents currently waiting in the output directory.
    pub fn pending_responses(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut candidates = Vec::new();
        for entry in fs::read_dir(&self.output_dir)? {
            let path = entry?.path();
            let is_document = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
            if is_document && path.is_file() {
                candidates.push(path);
            }
        }
        candidates.sort();
        Ok(candidates)
    }
}

impl Mailbox for FsMailbox {
    fn put(&self, file_stem: &str, text: &str) -> IntegradorResult<()> {
        let sent_dir = self.sent_dir();
        fs::create_dir_all(&sent_dir).map_err(|source| IntegradorError::CommandWrite {
            path: sent_dir.clone(),
            source: source.into(),
        })?;

        let audit_path = self.audit_path(file_stem);
        fs::write(&audit_path, text).map_err(|source| IntegradorError::CommandWrite {
            path: audit_path.clone(),
            source: source.into(),
        })?;

        let command_path = self.command_path(file_stem);
        write_text_atomic(&command_path, text).map_err(|source| {
            IntegradorError::CommandWrite {
                path: command_path.clone(),
                source,
            }
        })?;
        debug!(
            audit = %audit_path.display(),
            command = %command_path.display(),
            "command files written"
        );
        Ok(())
    }

    fn prepare_responses(&self) -> IntegradorResult<()> {
        fs::create_dir_all(self.processed_dir())?;
        Ok(())
    }

    fn take_matching(&self, matcher: &ResponseMatcher) -> IntegradorResult<Option<String>> {
        let candidates = match self.pending_responses() {
            Ok(candidates) => candidates,
            Err(error) => {
                warn!(
                    output_dir = %self.output_dir.display(),
                    %error,
                    "failed to list response directory"
                );
                return Ok(None);
            }
        };

        for path in candidates {
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(error) => {
                    debug!(path = %path.display(), %error, "skipping unreadable response");
                    continue;
                }
            };
            // The processor does not always write UTF-8.
            let content = String::from_utf8_lossy(&bytes).into_owned();
            if !matcher.matches(&content) {
                continue;
            }
            match self.archive(&path) {
                Ok(archived) => {
                    info!(
                        session_id = matcher.session_id().get(),
                        archived = %archived.display(),
                        "response matched and archived"
                    );
                    return Ok(Some(content));
                }
                Err(error) => {
                    debug!(path = %path.display(), %error, "skipping response that could not be archived");
                }
            }
        }
        Ok(None)
    }
}
