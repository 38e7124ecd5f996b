//! Mailbox configuration: directories, timing and the validator credential.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{IntegradorError, IntegradorResult};
use crate::fs_mailbox::FsMailbox;
use crate::poller::PollPolicy;

pub const INPUT_DIR_ENV: &str = "INTEGRADOR_INPUT_DIR";
pub const OUTPUT_DIR_ENV: &str = "INTEGRADOR_OUTPUT_DIR";
pub const TIMEOUT_MS_ENV: &str = "INTEGRADOR_TIMEOUT_MS";
pub const POLL_INTERVAL_MS_ENV: &str = "INTEGRADOR_POLL_INTERVAL_MS";
pub const VALIDATOR_ACCESS_KEY_ENV: &str = "INTEGRADOR_VALIDATOR_ACCESS_KEY";

const DEFAULT_INPUT_DIR: &str = r"C:\Integrador\Input\";
const DEFAULT_OUTPUT_DIR: &str = r"C:\Integrador\Output\";
const DEFAULT_TIMEOUT_MS: i64 = 45_000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegradorConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Zero or negative waits indefinitely.
    pub timeout_ms: i64,
    pub poll_interval_ms: u64,
    /// Sent as constructor parameter `chaveAcessoValidador` on every command.
    pub validator_access_key: String,
}

impl Default for IntegradorConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            validator_access_key: String::new(),
        }
    }
}

impl IntegradorConfig {
    /// Reads a TOML file; missing keys keep their defaults.
    pub fn load(path: &Path) -> IntegradorResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|error| IntegradorError::Config {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        Self::from_toml_str(&raw).map_err(|message| IntegradorError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|error| error.to_string())
    }

    /// Applies `INTEGRADOR_*` environment overrides. Blank or unparsable
    /// values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Same as [`IntegradorConfig::apply_env_overrides`], reading variables
    /// through `lookup` instead of the process environment.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        if let Some(value) = read(INPUT_DIR_ENV) {
            self.input_dir = PathBuf::from(value);
        }
        if let Some(value) = read(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(value);
        }
        if let Some(value) = read(TIMEOUT_MS_ENV).and_then(|raw| raw.parse::<i64>().ok()) {
            self.timeout_ms = value;
        }
        if let Some(value) = read(POLL_INTERVAL_MS_ENV)
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|value| *value > 0)
        {
            self.poll_interval_ms = value;
        }
        if let Some(value) = read(VALIDATOR_ACCESS_KEY_ENV) {
            self.validator_access_key = value;
        }
    }

    pub fn validate(&self) -> IntegradorResult<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(IntegradorError::configuration("input_dir cannot be empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(IntegradorError::configuration("output_dir cannot be empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(IntegradorError::configuration(
                "poll_interval_ms must be greater than 0",
            ));
        }
        Ok(())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from_millis(self.poll_interval_ms, self.timeout_ms)
    }

    pub fn mailbox(&self) -> FsMailbox {
        FsMailbox::new(&self.input_dir, &self.output_dir)
    }
}
