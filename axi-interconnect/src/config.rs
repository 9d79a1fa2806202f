//! Configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::*;

#[allow(missing_docs)]
#[allow(variant_size_differences)]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {error}", .path.display())]
    Io { path: PathBuf, error: io::Error },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Interconnect(#[from] InterconnectError),
}

/// Interconnect configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterconnectConfig {
    /// Name of the generated wrapper module.
    pub module_name: String,

    /// Instance name of the crossbar in the wrapper.
    pub inst_name: String,

    /// Register the crossbar's inputs and outputs. Passed through to the crossbar.
    pub register: bool,

    /// Transaction timeout in cycles. Passed through to the crossbar.
    pub timeout_cycles: u64,

    /// Reject ports whose ID width differs from the first port's.
    pub strict_id_width: bool,
}

impl Default for InterconnectConfig {
    fn default() -> Self {
        Self {
            module_name: "axi_interconnect".to_string(),
            inst_name: "axi_interconnect_inst".to_string(),
            register: false,
            timeout_cycles: 1_000_000,
            strict_id_width: false,
        }
    }
}

impl InterconnectConfig {
    /// Parses a configuration from TOML. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> { parse_toml(s) }

    /// Loads a configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> { read_toml(path.as_ref()) }

    /// Validator enforcing this configuration.
    pub fn validator(&self) -> ConsistencyValidator { ConsistencyValidator { strict_id_width: self.strict_id_width } }
}

/// Options of the AXI adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterOptions {
    /// Convert bursts to the master data width.
    pub convert_burst: bool,

    /// Also convert narrow bursts.
    pub convert_narrow_burst: bool,

    /// Forward transaction IDs. Ignored if the ID width is zero.
    pub forward_id: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self { Self { convert_burst: true, convert_narrow_burst: false, forward_id: true } }
}

impl AdapterOptions {
    /// Parses options from TOML. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> { parse_toml(s) }

    /// Loads options from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> { read_toml(path.as_ref()) }
}

pub(crate) fn parse_toml<T: DeserializeOwned>(s: &str) -> Result<T, ConfigError> { Ok(toml::from_str(s)?) }

pub(crate) fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    log::debug!("Loading configuration from {}.", path.display());
    let content = fs::read_to_string(path).map_err(|error| ConfigError::Io { path: path.to_path_buf(), error })?;
    parse_toml(&content)
}
