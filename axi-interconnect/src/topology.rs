//! Declarative interconnect topology.
//!
//! ```toml
//! [interconnect]
//! module_name = "soc_interconnect"
//!
//! [[slave]]
//! prefix = "cpu"
//! clock_domain = "sys"
//! address_width = 32
//! data_width = 32
//! id_width = 1
//!
//! [[master]]
//! name = "ram"
//! prefix = "ram"
//! clock_domain = "sys"
//! address_width = 32
//! data_width = 32
//! id_width = 1
//! origin = 0x0
//! size = 0x10000000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{parse_toml, read_toml};
use crate::*;

/// A port of the topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    /// Port name. Defaults to `s_axi<n>` or `m_axi<n>`.
    #[serde(default)]
    pub name: Option<String>,

    /// Signal name prefix of the interface.
    pub prefix: String,

    /// Interface parameters.
    #[serde(flatten)]
    pub params: AxiParams,

    /// Base address. Master ports only.
    #[serde(default)]
    pub origin: Option<u64>,

    /// Region size. Master ports only.
    #[serde(default)]
    pub size: Option<u64>,
}

impl PortSpec {
    /// Standard AXI interface of the port.
    pub fn interface(&self) -> BusInterface { BusInterface::new(&self.prefix, &self.params) }
}

/// Interconnect topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Interconnect configuration.
    #[serde(default)]
    pub interconnect: InterconnectConfig,

    /// Slave ports, in port order.
    #[serde(default, rename = "slave")]
    pub slaves: Vec<PortSpec>,

    /// Master ports, in port order.
    #[serde(default, rename = "master")]
    pub masters: Vec<PortSpec>,
}

impl Topology {
    /// Parses a topology from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> { parse_toml(s) }

    /// Loads a topology from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> { read_toml(path.as_ref()) }

    /// Registers every port, slaves first, in file order.
    pub fn build(&self) -> Result<Interconnect, ConfigError> {
        let mut interconnect = Interconnect::new(self.interconnect.clone());
        for slave in &self.slaves {
            let _ = interconnect.add_slave(slave.name.as_deref(), slave.interface())?;
        }
        for master in &self.masters {
            let _ = interconnect.add_master(master.name.as_deref(), master.interface(), master.origin, master.size)?;
        }
        Ok(interconnect)
    }
}
