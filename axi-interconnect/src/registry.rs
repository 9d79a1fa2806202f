//! Port registry.

use std::collections::HashMap;
use std::fmt;
use std::iter;
use std::ops::Index;

use itertools::Itertools;
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::*;

/// Errors raised while registering, validating, deriving or packing.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterconnectError {
    #[error("{side} port `{name}` is already registered")]
    DuplicateName { side: Side, name: String },

    #[error("interface `{interface}` is not a well-formed AXI interface: {reason}")]
    InvalidInterface { interface: String, reason: String },

    #[error("signal `{signal}` of port `{name}` is already used by port `{registered}`")]
    DuplicateSignal { name: String, registered: String, signal: String },

    #[error("master port `{name}` needs both an origin and a size")]
    MissingRegion { name: String },

    #[error("invalid region on master port `{name}`: {reason}")]
    InvalidRegion { name: String, reason: String },

    #[error("no AXI interfaces are registered")]
    EmptyRegistry,

    #[error("different {property} on AXI interfaces ({reference_port}: {expected} / {offending_port}: {actual}), should be the same")]
    Consistency {
        property: Property,
        reference_port: String,
        offending_port: String,
        expected: String,
        actual: String,
    },

    #[error("{}{} is not a port of the crossbar's {side} side", .channel.name(), .field)]
    UnknownAbiField { side: Side, channel: ChannelKind, field: Field },

    #[error("expected {expected} values, got {actual}")]
    ValueCount { expected: usize, actual: usize },

    #[error("value for port `{port}` is {actual} bits wide, expected {expected}")]
    ValueWidth { port: String, expected: usize, actual: usize },
}

/// Side of the crossbar a port attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Slave port, driven by an upstream AXI manager.
    Slave,

    /// Master port, driving a downstream address-mapped subordinate.
    Master,
}

impl Side {
    /// Prefix of port names and crossbar signal names on this side.
    pub fn prefix(self) -> &'static str {
        match self {
            Side::Slave => "s_axi",
            Side::Master => "m_axi",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Slave => write!(f, "slave"),
            Side::Master => write!(f, "master"),
        }
    }
}

/// Address region of a master port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Base address.
    pub origin: u64,

    /// Size in bytes.
    pub size: u64,
}

impl Region {
    /// Creates a new region.
    pub const fn new(origin: u64, size: u64) -> Self { Self { origin, size } }
}

/// Handle of an interface stored in an [`InterfaceArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceId(usize);

/// Interface arena.
///
/// Interfaces are immutable once allocated, and their handles stay valid for the lifetime of the
/// arena.
#[derive(Debug, Default, Clone)]
pub struct InterfaceArena {
    inner: Vec<BusInterface>,
}

impl InterfaceArena {
    /// Allocates the interface and returns its handle.
    pub fn alloc(&mut self, interface: BusInterface) -> InterfaceId {
        let id = self.inner.len();
        self.inner.push(interface);
        InterfaceId(id)
    }

    /// Returns the interface of the given handle.
    pub fn get(&self, id: InterfaceId) -> Option<&BusInterface> { self.inner.get(id.0) }

    /// Number of allocated interfaces.
    pub fn len(&self) -> usize { self.inner.len() }

    /// Returns `true` if nothing has been allocated.
    pub fn is_empty(&self) -> bool { self.inner.is_empty() }
}

impl Index<InterfaceId> for InterfaceArena {
    type Output = BusInterface;

    fn index(&self, id: InterfaceId) -> &BusInterface { &self.inner[id.0] }
}

/// Registered port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredPort {
    /// Port name, unique within its side.
    pub name: String,

    /// Interface handle.
    pub interface: InterfaceId,

    /// Address region. `Some` exactly for master ports.
    pub region: Option<Region>,
}

/// Port registry.
///
/// Registration is transactional: a proposed port is validated together with the registered
/// ports before it is committed, so a failed registration leaves the registry untouched.
#[derive(Debug, Default, Clone)]
pub struct PortRegistry {
    validator: ConsistencyValidator,
    arena: InterfaceArena,
    slaves: LinkedHashMap<String, RegisteredPort>,
    masters: LinkedHashMap<String, RegisteredPort>,
    names: HashMap<InterfaceId, String>,
}

impl PortRegistry {
    /// Creates an empty registry validated by `validator`.
    pub fn new(validator: ConsistencyValidator) -> Self { Self { validator, ..Self::default() } }

    /// Registers a slave port. Its name defaults to `s_axi<slave count>`.
    pub fn add_slave(&mut self, name: Option<&str>, s_axi: BusInterface) -> Result<InterfaceId, InterconnectError> {
        let name = self.port_name(Side::Slave, name)?;
        s_axi.check()?;
        self.check_signals(&name, &s_axi)?;

        let proposed =
            self.entries(Side::Slave).chain(iter::once((name.as_str(), &s_axi))).chain(self.entries(Side::Master));
        let _ = self.validator.check(proposed, false)?;

        log::info!("Add AXI Slave {} interface.", name);
        Ok(self.commit(Side::Slave, name, s_axi, None))
    }

    /// Registers a master port with its address region. Its name defaults to `m_axi<master count>`.
    ///
    /// `size` is not required to be a power of two here, but a zero size is rejected when the
    /// region parameters are derived.
    pub fn add_master(
        &mut self, name: Option<&str>, m_axi: BusInterface, origin: Option<u64>, size: Option<u64>,
    ) -> Result<InterfaceId, InterconnectError> {
        let name = self.port_name(Side::Master, name)?;
        let region = match (origin, size) {
            (Some(origin), Some(size)) => Region::new(origin, size),
            _ => return Err(InterconnectError::MissingRegion { name }),
        };
        m_axi.check()?;
        self.check_signals(&name, &m_axi)?;

        let proposed =
            self.entries(Side::Slave).chain(self.entries(Side::Master)).chain(iter::once((name.as_str(), &m_axi)));
        let _ = self.validator.check(proposed, false)?;

        log::info!("Add AXI Master {} interface.", name);
        log::info!("  Origin: 0x{:08x}.", region.origin);
        log::info!("  Size:   0x{:x}.", region.size);
        if !region.size.is_power_of_two() {
            log::warn!("Size 0x{:x} of AXI Master {} is not a power of two.", region.size, name);
        }

        Ok(self.commit(Side::Master, name, m_axi, Some(region)))
    }

    /// Returns the name of the port registered with the given interface.
    pub fn lookup_name(&self, interface: InterfaceId) -> Option<&str> { self.names.get(&interface).map(String::as_str) }

    /// Validates the registered ports; see [`ConsistencyValidator::check`].
    pub fn validate(&self, show: bool) -> Result<GlobalParameters, InterconnectError> {
        self.validator.check(self.entries(Side::Slave).chain(self.entries(Side::Master)), show)
    }

    /// Registered ports of the given side, in registration order.
    pub fn ports(&self, side: Side) -> impl Iterator<Item = &RegisteredPort> { self.side(side).values() }

    /// Registered ports of the given side paired with their interfaces, in registration order.
    pub fn entries(&self, side: Side) -> impl Iterator<Item = (&str, &BusInterface)> {
        self.side(side).values().map(move |port| (port.name.as_str(), &self.arena[port.interface]))
    }

    /// Returns the registered port of the given side and name.
    pub fn port(&self, side: Side, name: &str) -> Option<&RegisteredPort> { self.side(side).get(name) }

    /// Returns the interface of the given handle.
    pub fn interface(&self, id: InterfaceId) -> Option<&BusInterface> { self.arena.get(id) }

    /// Number of slave ports.
    pub fn slave_count(&self) -> usize { self.slaves.len() }

    /// Number of master ports.
    pub fn master_count(&self) -> usize { self.masters.len() }

    fn side(&self, side: Side) -> &LinkedHashMap<String, RegisteredPort> {
        match side {
            Side::Slave => &self.slaves,
            Side::Master => &self.masters,
        }
    }

    fn port_name(&self, side: Side, name: Option<&str>) -> Result<String, InterconnectError> {
        let name = name.map_or_else(|| format!("{}{}", side.prefix(), self.side(side).len()), str::to_string);
        if self.side(side).contains_key(&name) {
            return Err(InterconnectError::DuplicateName { side, name });
        }
        Ok(name)
    }

    /// The wrapper exposes every interface signal as a port, so signal names are unique across the
    /// registry.
    fn check_signals(&self, name: &str, interface: &BusInterface) -> Result<(), InterconnectError> {
        for (registered, other) in self.entries(Side::Slave).chain(self.entries(Side::Master)) {
            if let Some(signal) = other.signals().chain(interface.signals()).duplicates().next() {
                return Err(InterconnectError::DuplicateSignal {
                    name: name.to_string(),
                    registered: registered.to_string(),
                    signal: signal.to_string(),
                });
            }
        }
        Ok(())
    }

    fn commit(&mut self, side: Side, name: String, interface: BusInterface, region: Option<Region>) -> InterfaceId {
        let id = self.arena.alloc(interface);
        let _ = self.names.insert(id, name.clone());
        let port = RegisteredPort { name: name.clone(), interface: id, region };
        let _ = match side {
            Side::Slave => self.slaves.insert(name, port),
            Side::Master => self.masters.insert(name, port),
        };
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axi(prefix: &str, clock_domain: &str) -> BusInterface {
        BusInterface::new(prefix, &AxiParams { clock_domain: clock_domain.to_string(), ..AxiParams::default() })
    }

    #[test]
    fn default_names() {
        let mut registry = PortRegistry::default();
        let s0 = registry.add_slave(None, axi("cpu", "sys")).unwrap();
        let s1 = registry.add_slave(None, axi("dma", "sys")).unwrap();
        let m0 = registry.add_master(None, axi("ram", "sys"), Some(0), Some(0x1000)).unwrap();

        assert_eq!(registry.lookup_name(s0), Some("s_axi0"));
        assert_eq!(registry.lookup_name(s1), Some("s_axi1"));
        assert_eq!(registry.lookup_name(m0), Some("m_axi0"));
        assert_eq!(registry.port(Side::Master, "m_axi0").unwrap().region, Some(Region::new(0, 0x1000)));
        assert_eq!(registry.interface(s1).unwrap().prefix(), "dma");
    }

    #[test]
    fn duplicate_name() {
        let mut registry = PortRegistry::default();
        registry.add_slave(Some("s_axi0"), axi("cpu", "sys")).unwrap();
        let err = registry.add_slave(Some("s_axi0"), axi("dma", "sys")).unwrap_err();

        assert_eq!(err, InterconnectError::DuplicateName { side: Side::Slave, name: "s_axi0".to_string() });
        assert_eq!(registry.slave_count(), 1);
    }

    #[test]
    fn names_are_unique_per_side() {
        let mut registry = PortRegistry::default();
        registry.add_slave(Some("bus"), axi("cpu", "sys")).unwrap();
        registry.add_master(Some("bus"), axi("ram", "sys"), Some(0), Some(0x1000)).unwrap();
        assert_eq!(registry.slave_count() + registry.master_count(), 2);
    }

    #[test]
    fn default_name_collision() {
        let mut registry = PortRegistry::default();
        registry.add_slave(Some("s_axi1"), axi("cpu", "sys")).unwrap();
        let err = registry.add_slave(None, axi("dma", "sys")).unwrap_err();
        assert_eq!(err, InterconnectError::DuplicateName { side: Side::Slave, name: "s_axi1".to_string() });
    }

    #[test]
    fn missing_region() {
        let mut registry = PortRegistry::default();
        assert_eq!(
            registry.add_master(None, axi("ram", "sys"), Some(0), None),
            Err(InterconnectError::MissingRegion { name: "m_axi0".to_string() })
        );
        assert_eq!(
            registry.add_master(Some("rom"), axi("rom", "sys"), None, Some(0x100)),
            Err(InterconnectError::MissingRegion { name: "rom".to_string() })
        );
        assert_eq!(registry.master_count(), 0);
    }

    #[test]
    fn zero_size_is_accepted_at_registration() {
        let mut registry = PortRegistry::default();
        assert!(registry.add_master(None, axi("ram", "sys"), Some(0), Some(0)).is_ok());
    }

    #[test]
    fn rejected_registration_leaves_registry_untouched() {
        let mut registry = PortRegistry::default();
        registry.add_slave(None, axi("cpu", "sys")).unwrap();
        let err = registry.add_master(None, axi("ram", "pix"), Some(0), Some(0x1000)).unwrap_err();

        assert!(matches!(err, InterconnectError::Consistency { property: Property::ClockDomain, .. }));
        assert_eq!(registry.master_count(), 0);
        assert_eq!(registry.ports(Side::Slave).count(), 1);
        assert!(registry.validate(false).is_ok());

        // The rejected name is still free.
        let m0 = registry.add_master(None, axi("ram", "sys"), Some(0), Some(0x1000)).unwrap();
        assert_eq!(registry.lookup_name(m0), Some("m_axi0"));
    }

    #[test]
    fn invalid_interface() {
        let mut registry = PortRegistry::default();
        let broken = BusInterface::from_channels("broken", "sys", Vec::<Channel>::new());
        assert!(matches!(registry.add_slave(None, broken), Err(InterconnectError::InvalidInterface { .. })));
        assert!(registry.arena.is_empty());
    }

    #[test]
    fn shared_prefix() {
        let mut registry = PortRegistry::default();
        registry.add_slave(None, axi("cpu", "sys")).unwrap();
        let err = registry.add_master(Some("ram"), axi("cpu", "sys"), Some(0), Some(0x1000)).unwrap_err();

        assert_eq!(err, InterconnectError::DuplicateSignal {
            name: "ram".to_string(),
            registered: "s_axi0".to_string(),
            signal: "cpu_awid".to_string(),
        });
        assert_eq!(registry.master_count(), 0);
        assert!(matches!(registry.add_slave(None, axi("cpu", "sys")), Err(InterconnectError::DuplicateSignal { .. })));
        assert_eq!(registry.slave_count(), 1);
    }

    #[test]
    fn entries_keep_registration_order() {
        let mut registry = PortRegistry::default();
        for prefix in ["c", "a", "b"] {
            registry.add_slave(Some(prefix), axi(prefix, "sys")).unwrap();
        }
        let names = registry.entries(Side::Slave).map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
