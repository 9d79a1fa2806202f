//! Interconnect builder.

use linked_hash_map::LinkedHashMap;

use crate::region::{self, PackedParams};
use crate::*;

/// Packed vectors of one side, keyed by channel and field, in crossbar port order.
pub type PackedChannels = LinkedHashMap<(ChannelKind, Field), PackedVector>;

/// Configuration bundle of the external crossbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossbarConfig {
    /// Name of the generated wrapper module.
    pub module_name: String,

    /// Instance name of the crossbar.
    pub inst_name: String,

    /// Clock domain.
    pub clock_domain: String,

    /// Number of slave ports.
    pub slave_count: usize,

    /// Number of master ports.
    pub master_count: usize,

    /// Data width.
    pub data_width: usize,

    /// Address width.
    pub address_width: usize,

    /// ID width.
    pub id_width: usize,

    /// Base address of every master port.
    pub base_addresses: PackedParams,

    /// Decoded address width of every master port.
    pub region_widths: PackedParams,

    /// Packed vectors of the slave side.
    pub packed_slave_channels: PackedChannels,

    /// Packed vectors of the master side.
    pub packed_master_channels: PackedChannels,

    /// Register the crossbar's inputs and outputs.
    pub register: bool,

    /// Transaction timeout in cycles.
    pub timeout_cycles: u64,
}

impl CrossbarConfig {
    /// Packed vectors of the given side.
    pub fn packed_channels(&self, side: Side) -> &PackedChannels {
        match side {
            Side::Slave => &self.packed_slave_channels,
            Side::Master => &self.packed_master_channels,
        }
    }

    /// Returns the packed vector of the given side, channel and field.
    pub fn packed(&self, side: Side, channel: ChannelKind, field: Field) -> Option<&PackedVector> {
        self.packed_channels(side).get(&(channel, field))
    }
}

/// Interconnect builder.
///
/// Upstream managers attach to slave ports and downstream subordinates to master ports. Every
/// registration is validated against the ports registered so far.
#[derive(Debug, Default, Clone)]
pub struct Interconnect {
    config: InterconnectConfig,
    registry: PortRegistry,
}

impl Interconnect {
    /// Creates an interconnect without ports.
    pub fn new(config: InterconnectConfig) -> Self {
        let registry = PortRegistry::new(config.validator());
        Self { config, registry }
    }

    /// Configuration.
    pub fn config(&self) -> &InterconnectConfig { &self.config }

    /// Port registry.
    pub fn registry(&self) -> &PortRegistry { &self.registry }

    /// Registers a slave port; see [`PortRegistry::add_slave`].
    pub fn add_slave(&mut self, name: Option<&str>, s_axi: BusInterface) -> Result<InterfaceId, InterconnectError> {
        self.registry.add_slave(name, s_axi)
    }

    /// Registers a master port; see [`PortRegistry::add_master`].
    pub fn add_master(
        &mut self, name: Option<&str>, m_axi: BusInterface, origin: Option<u64>, size: Option<u64>,
    ) -> Result<InterfaceId, InterconnectError> {
        self.registry.add_master(name, m_axi, origin, size)
    }

    /// Returns the name of the port registered with the given interface.
    pub fn lookup_name(&self, interface: InterfaceId) -> Option<&str> { self.registry.lookup_name(interface) }

    /// Validates the registered ports.
    pub fn validate(&self, show: bool) -> Result<GlobalParameters, InterconnectError> { self.registry.validate(show) }

    /// Derives the configuration bundle of the crossbar.
    pub fn finalize(&self) -> Result<CrossbarConfig, InterconnectError> {
        let params = self.registry.validate(true)?;

        log::info!("Finalized {}X{} Interconnect:", self.registry.slave_count(), self.registry.master_count());
        log::info!("  Slaves:");
        for port in self.registry.ports(Side::Slave) {
            log::info!("  - {}.", port.name);
        }
        log::info!("  Masters:");
        for port in self.registry.ports(Side::Master) {
            if let Some(region) = port.region {
                log::info!("  - {}, Origin: 0x{:08x}, Size: 0x{:x}.", port.name, region.origin, region.size);
            }
        }

        let regions = region::derive(self.registry.ports(Side::Master), params.address_width)?;

        Ok(CrossbarConfig {
            module_name: self.config.module_name.clone(),
            inst_name: self.config.inst_name.clone(),
            clock_domain: params.clock_domain,
            slave_count: self.registry.slave_count(),
            master_count: self.registry.master_count(),
            data_width: params.data_width,
            address_width: params.address_width,
            id_width: params.id_width,
            base_addresses: regions.base_addresses,
            region_widths: regions.region_widths,
            packed_slave_channels: self.pack_side(Side::Slave)?,
            packed_master_channels: self.pack_side(Side::Master)?,
            register: self.config.register,
            timeout_cycles: self.config.timeout_cycles,
        })
    }

    /// Builds an interconnect from upstream managers and address-mapped downstream subordinates,
    /// in the given order, and finalizes it.
    pub fn wrap<M, S>(
        masters: M, slaves: S, register: bool, timeout_cycles: u64,
    ) -> Result<CrossbarConfig, InterconnectError>
    where
        M: IntoIterator<Item = BusInterface>,
        S: IntoIterator<Item = (Region, BusInterface)>,
    {
        let config = InterconnectConfig { register, timeout_cycles, ..InterconnectConfig::default() };
        Self::wrap_with_config(config, masters, slaves)
    }

    /// Same as [`Interconnect::wrap`] with an explicit configuration.
    pub fn wrap_with_config<M, S>(
        config: InterconnectConfig, masters: M, slaves: S,
    ) -> Result<CrossbarConfig, InterconnectError>
    where
        M: IntoIterator<Item = BusInterface>,
        S: IntoIterator<Item = (Region, BusInterface)>,
    {
        let mut interconnect = Self::new(config);
        for master in masters {
            let _ = interconnect.add_slave(None, master)?;
        }
        for (region, slave) in slaves {
            let _ = interconnect.add_master(None, slave, Some(region.origin), Some(region.size))?;
        }
        interconnect.finalize()
    }

    fn pack_side(&self, side: Side) -> Result<PackedChannels, InterconnectError> {
        let mut packed = LinkedHashMap::new();
        for channel in ChannelKind::ALL {
            for abi_field in Abi::Interconnect.fields(side, channel) {
                let vector = Abi::Interconnect.pack(self.registry.entries(side), side, channel, abi_field.field)?;
                let _ = packed.insert((channel, abi_field.field), vector);
            }
        }
        Ok(packed)
    }
}
