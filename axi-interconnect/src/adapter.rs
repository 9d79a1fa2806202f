//! AXI adapter.
//!
//! Point-to-point width converter between one upstream manager and one downstream subordinate.
//! Only the data width may differ between both sides.

use itertools::Itertools;
use thiserror::Error;

use crate::*;

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("different {property} on AXI interfaces (slave: {expected} / master: {actual}), should be the same")]
    Mismatch { property: Property, expected: String, actual: String },

    #[error(transparent)]
    Interface(#[from] InterconnectError),
}

/// Configuration of the external `axi_adapter` module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Instance name of the adapter.
    pub inst_name: String,

    /// Clock domain.
    pub clock_domain: String,

    /// Address width.
    pub addr_width: usize,

    /// Data width of the slave side.
    pub s_data_width: usize,

    /// Data width of the master side.
    pub m_data_width: usize,

    /// ID width.
    pub id_width: usize,

    /// Forward transaction IDs.
    pub forward_id: bool,

    /// Convert bursts.
    pub convert_burst: bool,

    /// Convert narrow bursts.
    pub convert_narrow_burst: bool,

    /// Vectors of the slave side.
    pub packed_slave_channels: PackedChannels,

    /// Vectors of the master side.
    pub packed_master_channels: PackedChannels,
}

impl AdapterConfig {
    /// Checks that `s_axi` can be adapted to `m_axi` and derives the adapter configuration.
    pub fn new(s_axi: &BusInterface, m_axi: &BusInterface, options: AdapterOptions) -> Result<Self, AdapterError> {
        s_axi.check()?;
        m_axi.check()?;
        if let Some(signal) = s_axi.signals().chain(m_axi.signals()).duplicates().next() {
            return Err(AdapterError::Interface(InterconnectError::DuplicateSignal {
                name: Side::Master.prefix().to_string(),
                registered: Side::Slave.prefix().to_string(),
                signal: signal.to_string(),
            }));
        }

        for property in [Property::ClockDomain, Property::AddressWidth] {
            check(property, s_axi, m_axi)?;
        }
        log::info!("Clock Domain: {}", s_axi.clock_domain());
        log::info!("Address Width: {}", s_axi.address_width());
        log::info!("Slave Data Width: {}", s_axi.data_width());
        log::info!("Master Data Width: {}", m_axi.data_width());
        check(Property::IdWidth, s_axi, m_axi)?;
        log::info!("ID Width: {}", s_axi.id_width());

        let id_width = s_axi.id_width();
        Ok(Self {
            inst_name: "axi_adapter_inst".to_string(),
            clock_domain: s_axi.clock_domain().to_string(),
            addr_width: s_axi.address_width(),
            s_data_width: s_axi.data_width(),
            m_data_width: m_axi.data_width(),
            id_width,
            forward_id: options.forward_id && id_width != 0,
            convert_burst: options.convert_burst,
            convert_narrow_burst: options.convert_narrow_burst,
            packed_slave_channels: pack_side(Side::Slave, s_axi)?,
            packed_master_channels: pack_side(Side::Master, m_axi)?,
        })
    }

    /// Vectors of the given side.
    pub fn packed_channels(&self, side: Side) -> &PackedChannels {
        match side {
            Side::Slave => &self.packed_slave_channels,
            Side::Master => &self.packed_master_channels,
        }
    }
}

fn check(property: Property, s_axi: &BusInterface, m_axi: &BusInterface) -> Result<(), AdapterError> {
    let expected = property.value(s_axi);
    let actual = property.value(m_axi);
    if expected != actual {
        log::error!(
            "Different {} on AXI interfaces (Slave: {} / Master: {}), should be the same.",
            property.label(),
            expected,
            actual
        );
        return Err(AdapterError::Mismatch { property, expected, actual });
    }
    Ok(())
}

fn pack_side(side: Side, axi: &BusInterface) -> Result<PackedChannels, InterconnectError> {
    let mut packed = PackedChannels::new();
    for channel in ChannelKind::ALL {
        for abi_field in Abi::Adapter.fields(side, channel) {
            let vector = Abi::Adapter.pack([(side.prefix(), axi)], side, channel, abi_field.field)?;
            let _ = packed.insert((channel, abi_field.field), vector);
        }
    }
    Ok(packed)
}
