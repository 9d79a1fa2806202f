//! AXI bus interface.
//!
//! A [`BusInterface`] is a bundle of the five AXI channels. Every channel is an ordered set of
//! named signal fields with fixed widths, so the interface is a pure description: it carries the
//! Verilog signal name of each field and its width, never a value.

use std::fmt;

use itertools::Itertools;
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::InterconnectError;

/// Width of `axlen`.
pub const AXI_LEN_WIDTH: usize = 8;
/// Width of `axsize`.
pub const AXI_SIZE_WIDTH: usize = 3;
/// Width of `axburst`.
pub const AXI_BURST_WIDTH: usize = 2;
/// Width of `axlock`.
pub const AXI_LOCK_WIDTH: usize = 1;
/// Width of `axcache`.
pub const AXI_CACHE_WIDTH: usize = 4;
/// Width of `axprot`.
pub const AXI_PROT_WIDTH: usize = 3;
/// Width of `axqos`.
pub const AXI_QOS_WIDTH: usize = 4;
/// Width of `axregion`.
pub const AXI_REGION_WIDTH: usize = 4;
/// Width of `bresp` and `rresp`.
pub const AXI_RESP_WIDTH: usize = 2;
/// Number of data bits covered by one `wstrb` bit.
pub const AXI_STRB_GRANULARITY: usize = 8;

// AXI requires byte (8-bit) strobe granularity.
const_assert_eq!(AXI_STRB_GRANULARITY, 8);

/// AXI channel kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelKind {
    /// Write address.
    Aw,

    /// Write data.
    W,

    /// Write response.
    B,

    /// Read address.
    Ar,

    /// Read data.
    R,
}

impl ChannelKind {
    /// All channels in AXI order.
    pub const ALL: [ChannelKind; 5] =
        [ChannelKind::Aw, ChannelKind::W, ChannelKind::B, ChannelKind::Ar, ChannelKind::R];

    /// Channel prefix used in signal names.
    pub fn name(self) -> &'static str {
        match self {
            ChannelKind::Aw => "aw",
            ChannelKind::W => "w",
            ChannelKind::B => "b",
            ChannelKind::Ar => "ar",
            ChannelKind::R => "r",
        }
    }

    /// Returns `true` if the channel carries payload from manager to subordinate.
    pub fn is_request(self) -> bool { matches!(self, ChannelKind::Aw | ChannelKind::W | ChannelKind::Ar) }

    /// Fields every interface carries on this channel, in AXI order.
    pub fn fields(self) -> &'static [Field] {
        use Field::*;

        match self {
            ChannelKind::Aw | ChannelKind::Ar => &[Id, Addr, Len, Size, Burst, Lock, Cache, Prot, Qos, Valid, Ready],
            ChannelKind::W => &[Data, Strb, Last, Valid, Ready],
            ChannelKind::B => &[Id, Resp, Valid, Ready],
            ChannelKind::R => &[Id, Data, Resp, Last, Valid, Ready],
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.name().to_uppercase()) }
}

/// AXI signal fields.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Id,
    Addr,
    Len,
    Size,
    Burst,
    Lock,
    Cache,
    Prot,
    Qos,
    Region,
    User,
    Data,
    Strb,
    Last,
    Resp,
    Valid,
    Ready,
}

impl Field {
    /// Field suffix used in signal names.
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Addr => "addr",
            Field::Len => "len",
            Field::Size => "size",
            Field::Burst => "burst",
            Field::Lock => "lock",
            Field::Cache => "cache",
            Field::Prot => "prot",
            Field::Qos => "qos",
            Field::Region => "region",
            Field::User => "user",
            Field::Data => "data",
            Field::Strb => "strb",
            Field::Last => "last",
            Field::Resp => "resp",
            Field::Valid => "valid",
            Field::Ready => "ready",
        }
    }

    /// Returns `true` if the field travels in the channel's forward direction.
    ///
    /// Only `ready` travels backward.
    pub fn is_forward(self) -> bool { self != Field::Ready }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.name()) }
}

/// A named bit-vector of fixed width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalField {
    /// Verilog identifier of the signal.
    pub signal: String,

    /// Width in bits.
    pub width: usize,
}

/// Channel: an ordered mapping from field to signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    kind: ChannelKind,
    fields: LinkedHashMap<Field, SignalField>,
}

impl Channel {
    /// Creates an empty channel.
    pub fn new(kind: ChannelKind) -> Self { Self { kind, fields: LinkedHashMap::new() } }

    /// Adds a field, replacing an existing field of the same name.
    #[must_use]
    pub fn with_field(mut self, field: Field, signal: String, width: usize) -> Self {
        let _ = self.fields.insert(field, SignalField { signal, width });
        self
    }

    /// Channel kind.
    pub fn kind(&self) -> ChannelKind { self.kind }

    /// Returns the given field.
    pub fn get(&self, field: Field) -> Option<&SignalField> { self.fields.get(&field) }

    /// Iterates over the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &SignalField)> { self.fields.iter().map(|(k, v)| (*k, v)) }

    /// Total width of the channel.
    pub fn width(&self) -> usize { self.fields.values().map(|f| f.width).sum() }
}

/// Parameters of a standard AXI interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxiParams {
    /// Clock domain.
    pub clock_domain: String,

    /// Width of `axaddr`.
    pub address_width: usize,

    /// Width of `wdata` and `rdata`.
    pub data_width: usize,

    /// Width of `axid`, `bid` and `rid`. May be zero.
    pub id_width: usize,
}

impl Default for AxiParams {
    fn default() -> Self { Self { clock_domain: "sys".to_string(), address_width: 32, data_width: 32, id_width: 1 } }
}

/// AXI bus interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusInterface {
    prefix: String,
    clock_domain: String,
    channels: LinkedHashMap<ChannelKind, Channel>,
}

impl BusInterface {
    /// Creates a standard AXI interface whose signals are named `<prefix>_<channel><field>`.
    pub fn new(prefix: &str, params: &AxiParams) -> Self {
        let channels = ChannelKind::ALL.into_iter().map(|kind| {
            kind.fields().iter().fold(Channel::new(kind), |channel, &field| {
                let width = standard_width(field, params);
                channel.with_field(field, signal_name(prefix, kind, field), width)
            })
        });
        Self::from_channels(prefix, &params.clock_domain, channels)
    }

    /// Creates an interface from explicit channels.
    ///
    /// The result is not checked; see [`BusInterface::check`].
    pub fn from_channels<I: IntoIterator<Item = Channel>>(prefix: &str, clock_domain: &str, channels: I) -> Self {
        Self {
            prefix: prefix.to_string(),
            clock_domain: clock_domain.to_string(),
            channels: channels.into_iter().map(|channel| (channel.kind(), channel)).collect(),
        }
    }

    /// Signal name prefix.
    pub fn prefix(&self) -> &str { &self.prefix }

    /// Clock domain.
    pub fn clock_domain(&self) -> &str { &self.clock_domain }

    /// Returns the given channel.
    pub fn channel(&self, kind: ChannelKind) -> Option<&Channel> { self.channels.get(&kind) }

    /// Returns the given field of the given channel.
    pub fn field(&self, kind: ChannelKind, field: Field) -> Option<&SignalField> {
        self.channel(kind).and_then(|channel| channel.get(field))
    }

    /// Width of the given field, or zero if the field is absent.
    pub fn field_width(&self, kind: ChannelKind, field: Field) -> usize {
        self.field(kind, field).map_or(0, |f| f.width)
    }

    /// Address width: width of `awaddr`.
    pub fn address_width(&self) -> usize { self.field_width(ChannelKind::Aw, Field::Addr) }

    /// Data width: width of `wdata`.
    pub fn data_width(&self) -> usize { self.field_width(ChannelKind::W, Field::Data) }

    /// ID width: width of `awid`.
    pub fn id_width(&self) -> usize { self.field_width(ChannelKind::Aw, Field::Id) }

    /// Verilog names of every signal, channel by channel.
    pub fn signals(&self) -> impl Iterator<Item = &str> {
        self.channels.values().flat_map(|channel| channel.iter().map(|(_, signal)| signal.signal.as_str()))
    }

    /// Checks that the interface is a well-formed AXI interface.
    ///
    /// Every field other than `id`, `addr`, `data` and `strb` has its fixed AXI width. The `id`
    /// fields of all channels agree, and no signal name is used twice.
    pub fn check(&self) -> Result<(), InterconnectError> {
        let invalid = |reason: String| InterconnectError::InvalidInterface { interface: self.prefix.clone(), reason };

        for kind in ChannelKind::ALL {
            let channel = self.channel(kind).ok_or_else(|| invalid(format!("missing {} channel", kind)))?;
            for &field in kind.fields() {
                let missing = || invalid(format!("missing {}{} field", kind.name(), field));
                let signal = channel.get(field).ok_or_else(missing)?;
                if let Some(width) = fixed_width(field) {
                    if signal.width != width {
                        return Err(invalid(format!(
                            "{}{} is {} bits wide, expected {}",
                            kind.name(),
                            field,
                            signal.width,
                            width
                        )));
                    }
                }
            }
        }

        if let Some(signal) = self.signals().duplicates().next() {
            return Err(invalid(format!("signal {} is declared more than once", signal)));
        }

        let address_width = self.address_width();
        let data_width = self.data_width();
        if address_width == 0 {
            return Err(invalid("address width is zero".to_string()));
        }
        if data_width == 0 || data_width % AXI_STRB_GRANULARITY != 0 {
            return Err(invalid(format!("data width {} is not a positive multiple of 8", data_width)));
        }

        let strb_width = self.field_width(ChannelKind::W, Field::Strb);
        if strb_width != data_width / AXI_STRB_GRANULARITY {
            return Err(invalid(format!("strobe width {} does not match data width {}", strb_width, data_width)));
        }
        if self.field_width(ChannelKind::Ar, Field::Addr) != address_width {
            return Err(invalid("araddr and awaddr widths differ".to_string()));
        }
        if self.field_width(ChannelKind::R, Field::Data) != data_width {
            return Err(invalid("rdata and wdata widths differ".to_string()));
        }

        let id_width = self.id_width();
        for kind in [ChannelKind::B, ChannelKind::Ar, ChannelKind::R] {
            if self.field_width(kind, Field::Id) != id_width {
                return Err(invalid(format!("{}id and awid widths differ", kind.name())));
            }
        }

        Ok(())
    }
}

/// Signal name of a field on a standard interface.
pub fn signal_name(prefix: &str, kind: ChannelKind, field: Field) -> String {
    format!("{}_{}{}", prefix, kind.name(), field.name())
}

/// Width of a field that does not depend on the interface parameters.
fn fixed_width(field: Field) -> Option<usize> {
    match field {
        Field::Id | Field::Addr | Field::Data | Field::Strb => None,
        Field::Len => Some(AXI_LEN_WIDTH),
        Field::Size => Some(AXI_SIZE_WIDTH),
        Field::Burst => Some(AXI_BURST_WIDTH),
        Field::Lock => Some(AXI_LOCK_WIDTH),
        Field::Cache => Some(AXI_CACHE_WIDTH),
        Field::Prot => Some(AXI_PROT_WIDTH),
        Field::Qos => Some(AXI_QOS_WIDTH),
        Field::Region => Some(AXI_REGION_WIDTH),
        Field::User => Some(0),
        Field::Resp => Some(AXI_RESP_WIDTH),
        Field::Last | Field::Valid | Field::Ready => Some(1),
    }
}

fn standard_width(field: Field, params: &AxiParams) -> usize {
    match field {
        Field::Id => params.id_width,
        Field::Addr => params.address_width,
        Field::Data => params.data_width,
        Field::Strb => params.data_width / AXI_STRB_GRANULARITY,
        _ => fixed_width(field).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(data_width: usize) -> AxiParams { AxiParams { data_width, ..AxiParams::default() } }

    #[test]
    fn standard_interface() {
        let axi = BusInterface::new("cpu", &AxiParams { id_width: 4, ..params(64) });

        assert_eq!(axi.clock_domain(), "sys");
        assert_eq!(axi.address_width(), 32);
        assert_eq!(axi.data_width(), 64);
        assert_eq!(axi.id_width(), 4);
        assert_eq!(axi.field_width(ChannelKind::W, Field::Strb), 8);
        assert_eq!(axi.field(ChannelKind::Aw, Field::Addr).unwrap().signal, "cpu_awaddr");
        assert_eq!(axi.field(ChannelKind::R, Field::Ready).unwrap().signal, "cpu_rready");
        assert!(axi.check().is_ok());
    }

    #[test]
    fn channel_field_order() {
        let axi = BusInterface::new("cpu", &params(32));
        let fields = axi.channel(ChannelKind::B).unwrap().iter().map(|(field, _)| field).collect::<Vec<_>>();
        assert_eq!(fields, vec![Field::Id, Field::Resp, Field::Valid, Field::Ready]);
        assert_eq!(axi.channel(ChannelKind::B).unwrap().width(), 1 + 2 + 1 + 1);
    }

    #[test]
    fn missing_channel() {
        let axi = BusInterface::new("cpu", &params(32));
        let channels =
            ChannelKind::ALL.into_iter().filter(|k| *k != ChannelKind::B).map(|k| axi.channel(k).unwrap().clone());
        let broken = BusInterface::from_channels("broken", "sys", channels);

        match broken.check() {
            Err(InterconnectError::InvalidInterface { interface, reason }) => {
                assert_eq!(interface, "broken");
                assert_eq!(reason, "missing B channel");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_field() {
        let aw = Channel::new(ChannelKind::Aw).with_field(Field::Addr, "x_awaddr".to_string(), 32);
        let axi = BusInterface::new("cpu", &params(32));
        let channels = ChannelKind::ALL
            .into_iter()
            .map(|k| if k == ChannelKind::Aw { aw.clone() } else { axi.channel(k).unwrap().clone() });
        let broken = BusInterface::from_channels("x", "sys", channels);

        assert!(matches!(broken.check(), Err(InterconnectError::InvalidInterface { .. })));
    }

    #[test]
    fn bad_widths() {
        assert!(BusInterface::new("a", &params(0)).check().is_err());
        assert!(BusInterface::new("a", &params(12)).check().is_err());
        assert!(BusInterface::new("a", &AxiParams { address_width: 0, ..params(32) }).check().is_err());

        let axi = BusInterface::new("a", &params(32));
        let channels = ChannelKind::ALL.into_iter().map(|k| {
            let channel = axi.channel(k).unwrap().clone();
            if k == ChannelKind::W {
                channel.with_field(Field::Strb, "a_wstrb".to_string(), 2)
            } else {
                channel
            }
        });
        assert!(BusInterface::from_channels("a", "sys", channels).check().is_err());
    }

    /// Replaces one field of a standard interface.
    fn with_field(axi: &BusInterface, kind: ChannelKind, field: Field, width: usize) -> BusInterface {
        let channels = ChannelKind::ALL.into_iter().map(|k| {
            let channel = axi.channel(k).unwrap().clone();
            if k == kind {
                channel.with_field(field, signal_name(axi.prefix(), k, field), width)
            } else {
                channel
            }
        });
        BusInterface::from_channels(axi.prefix(), axi.clock_domain(), channels)
    }

    fn reason(axi: &BusInterface) -> String {
        match axi.check() {
            Err(InterconnectError::InvalidInterface { reason, .. }) => reason,
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn fixed_field_widths() {
        let axi = BusInterface::new("cpu", &AxiParams { id_width: 4, ..params(32) });

        assert_eq!(reason(&with_field(&axi, ChannelKind::Aw, Field::Len, 4)), "awlen is 4 bits wide, expected 8");
        assert_eq!(reason(&with_field(&axi, ChannelKind::B, Field::Resp, 3)), "bresp is 3 bits wide, expected 2");
        assert_eq!(reason(&with_field(&axi, ChannelKind::R, Field::Valid, 2)), "rvalid is 2 bits wide, expected 1");
    }

    #[test]
    fn id_widths_agree() {
        let axi = BusInterface::new("cpu", &AxiParams { id_width: 4, ..params(32) });

        assert_eq!(reason(&with_field(&axi, ChannelKind::B, Field::Id, 2)), "bid and awid widths differ");
        assert_eq!(reason(&with_field(&axi, ChannelKind::Ar, Field::Id, 0)), "arid and awid widths differ");
        assert!(with_field(&axi, ChannelKind::R, Field::Id, 4).check().is_ok());
    }

    #[test]
    fn duplicate_signal() {
        let axi = BusInterface::new("cpu", &params(32));
        let channels = ChannelKind::ALL.into_iter().map(|k| {
            let channel = axi.channel(k).unwrap().clone();
            if k == ChannelKind::Ar {
                channel.with_field(Field::Valid, "cpu_awvalid".to_string(), 1)
            } else {
                channel
            }
        });
        let broken = BusInterface::from_channels("cpu", "sys", channels);
        assert_eq!(reason(&broken), "signal cpu_awvalid is declared more than once");
    }
}
