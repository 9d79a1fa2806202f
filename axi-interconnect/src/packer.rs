//! Vector packer.
//!
//! The crossbar exposes one wide vector per channel field and side, e.g. `s_axi_awaddr` is the
//! concatenation of the `awaddr` signal of every slave port, slave 0 in the low-order bits. The
//! ABI table below lists the vectors of the external modules in port order.

use std::fmt;

use bitvec::prelude::*;

use crate::*;

/// Width of the `*user` sideband vectors per port.
///
/// The interfaces carry no user sidebands, so the crossbar is instantiated with `*USER_ENABLE = 0`
/// and the minimal legal width.
pub const AXI_USER_WIDTH: usize = 1;

/// Direction of a port, from the external module's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Input port.
    Input,

    /// Output port.
    Output,
}

/// Whether the interfaces drive an ABI field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Support {
    /// Connected to the interfaces' signals.
    Wired,

    /// Not carried by the interfaces. Tied to zero if it is an input, left open if it is an output.
    Unsupported {
        /// Width per port.
        width: usize,
    },
}

/// Field of the ABI table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbiField {
    /// Field.
    pub field: Field,

    /// Direction.
    pub direction: Direction,

    /// Support.
    pub support: Support,
}

/// External modules whose ports are built by concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Abi {
    /// `axi_interconnect`: N×M crossbar.
    Interconnect,

    /// `axi_adapter`: point-to-point width converter.
    Adapter,
}

impl Abi {
    /// Verilog module name.
    pub fn module_name(self) -> &'static str {
        match self {
            Abi::Interconnect => "axi_interconnect",
            Abi::Adapter => "axi_adapter",
        }
    }

    /// Fields of the given side and channel, in port order.
    pub fn fields(self, side: Side, channel: ChannelKind) -> Vec<AbiField> {
        let has_region = match (self, side) {
            (Abi::Interconnect, Side::Slave) => false,
            _ => matches!(channel, ChannelKind::Aw | ChannelKind::Ar),
        };

        let mut fields = Vec::new();
        for &field in channel.fields() {
            if field == Field::Valid {
                if has_region {
                    fields.push(Self::unsupported(side, channel, Field::Region, AXI_REGION_WIDTH));
                }
                fields.push(Self::unsupported(side, channel, Field::User, AXI_USER_WIDTH));
            }
            fields.push(AbiField { field, direction: direction(side, channel, field), support: Support::Wired });
        }
        fields
    }

    /// Returns the given field, or `None` if the external module has no such port.
    pub fn field(self, side: Side, channel: ChannelKind, field: Field) -> Option<AbiField> {
        self.fields(side, channel).into_iter().find(|f| f.field == field)
    }

    /// Packs `field` of `channel` across the given ports (name and interface), port 0 in the low-order bits.
    pub fn pack<'a, I>(
        self, ports: I, side: Side, channel: ChannelKind, field: Field,
    ) -> Result<PackedVector, InterconnectError>
    where I: IntoIterator<Item = (&'a str, &'a BusInterface)> {
        let abi_field =
            self.field(side, channel, field).ok_or(InterconnectError::UnknownAbiField { side, channel, field })?;
        let ports = ports.into_iter().collect::<Vec<_>>();

        let (width, packing) = match abi_field.support {
            Support::Unsupported { width } => {
                let packing = match abi_field.direction {
                    Direction::Input => Packing::Zero,
                    Direction::Output => Packing::Open,
                };
                (width * ports.len(), packing)
            }
            Support::Wired => {
                let mut segments = Vec::with_capacity(ports.len());
                let mut lsb = 0;
                for (name, interface) in ports {
                    let signal = interface.field(channel, field).ok_or_else(|| InterconnectError::InvalidInterface {
                        interface: interface.prefix().to_string(),
                        reason: format!("missing {}{} field", channel.name(), field),
                    })?;
                    segments.push(Segment {
                        port: name.to_string(),
                        signal: signal.signal.clone(),
                        lsb,
                        width: signal.width,
                    });
                    lsb += signal.width;
                }
                (lsb, Packing::Concat(segments))
            }
        };

        Ok(PackedVector { side, channel, field, direction: abi_field.direction, width, packing })
    }

    fn unsupported(side: Side, channel: ChannelKind, field: Field, width: usize) -> AbiField {
        AbiField { field, direction: direction(side, channel, field), support: Support::Unsupported { width } }
    }
}

/// Direction of a field on the given side, from the external module's point of view.
///
/// Slave ports face upstream managers, so request payloads and response `ready`s are inputs there.
/// Master ports are the mirror image.
pub fn direction(side: Side, channel: ChannelKind, field: Field) -> Direction {
    let inward = channel.is_request() == field.is_forward();
    match (side, inward) {
        (Side::Slave, true) | (Side::Master, false) => Direction::Input,
        (Side::Slave, false) | (Side::Master, true) => Direction::Output,
    }
}

/// Packs `field` of `channel` across the given ports for the crossbar; see [`Abi::pack`].
pub fn pack<'a, I>(ports: I, side: Side, channel: ChannelKind, field: Field) -> Result<PackedVector, InterconnectError>
where I: IntoIterator<Item = (&'a str, &'a BusInterface)> {
    Abi::Interconnect.pack(ports, side, channel, field)
}

/// Slice of a packed vector driven by one port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Port name.
    pub port: String,

    /// Signal of the port.
    pub signal: String,

    /// Least significant bit in the packed vector.
    pub lsb: usize,

    /// Width.
    pub width: usize,
}

/// How a packed vector is driven.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Packing {
    /// Concatenation of the ports' signals.
    Concat(Vec<Segment>),

    /// Constant zero.
    Zero,

    /// Unconnected.
    Open,
}

/// Packed vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackedVector {
    /// Side.
    pub side: Side,

    /// Channel.
    pub channel: ChannelKind,

    /// Field.
    pub field: Field,

    /// Direction.
    pub direction: Direction,

    /// Total width.
    pub width: usize,

    /// Packing.
    pub packing: Packing,
}

impl PackedVector {
    /// Port name on the external module (e.g. `s_axi_awaddr`).
    pub fn name(&self) -> String { signal_name(self.side.prefix(), self.channel, self.field) }

    /// Segments in low-to-high order. Empty unless the vector is a concatenation.
    pub fn segments(&self) -> &[Segment] {
        match &self.packing {
            Packing::Concat(segments) => segments,
            Packing::Zero | Packing::Open => &[],
        }
    }

    /// Assembles one value per segment into the packed value.
    pub fn concat_values(&self, values: &[BitVec]) -> Result<BitVec, InterconnectError> {
        let segments = self.segments();
        if values.len() != segments.len() {
            return Err(InterconnectError::ValueCount { expected: segments.len(), actual: values.len() });
        }

        let mut bits = bitvec![0; self.width];
        for (segment, value) in segments.iter().zip(values) {
            if value.len() != segment.width {
                return Err(InterconnectError::ValueWidth {
                    port: segment.port.clone(),
                    expected: segment.width,
                    actual: value.len(),
                });
            }
            bits[segment.lsb..segment.lsb + segment.width].copy_from_bitslice(value);
        }
        Ok(bits)
    }

    /// Slices a packed value into one value per segment.
    pub fn split_values(&self, value: &BitSlice) -> Result<Vec<BitVec>, InterconnectError> {
        if value.len() != self.width {
            return Err(InterconnectError::ValueWidth { port: self.name(), expected: self.width, actual: value.len() });
        }
        Ok(self.segments().iter().map(|segment| value[segment.lsb..segment.lsb + segment.width].to_bitvec()).collect())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::u64_to_bitvec;

    fn axi(prefix: &str, id_width: usize) -> BusInterface {
        BusInterface::new(prefix, &AxiParams { id_width, ..AxiParams::default() })
    }

    #[test]
    fn directions() {
        assert_eq!(direction(Side::Slave, ChannelKind::Aw, Field::Addr), Direction::Input);
        assert_eq!(direction(Side::Slave, ChannelKind::Aw, Field::Ready), Direction::Output);
        assert_eq!(direction(Side::Slave, ChannelKind::R, Field::Data), Direction::Output);
        assert_eq!(direction(Side::Slave, ChannelKind::B, Field::Ready), Direction::Input);
        assert_eq!(direction(Side::Master, ChannelKind::W, Field::Data), Direction::Output);
        assert_eq!(direction(Side::Master, ChannelKind::W, Field::Ready), Direction::Input);
        assert_eq!(direction(Side::Master, ChannelKind::B, Field::Resp), Direction::Input);
    }

    #[test]
    fn abi_tables() {
        let names =
            |abi: Abi, side, channel| abi.fields(side, channel).iter().map(|f| f.field.name()).collect::<Vec<_>>();

        assert_eq!(names(Abi::Interconnect, Side::Slave, ChannelKind::Aw), vec![
            "id", "addr", "len", "size", "burst", "lock", "cache", "prot", "qos", "user", "valid", "ready"
        ]);
        assert_eq!(names(Abi::Interconnect, Side::Master, ChannelKind::Ar), vec![
            "id", "addr", "len", "size", "burst", "lock", "cache", "prot", "qos", "region", "user", "valid", "ready"
        ]);
        assert_eq!(names(Abi::Interconnect, Side::Master, ChannelKind::R), vec![
            "id", "data", "resp", "last", "user", "valid", "ready"
        ]);
        assert_eq!(names(Abi::Adapter, Side::Slave, ChannelKind::Aw)[9], "region");
        assert_eq!(names(Abi::Adapter, Side::Slave, ChannelKind::W), vec![
            "data", "strb", "last", "user", "valid", "ready"
        ]);

        let region = Abi::Adapter.field(Side::Slave, ChannelKind::Ar, Field::Region).unwrap();
        assert_eq!(region.direction, Direction::Input);
        assert_eq!(region.support, Support::Unsupported { width: AXI_REGION_WIDTH });
        assert_eq!(Abi::Interconnect.field(Side::Slave, ChannelKind::Ar, Field::Region), None);
    }

    #[test]
    fn concatenation_order() {
        let (a, b, c) = (axi("a", 4), axi("b", 4), axi("c", 4));
        let ports = vec![("s_axi0", &a), ("s_axi1", &b), ("s_axi2", &c)];
        let packed = pack(ports, Side::Slave, ChannelKind::Aw, Field::Id).unwrap();

        assert_eq!(packed.name(), "s_axi_awid");
        assert_eq!(packed.direction, Direction::Input);
        assert_eq!(packed.width, 12);
        let segments = packed.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!((segments[0].signal.as_str(), segments[0].lsb, segments[0].width), ("a_awid", 0, 4));
        assert_eq!((segments[2].port.as_str(), segments[2].lsb), ("s_axi2", 8));
    }

    #[test]
    fn unsupported_fields() {
        let (a, b) = (axi("a", 1), axi("b", 1));
        let ports = || vec![("m_axi0", &a), ("m_axi1", &b)];

        let region = pack(ports(), Side::Master, ChannelKind::Aw, Field::Region).unwrap();
        assert_eq!((region.width, &region.packing, region.direction), (8, &Packing::Open, Direction::Output));

        let user = pack(ports(), Side::Master, ChannelKind::B, Field::User).unwrap();
        assert_eq!((user.width, &user.packing, user.direction), (2, &Packing::Zero, Direction::Input));

        let err = pack(ports(), Side::Slave, ChannelKind::Aw, Field::Region).unwrap_err();
        assert_eq!(err, InterconnectError::UnknownAbiField {
            side: Side::Slave,
            channel: ChannelKind::Aw,
            field: Field::Region
        });
    }

    #[test]
    fn values() {
        let (a, b) = (axi("a", 3), axi("b", 3));
        let packed = pack(vec![("s_axi0", &a), ("s_axi1", &b)], Side::Slave, ChannelKind::B, Field::Id).unwrap();

        let value = packed.concat_values(&[u64_to_bitvec(3, 0b101), u64_to_bitvec(3, 0b011)]).unwrap();
        assert_eq!(value, bitvec![1, 0, 1, 1, 1, 0]);
        assert_eq!(packed.split_values(&value).unwrap(), vec![u64_to_bitvec(3, 0b101), u64_to_bitvec(3, 0b011)]);

        assert_eq!(
            packed.concat_values(&[u64_to_bitvec(3, 0)]),
            Err(InterconnectError::ValueCount { expected: 2, actual: 1 })
        );
        assert!(matches!(
            packed.concat_values(&[u64_to_bitvec(3, 0), u64_to_bitvec(2, 0)]),
            Err(InterconnectError::ValueWidth { port, expected: 3, actual: 2 }) if port == "s_axi1"
        ));
        assert!(matches!(packed.split_values(&bitvec![0; 5]), Err(InterconnectError::ValueWidth { .. })));
    }

    #[test]
    fn zero_vector_value() {
        let a = axi("a", 1);
        let user = pack(vec![("s_axi0", &a)], Side::Slave, ChannelKind::W, Field::User).unwrap();
        assert_eq!(user.concat_values(&[]).unwrap(), bitvec![0; 1]);
        assert!(user.split_values(&bitvec![0; 1]).unwrap().is_empty());
    }
}
