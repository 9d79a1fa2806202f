//! Region parameter derivation.
//!
//! The crossbar decodes addresses with two packed parameter tables: the base address of every
//! master port (field width = address width) and the number of address bits each master port
//! decodes (field width = 32). Master 0 occupies the low-order field of both tables.

use bitvec::prelude::*;
use static_assertions::const_assert;

use crate::utils::*;
use crate::*;

/// Field width of the packed region width table.
pub const REGION_WIDTH_FIELD_WIDTH: usize = 32;

// Any region of a 64-bit address space has a width that fits in one field.
const_assert!(fits_in(clog2(u64::MAX) as u64, REGION_WIDTH_FIELD_WIDTH));

/// Fixed-width fields packed into one arbitrary-width bit vector, field 0 in the low-order bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackedParams {
    field_width: usize,
    bits: BitVec,
}

impl PackedParams {
    /// Packs `values` into fields of `field_width` bits.
    ///
    /// Bits of a value above `field_width` are dropped; callers check that values fit.
    pub fn pack<I: IntoIterator<Item = u64>>(field_width: usize, values: I) -> Self {
        let bits = values.into_iter().flat_map(|value| u64_to_bitvec(field_width, value)).collect();
        Self { field_width, bits }
    }

    /// Returns the `index`-th field.
    pub fn field(&self, index: usize) -> Option<&BitSlice> {
        if index >= self.len() {
            return None;
        }
        let lsb = index * self.field_width;
        Some(&self.bits[lsb..lsb + self.field_width])
    }

    /// Returns the `index`-th field as an integer.
    pub fn value(&self, index: usize) -> Option<u64> { self.field(index).and_then(bitslice_to_u64) }

    /// Number of fields.
    pub fn len(&self) -> usize {
        if self.field_width == 0 {
            0
        } else {
            self.bits.len() / self.field_width
        }
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool { self.bits.is_empty() }

    /// Width of one field.
    pub fn field_width(&self) -> usize { self.field_width }

    /// Total width in bits.
    pub fn width(&self) -> usize { self.bits.len() }

    /// Packed bits.
    pub fn bits(&self) -> &BitSlice { &self.bits }

    /// Sized Verilog hexadecimal literal of the packed value.
    pub fn to_verilog(&self) -> String { bitslice_to_verilog_hex(&self.bits) }
}

/// Address decoding parameters of the master ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionParams {
    /// Base address of every master port.
    pub base_addresses: PackedParams,

    /// Decoded address width of every master port.
    pub region_widths: PackedParams,
}

/// Derives the address decoding parameters of the given master ports, in order.
pub fn derive<'a, I>(masters: I, address_width: usize) -> Result<RegionParams, InterconnectError>
where I: IntoIterator<Item = &'a RegisteredPort> {
    let mut origins = Vec::new();
    let mut widths = Vec::new();

    for port in masters {
        let region = port.region.ok_or_else(|| InterconnectError::MissingRegion { name: port.name.clone() })?;
        if region.size == 0 {
            let reason = "size is zero".to_string();
            return Err(InterconnectError::InvalidRegion { name: port.name.clone(), reason });
        }
        if !fits_in(region.origin, address_width) {
            return Err(InterconnectError::InvalidRegion {
                name: port.name.clone(),
                reason: format!("origin 0x{:x} does not fit in {} address bits", region.origin, address_width),
            });
        }

        origins.push(region.origin);
        widths.push(clog2(region.size) as u64);
    }

    Ok(RegionParams {
        base_addresses: PackedParams::pack(address_width, origins),
        region_widths: PackedParams::pack(REGION_WIDTH_FIELD_WIDTH, widths),
    })
}
