//! Utilities.

use bitvec::prelude::*;

/// Returns ceiling log2.
pub const fn clog2(value: u64) -> usize {
    if value == 0 {
        0
    } else {
        (u64::BITS - (value - 1).leading_zeros()) as usize
    }
}

/// Returns bit-represented value of an integer, least significant bit first.
///
/// Bits above 64 are zero-filled.
pub fn u64_to_bitvec(n: usize, value: u64) -> BitVec {
    (0..n).map(|i| if i >= u64::BITS as usize { false } else { (value & (1 << i)) != 0 }).collect()
}

/// Returns the integer value of a bit slice, least significant bit first.
///
/// Returns `None` if a bit above 64 is set.
pub fn bitslice_to_u64(bits: &BitSlice) -> Option<u64> {
    bits.iter().by_vals().enumerate().try_fold(0u64, |acc, (i, bit)| match (bit, i < u64::BITS as usize) {
        (false, _) => Some(acc),
        (true, true) => Some(acc | (1 << i)),
        (true, false) => None,
    })
}

/// Returns `true` if `value` fits in `width` bits.
pub const fn fits_in(value: u64, width: usize) -> bool { width >= u64::BITS as usize || value >> width == 0 }

/// Formats bits as a sized Verilog hexadecimal literal (e.g. `64'h0000000010000000`).
pub fn bitslice_to_verilog_hex(bits: &BitSlice) -> String {
    let digits = (bits.len() + 3) / 4;
    let hex = (0..digits)
        .rev()
        .map(|d| {
            let nibble = (0..4)
                .filter(|k| bits.get(d * 4 + k).map_or(false, |bit| *bit))
                .fold(0u32, |acc, k| acc | (1 << k));
            char::from_digit(nibble, 16).unwrap_or('0')
        })
        .collect::<String>();
    format!("{}'h{}", bits.len(), hex)
}

/// Combines all elements into one String, separated by `sep`. Returns `None` if all elements are `None`.
pub fn join_options<I>(sep: &str, iterable: I) -> Option<String>
where I: IntoIterator<Item = Option<String>> {
    let iterable = iterable.into_iter().flatten().collect::<Vec<_>>();
    if iterable.is_empty() {
        None
    } else {
        Some(iterable.join(sep))
    }
}

/// Indents every line in the string.
pub fn indent(str: String, indent: usize) -> String {
    str.lines().map(|l| format!("{}{}", " ".repeat(indent), l)).collect::<Vec<_>>().join("\n")
}
