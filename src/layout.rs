//! Byte/bit layout computation for a message's ordered field list.
//!
//! Layout is a pure function of the field list: a byte cursor walks the
//! fields in declaration order, and within a bitfield-bearing field a bit
//! cursor walks the bitfields. Re-running on an unchanged definition yields
//! identical results; independently built code generators must agree
//! byte-for-byte on these offsets.

use crate::schema::FieldDef;

/// Computed layout for one message. Derived, never authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgLayout {
    pub fields: Vec<FieldLayout>,
    /// Total message size in bytes: the byte cursor after the last field.
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Start offset of the field's first element.
    pub byte_offset: usize,
    /// One entry per declared bitfield, in order. Bitfields describe a single
    /// element's bit structure; array elements repeat it.
    pub bitfields: Vec<BitfieldLayout>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitfieldLayout {
    pub bit_offset: u32,
    /// `2^width - 1`, unshifted.
    pub mask: u64,
}

/// Compute the layout for an ordered field list. Returns `None` when any
/// field's type name is unrecognized (the validator reports those; without a
/// size there is no layout to compute).
pub fn compute(fields: &[FieldDef]) -> Option<MsgLayout> {
    let mut out = Vec::with_capacity(fields.len());
    let mut cursor = 0usize;
    for field in fields {
        let ty = field.primitive()?;
        let mut bitfields = Vec::with_capacity(field.bitfields.len());
        let mut bit_cursor = 0u32;
        for bits in &field.bitfields {
            bitfields.push(BitfieldLayout {
                bit_offset: bit_cursor,
                mask: width_mask(bits.num_bits),
            });
            bit_cursor += bits.num_bits;
        }
        out.push(FieldLayout {
            byte_offset: cursor,
            bitfields,
        });
        cursor += ty.size() * field.count;
    }
    Some(MsgLayout {
        fields: out,
        size: cursor,
    })
}

pub fn width_mask(num_bits: u32) -> u64 {
    if num_bits >= 64 {
        u64::MAX
    } else {
        (1u64 << num_bits) - 1
    }
}
