//! Shared accessor math: get/set of field and bitfield values against a raw
//! message buffer.
//!
//! This is the exact math every generated accessor layer performs, with
//! configurable endianness: primitive read at the computed byte offset,
//! bitfield extract `(raw >> bit_offset) & mask`, affine transform
//! `exposed = raw * scale + offset`, enum value-to-name mapping with numeric
//! fallback — and the inverse chain on set, where bitfields use a masked
//! read-modify-write. That read-modify-write is not atomic; a buffer mutated
//! from multiple threads needs external synchronization.

use crate::backend::{CompiledBitfield, CompiledField, CompiledMessage};
use crate::types::PrimitiveType;
use byteorder::{BigEndian, ByteOrder, LittleEndian};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("index {index} out of range for {field} (count {count})")]
    IndexOutOfRange {
        field: String,
        index: usize,
        count: usize,
    },
    #[error("buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },
    #[error("value `{0}` is not numeric and matches no enum option")]
    BadToken(String),
}

/// A value crossing the accessor boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    /// An enum option name.
    Symbol(String),
}

impl FieldValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Unsigned(x) => Some(*x),
            FieldValue::Signed(x) => u64::try_from(*x).ok(),
            FieldValue::Float(x) => Some(*x as u64),
            FieldValue::Symbol(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Unsigned(x) => i64::try_from(*x).ok(),
            FieldValue::Signed(x) => Some(*x),
            FieldValue::Float(x) => Some(*x as i64),
            FieldValue::Symbol(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Unsigned(x) => Some(*x as f64),
            FieldValue::Signed(x) => Some(*x as f64),
            FieldValue::Float(x) => Some(*x),
            FieldValue::Symbol(_) => None,
        }
    }

    /// Integral view for enum lookup; floats qualify only when whole.
    fn integral_key(&self) -> Option<i64> {
        match self {
            FieldValue::Float(x) if x.fract() == 0.0 => Some(*x as i64),
            FieldValue::Float(_) | FieldValue::Symbol(_) => None,
            other => other.as_i64(),
        }
    }
}

/// Field/bitfield accessors for one compiled message over caller-owned
/// buffers.
#[derive(Debug, Clone, Copy)]
pub struct Accessor<'a> {
    msg: &'a CompiledMessage,
    endianness: Endianness,
}

enum Target<'a> {
    Field(&'a CompiledField),
    Bitfield(&'a CompiledField, &'a CompiledBitfield),
}

impl<'a> Target<'a> {
    fn owner(&self) -> &'a CompiledField {
        match self {
            Target::Field(f) => f,
            Target::Bitfield(f, _) => f,
        }
    }
}

impl<'a> Accessor<'a> {
    pub fn new(msg: &'a CompiledMessage, endianness: Endianness) -> Accessor<'a> {
        Accessor { msg, endianness }
    }

    /// Read a field or bitfield value (element 0 for arrays).
    pub fn get(&self, buf: &[u8], name: &str) -> Result<FieldValue, AccessError> {
        self.get_at(buf, name, 0)
    }

    /// Read array element `index` of a field or bitfield.
    pub fn get_at(&self, buf: &[u8], name: &str, index: usize) -> Result<FieldValue, AccessError> {
        let target = self.target(name)?;
        let field = target.owner();
        let offset = self.element_offset(field, index, buf.len())?;
        match target {
            Target::Field(f) => {
                let raw = self.read_primitive(buf, offset, f.ty);
                Ok(self.expose(raw, f.def.scale, f.def.offset, f.def.enum_ref.as_deref()))
            }
            Target::Bitfield(f, b) => {
                let word = self.read_word(buf, offset, f.ty);
                let raw = (word >> b.bit_offset) & b.mask;
                Ok(self.expose(
                    FieldValue::Unsigned(raw),
                    b.def.scale,
                    b.def.offset,
                    b.def.enum_ref.as_deref(),
                ))
            }
        }
    }

    /// Write a field or bitfield value (element 0 for arrays).
    pub fn set(&self, buf: &mut [u8], name: &str, value: FieldValue) -> Result<(), AccessError> {
        self.set_at(buf, name, 0, value)
    }

    /// Write array element `index` of a field or bitfield. Bitfield writes
    /// are a masked read-modify-write of the owning field's storage.
    pub fn set_at(
        &self,
        buf: &mut [u8],
        name: &str,
        index: usize,
        value: FieldValue,
    ) -> Result<(), AccessError> {
        let target = self.target(name)?;
        let field = target.owner();
        let offset = self.element_offset(field, index, buf.len())?;
        match target {
            Target::Field(f) => {
                let value = self.desymbolize(value, f.def.enum_ref.as_deref())?;
                let raw = unscale(&value, f.def.scale, f.def.offset, f.ty.is_float());
                self.write_primitive(buf, offset, f.ty, &raw);
                Ok(())
            }
            Target::Bitfield(f, b) => {
                let value = self.desymbolize(value, b.def.enum_ref.as_deref())?;
                let raw = unscale(&value, b.def.scale, b.def.offset, false);
                let raw = raw.as_u64().unwrap_or(0);
                let old = self.read_word(buf, offset, f.ty);
                let new = (old & !(b.mask << b.bit_offset)) | ((raw & b.mask) << b.bit_offset);
                self.write_word(buf, offset, f.ty, new);
                Ok(())
            }
        }
    }

    /// Find a field, or the field owning a bitfield, by name. Bitfield names
    /// share the message namespace, so a flat scan suffices.
    fn target(&self, name: &str) -> Result<Target<'a>, AccessError> {
        for f in &self.msg.fields {
            if f.def.name == name {
                return Ok(Target::Field(f));
            }
            for b in &f.bitfields {
                if b.def.name == name {
                    return Ok(Target::Bitfield(f, b));
                }
            }
        }
        Err(AccessError::UnknownField(name.to_string()))
    }

    fn element_offset(
        &self,
        field: &CompiledField,
        index: usize,
        buf_len: usize,
    ) -> Result<usize, AccessError> {
        if index >= field.def.count {
            return Err(AccessError::IndexOutOfRange {
                field: field.def.name.clone(),
                index,
                count: field.def.count,
            });
        }
        let offset = field.byte_offset + index * field.ty.size();
        let need = offset + field.ty.size();
        if buf_len < need {
            return Err(AccessError::BufferTooSmall {
                need,
                have: buf_len,
            });
        }
        Ok(offset)
    }

    /// Forward transform chain: affine map, then enum name lookup with
    /// fallback to the native value on miss.
    fn expose(
        &self,
        raw: FieldValue,
        scale: Option<f64>,
        offset: Option<f64>,
        enum_ref: Option<&str>,
    ) -> FieldValue {
        let value = if scale.is_some() || offset.is_some() {
            match raw.as_f64() {
                Some(x) => FieldValue::Float(x * scale.unwrap_or(1.0) + offset.unwrap_or(0.0)),
                None => raw,
            }
        } else {
            raw
        };
        if let Some(enum_name) = enum_ref {
            if let (Some(e), Some(key)) = (self.msg.enum_named(enum_name), value.integral_key()) {
                if let Some(option) = e.name_of(key) {
                    return FieldValue::Symbol(option.to_string());
                }
            }
        }
        value
    }

    /// Inverse enum lookup: option name to value; tokens that match no
    /// option pass through as numerics.
    fn desymbolize(
        &self,
        value: FieldValue,
        enum_ref: Option<&str>,
    ) -> Result<FieldValue, AccessError> {
        let FieldValue::Symbol(token) = value else {
            return Ok(value);
        };
        if let Some(e) = enum_ref.and_then(|n| self.msg.enum_named(n)) {
            if let Some(v) = e.value_of(&token) {
                return Ok(FieldValue::Signed(v));
            }
        }
        match token.parse::<f64>() {
            Ok(x) => Ok(FieldValue::Float(x)),
            Err(_) => Err(AccessError::BadToken(token)),
        }
    }

    fn read_primitive(&self, buf: &[u8], offset: usize, ty: PrimitiveType) -> FieldValue {
        let b = &buf[offset..offset + ty.size()];
        match ty {
            PrimitiveType::U8 => FieldValue::Unsigned(b[0] as u64),
            PrimitiveType::I8 => FieldValue::Signed(b[0] as i8 as i64),
            PrimitiveType::U16 | PrimitiveType::U32 | PrimitiveType::U64 => {
                FieldValue::Unsigned(self.read_word(buf, offset, ty))
            }
            PrimitiveType::I16 => FieldValue::Signed(match self.endianness {
                Endianness::Big => BigEndian::read_i16(b) as i64,
                Endianness::Little => LittleEndian::read_i16(b) as i64,
            }),
            PrimitiveType::I32 => FieldValue::Signed(match self.endianness {
                Endianness::Big => BigEndian::read_i32(b) as i64,
                Endianness::Little => LittleEndian::read_i32(b) as i64,
            }),
            PrimitiveType::I64 => FieldValue::Signed(match self.endianness {
                Endianness::Big => BigEndian::read_i64(b),
                Endianness::Little => LittleEndian::read_i64(b),
            }),
            PrimitiveType::F32 => FieldValue::Float(match self.endianness {
                Endianness::Big => BigEndian::read_f32(b) as f64,
                Endianness::Little => LittleEndian::read_f32(b) as f64,
            }),
            PrimitiveType::F64 => FieldValue::Float(match self.endianness {
                Endianness::Big => BigEndian::read_f64(b),
                Endianness::Little => LittleEndian::read_f64(b),
            }),
        }
    }

    fn write_primitive(&self, buf: &mut [u8], offset: usize, ty: PrimitiveType, v: &FieldValue) {
        match ty {
            PrimitiveType::F32 => {
                let x = v.as_f64().unwrap_or(0.0) as f32;
                let b = &mut buf[offset..offset + 4];
                match self.endianness {
                    Endianness::Big => BigEndian::write_f32(b, x),
                    Endianness::Little => LittleEndian::write_f32(b, x),
                }
            }
            PrimitiveType::F64 => {
                let x = v.as_f64().unwrap_or(0.0);
                let b = &mut buf[offset..offset + 8];
                match self.endianness {
                    Endianness::Big => BigEndian::write_f64(b, x),
                    Endianness::Little => LittleEndian::write_f64(b, x),
                }
            }
            t if t.is_signed() => {
                let x = v.as_i64().unwrap_or(0);
                self.write_word(buf, offset, t, x as u64);
            }
            t => {
                let x = v.as_u64().unwrap_or(0);
                self.write_word(buf, offset, t, x);
            }
        }
    }

    /// Raw storage bits as an unsigned word, whatever the declared
    /// signedness. Bitfield extraction and read-modify-write run on this.
    fn read_word(&self, buf: &[u8], offset: usize, ty: PrimitiveType) -> u64 {
        let b = &buf[offset..offset + ty.size()];
        match (ty.size(), self.endianness) {
            (1, _) => b[0] as u64,
            (2, Endianness::Big) => BigEndian::read_u16(b) as u64,
            (2, Endianness::Little) => LittleEndian::read_u16(b) as u64,
            (4, Endianness::Big) => BigEndian::read_u32(b) as u64,
            (4, Endianness::Little) => LittleEndian::read_u32(b) as u64,
            (_, Endianness::Big) => BigEndian::read_u64(b),
            (_, Endianness::Little) => LittleEndian::read_u64(b),
        }
    }

    fn write_word(&self, buf: &mut [u8], offset: usize, ty: PrimitiveType, v: u64) {
        let b = &mut buf[offset..offset + ty.size()];
        match (ty.size(), self.endianness) {
            (1, _) => b[0] = v as u8,
            (2, Endianness::Big) => BigEndian::write_u16(b, v as u16),
            (2, Endianness::Little) => LittleEndian::write_u16(b, v as u16),
            (4, Endianness::Big) => BigEndian::write_u32(b, v as u32),
            (4, Endianness::Little) => LittleEndian::write_u32(b, v as u32),
            (_, Endianness::Big) => BigEndian::write_u64(b, v),
            (_, Endianness::Little) => LittleEndian::write_u64(b, v),
        }
    }
}

/// Inverse affine map back to the raw storage domain. Integer storage
/// truncates toward zero, the way generated accessors cast.
fn unscale(
    v: &FieldValue,
    scale: Option<f64>,
    offset: Option<f64>,
    float_storage: bool,
) -> FieldValue {
    if scale.is_none() && offset.is_none() {
        return v.clone();
    }
    let x = v.as_f64().unwrap_or(0.0);
    let raw = (x - offset.unwrap_or(0.0)) / scale.unwrap_or(1.0);
    if float_storage {
        FieldValue::Float(raw)
    } else if raw < 0.0 {
        FieldValue::Signed(raw as i64)
    } else {
        FieldValue::Unsigned(raw as u64)
    }
}
