//! Canonical table of the recognized primitive storage types: size, signedness, native bounds.

/// One of the fixed primitive storage types a field may use.
///
/// Parsed case-insensitively from the schema spellings `uint8`..`uint64`,
/// `int8`..`int64`, `float32`, `float64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl PrimitiveType {
    /// Look up a type by its schema name. Returns `None` for unrecognized names;
    /// the validator reports those as shape violations.
    pub fn parse(name: &str) -> Option<PrimitiveType> {
        match name.to_ascii_lowercase().as_str() {
            "uint8" => Some(PrimitiveType::U8),
            "uint16" => Some(PrimitiveType::U16),
            "uint32" => Some(PrimitiveType::U32),
            "uint64" => Some(PrimitiveType::U64),
            "int8" => Some(PrimitiveType::I8),
            "int16" => Some(PrimitiveType::I16),
            "int32" => Some(PrimitiveType::I32),
            "int64" => Some(PrimitiveType::I64),
            "float32" => Some(PrimitiveType::F32),
            "float64" => Some(PrimitiveType::F64),
            _ => None,
        }
    }

    /// The schema spelling of this type.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::U8 => "uint8",
            PrimitiveType::U16 => "uint16",
            PrimitiveType::U32 => "uint32",
            PrimitiveType::U64 => "uint64",
            PrimitiveType::I8 => "int8",
            PrimitiveType::I16 => "int16",
            PrimitiveType::I32 => "int32",
            PrimitiveType::I64 => "int64",
            PrimitiveType::F32 => "float32",
            PrimitiveType::F64 => "float64",
        }
    }

    /// Storage size in bytes.
    pub fn size(self) -> usize {
        match self {
            PrimitiveType::U8 | PrimitiveType::I8 => 1,
            PrimitiveType::U16 | PrimitiveType::I16 => 2,
            PrimitiveType::U32 | PrimitiveType::I32 | PrimitiveType::F32 => 4,
            PrimitiveType::U64 | PrimitiveType::I64 | PrimitiveType::F64 => 8,
        }
    }

    /// Storage width in bits.
    pub fn bits(self) -> u32 {
        self.size() as u32 * 8
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveType::I8 | PrimitiveType::I16 | PrimitiveType::I32 | PrimitiveType::I64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, PrimitiveType::F32 | PrimitiveType::F64)
    }

    /// Smallest representable native value, as `f64`.
    pub fn native_min(self) -> f64 {
        match self {
            PrimitiveType::F32 => f32::MIN as f64,
            PrimitiveType::F64 => f64::MIN,
            t if t.is_signed() => -(2f64.powi(t.bits() as i32 - 1)),
            _ => 0.0,
        }
    }

    /// Largest representable native value, as `f64`.
    pub fn native_max(self) -> f64 {
        match self {
            PrimitiveType::F32 => f32::MAX as f64,
            PrimitiveType::F64 => f64::MAX,
            t if t.is_signed() => 2f64.powi(t.bits() as i32 - 1) - 1.0,
            t => 2f64.powi(t.bits() as i32) - 1.0,
        }
    }
}
