//! Exposed numeric domain (min/max) per field and bitfield.
//!
//! The domain is informational metadata for code generators; accessors never
//! enforce it. For integral storage the native bounds come from width and
//! signedness (bitfields are always unsigned, whatever the owning field
//! declares). A declared scale/offset maps both bounds through the forward
//! affine transform independently, with no re-sorting: a negative scale
//! legitimately yields min > max, which is exactly what the accessor math
//! produces. Unscaled floating fields use the storage type's native float
//! range. An explicit Min/Max always overrides the derived value.

use crate::schema::{BitfieldDef, FieldDef};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericDomain {
    pub min: f64,
    pub max: f64,
}

/// Derive the exposed domain for a field. `None` when the type name is
/// unrecognized.
pub fn field_domain(field: &FieldDef) -> Option<NumericDomain> {
    let ty = field.primitive()?;
    let derived = if ty.is_float() {
        NumericDomain {
            min: ty.native_min(),
            max: ty.native_max(),
        }
    } else {
        affine(
            integral_bounds(ty.bits(), ty.is_signed()),
            field.scale,
            field.offset,
        )
    };
    Some(with_overrides(derived, field.min, field.max))
}

/// Derive the exposed domain for a bitfield.
pub fn bitfield_domain(bits: &BitfieldDef) -> NumericDomain {
    let derived = affine(
        integral_bounds(bits.num_bits, false),
        bits.scale,
        bits.offset,
    );
    with_overrides(derived, bits.min, bits.max)
}

fn integral_bounds(bits: u32, signed: bool) -> NumericDomain {
    if signed {
        NumericDomain {
            min: -(2f64.powi(bits as i32 - 1)),
            max: 2f64.powi(bits as i32 - 1) - 1.0,
        }
    } else {
        NumericDomain {
            min: 0.0,
            max: 2f64.powi(bits as i32) - 1.0,
        }
    }
}

fn affine(d: NumericDomain, scale: Option<f64>, offset: Option<f64>) -> NumericDomain {
    if scale.is_none() && offset.is_none() {
        return d;
    }
    let s = scale.unwrap_or(1.0);
    let o = offset.unwrap_or(0.0);
    NumericDomain {
        min: d.min * s + o,
        max: d.max * s + o,
    }
}

fn with_overrides(d: NumericDomain, min: Option<f64>, max: Option<f64>) -> NumericDomain {
    NumericDomain {
        min: min.unwrap_or(d.min),
        max: max.unwrap_or(d.max),
    }
}
