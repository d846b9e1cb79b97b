//! Authored schema model: documents, messages, fields, bitfields, enums.
//!
//! These types deserialize directly from the YAML/JSON schema documents
//! (capitalized key names are the on-disk spelling). Everything derived —
//! offsets, masks, numeric domains, resolved IDs — lives elsewhere; a
//! `Document` holds only what the schema author wrote.

use crate::types::PrimitiveType;
use serde::Deserialize;

/// One parsed schema document: messages, enums, and any sub-documents pulled
/// in through the document's `includes` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    #[serde(rename = "Messages", default)]
    pub messages: Vec<MessageDef>,
    #[serde(rename = "Enums", default)]
    pub enums: Vec<EnumDef>,
    #[serde(rename = "includes", default)]
    pub includes: Vec<Document>,
}

impl Document {
    /// All enums visible to this document: its own, then recursively those of
    /// every included sub-document, in order.
    pub fn visible_enums(&self) -> Vec<EnumDef> {
        let mut out = self.enums.clone();
        for inc in &self.includes {
            out.extend(inc.visible_enums());
        }
        out
    }
}

/// A message definition: a name, an ID (literal or composite), and an ordered
/// field list whose order defines the byte layout.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDef {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    /// Literal message ID. Takes precedence over `ids` when both are present.
    #[serde(rename = "ID", default)]
    pub id: Option<u64>,
    /// Composite ID: ordered sub-identifiers bit-packed into the final ID.
    #[serde(rename = "IDs", default)]
    pub ids: Vec<SubIdentifier>,
    #[serde(rename = "Fields", default)]
    pub fields: Vec<FieldDef>,
}

/// One entry of a composite message ID: a value (literal integer or
/// `Enum.Option` reference) and the bit width it occupies.
#[derive(Debug, Clone, Deserialize)]
pub struct SubIdentifier {
    #[serde(rename = "Value")]
    pub value: IdValue,
    #[serde(rename = "Bits")]
    pub bits: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Literal(u64),
    /// An `Enum.Option` reference, or a numeric string.
    Symbol(String),
}

/// A field: a named, typed value occupying contiguous bytes within a message.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    #[serde(rename = "Name")]
    pub name: String,
    /// Raw type name as authored. Validated against the primitive table; kept
    /// as text so an unrecognized name can be reported rather than lost.
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(rename = "Count", default = "default_count")]
    pub count: usize,
    #[serde(rename = "Units", default)]
    pub units: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Scale", default)]
    pub scale: Option<f64>,
    #[serde(rename = "Offset", default)]
    pub offset: Option<f64>,
    #[serde(rename = "Min", default)]
    pub min: Option<f64>,
    #[serde(rename = "Max", default)]
    pub max: Option<f64>,
    #[serde(rename = "Default", default)]
    pub default: Option<Literal>,
    #[serde(rename = "Enum", default)]
    pub enum_ref: Option<String>,
    #[serde(rename = "Bitfields", default)]
    pub bitfields: Vec<BitfieldDef>,
}

impl FieldDef {
    /// The field's storage type, if the authored name is recognized.
    pub fn primitive(&self) -> Option<PrimitiveType> {
        PrimitiveType::parse(&self.ty)
    }

    /// Whether the field's value passes through a scale/offset affine map.
    pub fn is_scaled(&self) -> bool {
        self.scale.is_some() || self.offset.is_some()
    }
}

/// A named sub-range of bits within a single field's storage. Storage type
/// and size come from the owning field; bitfields are always unsigned for
/// range purposes, whatever the owning field's signedness.
#[derive(Debug, Clone, Deserialize)]
pub struct BitfieldDef {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "NumBits")]
    pub num_bits: u32,
    #[serde(rename = "Units", default)]
    pub units: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Scale", default)]
    pub scale: Option<f64>,
    #[serde(rename = "Offset", default)]
    pub offset: Option<f64>,
    #[serde(rename = "Min", default)]
    pub min: Option<f64>,
    #[serde(rename = "Max", default)]
    pub max: Option<f64>,
    #[serde(rename = "Default", default)]
    pub default: Option<Literal>,
    #[serde(rename = "Enum", default)]
    pub enum_ref: Option<String>,
}

impl BitfieldDef {
    pub fn is_scaled(&self) -> bool {
        self.scale.is_some() || self.offset.is_some()
    }
}

/// An enumeration: ordered (option name, integer value) pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct EnumDef {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Options", default)]
    pub options: Vec<EnumOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumOption {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: i64,
}

impl EnumDef {
    /// Option name for a value, first match wins.
    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.name.as_str())
    }

    /// Value for an option name.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.options.iter().find(|o| o.name == name).map(|o| o.value)
    }
}

/// A literal default value as authored: numeric or symbolic (enum option name).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    Text(String),
}

fn default_count() -> usize {
    1
}
