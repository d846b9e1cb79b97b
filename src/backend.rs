//! Compiled model and the rendering contract handed to per-language emitters.
//!
//! Emitters consume [`CompiledSet`] and produce target-language sources; no
//! text is generated in this crate. Backends are registered explicitly under
//! a language key in a [`BackendRegistry`] rather than discovered by name at
//! runtime.

use crate::domain::NumericDomain;
use crate::schema::{BitfieldDef, EnumDef, FieldDef, Literal};
use crate::types::PrimitiveType;
use std::collections::HashMap;

/// The full compiled, validated, immutable model for one run.
#[derive(Debug, Clone)]
pub struct CompiledSet {
    pub messages: Vec<CompiledMessage>,
}

/// One message with its computed layout, resolved ID, and merged enum set.
#[derive(Debug, Clone)]
pub struct CompiledMessage {
    pub name: String,
    /// Namespace-qualified path, e.g. `Nav.gps.Position`.
    pub descriptor: String,
    pub description: String,
    pub namespace: Vec<String>,
    /// Resolved numeric ID; `None` for definitions that declare neither a
    /// literal `ID` nor a composite `IDs` list.
    pub id: Option<u64>,
    /// Total byte size of the message body.
    pub size: usize,
    pub fields: Vec<CompiledField>,
    /// Enums visible to the message's document, includes merged in.
    pub enums: Vec<EnumDef>,
    /// From a reserved `headers` directory: excluded from ID uniqueness and
    /// the digest.
    pub is_header: bool,
}

#[derive(Debug, Clone)]
pub struct CompiledField {
    pub def: FieldDef,
    pub ty: PrimitiveType,
    pub byte_offset: usize,
    pub domain: NumericDomain,
    pub bitfields: Vec<CompiledBitfield>,
}

#[derive(Debug, Clone)]
pub struct CompiledBitfield {
    pub def: BitfieldDef,
    pub bit_offset: u32,
    pub mask: u64,
    pub domain: NumericDomain,
}

impl CompiledMessage {
    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|f| f.def.name == name)
    }

    pub fn enum_named(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Declared default values, in field order, bitfields after their owning
    /// field. Emitters turn these into an initializer list.
    pub fn initializers(&self) -> Vec<(&str, &Literal)> {
        let mut out = Vec::new();
        for f in &self.fields {
            if let Some(d) = &f.def.default {
                out.push((f.def.name.as_str(), d));
            }
            for b in &f.bitfields {
                if let Some(d) = &b.def.default {
                    out.push((b.def.name.as_str(), d));
                }
            }
        }
        out
    }
}

impl CompiledSet {
    pub fn message(&self, descriptor: &str) -> Option<&CompiledMessage> {
        self.messages.iter().find(|m| m.descriptor == descriptor)
    }

    /// Validation digest: one line per non-header message with its
    /// namespace-qualified descriptor and resolved ID. Build tooling diffs
    /// this across builds to detect schema-surface changes.
    pub fn digest(&self) -> String {
        let mut out = String::new();
        for msg in self.messages.iter().filter(|m| !m.is_header) {
            let id = match msg.id {
                Some(id) => id.to_string(),
                None => "UNDEFINED".to_string(),
            };
            out.push_str(&format!("{:<40} {:>10}\n", msg.descriptor, id));
        }
        out
    }
}

/// Per-target-language emitter. Implementations substitute the compiled
/// model into language-specific templates; that mechanical step lives
/// outside this crate.
pub trait Backend {
    fn render(&self, set: &CompiledSet) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Explicitly registered map from language key to emitter.
#[derive(Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Box<dyn Backend>>,
}

impl BackendRegistry {
    pub fn new() -> BackendRegistry {
        BackendRegistry::default()
    }

    /// Register an emitter under a language key. A later registration with
    /// the same key replaces the earlier one.
    pub fn register(&mut self, key: impl Into<String>, backend: Box<dyn Backend>) {
        self.backends.insert(key.into(), backend);
    }

    pub fn get(&self, key: &str) -> Option<&dyn Backend> {
        self.backends.get(key).map(|b| b.as_ref())
    }

    /// Registered language keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.backends.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting;

    impl Backend for Counting {
        fn render(
            &self,
            set: &CompiledSet,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let _ = set.messages.len();
            Ok(())
        }
    }

    #[test]
    fn registry_lookup_by_key() {
        let mut registry = BackendRegistry::new();
        registry.register("c", Box::new(Counting));
        registry.register("python", Box::new(Counting));
        assert!(registry.get("c").is_some());
        assert!(registry.get("fortran").is_none());
        assert_eq!(registry.keys(), vec!["c", "python"]);
    }
}
