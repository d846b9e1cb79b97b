//! Cross-checks the composed, laid-out model and drives the compile pipeline.
//!
//! Checks accumulate so one run surfaces every defect across a batch of
//! schema files; only unparseable documents, unresolvable identifier tokens,
//! and duplicate resolved IDs abort immediately.

use crate::backend::{CompiledBitfield, CompiledField, CompiledMessage, CompiledSet};
use crate::error::{CompileError, Diagnostic};
use crate::loader::{self, LoadedDocument};
use crate::schema::{EnumDef, MessageDef};
use crate::{domain, ident, layout};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Every message body must fit in this many bytes unless overridden.
/// One ceiling, applied everywhere.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 256;

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Ceiling on total message size in bytes.
    pub max_message_size: usize,
}

impl Default for CompileOptions {
    fn default() -> CompileOptions {
        CompileOptions {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// Load, compose, lay out, and validate everything under `root`.
pub fn compile_path(root: &Path, opts: &CompileOptions) -> Result<CompiledSet, CompileError> {
    let docs = loader::load_path(root)?;
    compile_documents(&docs, opts)
}

/// Compile already-loaded documents. The ID registry is built once here and
/// threaded through the run; there is no global state.
pub fn compile_documents(
    docs: &[LoadedDocument],
    opts: &CompileOptions,
) -> Result<CompiledSet, CompileError> {
    let mut diagnostics = Vec::new();
    let mut messages = Vec::new();
    let mut ids_in_use: HashMap<u64, String> = HashMap::new();

    for doc in docs {
        let enums = doc.document.visible_enums();
        for msg in &doc.document.messages {
            let descriptor = descriptor(doc, msg);
            check_shape(msg, &enums, &descriptor, &mut diagnostics);

            let id = ident::resolve(msg, &enums)?;
            if let (Some(id), false) = (id, doc.is_header) {
                if let Some(first) = ids_in_use.insert(id, descriptor.clone()) {
                    return Err(CompileError::DuplicateId {
                        id,
                        first,
                        second: descriptor,
                    });
                }
            }

            // Without a layout (some field type unrecognized, already
            // reported) there is nothing further to check or hand off.
            let msg_layout = match layout::compute(&msg.fields) {
                Some(l) => l,
                None => continue,
            };
            check_layout(msg, &msg_layout, opts, &descriptor, &mut diagnostics);

            // A layout exists, so every type name parsed; the lets below
            // cannot skip anything.
            let mut fields = Vec::with_capacity(msg.fields.len());
            for (def, fl) in msg.fields.iter().zip(&msg_layout.fields) {
                let (Some(ty), Some(domain)) = (def.primitive(), domain::field_domain(def))
                else {
                    continue;
                };
                fields.push(CompiledField {
                    ty,
                    byte_offset: fl.byte_offset,
                    domain,
                    bitfields: def
                        .bitfields
                        .iter()
                        .zip(&fl.bitfields)
                        .map(|(bdef, bl)| CompiledBitfield {
                            bit_offset: bl.bit_offset,
                            mask: bl.mask,
                            domain: domain::bitfield_domain(bdef),
                            def: bdef.clone(),
                        })
                        .collect(),
                    def: def.clone(),
                });
            }

            messages.push(CompiledMessage {
                name: msg.name.clone(),
                descriptor,
                description: msg.description.clone(),
                namespace: doc.namespace.clone(),
                id,
                size: msg_layout.size,
                fields,
                enums: enums.clone(),
                is_header: doc.is_header,
            });
        }
    }

    if !diagnostics.is_empty() {
        return Err(CompileError::Invalid(diagnostics));
    }
    Ok(CompiledSet { messages })
}

/// Namespace-qualified message path: directory components, then the file
/// stem (unless it repeats the message name), then the message name.
fn descriptor(doc: &LoadedDocument, msg: &MessageDef) -> String {
    let mut parts = doc.namespace.clone();
    if let Some(stem) = doc.path.file_stem().and_then(|s| s.to_str()) {
        if stem != msg.name {
            parts.push(stem.to_string());
        }
    }
    parts.push(msg.name.clone());
    parts.join(".")
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_shape(
    msg: &MessageDef,
    enums: &[EnumDef],
    descriptor: &str,
    out: &mut Vec<Diagnostic>,
) {
    let known_enum = |name: &str| enums.iter().any(|e| e.name == name);
    let mut seen_names: HashSet<&str> = HashSet::new();

    for field in &msg.fields {
        if !valid_name(&field.name) {
            out.push(Diagnostic::shape(
                descriptor,
                format!("bad field name [{}]", field.name),
            ));
        }
        if !seen_names.insert(&field.name) {
            out.push(Diagnostic::shape(
                descriptor,
                format!("duplicate field name [{}]", field.name),
            ));
        }
        if field.primitive().is_none() {
            out.push(Diagnostic::shape(
                descriptor,
                format!("field {} has invalid type {}", field.name, field.ty),
            ));
        }
        if field.count < 1 {
            out.push(Diagnostic::shape(
                descriptor,
                format!("field {} has count 0", field.name),
            ));
        }
        if let Some(e) = &field.enum_ref {
            if !known_enum(e) {
                out.push(Diagnostic::shape(
                    descriptor,
                    format!("field {} references unknown enum [{}]", field.name, e),
                ));
            }
        }
        for bits in &field.bitfields {
            if !valid_name(&bits.name) {
                out.push(Diagnostic::shape(
                    descriptor,
                    format!("bad bitfield name [{}] in field {}", bits.name, field.name),
                ));
            }
            if !seen_names.insert(&bits.name) {
                out.push(Diagnostic::shape(
                    descriptor,
                    format!("duplicate bitfield name [{}] in field {}", bits.name, field.name),
                ));
            }
            if bits.num_bits < 1 {
                out.push(Diagnostic::shape(
                    descriptor,
                    format!("bitfield {} in field {} has zero width", bits.name, field.name),
                ));
            }
            if let Some(e) = &bits.enum_ref {
                if !known_enum(e) {
                    out.push(Diagnostic::shape(
                        descriptor,
                        format!("bitfield {} references unknown enum [{}]", bits.name, e),
                    ));
                }
            }
        }
    }
}

fn check_layout(
    msg: &MessageDef,
    msg_layout: &layout::MsgLayout,
    opts: &CompileOptions,
    descriptor: &str,
    out: &mut Vec<Diagnostic>,
) {
    for (field, fl) in msg.fields.iter().zip(&msg_layout.fields) {
        let size = match field.primitive() {
            Some(t) => t.size(),
            None => continue,
        };
        if fl.byte_offset % size != 0 {
            out.push(Diagnostic::layout(
                descriptor,
                format!(
                    "field {} is at offset {} but has size {}",
                    field.name, fl.byte_offset, size
                ),
            ));
        }
        let total_bits: u32 = field.bitfields.iter().map(|b| b.num_bits).sum();
        if total_bits as usize > 8 * size {
            out.push(Diagnostic::layout(
                descriptor,
                format!(
                    "field {} has {} bits of bitfields in {}-byte storage",
                    field.name,
                    total_bits,
                    size
                ),
            ));
        }
    }
    if msg_layout.size > opts.max_message_size {
        out.push(Diagnostic::layout(
            descriptor,
            format!(
                "message {} too big: {} bytes exceeds the {}-byte ceiling",
                msg.name, msg_layout.size, opts.max_message_size
            ),
        ));
    }
}
