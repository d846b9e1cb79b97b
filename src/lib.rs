//! # msgschema — fixed-size binary message schema compiler
//!
//! Compiles declarative YAML/JSON schemas of fixed-size binary messages
//! (embedded/telemetry protocols) into a validated in-memory layout model
//! shared by per-language code emitters: byte offsets per field, bit
//! offsets/masks per bitfield, exposed numeric domains, and resolved
//! message IDs. No target-language text is emitted here; emitters plug in
//! through the [`backend`] rendering interface.
//!
//! ## Schema documents
//!
//! A document declares `Messages` and optional `Enums`. Two composition
//! mechanisms coexist: `!include` transclusion (a referenced file's parsed
//! content substituted in place, relative to the including file) and an
//! explicit `includes` list whose sub-documents contribute their enums to
//! the including document.
//!
//! ```text
//! Enums:
//!   - Name: Color
//!     Options:
//!       - Name: Red
//!         Value: 5
//! Messages:
//!   - Name: Status
//!     ID: 10
//!     Fields:
//!       - Name: Battery
//!         Type: uint16
//!         Scale: 0.5
//!         Units: mV
//!       - Name: Flags
//!         Type: uint8
//!         Bitfields:
//!           - Name: Mode
//!             NumBits: 4
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use msgschema::{compile_path, CompileOptions};
//! use std::path::Path;
//!
//! let set = compile_path(Path::new("schemas/"), &CompileOptions::default())?;
//! print!("{}", set.digest());
//! # Ok::<(), msgschema::CompileError>(())
//! ```

pub mod backend;
pub mod codec;
pub mod domain;
pub mod error;
pub mod ident;
pub mod layout;
pub mod loader;
pub mod schema;
pub mod types;
pub mod validate;

pub use backend::{Backend, BackendRegistry, CompiledMessage, CompiledSet};
pub use codec::{Accessor, AccessError, Endianness, FieldValue};
pub use domain::NumericDomain;
pub use error::{CompileError, Diagnostic, DiagnosticKind};
pub use loader::{load_path, LoadedDocument};
pub use schema::{Document, EnumDef, FieldDef, MessageDef};
pub use types::PrimitiveType;
pub use validate::{compile_documents, compile_path, CompileOptions};
