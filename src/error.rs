//! Error taxonomy for the compiler.
//!
//! Load and identifier-resolution failures abort the run immediately.
//! Schema-shape and layout violations accumulate into [`Diagnostic`]s so one
//! run surfaces every defect across a batch of schema files; they are then
//! surfaced together as [`CompileError::Invalid`]. Nothing is downgraded to
//! a warning.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("cannot read {path}: {detail}")]
    DocumentLoad { path: PathBuf, detail: String },
    #[error("error loading {target} for include statement in {from}")]
    BrokenInclude { from: PathBuf, target: PathBuf },
    #[error("cannot parse {path}: {detail}")]
    DocumentParse { path: PathBuf, detail: String },
    #[error("message {message}: can't find value for identifier token `{token}`")]
    UnresolvedIdentifier { message: String, token: String },
    #[error("message {second} uses id {id}, but it is already used by {first}")]
    DuplicateId { id: u64, first: String, second: String },
    #[error("schema validation failed with {} finding(s)", .0.len())]
    Invalid(Vec<Diagnostic>),
}

/// A single accumulated validation finding, tied to the message it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Namespace-qualified descriptor of the offending message.
    pub message: String,
    pub kind: DiagnosticKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Missing/malformed schema content: bad names, unrecognized types, bad enum references.
    Shape,
    /// Computed layout breaks an invariant: misalignment, bitfield overflow, size ceiling.
    Layout,
}

impl Diagnostic {
    pub fn shape(message: impl Into<String>, detail: impl Into<String>) -> Diagnostic {
        Diagnostic {
            message: message.into(),
            kind: DiagnosticKind::Shape,
            detail: detail.into(),
        }
    }

    pub fn layout(message: impl Into<String>, detail: impl Into<String>) -> Diagnostic {
        Diagnostic {
            message: message.into(),
            kind: DiagnosticKind::Layout,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DiagnosticKind::Shape => "shape",
            DiagnosticKind::Layout => "layout",
        };
        write!(f, "{}: {}: {}", self.message, kind, self.detail)
    }
}
