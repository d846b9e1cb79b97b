//! Load schema documents from disk and compose them.
//!
//! Two independent composition mechanisms, both preserved as separate passes:
//!
//! 1. **Transclusion**: a YAML node tagged `!include <relpath>` is replaced by
//!    the parsed content of the referenced file, resolved relative to the
//!    *including* file's directory, recursively. A missing referenced file,
//!    or a cyclic include chain, is a hard failure naming both files.
//! 2. **Explicit aggregation**: a document's `includes` list holds
//!    sub-documents (normally brought in through transclusion); enums from
//!    those sub-documents become visible to the including document via
//!    [`Document::visible_enums`].
//!
//! Directory traversal recurses into subdirectories, accumulating a namespace
//! path from directory names. A directory named `headers` is reserved: its
//! messages carry a header flag and stay out of ID uniqueness and the digest.
//! Files with unrecognized extensions are skipped, not errored.

use crate::error::CompileError;
use crate::schema::Document;
use serde_yaml::value::Tag;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// A document plus where it came from in the schema tree.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: Document,
    /// Directory components between the load root and the file.
    pub namespace: Vec<String>,
    pub path: PathBuf,
    /// True when the file sits under a reserved `headers` directory.
    pub is_header: bool,
}

/// Load a schema file, or every schema file under a directory.
pub fn load_path(root: &Path) -> Result<Vec<LoadedDocument>, CompileError> {
    let mut out = Vec::new();
    if root.is_dir() {
        load_dir(root, &mut Vec::new(), false, &mut out)?;
    } else if let Some(document) = load_file(root)? {
        out.push(LoadedDocument {
            document,
            namespace: Vec::new(),
            path: root.to_path_buf(),
            is_header: false,
        });
    } else {
        return Err(CompileError::DocumentLoad {
            path: root.to_path_buf(),
            detail: "not a schema file (.yaml/.yml/.json) or directory".to_string(),
        });
    }
    Ok(out)
}

/// Parse one document from text, with no transclusion (there is no base
/// directory to resolve against). Used for in-memory schemas and tests.
pub fn document_from_str(source: &str) -> Result<Document, CompileError> {
    serde_yaml::from_str(source).map_err(|e| CompileError::DocumentParse {
        path: PathBuf::from("<string>"),
        detail: e.to_string(),
    })
}

fn load_dir(
    dir: &Path,
    namespace: &mut Vec<String>,
    in_headers: bool,
    out: &mut Vec<LoadedDocument>,
) -> Result<(), CompileError> {
    // Sorted traversal keeps the digest stable across platforms.
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| CompileError::DocumentLoad {
            path: dir.to_path_buf(),
            detail: e.to_string(),
        })?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        let name = match path.file_name() {
            Some(n) => n.to_string_lossy().into_owned(),
            None => continue,
        };
        if path.is_dir() {
            let header_dir = in_headers || name == "headers";
            namespace.push(name);
            load_dir(&path, namespace, header_dir, out)?;
            namespace.pop();
        } else if recognized_extension(&path) {
            if let Some(document) = load_file(&path)? {
                out.push(LoadedDocument {
                    document,
                    namespace: namespace.clone(),
                    path,
                    is_header: in_headers,
                });
            }
        }
    }
    Ok(())
}

fn recognized_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml") | Some("json")
    )
}

/// Read and parse a single schema file, resolving transclusion. Returns
/// `Ok(None)` for unrecognized extensions.
fn load_file(path: &Path) -> Result<Option<Document>, CompileError> {
    if !recognized_extension(path) {
        return Ok(None);
    }
    let value = read_value(path, &mut Vec::new())?;
    let document = serde_yaml::from_value(value).map_err(|e| CompileError::DocumentParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    Ok(Some(document))
}

/// `chain` holds the canonical paths of every file currently being read,
/// outermost first; a transclusion target already on it is a cycle.
fn read_value(path: &Path, chain: &mut Vec<PathBuf>) -> Result<Value, CompileError> {
    let canonical = path.canonicalize().map_err(|e| CompileError::DocumentLoad {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let text = fs::read_to_string(path).map_err(|e| CompileError::DocumentLoad {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let value: Value = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| CompileError::DocumentParse {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        serde_yaml::to_value(&json).map_err(|e| CompileError::DocumentParse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?
    } else {
        serde_yaml::from_str(&text).map_err(|e| CompileError::DocumentParse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    chain.push(canonical);
    let resolved = resolve_transclusion(value, dir, path, chain);
    chain.pop();
    resolved
}

/// Substitute every `!include <relpath>` node with the parsed content of the
/// referenced file. Relative chains resolve against each including file's own
/// directory, so nested includes across directories work. A target already on
/// the in-progress chain is a cyclic include and fails naming both files.
fn resolve_transclusion(
    value: Value,
    dir: &Path,
    including: &Path,
    chain: &mut Vec<PathBuf>,
) -> Result<Value, CompileError> {
    match value {
        Value::Tagged(tagged) if tagged.tag == Tag::new("include") => {
            let rel = tagged.value.as_str().ok_or_else(|| CompileError::DocumentParse {
                path: including.to_path_buf(),
                detail: "!include expects a file path".to_string(),
            })?;
            let target = dir.join(rel);
            if !target.is_file() {
                return Err(CompileError::BrokenInclude {
                    from: including.to_path_buf(),
                    target,
                });
            }
            if let Ok(canonical) = target.canonicalize() {
                if chain.contains(&canonical) {
                    return Err(CompileError::BrokenInclude {
                        from: including.to_path_buf(),
                        target,
                    });
                }
            }
            read_value(&target, chain)
        }
        Value::Mapping(map) => {
            let mut out = serde_yaml::Mapping::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k, resolve_transclusion(v, dir, including, chain)?);
            }
            Ok(Value::Mapping(out))
        }
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|v| resolve_transclusion(v, dir, including, chain))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        other => Ok(other),
    }
}
