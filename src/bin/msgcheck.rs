//! Check a schema tree and emit the validation digest.
//!
//! Usage:
//!   msgcheck <schema-path> [digest-file]
//!
//! Compiles every schema file under the given path (a file or a directory
//! tree), prints each validation finding to stderr, and on success writes the
//! digest — one line per message with its namespace-qualified descriptor and
//! resolved ID — to the given file, or stdout when none is given. Build
//! tooling diffs the digest across builds to detect schema-surface changes.
//!
//! Exit code 1 on any load failure or validation finding.

use anyhow::Context;
use msgschema::{compile_path, CompileError, CompileOptions};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let schema_path = match args.next() {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("Usage: msgcheck <schema-path> [digest-file]");
            return ExitCode::FAILURE;
        }
    };
    let digest_file = args.next().map(PathBuf::from);

    let set = match compile_path(&schema_path, &CompileOptions::default()) {
        Ok(set) => set,
        Err(CompileError::Invalid(diagnostics)) => {
            for d in &diagnostics {
                eprintln!("{d}");
            }
            eprintln!("{} finding(s)", diagnostics.len());
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let digest = set.digest();
    let result = match &digest_file {
        Some(path) => write_digest(path, &digest),
        None => {
            print!("{digest}");
            Ok(())
        }
    };
    if let Err(e) = result {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn write_digest(path: &PathBuf, digest: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    std::fs::write(path, digest).with_context(|| format!("writing {}", path.display()))
}
