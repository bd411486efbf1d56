//! Error taxonomy for one generation run.
//!
//! Every error here is deterministic: re-running on the same input reproduces
//! it, so there is no retry policy anywhere. Absent or malformed annotations
//! are never errors; they simply exclude a type or field from generation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Directory or file could not be read at all.
    #[error("failed to read {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source text the scanner could not make sense of.
    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A field's type expression references a package that is not imported
    /// in the enclosing file.
    #[error("cannot resolve type `{type_expr}` in {path}: package `{alias}` is not imported")]
    UnresolvedType {
        type_expr: String,
        alias: String,
        path: PathBuf,
    },

    /// An identifier inside a constant-value expression references a package
    /// that is not imported in the enclosing file.
    #[error("cannot resolve `{ident}` in constant value: package `{alias}` is not imported in {path}")]
    UnresolvedConst {
        ident: String,
        alias: String,
        path: PathBuf,
    },

    /// Synthesis produced an inconsistent plan. This signals a defect in the
    /// generator itself, not in the scanned source.
    #[error("internal render error: {0}")]
    Render(String),

    /// The assembled file failed the post-synthesis source check.
    #[error("generated source for package `{package}` is malformed: {message}")]
    Format { package: String, message: String },

    /// The writer for a package group failed.
    #[error("failed to write output for package `{package}`: {source}")]
    Write {
        package: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
