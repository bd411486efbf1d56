//! Declaration walker: directory traversal, file parsing, and grouping of
//! compilation units by package identity.
//!
//! One `PackageGroup` per (directory, package name) pair, files in sorted
//! order, groups in first-encounter order of a deterministic depth-first
//! walk. The rest of the pipeline borrows these structures for the duration
//! of one generation pass.

pub mod scan;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// A named composite record type found in source, with the union of doc
/// comments attached to it and to its enclosing declaration group.
#[derive(Debug)]
pub struct TypeDecl {
    pub name: String,
    /// Raw `//…` comment lines, spec-level first, group-level after.
    pub docs: Vec<String>,
    pub fields: Vec<RawField>,
}

/// A raw field declaration, before classification.
#[derive(Debug)]
pub struct RawField {
    /// Normalized name: first declared name, or the type's base identifier
    /// for embedded fields.
    pub name: String,
    /// Type expression as printed relative to the field's own package.
    pub type_expr: String,
    /// Backtick tag contents, without the backticks.
    pub tag: Option<String>,
}

/// One parsed `.go` file.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    /// alias → unquoted import path, as declared at the top of this file.
    pub imports: IndexMap<String, String>,
    pub types: Vec<TypeDecl>,
}

/// All files sharing one package identity in one directory.
#[derive(Debug)]
pub struct PackageGroup {
    /// Package name, as declared in the files' package clauses.
    pub name: String,
    /// Directory the group's files live in.
    pub dir: PathBuf,
    pub files: Vec<SourceFile>,
}

/// Walk `target_dir` and parse every eligible Go file into package groups.
///
/// `file_filter` (when given) receives the bare file name. Independent of
/// it, the walk always skips `_test.go` files, previously generated files
/// (`DO NOT EDIT` header), hidden and underscore-prefixed entries, and
/// `testdata` directories — the conventions Go tooling follows.
pub fn walk(
    target_dir: &Path,
    file_filter: Option<&(dyn Fn(&str) -> bool)>,
) -> Result<Vec<PackageGroup>> {
    let mut groups: IndexMap<(PathBuf, String), PackageGroup> = IndexMap::new();
    walk_dir(target_dir, file_filter, &mut groups)?;
    Ok(groups.into_values().collect())
}

fn walk_dir(
    dir: &Path,
    file_filter: Option<&(dyn Fn(&str) -> bool)>,
    groups: &mut IndexMap<(PathBuf, String), PackageGroup>,
) -> Result<()> {
    let read_err = |source| Error::Walk {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(read_err)?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(read_err)?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();

    let mut subdirs = Vec::new();
    for path in entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || name.starts_with('_') {
            continue;
        }
        if path.is_dir() {
            if name != "testdata" {
                subdirs.push(path);
            }
            continue;
        }
        if !name.ends_with(".go") || name.ends_with("_test.go") {
            continue;
        }
        if let Some(filter) = file_filter {
            if !filter(name) {
                continue;
            }
        }

        let src = fs::read_to_string(&path).map_err(|source| Error::Walk {
            path: path.clone(),
            source,
        })?;
        if scan::looks_generated(&src) {
            continue;
        }
        let parsed = scan::parse_file(&path, &src)?;

        let key = (dir.to_path_buf(), parsed.package.clone());
        let group = groups.entry(key).or_insert_with(|| PackageGroup {
            name: parsed.package.clone(),
            dir: dir.to_path_buf(),
            files: Vec::new(),
        });
        group.files.push(SourceFile {
            path,
            imports: parsed.imports,
            types: parsed.types,
        });
    }

    for sub in subdirs {
        walk_dir(&sub, file_filter, groups)?;
    }
    Ok(())
}
