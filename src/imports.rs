//! Import dependency collection.
//!
//! One `ImportTable` lives per compilation-unit group: alias → unquoted
//! import path, deduplicated by alias with the last writer winning (no
//! conflict detection — an accepted limitation). The table is created fresh
//! per group, filled while fields are classified, handed by ownership to the
//! assembler, and discarded.
//!
//! Two collectors feed it:
//! - a parameter field's printed type is scanned for `alias.Ident` selector
//!   expressions, resolved against the enclosing file's import table;
//! - a constant-valued field's expression is split into identifier tokens
//!   (on non-letter characters, keeping `.`, `_`, `-` inside a token) and
//!   every dotted token resolves its head the same way. A constant may name
//!   a package-qualified symbol even though the field's declared type needs
//!   no import at all.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::walker::SourceFile;

pub type ImportTable = IndexMap<String, String>;

/// Default alias of an import path: its last segment, skipping a trailing
/// `vN` major-version segment (`example.com/foo/v2` → `foo`).
pub fn default_alias(path: &str) -> &str {
    static VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v\d+$").expect("static regex"));
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    if VERSION.is_match(last) {
        segments.next().unwrap_or(last)
    } else {
        last
    }
}

/// Merge alias→path pairs into the group table. Last writer per alias wins.
pub fn merge(table: &mut ImportTable, pairs: Vec<(String, String)>) {
    for (alias, path) in pairs {
        table.insert(alias, path);
    }
}

/// Selector scan over a printed type expression: every `alias.Ident` must
/// resolve against the file's imports or the pass aborts.
pub fn type_imports(type_expr: &str, file: &SourceFile) -> Result<Vec<(String, String)>> {
    static SELECTOR: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\.[A-Za-z_]").expect("static regex"));

    let mut out = Vec::new();
    for caps in SELECTOR.captures_iter(type_expr) {
        let whole = caps.get(0).expect("capture 0 always present");
        // reject the tail of `a.b.c` — only a leading identifier qualifies
        if whole.start() > 0 {
            let prev = type_expr.as_bytes()[whole.start() - 1];
            if prev == b'.' || prev.is_ascii_alphanumeric() || prev == b'_' {
                continue;
            }
        }
        let alias = &caps[1];
        match file.imports.get(alias) {
            Some(path) => out.push((alias.to_string(), path.clone())),
            None => {
                return Err(Error::UnresolvedType {
                    type_expr: type_expr.to_string(),
                    alias: alias.to_string(),
                    path: file.path.clone(),
                });
            }
        }
    }
    Ok(out)
}

/// Identifier scan over a constant-value expression. Splitting keeps `.`,
/// `_`, and `-` inside a token and breaks on every other non-letter, so
/// `pay.MethodCard + 1` yields `pay.MethodCard`. Tokens without a dot never
/// need an import; a dotted token whose head is not a known alias is fatal.
pub fn const_expr_imports(const_value: &str, file: &SourceFile) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for token in const_value.split(|c: char| !(c.is_alphabetic() || matches!(c, '.' | '_' | '-'))) {
        if token.is_empty() || !token.starts_with(|c: char| c.is_alphabetic() || c == '_') {
            continue;
        }
        let Some((head, _)) = token.split_once('.') else {
            continue;
        };
        match file.imports.get(head) {
            Some(path) => out.push((head.to_string(), path.clone())),
            None => {
                return Err(Error::UnresolvedConst {
                    ident: token.to_string(),
                    alias: head.to_string(),
                    path: file.path.clone(),
                });
            }
        }
    }
    Ok(out)
}
