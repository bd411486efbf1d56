//! Output assembly for one compilation-unit group.
//!
//! Wraps the concatenated constructors with the generated-code header, the
//! package clause, and a gofmt-shaped import block, then runs a delimiter
//! check over the final text. Groups that produced nothing are skipped by
//! the pipeline before this module is ever involved, so an assembled unit
//! always has a body.

use crate::error::{Error, Result};
use crate::imports::{default_alias, ImportTable};

/// Assembled output for one group; write-once, handed to the writer and
/// discarded.
#[derive(Debug)]
pub struct GeneratedUnit {
    pub package_name: String,
    pub imports: ImportTable,
    pub body: String,
}

pub fn assemble(generator_name: &str, unit: &GeneratedUnit) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!(
        "// Code generated by {generator_name}; DO NOT EDIT.\n\n"
    ));
    out.push_str(&format!("package {}\n", unit.package_name));

    let imports = render_imports(&unit.imports);
    if !imports.is_empty() {
        out.push('\n');
        out.push_str(&imports);
    }

    out.push('\n');
    out.push_str(&unit.body);

    verify_source(&out).map_err(|message| Error::Format {
        package: unit.package_name.clone(),
        message,
    })?;
    Ok(out)
}

/// Render the collected import table the way gofmt would: standard-library
/// paths first, a blank line, then external paths; each group sorted by
/// path; the alias printed only when it differs from the path's default.
fn render_imports(table: &ImportTable) -> String {
    if table.is_empty() {
        return String::new();
    }

    let mut entries: Vec<(&str, &str)> = table
        .iter()
        .map(|(alias, path)| (alias.as_str(), path.as_str()))
        .collect();
    entries.sort_by_key(|&(_, path)| path);

    if let [(alias, path)] = entries[..] {
        return format!("import {}\n", spec_text(alias, path));
    }

    let (std, external): (Vec<_>, Vec<_>) =
        entries.iter().copied().partition(|&(_, path)| is_std(path));
    let mut out = String::from("import (\n");
    for &(alias, path) in &std {
        out.push_str(&format!("\t{}\n", spec_text(alias, path)));
    }
    if !std.is_empty() && !external.is_empty() {
        out.push('\n');
    }
    for &(alias, path) in &external {
        out.push_str(&format!("\t{}\n", spec_text(alias, path)));
    }
    out.push_str(")\n");
    out
}

fn spec_text(alias: &str, path: &str) -> String {
    if alias == default_alias(path) {
        format!("\"{path}\"")
    } else {
        format!("{alias} \"{path}\"")
    }
}

/// Standard-library import paths have no dot in their first segment.
fn is_std(path: &str) -> bool {
    !path.split('/').next().unwrap_or(path).contains('.')
}

/// Post-synthesis source check, standing in for running the target
/// language's formatter: every `(`/`[`/`{` must close in order, honoring
/// string, rune, and raw-string literals and both comment forms. A failure
/// here is a generator defect and is surfaced verbatim.
fn verify_source(src: &str) -> std::result::Result<(), String> {
    #[derive(PartialEq)]
    enum St {
        Code,
        Str,
        Rune,
        Raw,
        Line,
        Block,
    }

    let mut stack: Vec<char> = Vec::new();
    let mut state = St::Code;
    let mut line = 1usize;
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
            if matches!(state, St::Line | St::Str | St::Rune) {
                state = St::Code;
            }
            continue;
        }
        match state {
            St::Code => match c {
                '(' | '[' | '{' => stack.push(c),
                ')' | ']' | '}' => {
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    if stack.pop() != Some(expected) {
                        return Err(format!("unbalanced `{c}` at line {line}"));
                    }
                }
                '"' => state = St::Str,
                '\'' => state = St::Rune,
                '`' => state = St::Raw,
                '/' if chars.peek() == Some(&'/') => state = St::Line,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = St::Block;
                }
                _ => {}
            },
            St::Str | St::Rune => {
                let quote = if state == St::Str { '"' } else { '\'' };
                if c == '\\' {
                    chars.next();
                } else if c == quote {
                    state = St::Code;
                }
            }
            St::Raw => {
                if c == '`' {
                    state = St::Code;
                }
            }
            St::Line => {}
            St::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = St::Code;
                }
            }
        }
    }
    if let Some(open) = stack.pop() {
        return Err(format!("unclosed `{open}` at end of file"));
    }
    Ok(())
}
