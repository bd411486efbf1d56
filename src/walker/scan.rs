//! Focused Go declaration scanner.
//!
//! This is not a Go frontend. It reads exactly what the generator needs out
//! of a conventionally formatted (gofmt) source file: the package clause,
//! the import table, and top-level struct type declarations with their doc
//! comments, field lists, and backtick tags. Function bodies and every other
//! top-level construct are skipped by brace tracking.
//!
//! The scan works on logical lines. A first pass separates each physical
//! line into a code part and a line-comment part while tracking the states
//! that can span or hide characters: interpreted strings, rune literals,
//! raw (backtick) strings, and block comments. Raw strings survive into the
//! code part because struct tags live in them.

use std::path::Path;

use indexmap::IndexMap;

use super::{RawField, TypeDecl};
use crate::error::{Error, Result};
use crate::imports::default_alias;

/// One parsed compilation unit.
#[derive(Debug)]
pub struct ParsedFile {
    pub package: String,
    /// alias → unquoted import path, in declaration order.
    pub imports: IndexMap<String, String>,
    pub types: Vec<TypeDecl>,
}

/// Generated-file convention: a `// Code generated … DO NOT EDIT.` line
/// before the package clause. Such files are never scanned again.
pub fn looks_generated(src: &str) -> bool {
    for line in src.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("package ") {
            return false;
        }
        if trimmed.starts_with("// Code generated ") && trimmed.ends_with("DO NOT EDIT.") {
            return true;
        }
    }
    false
}

pub fn parse_file(path: &Path, src: &str) -> Result<ParsedFile> {
    Parser {
        path,
        lines: logical_lines(src),
        idx: 0,
    }
    .parse()
}

// ————————————————————————————————————————————————————————————————————————————
// LOGICAL LINES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default)]
struct Line {
    code: String,
    comment: Option<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Lex {
    Normal,
    Str,
    Rune,
    Raw,
    Block,
}

fn logical_lines(src: &str) -> Vec<Line> {
    let mut out = Vec::new();
    let mut line = Line::default();
    let mut state = Lex::Normal;
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            out.push(std::mem::take(&mut line));
            // interpreted strings and runes cannot span lines in Go
            if matches!(state, Lex::Str | Lex::Rune) {
                state = Lex::Normal;
            }
            continue;
        }
        match state {
            Lex::Normal => match c {
                '"' => {
                    line.code.push(c);
                    state = Lex::Str;
                }
                '\'' => {
                    line.code.push(c);
                    state = Lex::Rune;
                }
                '`' => {
                    line.code.push(c);
                    state = Lex::Raw;
                }
                '/' if chars.peek() == Some(&'/') => {
                    let mut text = String::from("/");
                    for n in chars.by_ref() {
                        if n == '\n' {
                            line.comment = Some(std::mem::take(&mut text));
                            out.push(std::mem::take(&mut line));
                            break;
                        }
                        text.push(n);
                    }
                    if !text.is_empty() {
                        // comment ran to end of input
                        line.comment = Some(text);
                    }
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    line.code.push(' ');
                    state = Lex::Block;
                }
                _ => line.code.push(c),
            },
            Lex::Str | Lex::Rune => {
                line.code.push(c);
                let quote = if state == Lex::Str { '"' } else { '\'' };
                if c == '\\' {
                    if let Some(esc) = chars.next() {
                        line.code.push(esc);
                    }
                } else if c == quote {
                    state = Lex::Normal;
                }
            }
            Lex::Raw => {
                line.code.push(c);
                if c == '`' {
                    state = Lex::Normal;
                }
            }
            Lex::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = Lex::Normal;
                }
            }
        }
    }
    if !line.code.is_empty() || line.comment.is_some() {
        out.push(line);
    }
    out
}

/// Net `{`/`}` balance of a code line, ignoring braces inside string, rune,
/// and raw-string literals.
fn net_braces(code: &str) -> i32 {
    let mut net = 0;
    let mut state = Lex::Normal;
    let mut chars = code.chars().peekable();
    while let Some(c) = chars.next() {
        match state {
            Lex::Normal => match c {
                '{' => net += 1,
                '}' => net -= 1,
                '"' => state = Lex::Str,
                '\'' => state = Lex::Rune,
                '`' => state = Lex::Raw,
                _ => {}
            },
            Lex::Str | Lex::Rune => {
                let quote = if state == Lex::Str { '"' } else { '\'' };
                if c == '\\' {
                    chars.next();
                } else if c == quote {
                    state = Lex::Normal;
                }
            }
            // block comments never reach brace counting; they are replaced
            // with spaces when logical lines are built
            Lex::Raw | Lex::Block => {
                if c == '`' {
                    state = Lex::Normal;
                }
            }
        }
    }
    net
}

// ————————————————————————————————————————————————————————————————————————————
// PARSER
// ————————————————————————————————————————————————————————————————————————————

struct Parser<'a> {
    path: &'a Path,
    lines: Vec<Line>,
    idx: usize,
}

impl Parser<'_> {
    fn parse(mut self) -> Result<ParsedFile> {
        let mut package = None;
        let mut imports = IndexMap::new();
        let mut types = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut skip_depth: i32 = 0;

        while self.idx < self.lines.len() {
            let line = &self.lines[self.idx];
            let code = line.code.trim().to_string();

            if skip_depth > 0 {
                skip_depth += net_braces(&code);
                self.idx += 1;
                continue;
            }

            if code.is_empty() {
                match &line.comment {
                    Some(c) => pending.push(c.clone()),
                    // a blank line detaches any comments above it
                    None => pending.clear(),
                }
                self.idx += 1;
                continue;
            }

            if let Some(rest) = code.strip_prefix("package ") {
                package = Some(rest.trim().to_string());
                pending.clear();
                self.idx += 1;
            } else if code == "import (" {
                self.idx += 1;
                self.parse_import_block(&mut imports)?;
                pending.clear();
            } else if let Some(rest) = code.strip_prefix("import ") {
                if let Some((alias, path)) = parse_import_spec(rest.trim()) {
                    imports.insert(alias, path);
                }
                pending.clear();
                self.idx += 1;
            } else if code == "type (" {
                let group_docs = std::mem::take(&mut pending);
                self.idx += 1;
                self.parse_type_group(&group_docs, &mut types)?;
            } else if let Some(rest) = code.strip_prefix("type ") {
                let docs = std::mem::take(&mut pending);
                self.parse_type_spec(rest.trim().to_string(), docs, &[], &mut types)?;
            } else {
                skip_depth += net_braces(&code);
                pending.clear();
                self.idx += 1;
            }
        }

        let package = package.ok_or_else(|| Error::Parse {
            path: self.path.to_path_buf(),
            line: 1,
            message: "missing package clause".to_string(),
        })?;
        Ok(ParsedFile { package, imports, types })
    }

    fn parse_import_block(&mut self, imports: &mut IndexMap<String, String>) -> Result<()> {
        while self.idx < self.lines.len() {
            let code = self.lines[self.idx].code.trim().to_string();
            self.idx += 1;
            if code == ")" {
                return Ok(());
            }
            if code.is_empty() {
                continue;
            }
            if let Some((alias, path)) = parse_import_spec(&code) {
                imports.insert(alias, path);
            } else {
                return Err(self.err_here("malformed import specification"));
            }
        }
        Err(self.err_here("unterminated import block"))
    }

    /// `type ( … )` — specs inside carry their own doc comments, and the
    /// group's doc comments apply to every spec in it.
    fn parse_type_group(&mut self, group_docs: &[String], types: &mut Vec<TypeDecl>) -> Result<()> {
        let mut pending: Vec<String> = Vec::new();
        while self.idx < self.lines.len() {
            let line = &self.lines[self.idx];
            let code = line.code.trim().to_string();
            if code == ")" {
                self.idx += 1;
                return Ok(());
            }
            if code.is_empty() {
                match &line.comment {
                    Some(c) => pending.push(c.clone()),
                    None => pending.clear(),
                }
                self.idx += 1;
                continue;
            }
            let docs = std::mem::take(&mut pending);
            self.parse_type_spec(code, docs, group_docs, types)?;
        }
        Err(self.err_here("unterminated type declaration group"))
    }

    /// One type spec, with the `type ` keyword already stripped. Non-struct
    /// specs (aliases, interfaces, basic definitions) are skipped.
    fn parse_type_spec(
        &mut self,
        spec: String,
        docs: Vec<String>,
        group_docs: &[String],
        types: &mut Vec<TypeDecl>,
    ) -> Result<()> {
        let Some((name, after)) = split_leading_ident(&spec) else {
            return Err(self.err_here("malformed type declaration"));
        };
        let after = after.trim_start();

        let Some(struct_rest) = strip_struct_keyword(after) else {
            // not a struct: consume the spec, tracking braces it may open
            let mut depth = net_braces(&spec);
            self.idx += 1;
            while depth > 0 && self.idx < self.lines.len() {
                depth += net_braces(&self.lines[self.idx].code);
                self.idx += 1;
            }
            return Ok(());
        };

        let fields = self.parse_struct_body(struct_rest)?;
        // doc order matches the original: the spec's own comments first,
        // then the enclosing group's
        let mut all_docs = docs;
        all_docs.extend(group_docs.iter().cloned());
        types.push(TypeDecl {
            name: name.to_string(),
            docs: all_docs,
            fields,
        });
        Ok(())
    }

    /// Parse a struct body starting at the current line. `rest` is whatever
    /// follows the `struct` keyword on the declaration line (`{`, `{}`, or a
    /// full single-line body).
    fn parse_struct_body(&mut self, rest: &str) -> Result<Vec<RawField>> {
        let rest = rest.trim();
        let mut fields = Vec::new();

        // single-line form: `struct{}` or `struct{ A int; B string }`
        if rest.starts_with('{') && net_braces(rest) == 0 {
            let inner = rest
                .trim_start_matches('{')
                .trim_end_matches('}')
                .trim();
            for part in inner.split(';') {
                if let Some(field) = parse_field_line(part.trim()) {
                    fields.push(field);
                }
            }
            self.idx += 1;
            return Ok(fields);
        }

        if rest != "{" {
            return Err(self.err_here("expected `{` after struct keyword"));
        }
        self.idx += 1;

        let mut depth: i32 = 1;
        while self.idx < self.lines.len() {
            let code = self.lines[self.idx].code.trim().to_string();
            let net = net_braces(&code);
            if depth == 1 {
                if code == "}" || (net < 0 && code.starts_with('}')) {
                    self.idx += 1;
                    return Ok(fields);
                }
                if net <= 0 {
                    if let Some(field) = parse_field_line(&code) {
                        fields.push(field);
                    }
                }
                // net > 0 opens an anonymous nested type; it cannot carry a
                // tag the generator understands, so its lines are skipped
            }
            depth += net;
            if depth <= 0 {
                self.idx += 1;
                return Ok(fields);
            }
            self.idx += 1;
        }
        Err(self.err_here("unterminated struct body"))
    }

    fn err_here(&self, message: &str) -> Error {
        Error::Parse {
            path: self.path.to_path_buf(),
            line: self.idx.min(self.lines.len().saturating_sub(1)) + 1,
            message: message.to_string(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// LINE-LEVEL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// `alias "path"` | `"path"` | `. "path"` | `_ "path"` → (alias, path).
fn parse_import_spec(spec: &str) -> Option<(String, String)> {
    let open = spec.find('"')?;
    let close = spec.rfind('"')?;
    if close <= open {
        return None;
    }
    let path = spec[open + 1..close].to_string();
    let alias = spec[..open].trim();
    let alias = if alias.is_empty() {
        default_alias(&path).to_string()
    } else {
        alias.to_string()
    };
    Some((alias, path))
}

fn strip_struct_keyword(s: &str) -> Option<&str> {
    let rest = s.strip_prefix("struct")?;
    // `struct{` or `struct {`, never `structFoo`
    if rest.starts_with('{') || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

fn ident_len(s: &str) -> usize {
    let mut len = 0;
    for (i, c) in s.char_indices() {
        let ok = if i == 0 {
            c.is_alphabetic() || c == '_'
        } else {
            c.is_alphanumeric() || c == '_'
        };
        if !ok {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

fn split_leading_ident(s: &str) -> Option<(&str, &str)> {
    let len = ident_len(s);
    if len == 0 {
        None
    } else {
        Some((&s[..len], &s[len..]))
    }
}

/// Parse one field line into a raw field. Returns `None` for lines that do
/// not declare a usable field (interface embeddings inside nested types,
/// stray tokens); the classifier never sees those.
fn parse_field_line(code: &str) -> Option<RawField> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }

    // split off the backtick tag, if any
    let (decl, tag) = match code.find('`') {
        Some(open) => {
            let rest = &code[open + 1..];
            let close = rest.find('`')?;
            (code[..open].trim(), Some(rest[..close].to_string()))
        }
        None => (code, None),
    };
    if decl.is_empty() {
        return None;
    }

    let mut names: Vec<&str> = Vec::new();
    let mut rest = decl;
    loop {
        let Some((id, after)) = split_leading_ident(rest) else {
            // `*UserBase`, `[]byte`, … — no leading name, embedded or junk
            break;
        };
        let after_trim = after.trim_start();
        if let Some(more) = after_trim.strip_prefix(',') {
            names.push(id);
            rest = more.trim_start();
            continue;
        }
        if after_trim.is_empty() || after_trim.starts_with('.') {
            // a lone `UserBase` or `foo.Bar`: embedded field
            break;
        }
        names.push(id);
        rest = after_trim;
        break;
    }

    if names.is_empty() {
        // embedded: the normalized name is the type's base identifier
        let type_expr = normalize_ws(decl);
        let name = embedded_name(&type_expr)?;
        Some(RawField { name, type_expr, tag })
    } else {
        if rest.is_empty() {
            return None; // `X,` with nothing after — not a field
        }
        Some(RawField {
            name: names[0].to_string(),
            type_expr: normalize_ws(rest),
            tag,
        })
    }
}

/// Base identifier of an embedded field's type: `*foo.Bar` → `Bar`.
fn embedded_name(type_expr: &str) -> Option<String> {
    type_expr
        .rsplit(|c: char| !(c.is_alphanumeric() || c == '_'))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(src: &str) -> ParsedFile {
        parse_file(&PathBuf::from("test.go"), src).expect("parse failed")
    }

    #[test]
    fn package_and_imports() {
        let f = parse(
            r#"package shop

import (
	"time"

	pay "example.com/payments"
	"example.com/geo"
)
"#,
        );
        assert_eq!(f.package, "shop");
        assert_eq!(f.imports.get("time").map(String::as_str), Some("time"));
        assert_eq!(f.imports.get("pay").map(String::as_str), Some("example.com/payments"));
        assert_eq!(f.imports.get("geo").map(String::as_str), Some("example.com/geo"));
    }

    #[test]
    fn single_import_form() {
        let f = parse("package a\n\nimport \"fmt\"\n");
        assert_eq!(f.imports.get("fmt").map(String::as_str), Some("fmt"));
    }

    #[test]
    fn struct_with_tags_and_docs() {
        let f = parse(
            r#"package user

//genconstructor -e
type AdminUser struct {
	*UserBase `super:""`
	Role      string `required:"\"admin\""`
}
"#,
        );
        assert_eq!(f.types.len(), 1);
        let t = &f.types[0];
        assert_eq!(t.name, "AdminUser");
        assert_eq!(t.docs, vec!["//genconstructor -e"]);
        assert_eq!(t.fields.len(), 2);
        assert_eq!(t.fields[0].name, "UserBase");
        assert_eq!(t.fields[0].type_expr, "*UserBase");
        assert_eq!(t.fields[0].tag.as_deref(), Some(r#"super:"""#));
        assert_eq!(t.fields[1].name, "Role");
        assert_eq!(t.fields[1].type_expr, "string");
        assert_eq!(t.fields[1].tag.as_deref(), Some(r#"required:"\"admin\"""#));
    }

    #[test]
    fn grouped_type_decl_merges_group_docs() {
        let f = parse(
            r#"package a

//genconstructor -p
type (
	// Foo is a thing.
	Foo struct {
		Key string `required:""`
	}

	Bar struct {
		Key string `required:""`
	}
)
"#,
        );
        assert_eq!(f.types.len(), 2);
        // spec docs come first, group docs after
        assert_eq!(
            f.types[0].docs,
            vec!["// Foo is a thing.", "//genconstructor -p"]
        );
        assert_eq!(f.types[1].docs, vec!["//genconstructor -p"]);
    }

    #[test]
    fn blank_line_detaches_doc_comments() {
        let f = parse(
            "package a\n\n//genconstructor\n\ntype Foo struct {\n\tKey string `required:\"\"`\n}\n",
        );
        assert!(f.types[0].docs.is_empty());
    }

    #[test]
    fn multi_name_fields_use_first_name() {
        let f = parse(
            "package a\n\ntype P struct {\n\tX, Y int `required:\"\"`\n}\n",
        );
        let t = &f.types[0];
        assert_eq!(t.fields.len(), 1);
        assert_eq!(t.fields[0].name, "X");
        assert_eq!(t.fields[0].type_expr, "int");
    }

    #[test]
    fn embedded_qualified_field() {
        let f = parse("package a\n\ntype T struct {\n\t*base.Account `super:\"\"`\n}\n");
        assert_eq!(f.types[0].fields[0].name, "Account");
        assert_eq!(f.types[0].fields[0].type_expr, "*base.Account");
    }

    #[test]
    fn func_bodies_are_skipped() {
        let f = parse(
            r#"package a

func helper() string {
	type looksLikeADecl struct {
		X int `required:""`
	}
	return "}{"
}

type Real struct {
	Key string `required:""`
}
"#,
        );
        assert_eq!(f.types.len(), 1);
        assert_eq!(f.types[0].name, "Real");
    }

    #[test]
    fn braces_in_strings_and_comments_do_not_confuse_depth() {
        let f = parse(
            "package a\n\nvar x = \"}}}\" /* {{{ */\n\ntype T struct {\n\tKey string `required:\"\"`\n}\n",
        );
        assert_eq!(f.types.len(), 1);
    }

    #[test]
    fn non_struct_types_are_skipped() {
        let f = parse(
            "package a\n\ntype Alias = string\n\ntype Small int\n\ntype I interface {\n\tFoo()\n}\n",
        );
        assert!(f.types.is_empty());
    }

    #[test]
    fn untagged_fields_have_no_tag() {
        let f = parse("package a\n\ntype Point struct {\n\tX int\n\tY int\n}\n");
        assert_eq!(f.types[0].fields.len(), 2);
        assert!(f.types[0].fields.iter().all(|f| f.tag.is_none()));
    }

    #[test]
    fn generated_files_are_recognized() {
        assert!(looks_generated(
            "// Code generated by go-genconstructor; DO NOT EDIT.\n\npackage a\n"
        ));
        assert!(!looks_generated("package a\n"));
        // marker after the package clause does not count
        assert!(!looks_generated(
            "package a\n// Code generated by x; DO NOT EDIT.\n"
        ));
    }

    #[test]
    fn missing_package_clause_is_an_error() {
        let err = parse_file(&PathBuf::from("t.go"), "type X struct{}\n");
        assert!(err.is_err());
    }

    #[test]
    fn single_line_struct_body() {
        let f = parse("package a\n\ntype T struct{ A int `required:\"\"`; B string }\n");
        assert_eq!(f.types[0].fields.len(), 2);
        assert_eq!(f.types[0].fields[0].name, "A");
        assert_eq!(f.types[0].fields[1].type_expr, "string");
    }
}
