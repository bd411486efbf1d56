//! Field classification.
//!
//! A field enters the synthesis set iff its backtick tag carries one of the
//! two recognized keys: `required` (constant-value annotation) or `super`
//! (designated-base annotation, value ignored). Untagged fields and fields
//! with neither key are invisible to the generator; malformed tags are
//! skipped, not errored.
//!
//! A `required` value is emitted verbatim into the constructor body and is
//! never type-checked — the author is trusted. An empty `required:""` marks
//! the field as an ordinary constructor parameter instead.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::walker::TypeDecl;

/// Tag key whose value is baked into the constructor body.
pub const CONST_VALUE_KEY: &str = "required";
/// Tag key marking the designated-base field for `extends` inference.
pub const DESIGNATED_BASE_KEY: &str = "super";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Normalized field name (first declared name, or the type's base
    /// identifier for embedded fields).
    pub name: String,
    /// Type printed relative to the type's own package, so same-package
    /// types stay unqualified.
    pub printed_type: String,
    /// Non-empty constant expression, if the field is constant-valued.
    pub const_value: Option<String>,
    /// True for the designated-base field.
    pub is_base: bool,
}

#[derive(Debug, Default)]
pub struct ClassifiedFields {
    pub fields: Vec<FieldDescriptor>,
    /// Name of the designated-base field, recorded for interface inference.
    pub base_name: Option<String>,
}

/// Classify a marked type's fields in declaration order.
pub fn classify(decl: &TypeDecl) -> ClassifiedFields {
    let mut out = ClassifiedFields::default();
    for field in &decl.fields {
        let Some(tag) = field.tag.as_deref() else {
            continue;
        };
        let const_value = lookup_tag(tag, CONST_VALUE_KEY);
        let is_base = lookup_tag(tag, DESIGNATED_BASE_KEY).is_some();
        if const_value.is_none() && !is_base {
            continue;
        }
        if is_base {
            out.base_name = Some(field.name.clone());
        }
        out.fields.push(FieldDescriptor {
            name: field.name.clone(),
            printed_type: field.type_expr.clone(),
            // empty required:"" means "caller supplies this", not a constant
            const_value: const_value.filter(|v| !v.is_empty()),
            is_base,
        });
    }
    out
}

/// Look up one key in a `key:"value"` struct tag. Values follow the Go
/// convention: double-quoted with `\"` and `\\` escapes.
pub fn lookup_tag(tag: &str, key: &str) -> Option<String> {
    static PAIR: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"([A-Za-z_][A-Za-z0-9_-]*):"((?:[^"\\]|\\.)*)""#).expect("static regex")
    });
    for caps in PAIR.captures_iter(tag) {
        if &caps[1] == key {
            return Some(unescape(&caps[2]));
        }
    }
    None
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(esc) => out.push(esc),
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::RawField;

    fn decl(fields: Vec<RawField>) -> TypeDecl {
        TypeDecl {
            name: "T".to_string(),
            docs: Vec::new(),
            fields,
        }
    }

    fn raw(name: &str, ty: &str, tag: Option<&str>) -> RawField {
        RawField {
            name: name.to_string(),
            type_expr: ty.to_string(),
            tag: tag.map(str::to_string),
        }
    }

    #[test]
    fn tag_lookup_unquotes_values() {
        assert_eq!(
            lookup_tag(r#"required:"\"admin\"""#, "required"),
            Some("\"admin\"".to_string())
        );
        assert_eq!(lookup_tag(r#"required:"""#, "required"), Some(String::new()));
        assert_eq!(lookup_tag(r#"json:"x" required:"1""#, "required"), Some("1".to_string()));
        assert_eq!(lookup_tag(r#"json:"x""#, "required"), None);
    }

    #[test]
    fn untagged_and_unrecognized_fields_are_invisible() {
        let c = classify(&decl(vec![
            raw("X", "int", None),
            raw("Y", "int", Some(r#"json:"y""#)),
        ]));
        assert!(c.fields.is_empty());
        assert!(c.base_name.is_none());
    }

    #[test]
    fn empty_required_is_a_parameter() {
        let c = classify(&decl(vec![raw("Key", "string", Some(r#"required:"""#))]));
        assert_eq!(c.fields.len(), 1);
        assert_eq!(c.fields[0].const_value, None);
        assert!(!c.fields[0].is_base);
    }

    #[test]
    fn nonempty_required_is_a_constant() {
        let c = classify(&decl(vec![raw(
            "Role",
            "string",
            Some(r#"required:"\"admin\"""#),
        )]));
        assert_eq!(c.fields[0].const_value.as_deref(), Some("\"admin\""));
    }

    #[test]
    fn super_tag_records_the_base_field() {
        let c = classify(&decl(vec![
            raw("UserBase", "*UserBase", Some(r#"super:"""#)),
            raw("Role", "string", Some(r#"required:"\"admin\"""#)),
        ]));
        assert_eq!(c.base_name.as_deref(), Some("UserBase"));
        assert!(c.fields[0].is_base);
        assert!(!c.fields[1].is_base);
    }

    #[test]
    fn declaration_order_is_preserved() {
        let c = classify(&decl(vec![
            raw("B", "int", Some(r#"required:"""#)),
            raw("A", "int", Some(r#"required:"""#)),
        ]));
        let names: Vec<&str> = c.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
