//! Constructor synthesis.
//!
//! A pure function of (type name, classified fields, mode, interface name):
//! no hidden state, deterministic, idempotent across runs. Each field is
//! first planned into one of three rules, then the fixed template renders
//! the plan. Keeping the rules explicit (instead of ad hoc concatenation)
//! is what guarantees re-runnable, byte-identical output.

use crate::error::{Error, Result};
use crate::fields::FieldDescriptor;
use crate::naming;
use crate::options::Mode;

/// Parameter name for the interface-narrowed base field.
const NARROW_PARAM: &str = "x";

/// How one field is satisfied inside the constructor.
#[derive(Debug)]
enum FieldRule<'a> {
    /// Emit the annotation's expression verbatim; no parameter.
    Const(&'a str),
    /// Take the inferred interface and down-cast to `*<fieldName>` in the
    /// body. The extends mechanism assumes the base field's concrete type is
    /// a pointer to a record named like the field itself.
    Narrow { interface: &'a str },
    /// Ordinary caller-supplied parameter.
    Param { param: String, ty: &'a str },
}

/// Render one constructor for a marked type.
///
/// `interface_name` must be present for `super`/`extends` (the pipeline
/// resolves it first); a missing one is a generator defect, not an input
/// error.
pub fn render(
    type_name: &str,
    mode: Mode,
    interface_name: Option<&str>,
    fields: &[FieldDescriptor],
) -> Result<String> {
    let interface_name = match (mode.wants_interface(), interface_name) {
        (true, Some(name)) => Some(name),
        (true, None) => {
            return Err(Error::Render(format!(
                "type {type_name}: mode {mode:?} requires an interface name"
            )));
        }
        (false, _) => None,
    };

    let plan: Vec<(&str, FieldRule)> = fields
        .iter()
        .map(|f| {
            let rule = if let Some(value) = f.const_value.as_deref() {
                FieldRule::Const(value)
            } else if mode == Mode::Extends && f.is_base {
                FieldRule::Narrow {
                    interface: interface_name.unwrap_or_default(),
                }
            } else {
                FieldRule::Param {
                    param: naming::to_lower_camel(&f.name),
                    ty: &f.printed_type,
                }
            };
            (f.name.as_str(), rule)
        })
        .collect();

    let ctor_name = format!("New{}", naming::to_upper_camel(type_name));
    let return_type = match mode {
        Mode::Plain => type_name.to_string(),
        Mode::Pointer => format!("*{type_name}"),
        Mode::Super | Mode::Extends => interface_name.unwrap_or_default().to_string(),
    };

    let mut out = String::new();

    // signature: one parameter per non-constant field, declaration order
    let params: Vec<(String, String)> = plan
        .iter()
        .filter_map(|(_, rule)| match rule {
            FieldRule::Const(_) => None,
            FieldRule::Narrow { interface } => {
                Some((NARROW_PARAM.to_string(), (*interface).to_string()))
            }
            FieldRule::Param { param, ty } => Some((param.clone(), (*ty).to_string())),
        })
        .collect();
    if params.is_empty() {
        out.push_str(&format!("func {ctor_name}() {return_type} {{\n"));
    } else {
        out.push_str(&format!("func {ctor_name}(\n"));
        for (param, ty) in &params {
            out.push_str(&format!("\t{param} {ty},\n"));
        }
        out.push_str(&format!(") {return_type} {{\n"));
    }

    // body: a single record literal, address-taken unless returned by value
    let amp = if mode.returns_reference() { "&" } else { "" };
    out.push_str(&format!("\treturn {amp}{type_name}{{\n"));
    for (name, rule) in &plan {
        let value = match rule {
            FieldRule::Const(value) => (*value).to_string(),
            FieldRule::Narrow { .. } => format!("{NARROW_PARAM}.(*{name})"),
            FieldRule::Param { param, .. } => param.clone(),
        };
        out.push_str(&format!("\t\t{name}: {value},\n"));
    }
    out.push_str("\t}\n}\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(name: &str, ty: &str) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            printed_type: ty.to_string(),
            const_value: None,
            is_base: false,
        }
    }

    fn const_field(name: &str, ty: &str, value: &str) -> FieldDescriptor {
        FieldDescriptor {
            const_value: Some(value.to_string()),
            ..field(name, ty)
        }
    }

    fn base_field(name: &str, ty: &str) -> FieldDescriptor {
        FieldDescriptor {
            is_base: true,
            ..field(name, ty)
        }
    }

    #[test]
    fn plain_returns_by_value() {
        let out = render("Foo", Mode::Plain, None, &[field("Key", "string")]).expect("render");
        assert_eq!(
            out,
            "func NewFoo(\n\tkey string,\n) Foo {\n\treturn Foo{\n\t\tKey: key,\n\t}\n}\n"
        );
    }

    #[test]
    fn pointer_returns_address() {
        let out = render("Foo", Mode::Pointer, None, &[field("Key", "string")]).expect("render");
        assert_eq!(
            out,
            "func NewFoo(\n\tkey string,\n) *Foo {\n\treturn &Foo{\n\t\tKey: key,\n\t}\n}\n"
        );
    }

    #[test]
    fn constants_are_emitted_verbatim_and_never_parameters() {
        let out = render(
            "Foo",
            Mode::Plain,
            None,
            &[
                field("Key", "string"),
                const_field("Role", "string", "\"admin\""),
            ],
        )
        .expect("render");
        assert!(!out.contains("role string"));
        assert!(out.contains("\t\tRole: \"admin\",\n"));
    }

    #[test]
    fn all_constant_fields_make_a_zero_parameter_constructor() {
        let out = render(
            "Foo",
            Mode::Pointer,
            None,
            &[const_field("Role", "string", "\"admin\"")],
        )
        .expect("render");
        assert_eq!(
            out,
            "func NewFoo() *Foo {\n\treturn &Foo{\n\t\tRole: \"admin\",\n\t}\n}\n"
        );
    }

    #[test]
    fn super_returns_the_interface() {
        let out = render("adminUser", Mode::Super, Some("AdminUser"), &[field("Key", "string")])
            .expect("render");
        assert!(out.starts_with("func NewAdminUser(\n"));
        assert!(out.contains(") AdminUser {\n"));
        assert!(out.contains("\treturn &adminUser{\n"));
    }

    #[test]
    fn extends_narrows_the_base_field() {
        let out = render(
            "AdminUser",
            Mode::Extends,
            Some("User"),
            &[
                base_field("UserBase", "*UserBase"),
                const_field("Role", "string", "\"admin\""),
            ],
        )
        .expect("render");
        assert_eq!(
            out,
            "func NewAdminUser(\n\tx User,\n) User {\n\treturn &AdminUser{\n\t\tUserBase: x.(*UserBase),\n\t\tRole: \"admin\",\n\t}\n}\n"
        );
    }

    #[test]
    fn missing_interface_is_a_render_defect() {
        let err = render("Foo", Mode::Super, None, &[field("Key", "string")]).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn rendering_is_idempotent() {
        let fields = [field("Key", "string"), const_field("N", "int", "42")];
        let a = render("Foo", Mode::Pointer, None, &fields).expect("render");
        let b = render("Foo", Mode::Pointer, None, &fields).expect("render");
        assert_eq!(a, b);
    }
}
