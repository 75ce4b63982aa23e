use crate::model::{Member, ShapeId};

/// Naming and escaping policy for generated code.
///
/// Implementations decide how a member maps onto field, getter, constructor
/// argument, and json property names, keeping that policy out of the
/// generation core.
pub trait Namer {
    fn field_name(&self, member: &Member) -> String;
    fn getter_name(&self, member: &Member) -> String;
    fn ctor_arg_name(&self, member: &Member) -> String;
    /// The json property name: the `jsonName` trait when present, the raw
    /// member name otherwise.
    fn json_name(&self, member: &Member) -> String {
        member
            .traits
            .json_name
            .clone()
            .unwrap_or_else(|| member.name.clone())
    }
    fn type_name(&self, id: &ShapeId) -> String;
}

/// Default policy: snake_case fields/getters/arguments, CamelCase type names,
/// Rust keywords escaped with `r#`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNamer;

impl Namer for DefaultNamer {
    fn field_name(&self, member: &Member) -> String {
        sanitize_rust_identifier(&to_snake_case(&sanitize_name(&member.name)))
    }

    fn getter_name(&self, member: &Member) -> String {
        self.field_name(member)
    }

    fn ctor_arg_name(&self, member: &Member) -> String {
        self.field_name(member)
    }

    fn type_name(&self, id: &ShapeId) -> String {
        to_camel_case(&to_snake_case(&sanitize_name(id.name())))
    }
}

/// Variant name for an enum constant or union member: `NOT_FOUND` and
/// `notFound` both become `NotFound`.
pub fn enum_variant_name(name: &str) -> String {
    to_camel_case(&to_snake_case(name))
}

/// Convert a snake_case string to CamelCase.
pub fn to_camel_case(s: &str) -> String {
    s.split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert CamelCase or mixedCase to snake_case.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}

/// Replace invalid identifier characters with underscores and ensure the
/// result doesn't start with a digit.
fn sanitize_name(name: &str) -> String {
    let mut s: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.is_empty() {
        s = "_".to_string();
    }
    if s.chars()
        .next()
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false)
    {
        s.insert(0, '_');
    }
    s
}

fn sanitize_rust_identifier(name: &str) -> String {
    const KEYWORDS: &[&str] = &[
        "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn",
        "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
        "return", "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe",
        "use", "where", "while", "async", "await", "dyn",
    ];
    if KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}
