//! Structural declarations for documentation and tooling.
//!
//! A [`Declaration`] renders a type in a compact, TypeScript-like notation
//! (`{ id: number; note?: string }`). It plays no part in validation.

use std::fmt;

use crate::Type;

/// A field inside a record declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub optional: bool,
    pub declaration: Declaration,
}

/// Declaration tree for a [`Type`].
///
/// # Examples
///
/// ```
/// use typeshape_core::*;
///
/// let ty = Type::object(vec![
///     Property::required("id", Type::Number),
///     Property::optional("tags", Type::array(Type::String)),
///     Property::required("mode", Type::union(vec![Type::literal("r"), Type::literal("w")])),
/// ]);
/// assert_eq!(
///     Declaration::compile(&ty).to_string(),
///     r#"{ id: number; tags?: Array<string>; mode: ("r") | ("w") }"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Reference to a named type.
    Named(String),
    /// Primitive keyword such as `number` or `undefined`.
    Primitive(&'static str),
    /// Literal singleton, already rendered.
    Literal(String),
    Array(Box<Declaration>),
    Record(Vec<Field>),
    Union(Vec<Declaration>),
}

impl Declaration {
    /// Compiles the declaration for `ty`.
    pub fn compile(ty: &Type) -> Self {
        match ty {
            Type::Alias { name } => Declaration::Named(name.clone()),
            Type::Any => Declaration::Primitive("any"),
            Type::Array { element } => Declaration::Array(Box::new(Declaration::compile(element))),
            Type::Boolean => Declaration::Primitive("boolean"),
            Type::Literal { value } => Declaration::Literal(value.to_string()),
            Type::Null => Declaration::Primitive("null"),
            Type::Number => Declaration::Primitive("number"),
            Type::Object { properties } => Declaration::Record(
                properties
                    .iter()
                    .map(|p| Field {
                        name: p.name.clone(),
                        optional: !p.required,
                        declaration: Declaration::compile(&p.ty),
                    })
                    .collect(),
            ),
            Type::String => Declaration::Primitive("string"),
            Type::Undefined => Declaration::Primitive("undefined"),
            Type::Union { members } => {
                Declaration::Union(members.iter().map(Declaration::compile).collect())
            }
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Named(name) => f.write_str(name),
            Declaration::Primitive(keyword) => f.write_str(keyword),
            Declaration::Literal(rendered) => f.write_str(rendered),
            Declaration::Array(element) => write!(f, "Array<{element}>"),
            Declaration::Record(fields) => {
                if fields.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    if is_identifier(&field.name) {
                        f.write_str(&field.name)?;
                    } else {
                        write!(f, "{}", serde_json::Value::String(field.name.clone()))?;
                    }
                    if field.optional {
                        f.write_str("?")?;
                    }
                    write!(f, ": {}", field.declaration)?;
                }
                f.write_str(" }")
            }
            Declaration::Union(members) => {
                if members.is_empty() {
                    return f.write_str("never");
                }
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "({member})")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&Type> for Declaration {
    fn from(ty: &Type) -> Self {
        Declaration::compile(ty)
    }
}
