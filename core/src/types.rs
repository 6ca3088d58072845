//! Type model for structural shape declarations.
//!
//! A [`Type`] is a closed description of what a value may look like. Types
//! are produced by an upstream parser (or built by hand with the constructor
//! helpers below) and serialize with [`serde`] so they can travel as JSON or
//! YAML definition documents.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Version of the definition document contract (semver).
///
/// Embedded in [`TypeDefinitions`](crate::TypeDefinitions) and in every
/// generated [`Artifact`](crate::Artifact).
pub const DEFINITION_FORMAT_VERSION: &str = "1.0.0";

/// A literal singleton value: a boolean, a number, or a string.
///
/// # Examples
///
/// ```
/// use typeshape_core::Literal;
/// use serde_json::json;
///
/// let zero = Literal::from(0);
/// assert!(zero.matches(&json!(0)));
/// assert!(zero.matches(&json!(0.0)));
/// assert!(!zero.matches(&json!("0")));
/// assert!(!zero.matches(&json!(false)));
/// assert_eq!(zero.to_string(), "0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Number(Number),
    String(String),
}

impl Literal {
    /// Strict equality against a runtime value. No coercion between kinds.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Literal::Bool(expected), Value::Bool(actual)) => expected == actual,
            (Literal::Number(expected), Value::Number(actual)) => numbers_equal(expected, actual),
            (Literal::String(expected), Value::String(actual)) => expected == actual,
            _ => false,
        }
    }

    /// Returns the literal as a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Number(n) => Value::Number(n.clone()),
            Literal::String(s) => Value::String(s.clone()),
        }
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Number(Number::from(value))
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Number(Number::from(value))
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

/// A declared object property.
///
/// # Examples
///
/// ```
/// use typeshape_core::{Property, Type};
///
/// let id = Property::required("id", Type::Number);
/// assert!(id.required);
///
/// let note = Property::optional("note", Type::String);
/// assert!(!note.required);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property key.
    pub name: String,
    /// Shape of the property value.
    #[serde(rename = "type")]
    pub ty: Type,
    /// Whether the key must be checked even when absent.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl Property {
    /// Creates a required property.
    pub fn required(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            ty,
            required: true,
        }
    }

    /// Creates an optional property.
    pub fn optional(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            ty,
            required: false,
        }
    }
}

/// The closed set of shape descriptions.
///
/// Serialized internally tagged by `kind`:
///
/// ```
/// use typeshape_core::{Property, Type};
///
/// let ty: Type = serde_json::from_str(r#"{
///     "kind": "object",
///     "properties": [
///         { "name": "id", "type": { "kind": "number" } },
///         { "name": "next", "type": { "kind": "alias", "name": "Node" }, "required": false }
///     ]
/// }"#).unwrap();
///
/// assert_eq!(ty, Type::object(vec![
///     Property::required("id", Type::Number),
///     Property::optional("next", Type::alias("Node")),
/// ]));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Type {
    /// Reference to a named type, resolved lazily by name.
    Alias { name: String },
    /// Any value, including an absent one.
    Any,
    /// Sequence whose every element has the element shape.
    Array { element: Box<Type> },
    Boolean,
    /// Exactly one literal value.
    Literal { value: Literal },
    Null,
    Number,
    /// Structured mapping with a fixed set of declared keys.
    Object { properties: Vec<Property> },
    String,
    /// Absence of a value.
    Undefined,
    /// Ordered alternatives; order is the trial order.
    Union { members: Vec<Type> },
}

impl Type {
    /// Reference to the named type `name`.
    pub fn alias(name: &str) -> Self {
        Type::Alias {
            name: name.to_string(),
        }
    }

    /// Array of `element`.
    pub fn array(element: Type) -> Self {
        Type::Array {
            element: Box::new(element),
        }
    }

    /// Singleton literal type.
    pub fn literal(value: impl Into<Literal>) -> Self {
        Type::Literal {
            value: value.into(),
        }
    }

    /// Object with the given properties, in declaration order.
    pub fn object(properties: Vec<Property>) -> Self {
        Type::Object { properties }
    }

    /// Union of `members`, tried in order.
    pub fn union(members: Vec<Type>) -> Self {
        Type::Union { members }
    }

    /// Lowercase kind tag, matching the serialized `kind` field.
    ///
    /// # Examples
    ///
    /// ```
    /// use typeshape_core::Type;
    ///
    /// assert_eq!(Type::array(Type::Number).kind(), "array");
    /// assert_eq!(Type::Undefined.kind(), "undefined");
    /// ```
    pub fn kind(&self) -> &'static str {
        match self {
            Type::Alias { .. } => "alias",
            Type::Any => "any",
            Type::Array { .. } => "array",
            Type::Boolean => "boolean",
            Type::Literal { .. } => "literal",
            Type::Null => "null",
            Type::Number => "number",
            Type::Object { .. } => "object",
            Type::String => "string",
            Type::Undefined => "undefined",
            Type::Union { .. } => "union",
        }
    }

    /// Names of every named type referenced anywhere in this type.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names, true);
        names
    }

    /// Names referenced without passing through an array element or object
    /// property. A cycle made only of these edges never consumes input.
    pub(crate) fn unguarded_references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names, false);
        names
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>, descend: bool) {
        match self {
            Type::Alias { name } => out.push(name),
            Type::Array { element } => {
                if descend {
                    element.collect_references(out, descend);
                }
            }
            Type::Object { properties } => {
                if descend {
                    for property in properties {
                        property.ty.collect_references(out, descend);
                    }
                }
            }
            Type::Union { members } => {
                for member in members {
                    member.collect_references(out, descend);
                    // Trial stops at `any`; later members are never reached.
                    if !descend && matches!(member, Type::Any) {
                        break;
                    }
                }
            }
            Type::Any
            | Type::Boolean
            | Type::Literal { .. }
            | Type::Null
            | Type::Number
            | Type::String
            | Type::Undefined => {}
        }
    }
}
