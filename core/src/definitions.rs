use serde::{Deserialize, Serialize};

use crate::Type;

/// One named type as produced by the definition parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Name other types use to reference this one.
    pub name: String,
    /// The shape bound to `name`.
    #[serde(rename = "type")]
    pub ty: Type,
}

/// Ordered mapping from type name to [`Type`].
///
/// This is the input of [`Registry::compile`](crate::Registry::compile).
/// Order is preserved so generated artifacts list types the way they were
/// declared; it has no effect on reference resolution.
///
/// # Examples
///
/// ```
/// use typeshape_core::*;
///
/// let definitions = TypeDefinitions::new()
///     .with_type("Id", Type::Number)
///     .with_type("User", Type::object(vec![Property::required("id", Type::alias("Id"))]));
///
/// assert_eq!(definitions.len(), 2);
/// assert_eq!(definitions.names().collect::<Vec<_>>(), vec!["Id", "User"]);
/// assert!(definitions.get("User").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinitions {
    /// Definition contract version (populated from
    /// [`DEFINITION_FORMAT_VERSION`](crate::DEFINITION_FORMAT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
    /// Named types in declaration order.
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
}

impl TypeDefinitions {
    /// Creates an empty definition set stamped with the current format version.
    pub fn new() -> Self {
        Self {
            format_version: Some(crate::DEFINITION_FORMAT_VERSION.to_string()),
            types: Vec::new(),
        }
    }

    /// Appends a named type.
    pub fn with_type(mut self, name: &str, ty: Type) -> Self {
        self.push(name, ty);
        self
    }

    /// Appends a named type in place.
    pub fn push(&mut self, name: &str, ty: Type) {
        self.types.push(TypeDefinition {
            name: name.to_string(),
            ty,
        });
    }

    /// Looks up the first definition named `name`.
    pub fn get(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|d| d.name == name).map(|d| &d.ty)
    }

    /// Iterates over defined names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|d| d.name.as_str())
    }

    /// Returns the number of definitions.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if there are no definitions.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
