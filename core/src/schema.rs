//! Schema descriptors: serializable structural descriptions of types.
//!
//! A [`Schema`] mirrors a [`Type`] one node at a time and is meant for
//! introspection and tooling. It is never executed. References to named
//! types stay references ([`SchemaRef`]); the target's descriptor is looked
//! up on demand through the [`Registry`], which keeps self- and
//! mutually-referential types finite.

use serde::{Deserialize, Serialize};

use crate::{Literal, NamedType, Registry, Type};

/// Lazy pointer to a named type's binding.
///
/// # Examples
///
/// ```
/// use typeshape_core::*;
///
/// let definitions = TypeDefinitions::new()
///     .with_type("List", Type::object(vec![Property::optional("next", Type::alias("List"))]));
/// let registry = Registry::compile(&definitions).unwrap();
///
/// let Schema::Object { properties } = registry.get("List").unwrap().schema() else {
///     panic!("expected an object schema");
/// };
/// let Schema::Ref(next) = &properties[0].schema else {
///     panic!("expected a reference");
/// };
/// assert_eq!(next.resolve(&registry).unwrap().name(), "List");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    /// Target type name.
    pub name: String,
}

impl SchemaRef {
    /// Resolves the reference against `registry`.
    pub fn resolve<'r>(&self, registry: &'r Registry) -> Option<NamedType<'r>> {
        registry.get(&self.name)
    }
}

/// A declared property inside an object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    pub name: String,
    pub required: bool,
    pub schema: Schema,
}

/// Structural description of a type, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schema {
    Ref(SchemaRef),
    Any,
    Array { items: Box<Schema> },
    Boolean,
    Const { value: Literal },
    Null,
    Number,
    Object { properties: Vec<SchemaProperty> },
    String,
    Undefined,
    Union { members: Vec<Schema> },
}

impl Schema {
    /// Compiles the descriptor for `ty`.
    ///
    /// # Examples
    ///
    /// ```
    /// use typeshape_core::*;
    /// use serde_json::json;
    ///
    /// let schema = Schema::compile(&Type::array(Type::literal("on")));
    /// assert_eq!(
    ///     serde_json::to_value(&schema).unwrap(),
    ///     json!({ "type": "array", "items": { "type": "const", "value": "on" } })
    /// );
    /// ```
    pub fn compile(ty: &Type) -> Self {
        match ty {
            Type::Alias { name } => Schema::Ref(SchemaRef { name: name.clone() }),
            Type::Any => Schema::Any,
            Type::Array { element } => Schema::Array {
                items: Box::new(Schema::compile(element)),
            },
            Type::Boolean => Schema::Boolean,
            Type::Literal { value } => Schema::Const {
                value: value.clone(),
            },
            Type::Null => Schema::Null,
            Type::Number => Schema::Number,
            Type::Object { properties } => Schema::Object {
                properties: properties
                    .iter()
                    .map(|p| SchemaProperty {
                        name: p.name.clone(),
                        required: p.required,
                        schema: Schema::compile(&p.ty),
                    })
                    .collect(),
            },
            Type::String => Schema::String,
            Type::Undefined => Schema::Undefined,
            Type::Union { members } => Schema::Union {
                members: members.iter().map(Schema::compile).collect(),
            },
        }
    }
}

impl From<&Type> for Schema {
    fn from(ty: &Type) -> Self {
        Schema::compile(ty)
    }
}
