//! Sanitizer compilation: shape-exact reconstruction of validated values.
//!
//! A [`Sanitizer`] always builds a new value. Object keys outside the
//! declared set are dropped even when validation tolerated them, and the
//! output never shares structure with the input.
//!
//! Union nodes classify the value again, member by member in declared
//! order, instead of reusing whichever branch validation matched. Each
//! member's trial runs under the same context as the enclosing call, which
//! for [`create`](crate::NamedType::create) allows additional properties.

use serde_json::{Map, Value};

use crate::validate::{CheckContext, ELEMENT_SEGMENT, Path, Slots, Validator, resolve_slot};
use crate::{CompileError, Type, ValidationFailure};

#[derive(Debug, Clone)]
pub(crate) struct PropertySanitizer {
    name: String,
    sanitizer: Sanitizer,
}

#[derive(Debug, Clone)]
pub(crate) struct Branch {
    validator: Validator,
    sanitizer: Sanitizer,
}

/// Executable reconstruction tree for a [`Type`].
#[derive(Debug, Clone)]
pub(crate) enum Sanitizer {
    Alias(usize),
    /// Leaf kinds: the value is copied as is.
    Keep,
    Array(Box<Sanitizer>),
    Object(Vec<PropertySanitizer>),
    Union(Vec<Branch>),
}

impl Sanitizer {
    pub(crate) fn compile(ty: &Type, slots: &Slots, owner: &str) -> Result<Self, CompileError> {
        Ok(match ty {
            Type::Alias { name } => Sanitizer::Alias(resolve_slot(name, slots, owner)?),
            Type::Any
            | Type::Boolean
            | Type::Literal { .. }
            | Type::Null
            | Type::Number
            | Type::String
            | Type::Undefined => Sanitizer::Keep,
            Type::Array { element } => {
                Sanitizer::Array(Box::new(Sanitizer::compile(element, slots, owner)?))
            }
            Type::Object { properties } => {
                let mut compiled = Vec::with_capacity(properties.len());
                for property in properties {
                    compiled.push(PropertySanitizer {
                        name: property.name.clone(),
                        sanitizer: Sanitizer::compile(&property.ty, slots, owner)?,
                    });
                }
                Sanitizer::Object(compiled)
            }
            Type::Union { members } => {
                let mut branches = Vec::with_capacity(members.len());
                for member in members {
                    branches.push(Branch {
                        validator: Validator::compile(member, slots, owner)?,
                        sanitizer: Sanitizer::compile(member, slots, owner)?,
                    });
                }
                Sanitizer::Union(branches)
            }
        })
    }

    /// Rebuilds `value`, which is expected to have passed validation.
    ///
    /// A shape mismatch (only reachable when called on unvalidated input)
    /// is reported as a [`ValidationFailure`] at `path`.
    pub(crate) fn sanitize(
        &self,
        value: &Value,
        path: &Path<'_>,
        cx: &CheckContext<'_>,
    ) -> Result<Value, ValidationFailure> {
        match self {
            Sanitizer::Alias(slot) => cx.registry.entry(*slot).sanitize(value, cx),
            Sanitizer::Keep => Ok(value.clone()),
            Sanitizer::Array(element) => {
                let Value::Array(items) = value else {
                    return Err(ValidationFailure::new(path, "is not an array", Some(value)));
                };
                let element_path = path.child(ELEMENT_SEGMENT);
                items
                    .iter()
                    .map(|item| element.sanitize(item, &element_path, cx))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            Sanitizer::Object(properties) => {
                let Value::Object(map) = value else {
                    return Err(ValidationFailure::new(path, "is not an object", Some(value)));
                };
                let mut out = Map::new();
                // An absent property has nothing to copy, whether or not it
                // is required: a required property may admit undefined.
                for property in properties {
                    if let Some(child) = map.get(&property.name) {
                        let sanitized = property
                            .sanitizer
                            .sanitize(child, &path.child(&property.name), cx)?;
                        out.insert(property.name.clone(), sanitized);
                    }
                }
                Ok(Value::Object(out))
            }
            Sanitizer::Union(branches) => {
                let mut last = None;
                for branch in branches {
                    match branch.validator.check(Some(value), path, cx) {
                        Ok(()) => return branch.sanitizer.sanitize(value, path, cx),
                        Err(failure) => last = Some(failure),
                    }
                }
                Err(last.unwrap_or_else(|| {
                    ValidationFailure::new(path, "matches no union member", Some(value))
                }))
            }
        }
    }
}
