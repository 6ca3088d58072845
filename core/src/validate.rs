//! Validator compilation and value checking.
//!
//! [`Validator::compile`] turns a [`Type`] into a check tree whose alias
//! nodes hold registry slots instead of bindings, so a named type can refer
//! to itself or to types declared after it. Checks return
//! `Result<(), ValidationFailure>`; union members are tried in order and the
//! first success wins. When every member fails, only the last member's
//! failure is reported. Failures are not aggregated across members.
//!
//! # Examples
//!
//! ```
//! use typeshape_core::*;
//! use serde_json::json;
//!
//! let definitions = TypeDefinitions::new().with_type(
//!     "Point",
//!     Type::object(vec![
//!         Property::required("x", Type::Number),
//!         Property::optional("label", Type::String),
//!     ]),
//! );
//! let registry = Registry::compile(&definitions).unwrap();
//! let point = registry.get("Point").unwrap();
//!
//! assert!(point.is_valid(&json!({ "x": 1 })));
//! assert!(!point.is_valid(&json!({ "x": 1, "y": 2 })));
//!
//! let mut catcher = ErrorCatcher::default();
//! let options = ValidateOptions::default().with_error_catcher(&mut catcher);
//! assert_eq!(point.validate(&json!({ "x": "1" }), options), Ok(false));
//! assert_eq!(catcher.message(), Some("Point.x is not a number:\n\"1\""));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde_json::Value;

use crate::{CompileError, Literal, Registry, Type, ValidationFailure};

/// Maps type names to their registry slot.
pub(crate) type Slots = HashMap<String, usize>;

/// Path segment used for array elements.
pub(crate) const ELEMENT_SEGMENT: &str = "*";

/// Single-use sink that captures one failure message instead of returning
/// it as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCatcher {
    message: Option<String>,
}

impl ErrorCatcher {
    /// The captured message, if a failure was caught.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Takes the captured message, leaving the catcher empty.
    pub fn take(&mut self) -> Option<String> {
        self.message.take()
    }

    fn catch(&mut self, failure: ValidationFailure) {
        self.message = Some(failure.into_message());
    }
}

/// Options for one [`validate`](crate::NamedType::validate) call.
///
/// `allow_additional_properties` applies to every object in the call tree,
/// including objects reached through named-type references.
#[derive(Debug, Default)]
pub struct ValidateOptions<'a> {
    /// Where to store the failure message instead of returning `Err`.
    pub error_catcher: Option<&'a mut ErrorCatcher>,
    /// Tolerate undeclared object keys during this call.
    pub allow_additional_properties: bool,
}

impl<'a> ValidateOptions<'a> {
    /// Captures failures in `catcher`; `validate` then returns `Ok(false)`.
    pub fn with_error_catcher(mut self, catcher: &'a mut ErrorCatcher) -> Self {
        self.error_catcher = Some(catcher);
        self
    }

    /// Sets the additional-properties policy for the call.
    pub fn allow_additional_properties(mut self, allow: bool) -> Self {
        self.allow_additional_properties = allow;
        self
    }

    pub(crate) fn finish(self, outcome: Result<(), ValidationFailure>) -> Result<bool, ValidationFailure> {
        match outcome {
            Ok(()) => Ok(true),
            Err(failure) => match self.error_catcher {
                Some(catcher) => {
                    catcher.catch(failure);
                    Ok(false)
                }
                None => Err(failure),
            },
        }
    }
}

/// Diagnostic access path, linked from leaf to root so that descending
/// never allocates. Only rendered when a check fails.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Path<'a> {
    segment: &'a str,
    parent: Option<&'a Path<'a>>,
}

impl<'a> Path<'a> {
    pub(crate) fn root(segment: &'a str) -> Self {
        Self {
            segment,
            parent: None,
        }
    }

    pub(crate) fn child(&'a self, segment: &'a str) -> Path<'a> {
        Path {
            segment,
            parent: Some(self),
        }
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent {
            write!(f, "{parent}.")?;
        }
        f.write_str(self.segment)
    }
}

/// State shared by every node of one check or create call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CheckContext<'r> {
    pub(crate) registry: &'r Registry,
    pub(crate) allow_additional_properties: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PropertyValidator {
    name: String,
    required: bool,
    validator: Validator,
}

#[derive(Debug, Clone)]
pub(crate) struct ObjectValidator {
    properties: Vec<PropertyValidator>,
    allowed: HashSet<String>,
}

/// Executable check tree for a [`Type`].
#[derive(Debug, Clone)]
pub(crate) enum Validator {
    Alias(usize),
    Any,
    Array(Box<Validator>),
    Boolean,
    Literal(Literal),
    Null,
    Number,
    Object(ObjectValidator),
    String,
    Undefined,
    Union(Vec<Validator>),
}

impl Validator {
    /// Compiles `ty`, resolving alias names to slots. `owner` names the
    /// definition being compiled, for error reporting.
    pub(crate) fn compile(ty: &Type, slots: &Slots, owner: &str) -> Result<Self, CompileError> {
        Ok(match ty {
            Type::Alias { name } => Validator::Alias(resolve_slot(name, slots, owner)?),
            Type::Any => Validator::Any,
            Type::Array { element } => {
                Validator::Array(Box::new(Validator::compile(element, slots, owner)?))
            }
            Type::Boolean => Validator::Boolean,
            Type::Literal { value } => Validator::Literal(value.clone()),
            Type::Null => Validator::Null,
            Type::Number => Validator::Number,
            Type::Object { properties } => {
                let mut compiled = Vec::with_capacity(properties.len());
                let mut allowed = HashSet::with_capacity(properties.len());
                for property in properties {
                    if !allowed.insert(property.name.clone()) {
                        return Err(CompileError::DuplicateProperty {
                            name: owner.to_string(),
                            property: property.name.clone(),
                        });
                    }
                    compiled.push(PropertyValidator {
                        name: property.name.clone(),
                        required: property.required,
                        validator: Validator::compile(&property.ty, slots, owner)?,
                    });
                }
                Validator::Object(ObjectValidator {
                    allowed,
                    properties: compiled,
                })
            }
            Type::String => Validator::String,
            Type::Undefined => Validator::Undefined,
            Type::Union { members } => Validator::Union(
                members
                    .iter()
                    .map(|m| Validator::compile(m, slots, owner))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Checks `value` (`None` means absent) at `path`.
    pub(crate) fn check(
        &self,
        value: Option<&Value>,
        path: &Path<'_>,
        cx: &CheckContext<'_>,
    ) -> Result<(), ValidationFailure> {
        match self {
            Validator::Alias(slot) => cx.registry.entry(*slot).check(value, cx),
            Validator::Any => Ok(()),
            Validator::Array(element) => {
                let Some(Value::Array(items)) = value else {
                    return Err(ValidationFailure::new(path, "is not an array", value));
                };
                let element_path = path.child(ELEMENT_SEGMENT);
                for item in items {
                    element.check(Some(item), &element_path, cx)?;
                }
                Ok(())
            }
            Validator::Boolean => require(matches!(value, Some(Value::Bool(_))), path, "is not a boolean", value),
            Validator::Literal(literal) => match value {
                Some(v) if literal.matches(v) => Ok(()),
                _ => Err(ValidationFailure::new(path, format_args!("is not {literal}"), value)),
            },
            Validator::Null => require(matches!(value, Some(Value::Null)), path, "is not null", value),
            Validator::Number => require(matches!(value, Some(Value::Number(_))), path, "is not a number", value),
            Validator::Object(object) => object.check(value, path, cx),
            Validator::String => require(matches!(value, Some(Value::String(_))), path, "is not a string", value),
            Validator::Undefined => require(value.is_none(), path, "is not undefined", value),
            Validator::Union(members) => {
                let mut last = None;
                for member in members {
                    match member.check(value, path, cx) {
                        Ok(()) => return Ok(()),
                        Err(failure) => last = Some(failure),
                    }
                }
                Err(last.unwrap_or_else(|| ValidationFailure::new(path, "matches no union member", value)))
            }
        }
    }
}

impl ObjectValidator {
    fn check(&self, value: Option<&Value>, path: &Path<'_>, cx: &CheckContext<'_>) -> Result<(), ValidationFailure> {
        let Some(Value::Object(map)) = value else {
            return Err(ValidationFailure::new(path, "is not an object", value));
        };

        if !cx.allow_additional_properties {
            if let Some(key) = map.keys().find(|k| !self.allowed.contains(k.as_str())) {
                return Err(ValidationFailure::new(
                    path,
                    format_args!("does not allow key \"{key}\""),
                    value,
                ));
            }
        }

        for property in &self.properties {
            let child = map.get(&property.name);
            if property.required || child.is_some() {
                property
                    .validator
                    .check(child, &path.child(&property.name), cx)?;
            }
        }
        Ok(())
    }
}

fn require(ok: bool, path: &Path<'_>, problem: &str, value: Option<&Value>) -> Result<(), ValidationFailure> {
    if ok {
        Ok(())
    } else {
        Err(ValidationFailure::new(path, problem, value))
    }
}

pub(crate) fn resolve_slot(name: &str, slots: &Slots, owner: &str) -> Result<usize, CompileError> {
    slots
        .get(name)
        .copied()
        .ok_or_else(|| CompileError::UnresolvedAlias {
            name: owner.to_string(),
            target: name.to_string(),
        })
}
