//! Error types for type compilation and value validation.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The single recoverable failure raised while checking a value.
///
/// The message has the form `"<dotted-path> <problem>:\n<offending value>"`,
/// where the offending value is rendered as compact JSON (or `undefined` for
/// an absent value).
///
/// # Examples
///
/// ```
/// use typeshape_core::*;
/// use serde_json::json;
///
/// let registry = Registry::compile(&TypeDefinitions::new().with_type("Flag", Type::Boolean)).unwrap();
/// let failure = registry.get("Flag").unwrap().validate(&json!(1), ValidateOptions::default()).unwrap_err();
/// assert_eq!(failure.message(), "Flag is not a boolean:\n1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    message: String,
}

impl ValidationFailure {
    pub(crate) fn new(path: impl fmt::Display, problem: impl fmt::Display, value: Option<&Value>) -> Self {
        let rendered = match value {
            Some(value) => serde_json::to_string(value).unwrap_or_else(|_| value.to_string()),
            None => "undefined".to_string(),
        };
        Self {
            message: format!("{path} {problem}:\n{rendered}"),
        }
    }

    /// The path-qualified failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Consumes the failure, returning its message.
    pub fn into_message(self) -> String {
        self.message
    }
}

/// Problems found while compiling a set of type definitions.
///
/// These are programming errors in the definitions themselves; they are
/// reported once by [`Registry::compile`](crate::Registry::compile) and can
/// never surface while validating values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A definition has an empty or whitespace-only name.
    #[error("type name cannot be empty")]
    EmptyName,
    /// Two definitions share a name.
    #[error("duplicate type name: {0}")]
    DuplicateName(String),
    /// An object type declares the same property name twice.
    #[error("type {name} declares property {property} more than once")]
    DuplicateProperty {
        /// Definition containing the object type.
        name: String,
        /// Repeated property name.
        property: String,
    },
    /// An alias points at a name that is not defined.
    #[error("type {name} references undefined type {target}")]
    UnresolvedAlias {
        /// Definition containing the alias.
        name: String,
        /// Missing alias target.
        target: String,
    },
    /// A reference cycle that never passes through an array element or an
    /// object property, so checking any value would recurse forever.
    #[error("unguarded reference cycle: {0}")]
    UnguardedCycle(String),
}
