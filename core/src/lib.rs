//! Compile structural type declarations into runtime artifacts.
//!
//! This crate turns a set of named [`Type`]s into, per name:
//!
//! - a [`Schema`] descriptor for introspection (references stay lazy via
//!   [`SchemaRef`]),
//! - a [`Declaration`] for documentation and tooling,
//! - a validator, exposed as [`NamedType::validate`], and
//! - a sanitizer, exposed as [`NamedType::create`], which returns a fresh
//!   value holding exactly the declared shape.
//!
//! [`Registry::compile`] indexes every name before compiling anything, so
//! named types may reference each other in any order and recursively.
//! [`Registry::artifact`] aggregates everything into an [`Artifact`] that a
//! [`Formatter`] turns into text.
//!
//! # Example
//!
//! ```
//! use typeshape_core::*;
//! use serde_json::json;
//!
//! let definitions = TypeDefinitions::new()
//!     .with_type("A", Type::alias("B"))
//!     .with_type("B", Type::object(vec![Property::optional("a", Type::alias("A"))]));
//! let registry = Registry::compile(&definitions).unwrap();
//! let a = registry.get("A").unwrap();
//!
//! assert!(a.is_valid(&json!({ "a": { "a": {} } })));
//! assert!(!a.is_valid(&json!({ "a": { "b": 1 } })));
//!
//! let lenient = ValidateOptions::default().allow_additional_properties(true);
//! assert_eq!(a.validate(&json!({ "a": { "b": 1 } }), lenient), Ok(true));
//! assert_eq!(a.create(&json!({ "a": { "b": 1 } })).unwrap(), json!({ "a": {} }));
//! ```

mod artifact;
mod declaration;
mod definitions;
mod error;
mod registry;
mod sanitize;
mod schema;
mod types;
mod validate;

pub use artifact::{Artifact, ArtifactEntry, Formatter, WhitespaceFormatter};
pub use declaration::{Declaration, Field};
pub use definitions::{TypeDefinition, TypeDefinitions};
pub use error::{CompileError, ValidationFailure};
pub use registry::{NamedType, Registry};
pub use schema::{Schema, SchemaProperty, SchemaRef};
pub use types::*;
pub use validate::{ErrorCatcher, ValidateOptions};
