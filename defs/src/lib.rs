//! Definition loading and generation configuration for typeshape.
//!
//! This crate reads serialized type definitions (the output of an upstream
//! declaration parser) from JSON or YAML documents, checks type names,
//! fingerprints the definitions, and compiles them into a
//! [`typeshape_core::Registry`].
//!
//! # Quick start
//!
//! ```no_run
//! use typeshape_defs::{DefinitionSet, GenerateConfig};
//! use typeshape_core::WhitespaceFormatter;
//!
//! let set = DefinitionSet::from_dir("types/").unwrap();
//! let config = GenerateConfig::load("typeshape.yml").unwrap();
//!
//! let registry = set.compile().unwrap();
//! let mut artifact = registry.artifact().with_source_hash(set.checksum().unwrap());
//! artifact.retain(|name| config.is_included(name));
//! println!("{}", artifact.render(&WhitespaceFormatter));
//! ```

mod config;
mod error;
mod loader;

pub use config::{GenerateConfig, OutputConfig, OutputFormat, ValidationConfig};
pub use error::{DefinitionError, Result};
pub use loader::{DefinitionBuilder, DefinitionSet, DefinitionSource, DocumentFormat};
