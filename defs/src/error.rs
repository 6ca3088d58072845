//! Error types for definition loading.
//!
//! Provides a unified error type covering I/O, serialization, naming rules,
//! source fallback, and compilation failures.

use thiserror::Error;
use typeshape_core::CompileError;

/// Errors that can occur while loading or compiling definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A file extension that is neither JSON nor YAML.
    #[error("unsupported definition file: {0}")]
    UnsupportedFormat(String),

    /// A type name that is not a valid identifier.
    #[error("invalid type name: {0:?}")]
    InvalidName(String),

    /// The same type name is defined in more than one place.
    #[error("duplicate type name: {0}")]
    DuplicateName(String),

    /// All configured loader sources failed.
    #[error("no definition sources available")]
    NoSourcesAvailable,

    /// The definitions loaded but do not compile.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
}

/// Convenience alias for results with [`DefinitionError`].
pub type Result<T> = std::result::Result<T, DefinitionError>;
