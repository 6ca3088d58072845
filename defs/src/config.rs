//! Generation configuration.
//!
//! Defines the YAML-serializable configuration that controls which named
//! types are emitted into an artifact, the default additional-properties
//! policy for ad-hoc checks, and output options.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! include:
//!   - User
//!   - Order
//! exclude:
//!   - InternalNote
//! validation:
//!   allow_additional_properties: false
//! output:
//!   format: text
//!   header: "Generated from api.yaml. Do not edit."
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default validation policy for checks driven by this configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Tolerate undeclared object keys.
    #[serde(default)]
    pub allow_additional_properties: bool,
}

/// Artifact encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Formatted declaration + schema text.
    #[default]
    Text,
    /// The artifact serialized as pretty JSON.
    Json,
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Header line written at the top of the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

/// Top-level generation configuration.
///
/// # Examples
///
/// ```
/// # let yaml = r#"
/// # version: "1.0"
/// # include: [User, Order]
/// # exclude: [Order]
/// # "#;
/// # let config: typeshape_defs::GenerateConfig = serde_yaml::from_str(yaml).unwrap();
/// assert!(config.is_included("User"));
/// assert!(!config.is_included("Order"));
/// assert!(!config.is_included("Other"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Types to emit (empty = emit all).
    #[serde(default)]
    pub include: Vec<String>,
    /// Types to never emit.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            validation: ValidationConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl GenerateConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DefinitionError::IoError) if the file
    /// cannot be read, or [`YamlError`](crate::DefinitionError::YamlError)
    /// if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DefinitionError::IoError) if the file
    /// cannot be written, or [`YamlError`](crate::DefinitionError::YamlError)
    /// if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` if `name` is in the exclusion list.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|n| n == name)
    }

    /// Returns `true` if `name` should be emitted.
    ///
    /// When the include list is empty, every non-excluded name is emitted.
    /// Exclusions always win.
    pub fn is_included(&self, name: &str) -> bool {
        if self.is_excluded(name) {
            return false;
        }
        if self.include.is_empty() {
            return true;
        }
        self.include.iter().any(|n| n == name)
    }
}
