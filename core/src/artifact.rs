//! Aggregated output artifact and the formatter seam.
//!
//! An [`Artifact`] lists, per named type, its declaration text and schema
//! descriptor. [`Artifact::to_text`] produces raw text; a [`Formatter`]
//! post-processes it. Formatters may only touch whitespace.

use serde::{Deserialize, Serialize};

use crate::Schema;

/// One named type in an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub name: String,
    pub declaration: String,
    pub schema: Schema,
}

/// Aggregated output for a compiled registry.
///
/// # Examples
///
/// ```
/// use typeshape_core::*;
///
/// let definitions = TypeDefinitions::new()
///     .with_type("Id", Type::Number)
///     .with_type("Tag", Type::literal("x"));
/// let artifact = Registry::compile(&definitions).unwrap().artifact();
///
/// let text = artifact.render(&WhitespaceFormatter);
/// assert!(text.contains("type Id = number;\n"));
/// assert!(text.contains(r#"schema Tag = {"type":"const","value":"x"};"#));
/// assert!(text.ends_with(";\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Definition contract version the artifact was produced under.
    pub format_version: String,
    /// Free-form header lines emitted as comments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<String>,
    /// RFC 3339 generation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// Digest of the definitions the artifact was compiled from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    /// Named types in declaration order.
    pub types: Vec<ArtifactEntry>,
}

impl Default for Artifact {
    fn default() -> Self {
        Self::new()
    }
}

impl Artifact {
    /// Creates an empty artifact.
    pub fn new() -> Self {
        Self {
            format_version: crate::DEFINITION_FORMAT_VERSION.to_string(),
            header: Vec::new(),
            generated_at: None,
            source_hash: None,
            types: Vec::new(),
        }
    }

    /// Adds a header line.
    pub fn with_header(mut self, line: impl Into<String>) -> Self {
        self.header.push(line.into());
        self
    }

    /// Sets the generation timestamp.
    pub fn with_generated_at(mut self, generated_at: impl Into<String>) -> Self {
        self.generated_at = Some(generated_at.into());
        self
    }

    /// Sets the source digest.
    pub fn with_source_hash(mut self, hash: impl Into<String>) -> Self {
        self.source_hash = Some(hash.into());
        self
    }

    /// Keeps only the entries whose name satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.types.retain(|entry| keep(&entry.name));
    }

    /// Returns the entry for `name`.
    pub fn get(&self, name: &str) -> Option<&ArtifactEntry> {
        self.types.iter().find(|e| e.name == name)
    }

    /// Raw, unformatted text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("// typeshape artifact {}\n", self.format_version));
        for header in &self.header {
            for line in header.lines() {
                out.push_str(&format!("// {line}\n"));
            }
        }
        if let Some(generated_at) = &self.generated_at {
            out.push_str(&format!("// generated-at: {generated_at}\n"));
        }
        if let Some(hash) = &self.source_hash {
            out.push_str(&format!("// source-hash: {hash}\n"));
        }
        for entry in &self.types {
            // Schema serialization is infallible: no maps with non-string keys.
            let schema = serde_json::to_string(&entry.schema).unwrap_or_default();
            out.push_str(&format!(
                "\ntype {} = {};\nschema {} = {};\n",
                entry.name, entry.declaration, entry.name, schema
            ));
        }
        out
    }

    /// Raw text passed through `formatter`.
    pub fn render(&self, formatter: &dyn Formatter) -> String {
        formatter.format(&self.to_text())
    }
}

/// Whitespace-only post-processor for artifact text.
pub trait Formatter {
    /// Returns `raw` with whitespace normalized. Must not change meaning.
    fn format(&self, raw: &str) -> String;
}

/// Default formatter: strips trailing whitespace, collapses runs of blank
/// lines into one, and ends the text with exactly one newline.
///
/// # Examples
///
/// ```
/// use typeshape_core::{Formatter, WhitespaceFormatter};
///
/// let out = WhitespaceFormatter.format("a  \n\n\n\nb\t\n\n");
/// assert_eq!(out, "a\n\nb\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceFormatter;

impl Formatter for WhitespaceFormatter {
    fn format(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut blank_run = false;
        for line in raw.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                if !out.is_empty() {
                    blank_run = true;
                }
                continue;
            }
            if blank_run {
                out.push('\n');
                blank_run = false;
            }
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
