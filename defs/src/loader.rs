//! Definition loading with builder pattern and fallback chains.
//!
//! Provides [`DefinitionSet`] for reading serialized type definitions (the
//! output of an upstream declaration parser) and [`DefinitionBuilder`] for
//! trying several sources in order.
//!
//! # Document format
//!
//! JSON (`.json`) or YAML (`.yaml`/`.yml`):
//!
//! ```yaml
//! types:
//!   - name: User
//!     type:
//!       kind: object
//!       properties:
//!         - name: id
//!           type: { kind: number }
//!         - name: email
//!           type: { kind: string }
//!           required: false
//! ```
//!
//! # Loading patterns
//!
//! ```no_run
//! use typeshape_defs::DefinitionSet;
//!
//! // One document
//! let set = DefinitionSet::from_file("types/api.yaml").unwrap();
//!
//! // Every document in a directory, merged
//! let set = DefinitionSet::from_dir("types/").unwrap();
//!
//! // Fallback chain
//! let set = DefinitionSet::builder()
//!     .from_dir("/etc/typeshape/types")
//!     .from_file("types.json")
//!     .build()
//!     .unwrap();
//! let registry = set.compile().unwrap();
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use typeshape_core::{Registry, Type, TypeDefinitions};

use crate::error::{DefinitionError, Result};

static TYPE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex must compile"));

/// Serialization of a definition document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Detects the format from a file extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use typeshape_defs::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_path("a/b.yml"), Some(DocumentFormat::Yaml));
    /// assert_eq!(DocumentFormat::from_path("b.JSON"), Some(DocumentFormat::Json));
    /// assert_eq!(DocumentFormat::from_path("b.txt"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Describes where a [`DefinitionSet`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionSource {
    /// Parsed from an in-memory string.
    Inline,
    /// Loaded from a single document.
    File(PathBuf),
    /// Loaded from every document in a directory.
    Directory(PathBuf),
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<DefinitionSource>),
}

/// Validated, ordered type definitions plus their provenance.
#[derive(Debug, Clone)]
pub struct DefinitionSet {
    definitions: TypeDefinitions,
    source: DefinitionSource,
}

impl DefinitionSet {
    /// Returns a new [`DefinitionBuilder`] for configuring a fallback chain.
    pub fn builder() -> DefinitionBuilder {
        DefinitionBuilder::new()
    }

    /// Wraps already-built definitions, checking names.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidName`] or
    /// [`DefinitionError::DuplicateName`].
    pub fn new(definitions: TypeDefinitions) -> Result<Self> {
        check_names(&definitions)?;
        Ok(Self {
            definitions,
            source: DefinitionSource::Inline,
        })
    }

    /// Parses a document from a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use typeshape_defs::{DefinitionSet, DocumentFormat};
    ///
    /// let raw = r#"{ "types": [ { "name": "Flag", "type": { "kind": "boolean" } } ] }"#;
    /// let set = DefinitionSet::from_str(raw, DocumentFormat::Json).unwrap();
    /// assert_eq!(set.len(), 1);
    /// assert!(set.get("Flag").is_some());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a parse error or a naming error.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(raw: &str, format: DocumentFormat) -> Result<Self> {
        let definitions: TypeDefinitions = match format {
            DocumentFormat::Json => serde_json::from_str(raw)?,
            DocumentFormat::Yaml => serde_yaml::from_str(raw)?,
        };
        Self::new(definitions)
    }

    /// Loads a single JSON or YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnsupportedFormat`] for unknown extensions,
    /// [`DefinitionError::IoError`] if the file cannot be read, or a parse or
    /// naming error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let definitions = read_document(path)?;
        check_names(&definitions)?;
        debug!(path = %path.display(), types = definitions.len(), "Loaded definition file");
        Ok(Self {
            definitions,
            source: DefinitionSource::File(path.to_path_buf()),
        })
    }

    /// Loads and merges every `*.json`, `*.yaml`, and `*.yml` document in a
    /// directory, in file-name order.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::IoError`] if the directory cannot be read,
    /// a parse error for any malformed document, or
    /// [`DefinitionError::DuplicateName`] when two documents define the same
    /// name.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.is_file() && DocumentFormat::from_path(&file_path).is_some() {
                files.push(file_path);
            }
        }
        files.sort();

        let mut merged = TypeDefinitions::new();
        for file_path in &files {
            let document = read_document(file_path)?;
            merged.types.extend(document.types);
        }
        check_names(&merged)?;

        info!(path = %path.display(), files = files.len(), types = merged.len(), "Loaded definition directory");
        Ok(Self {
            definitions: merged,
            source: DefinitionSource::Directory(path.to_path_buf()),
        })
    }

    /// Loads from a file or a directory, whichever `path` is.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::from_dir(path)
        } else {
            Self::from_file(path)
        }
    }

    /// Merges several sets, rejecting names defined more than once.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::NoSourcesAvailable`] for an empty input or
    /// [`DefinitionError::DuplicateName`].
    pub fn merge(sets: Vec<DefinitionSet>) -> Result<Self> {
        if sets.is_empty() {
            return Err(DefinitionError::NoSourcesAvailable);
        }
        let mut merged = TypeDefinitions::new();
        let mut sources = Vec::with_capacity(sets.len());
        for set in sets {
            merged.types.extend(set.definitions.types);
            sources.push(set.source);
        }
        check_names(&merged)?;
        let source = if sources.len() == 1 {
            sources.remove(0)
        } else {
            DefinitionSource::Multiple(sources)
        };
        Ok(Self {
            definitions: merged,
            source,
        })
    }

    /// Looks up a type by name.
    pub fn get(&self, name: &str) -> Option<&Type> {
        self.definitions.get(name)
    }

    /// Returns `true` if `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if there are no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterates over names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.names()
    }

    /// The underlying definitions.
    pub fn definitions(&self) -> &TypeDefinitions {
        &self.definitions
    }

    /// Consumes the set, returning the definitions.
    pub fn into_definitions(self) -> TypeDefinitions {
        self.definitions
    }

    /// Where the definitions came from.
    pub fn source(&self) -> &DefinitionSource {
        &self.source
    }

    /// SHA-256 hex digest of the canonical JSON form of the definitions.
    ///
    /// Independent of the source encoding: the same types loaded from JSON
    /// or YAML hash identically.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::JsonError`] if serialization fails.
    pub fn checksum(&self) -> Result<String> {
        let bytes = serde_json::to_vec(&self.definitions.types)?;
        let hash = Sha256::digest(&bytes);
        Ok(format!("{:x}", hash))
    }

    /// Compiles the definitions into a [`Registry`].
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Compile`] wrapping the compiler's error.
    pub fn compile(&self) -> Result<Registry> {
        Ok(Registry::compile(&self.definitions)?)
    }
}

fn read_document(path: &Path) -> Result<TypeDefinitions> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| DefinitionError::UnsupportedFormat(path.display().to_string()))?;
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let definitions = match format {
        DocumentFormat::Json => serde_json::from_reader(reader)?,
        DocumentFormat::Yaml => serde_yaml::from_reader(reader)?,
    };
    Ok(definitions)
}

fn check_names(definitions: &TypeDefinitions) -> Result<()> {
    let mut seen = HashSet::new();
    for name in definitions.names() {
        if !TYPE_NAME_RE.is_match(name) {
            return Err(DefinitionError::InvalidName(name.to_string()));
        }
        if !seen.insert(name) {
            return Err(DefinitionError::DuplicateName(name.to_string()));
        }
    }
    Ok(())
}

/// Builder for constructing a [`DefinitionSet`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`DefinitionError::NoSourcesAvailable`] is returned.
pub struct DefinitionBuilder {
    sources: Vec<DefinitionSource>,
}

impl DefinitionBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds a directory of definition documents as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(DefinitionSource::Directory(path.into()));
        self
    }

    /// Adds a single definition document as a source.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(DefinitionSource::File(path.into()));
        self
    }

    /// Attempts to load definitions from configured sources in order.
    pub fn build(self) -> Result<DefinitionSet> {
        if self.sources.is_empty() {
            return Err(DefinitionError::NoSourcesAvailable);
        }

        let all_sources = self.sources.clone();

        for source in &self.sources {
            let result = match source {
                DefinitionSource::Directory(path) => DefinitionSet::from_dir(path),
                DefinitionSource::File(path) => DefinitionSet::from_file(path),
                DefinitionSource::Inline | DefinitionSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut set) => {
                    set.source = DefinitionSource::Multiple(all_sources);
                    return Ok(set);
                }
                Err(err) => debug!(source = ?source, error = %err, "Definition source failed"),
            }
        }

        Err(DefinitionError::NoSourcesAvailable)
    }
}

impl Default for DefinitionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
