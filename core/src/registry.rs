//! Named-type registry: compiles every definition and binds
//! {name, schema, declaration, create, validate} per name.
//!
//! All names are indexed before any type is compiled, so references may
//! point forward, backward, or at the referring type itself. Alias nodes
//! store a slot into this registry and are resolved at call time; no
//! binding ever captures another binding.

use serde_json::Value;
use tracing::{debug, info};

use crate::artifact::{Artifact, ArtifactEntry};
use crate::sanitize::Sanitizer;
use crate::validate::{CheckContext, Path, Slots, Validator};
use crate::{
    CompileError, Declaration, Schema, Type, TypeDefinitions, ValidateOptions, ValidationFailure,
};

/// Compiled artifacts for one named type.
#[derive(Debug)]
pub(crate) struct Entry {
    name: String,
    ty: Type,
    schema: Schema,
    declaration: Declaration,
    validator: Validator,
    sanitizer: Sanitizer,
}

impl Entry {
    /// Checks `value` starting a fresh path at this type's name.
    pub(crate) fn check(&self, value: Option<&Value>, cx: &CheckContext<'_>) -> Result<(), ValidationFailure> {
        self.validator.check(value, &Path::root(&self.name), cx)
    }

    pub(crate) fn sanitize(&self, value: &Value, cx: &CheckContext<'_>) -> Result<Value, ValidationFailure> {
        self.sanitizer.sanitize(value, &Path::root(&self.name), cx)
    }
}

/// Immutable collection of compiled named types.
///
/// A registry holds no interior mutability, so it can be shared freely
/// across threads and its bindings invoked concurrently.
///
/// # Examples
///
/// ```
/// use typeshape_core::*;
/// use serde_json::json;
///
/// // `Tree` is declared before `Forest`, which it references.
/// let definitions = TypeDefinitions::new()
///     .with_type("Tree", Type::object(vec![
///         Property::required("value", Type::Number),
///         Property::optional("children", Type::alias("Forest")),
///     ]))
///     .with_type("Forest", Type::array(Type::alias("Tree")));
///
/// let registry = Registry::compile(&definitions).unwrap();
/// let tree = registry.get("Tree").unwrap();
/// assert!(tree.is_valid(&json!({ "value": 1, "children": [{ "value": 2 }] })));
/// assert_eq!(tree.declaration().to_string(), "{ value: number; children?: Forest }");
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Entry>,
    slots: Slots,
}

impl Registry {
    /// Compiles every definition into a binding.
    ///
    /// # Errors
    ///
    /// - [`CompileError::EmptyName`] / [`CompileError::DuplicateName`] for bad
    ///   names.
    /// - [`CompileError::DuplicateProperty`] when an object repeats a key.
    /// - [`CompileError::UnresolvedAlias`] when a reference has no target.
    /// - [`CompileError::UnguardedCycle`] when names refer to each other only
    ///   through aliases and unions (e.g. `A = B`, `B = A | string`).
    pub fn compile(definitions: &TypeDefinitions) -> Result<Self, CompileError> {
        let mut slots = Slots::with_capacity(definitions.len());
        for (slot, definition) in definitions.types.iter().enumerate() {
            if definition.name.trim().is_empty() {
                return Err(CompileError::EmptyName);
            }
            if slots.insert(definition.name.clone(), slot).is_some() {
                return Err(CompileError::DuplicateName(definition.name.clone()));
            }
        }

        let mut entries = Vec::with_capacity(definitions.len());
        for definition in &definitions.types {
            let name = definition.name.as_str();
            let entry = Entry {
                name: name.to_string(),
                ty: definition.ty.clone(),
                schema: Schema::compile(&definition.ty),
                declaration: Declaration::compile(&definition.ty),
                validator: Validator::compile(&definition.ty, &slots, name)?,
                sanitizer: Sanitizer::compile(&definition.ty, &slots, name)?,
            };
            debug!(name = %name, kind = definition.ty.kind(), "Compiled named type");
            entries.push(entry);
        }

        let registry = Self { entries, slots };
        registry.reject_unguarded_cycles()?;
        info!(types = registry.len(), "Compiled type registry");
        Ok(registry)
    }

    /// Returns the binding for `name`.
    pub fn get(&self, name: &str) -> Option<NamedType<'_>> {
        self.slots.get(name).map(|&slot| NamedType {
            registry: self,
            entry: self.entry(slot),
        })
    }

    /// Returns `true` if `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Iterates over bindings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = NamedType<'_>> {
        self.entries.iter().map(move |entry| NamedType {
            registry: self,
            entry,
        })
    }

    /// Iterates over names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Returns the number of named types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Assembles the aggregated artifact for every named type.
    pub fn artifact(&self) -> Artifact {
        let mut artifact = Artifact::new();
        artifact.types = self
            .iter()
            .map(|binding| ArtifactEntry {
                name: binding.name().to_string(),
                declaration: binding.declaration().to_string(),
                schema: binding.schema().clone(),
            })
            .collect();
        artifact
    }

    // Slots are only ever produced by `compile` for this registry.
    pub(crate) fn entry(&self, slot: usize) -> &Entry {
        &self.entries[slot]
    }

    fn reject_unguarded_cycles(&self) -> Result<(), CompileError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Active,
            Done,
        }

        fn visit(
            registry: &Registry,
            slot: usize,
            marks: &mut [Mark],
            stack: &mut Vec<usize>,
        ) -> Result<(), CompileError> {
            match marks[slot] {
                Mark::Done => return Ok(()),
                Mark::Active => {
                    let start = stack.iter().position(|&s| s == slot).unwrap_or(0);
                    let cycle = stack[start..]
                        .iter()
                        .chain(std::iter::once(&slot))
                        .map(|&s| registry.entry(s).name.as_str())
                        .collect::<Vec<_>>()
                        .join(" -> ");
                    return Err(CompileError::UnguardedCycle(cycle));
                }
                Mark::Unvisited => {}
            }

            marks[slot] = Mark::Active;
            stack.push(slot);
            for target in registry.entry(slot).ty.unguarded_references() {
                if let Some(&next) = registry.slots.get(target) {
                    visit(registry, next, marks, stack)?;
                }
            }
            stack.pop();
            marks[slot] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; self.entries.len()];
        let mut stack = Vec::new();
        for slot in 0..self.entries.len() {
            visit(self, slot, &mut marks, &mut stack)?;
        }
        Ok(())
    }
}

/// Runtime binding for one named type.
///
/// Cheap to copy; borrows the owning [`Registry`] so references to other
/// named types resolve at call time.
#[derive(Clone, Copy)]
pub struct NamedType<'r> {
    registry: &'r Registry,
    entry: &'r Entry,
}

impl<'r> NamedType<'r> {
    /// The type's name.
    pub fn name(&self) -> &'r str {
        &self.entry.name
    }

    /// The source type definition.
    pub fn ty(&self) -> &'r Type {
        &self.entry.ty
    }

    /// The schema descriptor.
    pub fn schema(&self) -> &'r Schema {
        &self.entry.schema
    }

    /// The structural declaration.
    pub fn declaration(&self) -> &'r Declaration {
        &self.entry.declaration
    }

    /// Checks `value` against this type.
    ///
    /// Returns `Ok(true)` on success. On failure, stores the message in the
    /// options' error catcher and returns `Ok(false)`, or returns `Err` if no
    /// catcher was supplied.
    pub fn validate(&self, value: &Value, options: ValidateOptions<'_>) -> Result<bool, ValidationFailure> {
        let cx = CheckContext {
            registry: self.registry,
            allow_additional_properties: options.allow_additional_properties,
        };
        options.finish(self.entry.check(Some(value), &cx))
    }

    /// Checks `value` with default options, discarding the failure message.
    pub fn is_valid(&self, value: &Value) -> bool {
        let cx = CheckContext {
            registry: self.registry,
            allow_additional_properties: false,
        };
        self.entry.check(Some(value), &cx).is_ok()
    }

    /// Validates `value` with additional properties allowed, then returns a
    /// freshly built value containing exactly the declared shape.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationFailure`] from the validation step unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use typeshape_core::*;
    /// use serde_json::json;
    ///
    /// let definitions = TypeDefinitions::new().with_type(
    ///     "Pair",
    ///     Type::object(vec![
    ///         Property::required("a", Type::Number),
    ///         Property::optional("b", Type::Number),
    ///     ]),
    /// );
    /// let registry = Registry::compile(&definitions).unwrap();
    /// let pair = registry.get("Pair").unwrap();
    ///
    /// let input = json!({ "a": 1, "b": 2, "c": 3 });
    /// assert_eq!(pair.create(&input).unwrap(), json!({ "a": 1, "b": 2 }));
    /// assert!(pair.create(&json!({ "b": 2 })).is_err());
    /// ```
    pub fn create(&self, value: &Value) -> Result<Value, ValidationFailure> {
        let cx = CheckContext {
            registry: self.registry,
            allow_additional_properties: true,
        };
        self.entry.check(Some(value), &cx)?;
        self.entry.sanitize(value, &cx)
    }
}

impl std::fmt::Debug for NamedType<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedType")
            .field("name", &self.entry.name)
            .field("declaration", &self.entry.declaration.to_string())
            .finish()
    }
}

// Names map to slots one-to-one.
impl PartialEq for NamedType<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.entry, other.entry)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Property;

    #[test]
    fn test_rejects_duplicate_names() {
        let definitions = TypeDefinitions::new()
            .with_type("A", Type::Number)
            .with_type("A", Type::String);
        assert_eq!(
            Registry::compile(&definitions).unwrap_err(),
            CompileError::DuplicateName("A".to_string())
        );
    }

    #[test]
    fn test_rejects_empty_name() {
        let definitions = TypeDefinitions::new().with_type("  ", Type::Number);
        assert_eq!(Registry::compile(&definitions).unwrap_err(), CompileError::EmptyName);
    }

    #[test]
    fn test_rejects_unresolved_alias() {
        let definitions = TypeDefinitions::new().with_type(
            "User",
            Type::object(vec![Property::required("role", Type::alias("Role"))]),
        );
        assert_eq!(
            Registry::compile(&definitions).unwrap_err(),
            CompileError::UnresolvedAlias {
                name: "User".to_string(),
                target: "Role".to_string(),
            }
        );
    }

    #[test]
    fn test_rejects_unguarded_cycles() {
        let definitions = TypeDefinitions::new()
            .with_type("A", Type::alias("B"))
            .with_type("B", Type::union(vec![Type::String, Type::alias("A")]));
        assert_eq!(
            Registry::compile(&definitions).unwrap_err(),
            CompileError::UnguardedCycle("A -> B -> A".to_string())
        );

        let definitions = TypeDefinitions::new().with_type("Loop", Type::alias("Loop"));
        assert_eq!(
            Registry::compile(&definitions).unwrap_err(),
            CompileError::UnguardedCycle("Loop -> Loop".to_string())
        );
    }

    #[test]
    fn test_rejects_duplicate_property_names() {
        let definitions = TypeDefinitions::new().with_type(
            "Pair",
            Type::object(vec![
                Property::required("a", Type::Number),
                Property::optional("a", Type::Any),
            ]),
        );
        assert_eq!(
            Registry::compile(&definitions).unwrap_err(),
            CompileError::DuplicateProperty {
                name: "Pair".to_string(),
                property: "a".to_string(),
            }
        );

        let nested = TypeDefinitions::new().with_type(
            "List",
            Type::array(Type::object(vec![
                Property::required("id", Type::Number),
                Property::required("id", Type::String),
            ])),
        );
        assert!(matches!(
            Registry::compile(&nested),
            Err(CompileError::DuplicateProperty { property, .. }) if property == "id"
        ));
    }

    #[test]
    fn test_accepts_cycle_behind_any_member() {
        let definitions =
            TypeDefinitions::new().with_type("J", Type::union(vec![Type::Any, Type::alias("J")]));
        let registry = Registry::compile(&definitions).unwrap();
        let j = registry.get("J").unwrap();
        assert!(j.is_valid(&json!({ "k": [1] })));
        assert_eq!(j.create(&json!("x")), Ok(json!("x")));

        let definitions = TypeDefinitions::new()
            .with_type("K", Type::union(vec![Type::alias("K"), Type::Any]));
        assert_eq!(
            Registry::compile(&definitions).unwrap_err(),
            CompileError::UnguardedCycle("K -> K".to_string())
        );
    }

    #[test]
    fn test_accepts_guarded_self_reference() {
        let definitions = TypeDefinitions::new().with_type(
            "Json",
            Type::union(vec![
                Type::Null,
                Type::Boolean,
                Type::Number,
                Type::String,
                Type::array(Type::alias("Json")),
            ]),
        );
        let registry = Registry::compile(&definitions).unwrap();
        assert!(registry.get("Json").unwrap().is_valid(&json!([1, [true, null], "x"])));
        assert!(!registry.get("Json").unwrap().is_valid(&json!({ "a": 1 })));
    }

    #[test]
    fn test_alias_failure_restarts_path_at_target() {
        let definitions = TypeDefinitions::new()
            .with_type("Outer", Type::object(vec![Property::required("inner", Type::alias("Inner"))]))
            .with_type("Inner", Type::object(vec![Property::required("n", Type::Number)]));
        let registry = Registry::compile(&definitions).unwrap();
        let failure = registry
            .get("Outer")
            .unwrap()
            .validate(&json!({ "inner": { "n": "x" } }), ValidateOptions::default())
            .unwrap_err();
        assert_eq!(failure.message(), "Inner.n is not a number:\n\"x\"");
    }

    #[test]
    fn test_additional_properties_flag_reaches_aliased_types() {
        let definitions = TypeDefinitions::new()
            .with_type("Outer", Type::object(vec![Property::required("inner", Type::alias("Inner"))]))
            .with_type("Inner", Type::object(vec![]));
        let registry = Registry::compile(&definitions).unwrap();
        let outer = registry.get("Outer").unwrap();
        let value = json!({ "inner": { "extra": 1 } });

        assert!(!outer.is_valid(&value));
        let options = ValidateOptions::default().allow_additional_properties(true);
        assert_eq!(outer.validate(&value, options), Ok(true));
    }

    #[test]
    fn test_iteration_follows_declaration_order() {
        let definitions = TypeDefinitions::new()
            .with_type("Z", Type::Number)
            .with_type("A", Type::String);
        let registry = Registry::compile(&definitions).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Z", "A"]);
        assert_eq!(registry.iter().count(), 2);
        assert!(registry.contains("A"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
