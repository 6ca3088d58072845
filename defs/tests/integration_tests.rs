use std::path::Path;

use serde_json::json;
use typeshape_core::{Property, Type, TypeDefinitions, WhitespaceFormatter};
use typeshape_defs::{DefinitionError, DefinitionSet, DefinitionSource, GenerateConfig};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_json(dir: &Path, file: &str, definitions: &TypeDefinitions) {
    let raw = serde_json::to_string_pretty(definitions).unwrap();
    std::fs::write(dir.join(file), raw).unwrap();
}

fn write_raw(dir: &Path, file: &str, raw: &str) {
    std::fs::write(dir.join(file), raw).unwrap();
}

const USER_YAML: &str = r#"
types:
  - name: User
    type:
      kind: object
      properties:
        - name: id
          type: { kind: alias, name: Id }
        - name: email
          type: { kind: string }
          required: false
"#;

// ---------------------------------------------------------------------------
// Directory loading
// ---------------------------------------------------------------------------

#[test]
fn test_directory_merges_json_and_yaml() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(dir.path(), "b_user.yaml", USER_YAML);
    write_json(dir.path(), "a_id.json", &TypeDefinitions::new().with_type("Id", Type::Number));
    write_raw(dir.path(), "notes.txt", "ignored");

    let set = DefinitionSet::from_dir(dir.path()).unwrap();
    assert_eq!(set.names().collect::<Vec<_>>(), vec!["Id", "User"]);
    assert_eq!(set.source(), &DefinitionSource::Directory(dir.path().to_path_buf()));

    let registry = set.compile().unwrap();
    let user = registry.get("User").unwrap();
    assert!(user.is_valid(&json!({ "id": 7 })));
    assert!(!user.is_valid(&json!({ "id": "7" })));
}

#[test]
fn test_directory_rejects_duplicates_across_files() {
    let dir = tempfile::tempdir().unwrap();
    write_json(dir.path(), "one.json", &TypeDefinitions::new().with_type("Id", Type::Number));
    write_json(dir.path(), "two.json", &TypeDefinitions::new().with_type("Id", Type::String));

    let err = DefinitionSet::from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicateName(name) if name == "Id"));
}

#[test]
fn test_malformed_document_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(dir.path(), "bad.json", "{ \"types\": [ { \"name\": \"X\" } ] }");
    assert!(matches!(
        DefinitionSet::from_file(dir.path().join("bad.json")),
        Err(DefinitionError::JsonError(_))
    ));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(dir.path(), "types.toml", "");
    assert!(matches!(
        DefinitionSet::from_file(dir.path().join("types.toml")),
        Err(DefinitionError::UnsupportedFormat(_))
    ));
}

// ---------------------------------------------------------------------------
// Fallback chain
// ---------------------------------------------------------------------------

#[test]
fn test_builder_falls_back_to_later_source() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("types.yml");
    write_raw(dir.path(), "types.yml", USER_YAML);

    let set = DefinitionSet::builder()
        .from_dir(dir.path().join("missing"))
        .from_file(&file)
        .build()
        .unwrap();
    assert!(set.contains("User"));
    assert!(matches!(set.source(), DefinitionSource::Multiple(sources) if sources.len() == 2));
}

#[test]
fn test_builder_with_only_failing_sources() {
    let dir = tempfile::tempdir().unwrap();
    let err = DefinitionSet::builder()
        .from_file(dir.path().join("nope.json"))
        .build()
        .unwrap_err();
    assert!(matches!(err, DefinitionError::NoSourcesAvailable));
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn test_generate_filtered_artifact() {
    let definitions = TypeDefinitions::new()
        .with_type("Id", Type::Number)
        .with_type(
            "Account",
            Type::object(vec![
                Property::required("id", Type::alias("Id")),
                Property::optional("secret", Type::alias("Secret")),
            ]),
        )
        .with_type("Secret", Type::String);
    let set = DefinitionSet::new(definitions).unwrap();
    let config = GenerateConfig {
        exclude: vec!["Secret".into()],
        ..Default::default()
    };

    let registry = set.compile().unwrap();
    let mut artifact = registry.artifact().with_source_hash(set.checksum().unwrap());
    artifact.retain(|name| config.is_included(name));

    let text = artifact.render(&WhitespaceFormatter);
    assert!(text.contains("type Account = { id: Id; secret?: Secret };"));
    assert!(text.contains("type Id = number;"));
    assert!(!text.contains("type Secret"));
    assert!(text.contains(&set.checksum().unwrap()));
}
