use serde_json::{Value, json};
use typeshape_core::{
    CompileError, ErrorCatcher, Property, Registry, Schema, Type, TypeDefinitions, ValidateOptions,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn single(name: &str, ty: Type) -> Registry {
    Registry::compile(&TypeDefinitions::new().with_type(name, ty)).unwrap()
}

fn pair_type() -> Type {
    Type::object(vec![
        Property::required("a", Type::Number),
        Property::optional("b", Type::Number),
    ])
}

fn lenient() -> ValidateOptions<'static> {
    ValidateOptions::default().allow_additional_properties(true)
}

fn keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .map(|m| m.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Additional properties
// ---------------------------------------------------------------------------

#[test]
fn test_lenient_validation_then_create_strips_extra_keys() {
    let registry = single("Pair", pair_type());
    let pair = registry.get("Pair").unwrap();
    let input = json!({ "a": 1, "b": 2, "c": 3 });

    assert_eq!(pair.validate(&input, lenient()), Ok(true));
    assert_eq!(pair.create(&input).unwrap(), json!({ "a": 1, "b": 2 }));
    // Input is left untouched.
    assert_eq!(input, json!({ "a": 1, "b": 2, "c": 3 }));
}

#[test]
fn test_strict_default_names_offending_key() {
    let registry = single("Pair", pair_type());
    let pair = registry.get("Pair").unwrap();
    let input = json!({ "a": 1, "b": 2, "c": 3 });

    let mut catcher = ErrorCatcher::default();
    let outcome = pair.validate(&input, ValidateOptions::default().with_error_catcher(&mut catcher));
    assert_eq!(outcome, Ok(false));
    let message = catcher.message().unwrap();
    assert!(message.contains("\"c\""), "message should name key c: {message}");
    assert!(message.starts_with("Pair does not allow key"));
}

#[test]
fn test_validate_without_catcher_returns_err() {
    let registry = single("Pair", pair_type());
    let failure = registry
        .get("Pair")
        .unwrap()
        .validate(&json!({ "a": "1" }), ValidateOptions::default())
        .unwrap_err();
    assert_eq!(failure.message(), "Pair.a is not a number:\n\"1\"");
    assert_eq!(failure.to_string(), failure.message());
}

// ---------------------------------------------------------------------------
// Literals and unions
// ---------------------------------------------------------------------------

#[test]
fn test_literal_zero_is_strict() {
    let registry = single("Zero", Type::literal(0));
    let zero = registry.get("Zero").unwrap();
    assert!(zero.is_valid(&json!(0)));
    assert!(!zero.is_valid(&json!("0")));
    assert!(!zero.is_valid(&json!(false)));
}

#[test]
fn test_union_reports_last_member_failure_only() {
    let registry = single("BoolOrNum", Type::union(vec![Type::Boolean, Type::Number]));
    let ty = registry.get("BoolOrNum").unwrap();
    assert!(ty.is_valid(&json!(true)));
    assert!(ty.is_valid(&json!(5)));

    let mut catcher = ErrorCatcher::default();
    let outcome = ty.validate(&json!("x"), ValidateOptions::default().with_error_catcher(&mut catcher));
    assert_eq!(outcome, Ok(false));
    assert_eq!(catcher.message(), Some("BoolOrNum is not a number:\n\"x\""));
}

#[test]
fn test_union_trial_does_not_leak_between_members() {
    // The first member fails deep inside; the second still gets a clean try.
    let registry = single(
        "Shape",
        Type::union(vec![
            Type::object(vec![Property::required("r", Type::Number)]),
            Type::object(vec![Property::required("w", Type::Number)]),
        ]),
    );
    let shape = registry.get("Shape").unwrap();
    assert!(shape.is_valid(&json!({ "w": 2 })));
    assert_eq!(shape.create(&json!({ "w": 2, "r": "no" })).unwrap(), json!({ "w": 2 }));
}

// ---------------------------------------------------------------------------
// Recursion
// ---------------------------------------------------------------------------

#[test]
fn test_mutual_recursion_through_alias_and_optional_field() {
    let definitions = TypeDefinitions::new()
        .with_type("A", Type::alias("B"))
        .with_type("B", Type::object(vec![Property::optional("a", Type::alias("A"))]));
    let registry = Registry::compile(&definitions).unwrap();
    let a = registry.get("A").unwrap();

    for value in [json!({}), json!({ "a": {} }), json!({ "a": { "a": {} } })] {
        assert_eq!(a.validate(&value, ValidateOptions::default()), Ok(true), "{value}");
        assert_eq!(a.create(&value).unwrap(), value);
    }
    assert!(!a.is_valid(&json!({ "a": { "a": 1 } })));
}

#[test]
fn test_declaration_order_does_not_matter() {
    let forward = TypeDefinitions::new()
        .with_type("List", Type::array(Type::alias("Item")))
        .with_type("Item", Type::String);
    let backward = TypeDefinitions::new()
        .with_type("Item", Type::String)
        .with_type("List", Type::array(Type::alias("Item")));

    for definitions in [forward, backward] {
        let registry = Registry::compile(&definitions).unwrap();
        let list = registry.get("List").unwrap();
        assert!(list.is_valid(&json!(["a", "b"])));
        assert!(!list.is_valid(&json!(["a", 1])));
    }
}

#[test]
fn test_schema_reference_resolves_through_registry() {
    let definitions = TypeDefinitions::new()
        .with_type("Parent", Type::object(vec![Property::required("child", Type::alias("Child"))]))
        .with_type("Child", Type::Boolean);
    let registry = Registry::compile(&definitions).unwrap();

    let Schema::Object { properties } = registry.get("Parent").unwrap().schema() else {
        panic!("expected object schema");
    };
    let Schema::Ref(target) = &properties[0].schema else {
        panic!("expected reference");
    };
    let child = target.resolve(&registry).unwrap();
    assert_eq!(child.name(), "Child");
    assert_eq!(child.schema(), &Schema::Boolean);
}

#[test]
fn test_unresolved_alias_is_a_compile_error() {
    let definitions = TypeDefinitions::new().with_type("A", Type::array(Type::alias("Missing")));
    assert!(matches!(
        Registry::compile(&definitions),
        Err(CompileError::UnresolvedAlias { .. })
    ));
}

// ---------------------------------------------------------------------------
// Validate/create agreement
// ---------------------------------------------------------------------------

fn catalog() -> Registry {
    let definitions = TypeDefinitions::new()
        .with_type(
            "Order",
            Type::object(vec![
                Property::required("id", Type::Number),
                Property::required("status", Type::union(vec![Type::literal("open"), Type::literal("closed")])),
                Property::optional("lines", Type::array(Type::alias("Line"))),
                Property::optional("note", Type::union(vec![Type::String, Type::Null])),
                Property::optional("meta", Type::Any),
            ]),
        )
        .with_type(
            "Line",
            Type::object(vec![
                Property::required("sku", Type::String),
                Property::required("qty", Type::Number),
            ]),
        );
    Registry::compile(&definitions).unwrap()
}

fn samples() -> Vec<Value> {
    vec![
        json!({ "id": 1, "status": "open" }),
        json!({ "id": 2, "status": "closed", "lines": [{ "sku": "a", "qty": 1 }], "note": null }),
        json!({ "id": 3, "status": "open", "lines": [{ "sku": "a", "qty": 1, "x": 0 }] }),
        json!({ "id": 4, "status": "pending" }),
        json!({ "id": 5, "status": "open", "extra": true }),
        json!({ "id": "6", "status": "open" }),
        json!({ "id": 7, "status": "open", "meta": { "anything": [1, 2] } }),
        json!([1, 2]),
        json!(null),
    ]
}

#[test]
fn test_strict_validate_agrees_with_create() {
    let registry = catalog();
    let order = registry.get("Order").unwrap();
    let declared = ["id", "status", "lines", "note", "meta"];

    for value in samples() {
        if order.is_valid(&value) {
            let created = order.create(&value).unwrap();
            assert!(keys(&created).iter().all(|k| declared.contains(k)), "{created}");
            assert_eq!(created, value, "strictly valid input is rebuilt unchanged");
        }

        // Nothing stripped at any depth means no undeclared key was present.
        if let Ok(created) = order.create(&value) {
            if created == value {
                assert!(order.is_valid(&value), "{value}");
            } else {
                assert!(!order.is_valid(&value), "{value}");
            }
        }
    }

    let top_level_declared = json!({ "id": 8, "status": "closed", "lines": [] });
    assert!(keys(&top_level_declared).iter().all(|k| declared.contains(k)));
    assert!(order.create(&top_level_declared).is_ok());
    assert!(order.is_valid(&top_level_declared));
}

#[test]
fn test_create_is_idempotent() {
    let registry = catalog();
    let order = registry.get("Order").unwrap();

    for value in samples() {
        if let Ok(once) = order.create(&value) {
            let twice = order.create(&once).unwrap();
            assert_eq!(once, twice);
            assert!(order.is_valid(&once), "sanitized output validates strictly: {once}");
        }
    }
}

#[test]
fn test_create_propagates_validation_failure() {
    let registry = catalog();
    let order = registry.get("Order").unwrap();
    let failure = order.create(&json!({ "id": 4, "status": "pending" })).unwrap_err();
    assert_eq!(failure.message(), "Order.status is not \"closed\":\n\"pending\"");
}

#[test]
fn test_bindings_are_usable_across_threads() {
    let registry = catalog();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let order = registry.get("Order").unwrap();
                assert!(order.is_valid(&json!({ "id": 1, "status": "open" })));
            });
        }
    });
}
