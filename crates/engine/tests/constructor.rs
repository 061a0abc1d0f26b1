pub mod fixtures;

use fixtures::*;
use forma_domain::descriptor::{DependentMode, TypeDescriptor};
use forma_domain::instance::Instance;
use forma_engine::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn records_build_from_their_parameters() {
    let orchestrator = orchestrator();
    let workout = orchestrator
        .from_obj(
            &TypeDescriptor::class("Workout"),
            &node(r#"{"lift": "Squat", "reps": 5, "weight": 100, "maxed": true}"#),
        )
        .expect("workout");
    assert_eq!(
        value::<Workout>(&workout),
        Workout { lift: "Squat".into(), reps: 5, weight: 100.0, maxed: true }
    );

    let defaulted: Arc<Workout> = orchestrator
        .build(&TypeDescriptor::class("Workout"), &node(r#"{"lift": "Bench", "reps": 3, "weight": 60.5}"#))
        .expect("defaulted");
    assert!(!defaulted.maxed);
}

#[test]
fn missing_required_parameter_never_reaches_the_factory() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    let builder = RegistryBuilder::new();
    builder
        .record(
            ClassSpec::new("Counter")
                .model(ConstructorModel::new().param("start", TypeDescriptor::int()))
                .constructor(|args| {
                    CALLS.fetch_add(1, Ordering::SeqCst);
                    Ok(args.take::<i64>("start")?)
                }),
        )
        .expect("Counter");
    let orchestrator = Orchestrator::new(builder.build());
    let target = TypeDescriptor::class("Counter");

    let diagnostic = orchestrator.type_check(&target, &node("{}")).expect("missing");
    assert_eq!(diagnostic.code(), DiagnosticCode::KeyValueDiff);
    assert_eq!(diagnostic.missing_keys().collect::<Vec<_>>(), ["start"]);

    let result = orchestrator.from_obj(&target, &node("{}"));
    assert!(matches!(result, Err(EngineError::TypeCheck { .. })));
    assert_eq!(CALLS.load(Ordering::SeqCst), 0);

    orchestrator.from_obj(&target, &node(r#"{"start": 1}"#)).expect("built");
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn undeclared_keys_are_rejected() {
    let orchestrator = orchestrator();
    let diagnostic = orchestrator
        .type_check(&TypeDescriptor::class("Food"), &node(r#"{"type": "apple", "weight": 1}"#))
        .expect("extra");
    assert_eq!(diagnostic.code(), DiagnosticCode::KeyValueDiff);
    assert_eq!(diagnostic.extra_keys().collect::<Vec<_>>(), ["weight"]);
}

#[test]
fn argument_failures_are_reported_per_key() {
    let orchestrator = orchestrator();
    let diagnostic = orchestrator
        .type_check(&TypeDescriptor::class("Workout"), &node(r#"{"lift": 1, "reps": "five", "weight": 1}"#))
        .expect("failures");
    assert_eq!(diagnostic.code(), DiagnosticCode::KeyValue);
    assert_eq!(diagnostic.children().len(), 2);
    assert_eq!(
        diagnostic.child(&Label::Key("lift".into())).map(Diagnostic::code),
        Some(DiagnosticCode::AnumWrongType)
    );
    assert_eq!(
        diagnostic.child(&Label::Key("reps".into())).map(Diagnostic::code),
        Some(DiagnosticCode::WrongType)
    );
    assert!(diagnostic.to_string().starts_with("[KeyValue]"));
}

#[test]
fn unknown_enumeration_member_is_reported() {
    let orchestrator = orchestrator();
    let diagnostic = orchestrator
        .type_check(&TypeDescriptor::enumeration("Lift"), &node(r#""Curl""#))
        .expect("unknown member");
    assert_eq!(diagnostic.code(), DiagnosticCode::AnumMember);
    assert_eq!(diagnostic.available().collect::<Vec<_>>(), ["Squat", "Bench", "Deadlift"]);
}

#[test]
fn dependent_declared_before_its_source_fails_at_registration() {
    let layer = TypeDescriptor::dependent(TypeDescriptor::class("Layer"), [("width", "width")], DependentMode::TypeCheck);
    let builder = RegistryBuilder::new();
    let result = builder.record(
        ClassSpec::new("Broken")
            .model(ConstructorModel::new().param("layer", layer.clone()).param("width", TypeDescriptor::int()))
            .constructor(|_| Ok(())),
    );
    let Err(error) = result else { panic!("registration must fail") };
    assert_eq!(error.diagnostic().map(Diagnostic::code), Some(DiagnosticCode::ParameterOrder));

    // An explicit order puts the source first.
    builder
        .record(
            ClassSpec::new("Fixed")
                .model(
                    ConstructorModel::new()
                        .param("layer", layer)
                        .param("width", TypeDescriptor::int())
                        .order(["width", "layer"]),
                )
                .constructor(|_| Ok(())),
        )
        .expect("ordered");
}

#[test]
fn explicit_order_must_cover_every_parameter() {
    let builder = RegistryBuilder::new();
    let result = builder.record(
        ClassSpec::new("Partial")
            .model(
                ConstructorModel::new()
                    .param("a", TypeDescriptor::int())
                    .param("b", TypeDescriptor::int())
                    .order(["a", "c"]),
            )
            .constructor(|_| Ok(())),
    );
    let diagnostic = result.expect_err("order").diagnostic().cloned().expect("diagnostic");
    assert_eq!(diagnostic.code(), DiagnosticCode::ParameterOrder);
    assert_eq!(diagnostic.missing_keys().collect::<Vec<_>>(), ["b"]);
    assert_eq!(diagnostic.extra_keys().collect::<Vec<_>>(), ["c"]);
}

#[test]
fn registration_misuse_is_a_configuration_error() {
    let builder = RegistryBuilder::new();
    register_food(&builder);

    let apple2 = ClassSpec::new("Apple2").constructor(|_| Ok(()));
    assert!(matches!(builder.register("Fruit", "apple", apple2), Err(EngineError::Configuration { .. })));
    // `Meat` and `Fruit` share Food's level.
    let pear = ClassSpec::new("Pear").constructor(|_| Ok(()));
    assert!(matches!(builder.register("Fruit", "beef", pear), Err(EngineError::Configuration { .. })));
    let orphan = ClassSpec::new("Orphan").constructor(|_| Ok(()));
    assert!(matches!(builder.register("Nowhere", "x", orphan), Err(EngineError::Configuration { .. })));
    assert!(matches!(
        builder.register("Fruit", "kiwi", ClassSpec::new("Kiwi")),
        Err(EngineError::Configuration { .. })
    ));
    assert!(matches!(builder.root(ClassSpec::new("Food")), Err(EngineError::Configuration { .. })));
    assert!(matches!(builder.enumeration(EnumSpec::new("Empty")), Err(EngineError::Configuration { .. })));
}

#[test]
fn factory_errors_carry_the_class_context() {
    let orchestrator = orchestrator();
    let config = node(r#"{"dataset": {"name": "d", "rows": 4}, "window": {"size": 10}}"#);
    assert!(orchestrator.type_check(&TypeDescriptor::class("Experiment"), &config).is_none());

    let error = orchestrator.from_obj(&TypeDescriptor::class("Experiment"), &config).expect_err("too wide");
    assert!(matches!(error, EngineError::Construction { .. }));
    assert!(error.to_string().contains("while constructing `Window`"));
}

#[test]
fn generic_records_bind_their_type_parameters() {
    let builder = RegistryBuilder::new();
    builder
        .record(
            ClassSpec::new("Pair")
                .model(
                    ConstructorModel::new()
                        .type_params(["T"])
                        .param("left", TypeDescriptor::var("T"))
                        .param("right", TypeDescriptor::var("T")),
                )
                .constructor(|args| Ok((args.take::<Instance>("left")?, args.take::<Instance>("right")?))),
        )
        .expect("Pair");
    let orchestrator = Orchestrator::new(builder.build());
    let ints = TypeDescriptor::generic("Pair", [TypeDescriptor::int()]);
    let mixed = node(r#"{"left": 1, "right": "x"}"#);

    assert!(orchestrator.type_check(&ints, &node(r#"{"left": 1, "right": 2}"#)).is_none());
    let diagnostic = orchestrator.type_check(&ints, &mixed).expect("mixed");
    assert_eq!(
        diagnostic.child(&Label::Key("right".into())).map(Diagnostic::code),
        Some(DiagnosticCode::WrongType)
    );
    // Unbound type parameters accept anything.
    assert!(orchestrator.type_check(&TypeDescriptor::class("Pair"), &mixed).is_none());

    let arity = TypeDescriptor::generic("Pair", [TypeDescriptor::int(), TypeDescriptor::str()]);
    assert_eq!(
        orchestrator.type_check(&arity, &mixed).map(|d| d.code()),
        Some(DiagnosticCode::UnrepresentedType)
    );
}

#[test]
fn collecting_records_receive_extra_keys() {
    let builder = RegistryBuilder::new();
    builder
        .record(
            ClassSpec::new("Bag")
                .model(ConstructorModel::new().param("name", TypeDescriptor::str()).collect_extra())
                .constructor(|args| {
                    let extra = args.take_extra();
                    Ok(extra.keys().cloned().collect::<Vec<_>>())
                }),
        )
        .expect("Bag");
    let orchestrator = Orchestrator::new(builder.build());

    let keys: Arc<Vec<String>> = orchestrator
        .build(&TypeDescriptor::class("Bag"), &node(r#"{"name": "b", "size": 3, "tags": ["x"]}"#))
        .expect("bag");
    assert_eq!(*keys, ["size", "tags"]);
}

#[test]
fn unregistered_classes_are_unrepresented() {
    let orchestrator = orchestrator();
    let diagnostic = orchestrator.type_check(&TypeDescriptor::class("Ghost"), &node("{}")).expect("ghost");
    assert_eq!(diagnostic.code(), DiagnosticCode::UnrepresentedType);
    assert!(!orchestrator.contains(&TypeDescriptor::class("Ghost")));
    assert!(orchestrator.contains(&TypeDescriptor::class("Workout")));
}
