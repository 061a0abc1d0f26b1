pub mod fixtures;

use fixtures::*;
use forma_domain::config::EngineConfig;
use forma_domain::descriptor::TypeDescriptor;
use forma_domain::instance::Instance;
use forma_engine::prelude::*;
use forma_tree::{Node, Tree};
use std::sync::Arc;

#[test]
fn union_construction_prefers_the_first_member() {
    let orchestrator = orchestrator();
    let both = TypeDescriptor::union([TypeDescriptor::class("Celsius"), TypeDescriptor::class("Kelvin")]);
    let config = node(r#"{"value": 21.5}"#);

    for _ in 0..3 {
        let temperature: Arc<Temperature> = orchestrator.build(&both, &config).expect("temperature");
        assert_eq!(temperature.scale, "Celsius");
    }
    let reversed = TypeDescriptor::union([TypeDescriptor::class("Kelvin"), TypeDescriptor::class("Celsius")]);
    let temperature: Arc<Temperature> = orchestrator.build(&reversed, &config).expect("temperature");
    assert_eq!(temperature.scale, "Kelvin");
}

#[test]
fn union_failure_reports_every_member() {
    let orchestrator = orchestrator();
    let target = TypeDescriptor::union([TypeDescriptor::int(), TypeDescriptor::str()]);
    let diagnostic = orchestrator.type_check(&target, &node("[1]")).expect("no member");

    assert_eq!(diagnostic.code(), DiagnosticCode::KeyValue);
    assert_eq!(diagnostic.children().len(), 2);
    assert!(diagnostic.children().iter().all(|(label, child)| {
        matches!(label, Label::Member(_)) && child.code() == DiagnosticCode::WrongType
    }));
}

#[test]
fn hand_built_duplicates_only_repeat_members() {
    let orchestrator = orchestrator();
    assert_eq!(
        TypeDescriptor::union([TypeDescriptor::int(), TypeDescriptor::int()]),
        TypeDescriptor::Union(vec![TypeDescriptor::int()])
    );
    assert_eq!(
        TypeDescriptor::literal(["a", "a", "b"]),
        TypeDescriptor::Literal(vec![Node::from("a"), Node::from("b")])
    );

    let repeated = TypeDescriptor::Union(vec![TypeDescriptor::int(), TypeDescriptor::int()]);
    assert!(orchestrator.type_check(&repeated, &Node::from(3)).is_none());
    let diagnostic = orchestrator.type_check(&repeated, &Node::from("x")).expect("not an int");
    assert_eq!(diagnostic.children().len(), 2);

    let literal = TypeDescriptor::Literal(vec![Node::from("a"), Node::from("a")]);
    assert!(orchestrator.type_check(&literal, &Node::from("a")).is_none());
}

#[test]
fn tuple_arity_must_match() {
    let orchestrator = orchestrator();
    let target = TypeDescriptor::tuple([TypeDescriptor::int(), TypeDescriptor::str()]);

    let diagnostic = orchestrator.type_check(&target, &node(r#"[1, "a", 2]"#)).expect("arity");
    assert_eq!(diagnostic.code(), DiagnosticCode::TupleArgLen);

    let built = orchestrator.from_obj(&target, &node(r#"[1, "a"]"#)).expect("tuple");
    assert!(matches!(built, Instance::Tuple(ref items) if items.len() == 2));
    let pair: (i64, String) = orchestrator.build(&target, &node(r#"[1, "a"]"#)).expect("pair");
    assert_eq!(pair, (1, "a".to_owned()));
}

#[test]
fn sequence_and_mapping_label_their_failures() {
    let orchestrator = orchestrator();

    let ints = TypeDescriptor::sequence(TypeDescriptor::int());
    let diagnostic = orchestrator.type_check(&ints, &node(r#"[1, "two", 3]"#)).expect("sequence");
    assert_eq!(diagnostic.children().len(), 1);
    assert!(diagnostic.child(&Label::Index(1)).is_some());

    let floats = TypeDescriptor::mapping(TypeDescriptor::float());
    let diagnostic = orchestrator.type_check(&floats, &node(r#"{"a": 1, "b": true}"#)).expect("mapping");
    assert!(diagnostic.child(&Label::Key("b".into())).is_some());

    let scores: indexmap::IndexMap<String, f64> =
        orchestrator.build(&floats, &node(r#"{"a": 1, "b": 2.5}"#)).expect("scores");
    assert_eq!(scores.keys().collect::<Vec<_>>(), ["a", "b"]);
    assert!((scores["a"] - 1.0).abs() < f64::EPSILON);
}

#[test]
fn optional_accepts_null_and_inner_values() {
    let orchestrator = orchestrator();
    let target = TypeDescriptor::optional(TypeDescriptor::int());
    assert!(orchestrator.type_check(&target, &Node::Null).is_none());
    assert!(orchestrator.type_check(&target, &Node::from(3)).is_none());
    assert!(orchestrator.type_check(&target, &Node::from("3")).is_some());

    let absent: Option<i64> = orchestrator.build(&target, &Node::Null).expect("null");
    assert_eq!(absent, None);
}

#[test]
fn literals_compare_value_and_kind() {
    let orchestrator = orchestrator();
    let target = TypeDescriptor::literal([Node::from(1), Node::from("a")]);

    assert!(orchestrator.type_check(&target, &Node::from(1)).is_none());
    assert!(orchestrator.type_check(&target, &Node::from("a")).is_none());

    let wrong = orchestrator.type_check(&target, &Node::from("1")).expect("kind differs");
    assert_eq!(wrong.code(), DiagnosticCode::WrongType);
    assert_eq!(wrong.available().count(), 2);

    let unhashable = orchestrator.type_check(&target, &node("[1]")).expect("sequence");
    assert_eq!(unhashable.code(), DiagnosticCode::Hashable);
}

#[test]
fn scalars_keep_bool_and_int_apart() {
    let orchestrator = orchestrator();
    assert!(orchestrator.type_check(&TypeDescriptor::int(), &Node::from(true)).is_some());
    assert!(orchestrator.type_check(&TypeDescriptor::bool(), &Node::from(1)).is_some());
    assert!(orchestrator.type_check(&TypeDescriptor::any(), &node(r#"{"x": [1]}"#)).is_none());

    let widened = orchestrator.from_obj(&TypeDescriptor::float(), &Node::from(2)).expect("float");
    assert!(matches!(widened, Instance::Float(f) if (f - 2.0).abs() < f64::EPSILON));
}

#[test]
fn int_widening_can_be_disabled() {
    let mut config = EngineConfig::default();
    config.schema.widen_int_to_float = false;
    let orchestrator = Orchestrator::new(RegistryBuilder::with_config(config).build());

    let diagnostic = orchestrator.type_check(&TypeDescriptor::float(), &Node::from(2)).expect("strict");
    assert_eq!(diagnostic.code(), DiagnosticCode::WrongType);
}

#[test]
fn nesting_beyond_the_limit_is_too_deep() {
    let mut config = EngineConfig::default();
    config.limits.max_depth = 3;
    let orchestrator = Orchestrator::new(RegistryBuilder::with_config(config).build());

    let target = (0..5).fold(TypeDescriptor::int(), |inner, _| TypeDescriptor::sequence(inner));
    let config = (0..5).fold(Node::from(1), |inner, _| Node::from(vec![inner]));

    let diagnostic = orchestrator.type_check(&target, &config).expect("too deep");
    assert!(diagnostic.contains(DiagnosticCode::TooDeepLiteral));
    assert!(orchestrator.from_obj(&target, &config).is_err());
}

#[test]
fn self_referential_records_stop_at_the_depth_limit() {
    let builder = RegistryBuilder::new();
    builder
        .record(
            ClassSpec::new("Chain")
                .model(
                    ConstructorModel::new()
                        .param_with_default("next", TypeDescriptor::optional(TypeDescriptor::class("Chain"))),
                )
                .constructor(|_| Ok(())),
        )
        .expect("Chain");
    let orchestrator = Orchestrator::new(builder.build());

    let chain = |links: usize| {
        (0..links).fold(Node::Map(Tree::new()), |next, _| {
            let mut link = Tree::new();
            link.insert("next", next);
            Node::Map(link)
        })
    };
    let target = TypeDescriptor::class("Chain");
    assert!(orchestrator.type_check(&target, &chain(10)).is_none());

    let diagnostic = orchestrator.type_check(&target, &chain(100)).expect("too deep");
    assert!(diagnostic.contains(DiagnosticCode::TooDeepLiteral));
}

#[test]
fn units_can_be_replaced_and_extended() {
    #[derive(Debug)]
    struct Nothing;

    impl Unit for Nothing {
        fn name(&self) -> &'static str {
            "nothing"
        }

        fn contains(&self, _: &TypeDescriptor, _: &Orchestrator) -> bool {
            true
        }

        fn type_check(
            &self,
            target: &TypeDescriptor,
            _: &Node,
            _: &Orchestrator,
            _: forma_engine::scope::Scope<'_>,
        ) -> Option<Diagnostic> {
            Some(Diagnostic::new(DiagnosticCode::UnrepresentedType, target.clone(), "refused"))
        }

        fn from_obj(
            &self,
            _: &TypeDescriptor,
            _: &Node,
            _: &Orchestrator,
            _: forma_engine::scope::Scope<'_>,
        ) -> Result<Instance, EngineError> {
            Err(EngineError::construction("refused"))
        }
    }

    let strict = Orchestrator::builder(registry()).prepend_unit(Nothing).build();
    assert_eq!(strict.get(&TypeDescriptor::int()).map(|unit| unit.name()), Some("nothing"));
    assert!(strict.type_check(&TypeDescriptor::int(), &Node::from(1)).is_some());

    let fallback = Orchestrator::builder(registry()).units(Vec::new()).unit(Nothing).build();
    assert_eq!(fallback.get(&TypeDescriptor::class("Food")).map(|unit| unit.name()), Some("nothing"));
    // Registered hierarchies still resolve after an empty unit list.
    let bare = Orchestrator::builder(registry()).units(Vec::new()).build();
    assert_eq!(bare.get(&TypeDescriptor::class("Food")).map(|unit| unit.name()), Some("hierarchy"));
    assert!(bare.get(&TypeDescriptor::int()).is_none());
}

#[test]
fn unit_get_checks_before_building() {
    let orchestrator = orchestrator();
    let target = TypeDescriptor::class("Workout");
    let unit = orchestrator.get(&target).expect("record unit");
    assert_eq!(unit.name(), "record");

    let scope = forma_engine::scope::Scope::root();
    let valid = node(r#"{"lift": "Squat", "reps": 5, "weight": 100}"#);
    let built = unit.get(&target, &valid, &orchestrator, scope).expect("workout");
    assert_eq!(value::<Workout>(&built).reps, 5);

    let error = unit.get(&target, &node(r#"{"lift": "Squat"}"#), &orchestrator, scope).expect_err("missing");
    assert_eq!(error.diagnostic().map(Diagnostic::code), Some(DiagnosticCode::KeyValueDiff));
}
