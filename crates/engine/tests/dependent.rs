pub mod fixtures;

use fixtures::*;
use forma_domain::descriptor::{DependentMode, TypeDescriptor};
use forma_engine::prelude::*;
use std::sync::Arc;

type Experiment = (Arc<Dataset>, Arc<Window>);
type Pipeline = (i64, Arc<Layer>);

#[test]
fn from_obj_bindings_read_built_siblings() {
    let orchestrator = orchestrator();
    let config = node(r#"{"dataset": {"name": "iris", "rows": 150}, "window": {"size": 10}}"#);

    let (dataset, window): Experiment = orchestrator.build(&TypeDescriptor::class("Experiment"), &config).expect("built");
    assert_eq!(dataset.name, "iris");
    assert_eq!(*window, Window { size: 10, rows: 150 });
}

#[test]
fn explicit_values_win_over_bindings() {
    let orchestrator = orchestrator();
    let config = node(r#"{"dataset": {"name": "iris", "rows": 150}, "window": {"size": 10, "rows": 20}}"#);

    let (_, window): Experiment = orchestrator.build(&TypeDescriptor::class("Experiment"), &config).expect("built");
    assert_eq!(window.rows, 20);
}

#[test]
fn type_check_bindings_copy_raw_siblings() {
    let orchestrator = orchestrator();
    let config = node(r#"{"width": 8, "layer": {"activation": "tanh"}}"#);

    let (width, layer): Pipeline = orchestrator.build(&TypeDescriptor::class("Pipeline"), &config).expect("built");
    assert_eq!(width, 8);
    assert_eq!(*layer, Layer { width: 8, activation: "tanh".into() });
}

#[test]
fn bound_values_are_checked_against_the_target_parameter() {
    let orchestrator = orchestrator();
    let config = node(r#"{"width": 8, "layer": {"activation": "sigmoid"}}"#);

    let diagnostic = orchestrator.type_check(&TypeDescriptor::class("Pipeline"), &config).expect("activation");
    let layer = diagnostic.child(&Label::Key("layer".into())).expect("layer");
    assert!(layer.child(&Label::Key("activation".into())).is_some());
}

#[test]
fn failed_sources_mark_their_dependents() {
    let orchestrator = orchestrator();
    let config = node(r#"{"width": "wide", "layer": {}}"#);

    let diagnostic = orchestrator.type_check(&TypeDescriptor::class("Pipeline"), &config).expect("width");
    assert_eq!(
        diagnostic.child(&Label::Key("width".into())).map(Diagnostic::code),
        Some(DiagnosticCode::WrongType)
    );
    assert_eq!(
        diagnostic.child(&Label::Key("layer".into())).map(Diagnostic::code),
        Some(DiagnosticCode::MissingDependency)
    );
}

#[test]
fn missing_source_sibling_is_a_missing_dependency() {
    let builder = RegistryBuilder::new();
    register_dependents(&builder);
    builder
        .record(
            ClassSpec::new("Loose")
                .model(
                    ConstructorModel::new()
                        .param_with_default("width", TypeDescriptor::int())
                        .param(
                            "layer",
                            TypeDescriptor::dependent(
                                TypeDescriptor::class("Layer"),
                                [("width", "width")],
                                DependentMode::TypeCheck,
                            ),
                        ),
                )
                .constructor(|_| Ok(())),
        )
        .expect("Loose");
    let orchestrator = Orchestrator::new(builder.build());

    let diagnostic =
        orchestrator.type_check(&TypeDescriptor::class("Loose"), &node(r#"{"layer": {}}"#)).expect("missing");
    assert_eq!(
        diagnostic.child(&Label::Key("layer".into())).map(Diagnostic::code),
        Some(DiagnosticCode::MissingDependency)
    );
    assert!(orchestrator.type_check(&TypeDescriptor::class("Loose"), &node(r#"{"layer": {"width": 2}}"#)).is_none());
}

#[test]
fn dependents_need_a_parameter_scope() {
    let orchestrator = orchestrator();
    let target = TypeDescriptor::dependent(TypeDescriptor::class("Layer"), [("width", "width")], DependentMode::TypeCheck);

    let diagnostic = orchestrator.type_check(&target, &node("{}")).expect("no scope");
    assert_eq!(diagnostic.code(), DiagnosticCode::MissingDependency);
}

#[test]
fn bindings_must_name_declared_parameters() {
    let builder = RegistryBuilder::new();
    register_dependents(&builder);
    builder
        .record(
            ClassSpec::new("Typo")
                .model(ConstructorModel::new().param("width", TypeDescriptor::int()).param(
                    "layer",
                    TypeDescriptor::dependent(
                        TypeDescriptor::class("Layer"),
                        [("depth", "width")],
                        DependentMode::TypeCheck,
                    ),
                ))
                .constructor(|_| Ok(())),
        )
        .expect("Typo");
    let orchestrator = Orchestrator::new(builder.build());

    let diagnostic = orchestrator
        .type_check(&TypeDescriptor::class("Typo"), &node(r#"{"width": 1, "layer": {"width": 1}}"#))
        .expect("unknown target");
    assert_eq!(
        diagnostic.child(&Label::Key("layer".into())).map(Diagnostic::code),
        Some(DiagnosticCode::ExtraLiteral)
    );
}

#[test]
fn long_binding_paths_are_rejected_at_registration() {
    let builder = RegistryBuilder::new();
    register_dependents(&builder);
    let result = builder.record(
        ClassSpec::new("Deep")
            .model(ConstructorModel::new().param("dataset", TypeDescriptor::class("Dataset")).param(
                "window",
                TypeDescriptor::dependent(
                    TypeDescriptor::class("Window"),
                    [("rows", "dataset.meta.rows")],
                    DependentMode::FromObj,
                ),
            ))
            .constructor(|_| Ok(())),
    );
    let error = result.expect_err("too deep");
    assert_eq!(error.diagnostic().map(Diagnostic::code), Some(DiagnosticCode::TooDeepLiteral));
}

#[test]
fn unions_of_dependents_keep_the_parameter_scope() {
    let builder = RegistryBuilder::new();
    register_dependents(&builder);
    let layer = TypeDescriptor::dependent(TypeDescriptor::class("Layer"), [("width", "width")], DependentMode::TypeCheck);
    builder
        .record(
            ClassSpec::new("Either")
                .model(
                    ConstructorModel::new()
                        .param("width", TypeDescriptor::int())
                        .param("layer", TypeDescriptor::union([TypeDescriptor::int(), layer])),
                )
                .constructor(|_| Ok(())),
        )
        .expect("Either");
    let orchestrator = Orchestrator::new(builder.build());

    let target = TypeDescriptor::class("Either");
    assert!(orchestrator.type_check(&target, &node(r#"{"width": 4, "layer": 3}"#)).is_none());
    assert!(orchestrator.type_check(&target, &node(r#"{"width": 4, "layer": {}}"#)).is_none());
    orchestrator.from_obj(&target, &node(r#"{"width": 4, "layer": {"activation": "relu"}}"#)).expect("built");
}

fn bound_experiment(source: &str) -> Orchestrator {
    let builder = RegistryBuilder::new();
    register_dependents(&builder);
    builder
        .record(
            ClassSpec::new("Study")
                .model(ConstructorModel::new().param("dataset", TypeDescriptor::class("Dataset")).param(
                    "window",
                    TypeDescriptor::dependent(
                        TypeDescriptor::class("Window"),
                        [("rows", source)],
                        DependentMode::FromObj,
                    ),
                ))
                .constructor(|_| Ok(())),
        )
        .expect("bound experiment");
    Orchestrator::new(builder.build())
}

#[test]
fn unknown_attribute_paths_fail_the_check() {
    let orchestrator = bound_experiment("dataset.rowz");
    let config = node(r#"{"dataset": {"name": "iris", "rows": 150}, "window": {"size": 10}}"#);

    let diagnostic = orchestrator.type_check(&TypeDescriptor::class("Study"), &config).expect("unknown attribute");
    let window = diagnostic.child(&Label::Key("window".into())).expect("window");
    assert_eq!(window.code(), DiagnosticCode::MissingDependency);
    assert_eq!(window.missing_keys().collect::<Vec<_>>(), ["dataset.rowz"]);
    assert!(orchestrator.from_obj(&TypeDescriptor::class("Study"), &config).is_err());
}

#[test]
fn mistyped_attributes_fail_the_check() {
    let orchestrator = bound_experiment("dataset.name");
    let config = node(r#"{"dataset": {"name": "iris", "rows": 150}, "window": {"size": 10}}"#);

    let diagnostic = orchestrator.type_check(&TypeDescriptor::class("Study"), &config).expect("str into int");
    let window = diagnostic.child(&Label::Key("window".into())).expect("window");
    assert_eq!(window.child(&Label::Key("rows".into())).map(Diagnostic::code), Some(DiagnosticCode::WrongType));

    let error = orchestrator.from_obj(&TypeDescriptor::class("Study"), &config).expect_err("checked first");
    assert!(error.diagnostic().is_some());
}

#[test]
fn explicit_values_skip_the_attribute_check() {
    let orchestrator = bound_experiment("dataset.name");
    let config = node(r#"{"dataset": {"name": "iris", "rows": 150}, "window": {"size": 10, "rows": 40}}"#);
    assert!(orchestrator.type_check(&TypeDescriptor::class("Study"), &config).is_none());
}
