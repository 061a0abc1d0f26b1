#![allow(dead_code)]

use forma_domain::config::EngineConfig;
use forma_domain::descriptor::{DependentMode, TypeDescriptor};
use forma_domain::instance::{Instance, Member};
use forma_engine::prelude::*;
use forma_tree::{Node, Tree};

#[derive(Debug, Clone, PartialEq)]
pub struct Beef {
    pub weight: f64,
    pub feed: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pork {
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Apple;

#[derive(Debug, Clone, PartialEq)]
pub struct Avocado {
    pub ripe: bool,
}

/// Every class of the `GrandParent` hierarchy builds one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct Family {
    pub class: &'static str,
    pub base: i64,
    pub extra: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub lift: String,
    pub reps: i64,
    pub weight: f64,
    pub maxed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub rows: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub size: i64,
    pub rows: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub width: i64,
    pub activation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Temperature {
    pub scale: &'static str,
    pub value: f64,
}

/// Parses a JSON literal into a configuration node.
///
/// # Panics
/// * If `json` is not valid JSON.
#[must_use]
pub fn node(json: &str) -> Node {
    let value: serde_json::Value = serde_json::from_str(json).expect("fixture json");
    Node::from(value)
}

#[must_use]
pub fn tree(json: &str) -> Tree {
    match node(json) {
        Node::Map(tree) => tree,
        other => panic!("fixture is not a mapping: {other}"),
    }
}

/// Food → (Meat → beef, pork), (Fruit → apple, avocado). Meat and Fruit are unnamed.
///
/// # Panics
/// * If a registration is rejected.
pub fn register_food(builder: &RegistryBuilder) {
    builder
        .enumeration(EnumSpec::new("FeedType").member("Grass").member("Corn").member("Unknown"))
        .expect("FeedType");
    builder.root(ClassSpec::new("Food")).expect("Food");
    builder
        .intermediate(
            "Food",
            ClassSpec::new("Meat").model(ConstructorModel::new().inherit().param("weight", TypeDescriptor::float())),
        )
        .expect("Meat");
    builder
        .register(
            "Meat",
            "beef",
            ClassSpec::new("Beef")
                .model(
                    ConstructorModel::new()
                        .inherit()
                        .param_with_default("feed", TypeDescriptor::enumeration("FeedType")),
                )
                .constructor(|args| {
                    let feed = args.take_opt::<Member>("feed")?.map_or_else(|| "Corn".to_owned(), |m| m.name.to_string());
                    Ok(Beef { weight: args.take("weight")?, feed })
                }),
        )
        .expect("Beef");
    builder
        .register(
            "Meat",
            "pork",
            ClassSpec::new("Pork").constructor(|args| Ok(Pork { weight: args.take("weight")? })),
        )
        .expect("Pork");
    builder.intermediate("Food", ClassSpec::new("Fruit")).expect("Fruit");
    builder
        .register("Fruit", "apple", ClassSpec::new("Apple").constructor(|_| Ok(Apple)))
        .expect("Apple");
    builder
        .register(
            "Fruit",
            "avocado",
            ClassSpec::new("Avocado")
                .model(ConstructorModel::new().inherit().param("ripe", TypeDescriptor::bool()))
                .constructor(|args| Ok(Avocado { ripe: args.take("ripe")? })),
        )
        .expect("Avocado");
}

fn family(class: &'static str, extra: bool) -> ClassSpec {
    let model = if extra {
        ConstructorModel::new().inherit().param("extra", TypeDescriptor::str())
    } else {
        ConstructorModel::new().inherit()
    };
    ClassSpec::new(class).model(model).constructor(move |args| {
        Ok(Family { class, base: args.take("base")?, extra: args.take_opt("extra")? })
    })
}

/// `GrandParent` → `ParentA` "a" → (`Child0` "0", `Child1` "1");
/// `GrandParent` → `ParentB` "b" → `Child2` "2" → `DeepChild` "0".
///
/// `DeepChild` reuses `Child0`'s discriminator one level further down.
///
/// # Panics
/// * If a registration is rejected.
pub fn register_family(builder: &RegistryBuilder) {
    builder.root(ClassSpec::new("GrandParent")).expect("GrandParent");
    let parent = |name: &'static str| {
        ClassSpec::new(name)
            .model(ConstructorModel::new().inherit().param("base", TypeDescriptor::int()))
            .constructor(move |args| Ok(Family { class: name, base: args.take("base")?, extra: None }))
    };
    builder.register("GrandParent", "a", parent("ParentA")).expect("ParentA");
    builder.register("GrandParent", "b", parent("ParentB")).expect("ParentB");
    builder.register("ParentA", "0", family("Child0", true)).expect("Child0");
    builder.register("ParentA", "1", family("Child1", false)).expect("Child1");
    builder.register("ParentB", "2", family("Child2", true)).expect("Child2");
    builder.register("Child2", "0", family("DeepChild", true)).expect("DeepChild");
}

/// `Workout` record over the `Lift` enumeration.
///
/// # Panics
/// * If a registration is rejected.
pub fn register_gym(builder: &RegistryBuilder) {
    builder
        .enumeration(EnumSpec::new("Lift").member("Squat").member("Bench").member("Deadlift"))
        .expect("Lift");
    builder
        .record(
            ClassSpec::new("Workout")
                .model(
                    ConstructorModel::new()
                        .param("lift", TypeDescriptor::enumeration("Lift"))
                        .param("reps", TypeDescriptor::int())
                        .param("weight", TypeDescriptor::float())
                        .param_with_default("maxed", TypeDescriptor::bool()),
                )
                .constructor(|args| {
                    Ok(Workout {
                        lift: args.take::<Member>("lift")?.name.to_string(),
                        reps: args.take("reps")?,
                        weight: args.take("weight")?,
                        maxed: args.take_or("maxed", false)?,
                    })
                }),
        )
        .expect("Workout");
}

/// Records with dependent parameters.
///
/// `Experiment.window.rows` is read from the built `dataset`; `Pipeline.layer.width`
/// is copied from the raw `width` sibling and checked as `Layer.width`.
///
/// # Panics
/// * If a registration is rejected.
pub fn register_dependents(builder: &RegistryBuilder) {
    builder
        .record(
            ClassSpec::new("Dataset")
                .model(ConstructorModel::new().param("name", TypeDescriptor::str()).param("rows", TypeDescriptor::int()))
                .constructor(|args| Ok(Dataset { name: args.take("name")?, rows: args.take("rows")? })),
        )
        .expect("Dataset");
    builder
        .record(
            ClassSpec::new("Window")
                .model(ConstructorModel::new().param("size", TypeDescriptor::int()).param("rows", TypeDescriptor::int()))
                .constructor(|args| {
                    let window = Window { size: args.take("size")?, rows: args.take("rows")? };
                    if window.size > window.rows {
                        return Err(EngineError::construction(format!(
                            "window of {} does not fit {} rows",
                            window.size, window.rows
                        )));
                    }
                    Ok(window)
                }),
        )
        .expect("Window");
    builder
        .record(
            ClassSpec::new("Experiment")
                .model(
                    ConstructorModel::new().param("dataset", TypeDescriptor::class("Dataset")).param(
                        "window",
                        TypeDescriptor::dependent(
                            TypeDescriptor::class("Window"),
                            [("rows", "dataset.rows")],
                            DependentMode::FromObj,
                        ),
                    ),
                )
                .constructor(|args| {
                    let dataset: std::sync::Arc<Dataset> = args.take("dataset")?;
                    let window: std::sync::Arc<Window> = args.take("window")?;
                    Ok((dataset, window))
                }),
        )
        .expect("Experiment");
    builder
        .record(
            ClassSpec::new("Layer")
                .model(
                    ConstructorModel::new()
                        .param("width", TypeDescriptor::int())
                        .param_with_default("activation", TypeDescriptor::literal(["relu", "tanh"])),
                )
                .constructor(|args| {
                    Ok(Layer { width: args.take("width")?, activation: args.take_or("activation", "relu".to_owned())? })
                }),
        )
        .expect("Layer");
    builder
        .record(
            ClassSpec::new("Pipeline")
                .model(ConstructorModel::new().param("width", TypeDescriptor::int()).param(
                    "layer",
                    TypeDescriptor::dependent(
                        TypeDescriptor::class("Layer"),
                        [("width", "width")],
                        DependentMode::TypeCheck,
                    ),
                ))
                .constructor(|args| {
                    let width: i64 = args.take("width")?;
                    let layer: std::sync::Arc<Layer> = args.take("layer")?;
                    Ok((width, layer))
                }),
        )
        .expect("Pipeline");
}

/// Two records with identical parameters, for union precedence.
///
/// # Panics
/// * If a registration is rejected.
pub fn register_temperatures(builder: &RegistryBuilder) {
    for scale in ["Celsius", "Kelvin"] {
        builder
            .record(
                ClassSpec::new(scale)
                    .model(ConstructorModel::new().param("value", TypeDescriptor::float()))
                    .constructor(move |args| Ok(Temperature { scale, value: args.take("value")? })),
            )
            .expect("temperature");
    }
}

/// All fixtures on a registry with `config`.
#[must_use]
pub fn registry_with(config: EngineConfig) -> Registry {
    let builder = RegistryBuilder::with_config(config);
    register_food(&builder);
    register_family(&builder);
    register_gym(&builder);
    register_dependents(&builder);
    register_temperatures(&builder);
    builder.build()
}

#[must_use]
pub fn registry() -> Registry {
    registry_with(EngineConfig::default())
}

#[must_use]
pub fn orchestrator() -> Orchestrator {
    Orchestrator::new(registry())
}

/// Downcasts a built object to `T`.
///
/// # Panics
/// * If `instance` is not an object holding a `T`.
#[must_use]
pub fn value<T: Clone + 'static>(instance: &Instance) -> T {
    instance
        .as_object()
        .and_then(|o| o.downcast_ref::<T>())
        .cloned()
        .unwrap_or_else(|| panic!("expected {}, found {instance:?}", std::any::type_name::<T>()))
}
