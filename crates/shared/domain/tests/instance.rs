use forma_domain::error::InstanceError;
use forma_domain::instance::{Arguments, Instance, Object};
use forma_tree::Node;
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, PartialEq)]
struct Apple {
    weight: f64,
}

fn arguments() -> Arguments {
    let mut values = IndexMap::new();
    values.insert("name".to_owned(), Instance::Str("ada".into()));
    values.insert("reps".to_owned(), Instance::Int(5));
    values.insert("weight".to_owned(), Instance::Int(60));
    values.insert("tags".to_owned(), Instance::Seq(vec![Instance::Str("a".into())]));
    values.insert("pair".to_owned(), Instance::Tuple(vec![Instance::Int(1), Instance::Str("x".into())]));
    values.insert("nothing".to_owned(), Instance::Null);
    let apple = Object::new("Apple", IndexMap::new(), Arc::new(Apple { weight: 0.2 }));
    values.insert("fruit".to_owned(), Instance::Object(apple));
    Arguments::new("Workout", values, IndexMap::new())
}

#[test]
fn take_converts_primitives() {
    let mut args = arguments();
    assert_eq!(args.take::<String>("name").expect("name"), "ada");
    assert_eq!(args.take::<u32>("reps").expect("reps"), 5);
    assert!((args.take::<f64>("weight").expect("widened") - 60.0).abs() < f64::EPSILON);
    assert_eq!(args.take::<Vec<String>>("tags").expect("tags"), vec!["a".to_owned()]);
    assert_eq!(args.take::<(i64, String)>("pair").expect("pair"), (1, "x".to_owned()));
}

#[test]
fn take_reports_missing_and_mismatched_arguments() {
    let mut args = arguments();
    assert!(matches!(args.take::<String>("absent"), Err(InstanceError::Missing { .. })));
    assert!(matches!(args.take::<bool>("name"), Err(InstanceError::Mismatch { .. })));
    // Consumed even when the conversion fails.
    assert!(!args.contains("name"));
}

#[test]
fn optional_arguments_treat_null_as_absent() {
    let mut args = arguments();
    assert_eq!(args.take_opt::<String>("nothing").expect("null"), None);
    assert_eq!(args.take_opt::<String>("absent").expect("absent"), None);
    assert_eq!(args.take_or("absent", 3_i64).expect("default"), 3);
}

#[test]
fn objects_downcast_to_their_value() {
    let mut args = arguments();
    let apple: Arc<Apple> = args.take("fruit").expect("apple");
    assert_eq!(*apple, Apple { weight: 0.2 });
}

#[test]
fn instances_convert_back_to_nodes() {
    let node = Node::from(serde_json::json!({"a": [1, 2.5, "x", null]}));
    let instance = Instance::from(&node);
    assert_eq!(instance.to_node(), Some(node));
    assert_eq!(instance.attribute("a").map(Instance::kind), Some("sequence"));
}
