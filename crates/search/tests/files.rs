use forma_domain::descriptor::TypeDescriptor;
use forma_engine::model::ConstructorModel;
use forma_engine::orchestrator::Orchestrator;
use forma_engine::registry::{ClassSpec, RegistryBuilder};
use forma_search::prelude::*;
use forma_tree::{Node, Tree};
use std::fs;

fn expander() -> GridExpander {
    let builder = RegistryBuilder::new();
    register(&builder).expect("search classes");
    builder
        .record(
            ClassSpec::new("Model")
                .model(
                    ConstructorModel::new()
                        .param("name", TypeDescriptor::str())
                        .param("optimizer", TypeDescriptor::mapping(TypeDescriptor::any())),
                )
                .constructor(|_| Ok(())),
        )
        .expect("Model");
    GridExpander::new(Orchestrator::new(builder.build())).expect("expander")
}

#[test]
fn each_document_is_one_point() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sgd = dir.path().join("sgd.json");
    let adam = dir.path().join("adam.toml");
    fs::write(&sgd, r#"{"optimizer": {"kind": "sgd", "lr": 0.1}}"#).expect("write json");
    fs::write(&adam, "name = \"adam-run\"\n\n[optimizer]\nkind = \"adam\"\nbetas = [0.9, 0.999]\n").expect("write toml");

    let config = Tree::from_json(&format!(
        r#"{{"name": "base", "optimizer": {{"kind": "none"}}, "search": {{"type": "file_grid_search", "filenames": [{:?}, {:?}]}}}}"#,
        sgd.display().to_string(),
        adam.display().to_string(),
    ))
    .expect("config");

    let configs = expander().expand(&TypeDescriptor::class("Model"), &config).expect("expanded");
    assert_eq!(configs.len(), 2);

    assert_eq!(configs[0].get("name"), Some(&Node::from("base")));
    assert_eq!(configs[0].get_path("optimizer.kind"), Some(&Node::from("sgd")));
    assert_eq!(configs[0].get_path("optimizer.lr"), Some(&Node::Float(0.1)));

    assert_eq!(configs[1].get("name"), Some(&Node::from("adam-run")));
    assert_eq!(configs[1].get_path("optimizer.betas.1"), Some(&Node::Float(0.999)));
    assert!(configs[1].get_path("optimizer.lr").is_none());
}

#[test]
fn file_searches_compose_with_grids() {
    let dir = tempfile::tempdir().expect("tempdir");
    let point = dir.path().join("point.json");
    fs::write(&point, r#"{"optimizer": {"kind": "sgd"}}"#).expect("write json");

    let config = Tree::from_json(&format!(
        r#"{{"name": "base", "optimizer": {{}}, "search": {{"type": "base_grid_search", "search_space": [
            {{"type": "file_grid_search", "filenames": [{:?}]}},
            {{"type": "base_grid", "keys": "optimizer.lr", "values": [0.1, 0.2]}}
        ]}}}}"#,
        point.display().to_string(),
    ))
    .expect("config");

    let configs = expander().expand(&TypeDescriptor::class("Model"), &config).expect("expanded");
    assert_eq!(configs.len(), 2);
    assert!(configs.iter().all(|c| c.get_path("optimizer.kind") == Some(&Node::from("sgd"))));
    assert_eq!(configs[1].get_path("optimizer.lr"), Some(&Node::Float(0.2)));
}

#[test]
fn unsupported_documents_fail_the_expansion() {
    let dir = tempfile::tempdir().expect("tempdir");
    let point = dir.path().join("point.yaml");
    fs::write(&point, "optimizer: {}\n").expect("write yaml");

    let config = Tree::from_json(&format!(
        r#"{{"name": "base", "optimizer": {{}}, "search": {{"type": "file_grid_search", "filenames": [{:?}]}}}}"#,
        point.display().to_string(),
    ))
    .expect("config");

    let error = expander().expand(&TypeDescriptor::class("Model"), &config).expect_err("yaml");
    assert!(matches!(error, SearchError::Kernel { .. }), "{error:?}");
}
