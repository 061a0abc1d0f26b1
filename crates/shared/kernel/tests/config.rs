use forma_domain::config::EngineConfig;
use forma_kernel::KernelError;
use forma_kernel::config::{EnvMap, load_config_with_env, load_engine_config};
use serial_test::serial;
use std::io::Write;

fn env(pairs: &[(&str, &str)]) -> EnvMap {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

#[test]
#[serial]
fn defaults_apply_without_file() {
    let cfg: EngineConfig =
        load_config_with_env(None::<&str>, Some(EnvMap::default())).expect("defaults");
    assert_eq!(cfg.limits.max_depth, 64);
    assert_eq!(cfg.schema.discriminator_key, "type");
}

#[test]
#[serial]
fn file_values_are_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("forma.toml");
    let mut file = std::fs::File::create(&path).expect("create");
    writeln!(file, "[limits]\nmax_depth = 12\n\n[schema]\ndiscriminator_key = \"kind\"").expect("write");

    let cfg: EngineConfig =
        load_config_with_env(Some(&path), Some(EnvMap::default())).expect("file config");
    assert_eq!(cfg.limits.max_depth, 12);
    assert_eq!(cfg.limits.max_dependency_depth, 2);
    assert_eq!(cfg.schema.discriminator_key, "kind");
}

#[test]
#[serial]
fn environment_overrides_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("forma.json");
    std::fs::write(&path, r#"{"limits": {"max_depth": 12}}"#).expect("write");

    let overrides = env(&[("FORMA__LIMITS__MAX_DEPTH", "5"), ("FORMA__SCHEMA__WIDEN_INT_TO_FLOAT", "false")]);
    let cfg: EngineConfig = load_config_with_env(Some(&path), Some(overrides)).expect("config");
    assert_eq!(cfg.limits.max_depth, 5);
    assert!(!cfg.schema.widen_int_to_float);
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_engine_config(Some(dir.path().join("absent.toml"))).expect_err("missing file");
    assert!(matches!(err, KernelError::Config { .. }));
}
