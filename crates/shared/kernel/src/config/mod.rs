use crate::error::{KernelError, KernelErrorExt};
use config::{Config, Environment, File};
use forma_domain::config::EngineConfig;
use forma_domain::constants::ENV_PREFIX;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

/// Environment variables handed to the loader instead of the process environment.
pub type EnvMap = config::Map<String, String>;

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// This function implements a layered configuration strategy:
/// 1. **Defaults**: Whatever `T` fills in through `#[serde(default)]`.
/// 2. **Base File**: Settings from `path` (format inferred from the extension), when given.
/// 3. **Environment Overrides**: Values from variables prefixed with `FORMA__`.
///    Nested structures are accessed using double underscores (e.g., `FORMA__LIMITS__MAX_DEPTH`
///    maps to `limits.max_depth`).
///
/// # Arguments
/// * `path`: An optional file path to the configuration source. Without it only defaults and
///   environment variables apply.
///
/// # Errors
/// This function will return an error if:
/// * The specified configuration file cannot be found or parsed.
/// * The merged values do not match the structure of type `T`.
///
/// # Example
/// ```rust
/// use forma_kernel::config::load_config;
/// use forma_domain::config::EngineConfig;
///
/// let cfg: EngineConfig = load_config(None::<&str>).unwrap_or_default();
/// assert!(cfg.limits.max_depth > 0);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, KernelError>
where
    T: DeserializeOwned,
{
    load_config_with_env(path, None)
}

/// Same as [`load_config`], reading overrides from `env` instead of the process environment.
///
/// # Errors
/// See [`load_config`].
pub fn load_config_with_env<T>(
    path: Option<impl AsRef<Path>>,
    env: Option<EnvMap>,
) -> Result<T, KernelError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();

    if let Some(path) = &path {
        let path: &Path = path.as_ref();
        info!(path = %path.display(), "Loading config");
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .source(env),
    );

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Loads [`EngineConfig`] from an optional file and `FORMA__` overrides.
///
/// # Errors
/// See [`load_config`].
pub fn load_engine_config(path: Option<impl AsRef<Path>>) -> Result<EngineConfig, KernelError> {
    load_config(path)
}
