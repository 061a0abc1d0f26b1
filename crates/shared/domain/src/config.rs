use crate::constants::DISCRIMINATOR_KEY;
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Engine settings shared by the registry, the orchestrator and the units.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfigInner {
    pub limits: LimitsConfig,
    pub schema: SchemaConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(flatten, default)]
    inner: Arc<EngineConfigInner>,
}

impl Deref for EngineConfig {
    type Target = EngineConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for EngineConfig {
    fn deref_mut(&mut self) -> &mut EngineConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Recursion guards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum nesting of dispatches for one call before `TooDeepLiteral` is reported.
    pub max_depth: usize,
    /// Maximum segments in a dependent binding path (`sibling.attribute`).
    pub max_dependency_depth: usize,
}

/// How configuration documents are read.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub discriminator_key: String,
    /// Accept integer nodes where a float is declared.
    pub widen_int_to_float: bool,
}

// --- Default ---

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_depth: 64, max_dependency_depth: 2 }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self { discriminator_key: DISCRIMINATOR_KEY.to_owned(), widen_int_to_float: true }
    }
}
