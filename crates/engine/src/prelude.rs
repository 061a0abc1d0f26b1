pub use crate::alter::{Alter, EnvAlter, UserDictAlter};
pub use crate::diagnostic::{Detail, Diagnostic, DiagnosticCode, Label};
pub use crate::error::{EngineError, EngineErrorExt};
pub use crate::model::{ConstructorModel, ExtraKeys};
pub use crate::orchestrator::{Orchestrator, OrchestratorBuilder};
pub use crate::registry::{ClassId, ClassKind, ClassSpec, EnumSpec, Registry, RegistryBuilder};
pub use crate::unit::Unit;
