use serde::Serialize;

use crate::config::project_config::BackendSpec;

/// The effective settings of one environment after applying inheritance
/// and project defaults.
///
/// Produced per resolve call and never cached; the stored
/// `EnvironmentDef`s stay untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveEnvironment {
    pub name: String,
    /// Inheritance chain from the root ancestor to this environment.
    pub chain: Vec<String>,
    /// Variable files in merge order: defaults first, then ancestors, then
    /// the environment itself. Each path appears once.
    pub vars_files: Vec<String>,
    /// Nearest backend declared along the chain, if any.
    pub backend: Option<BackendSpec>,
}

impl EffectiveEnvironment {
    /// Backend type for display, `local` when nothing was declared.
    pub fn backend_kind(&self) -> &str {
        self.backend
            .as_ref()
            .map(|b| b.kind.as_str())
            .unwrap_or("local")
    }
}
