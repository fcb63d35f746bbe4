use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::errors::{Result, TivorError};
use crate::core::services::env_resolver::EnvResolver;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "tivor.yaml";

/// Top-level tivor configuration read from `tivor.yaml` (or `tivor.toml`).
///
/// Unknown fields are ignored so older binaries keep reading newer files.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub version: String,
    pub defaults: Option<Defaults>,
    pub secrets: Option<Secrets>,
    #[serde(default)]
    pub environments: Vec<EnvironmentDef>,
}

/// Project-wide fallbacks applied to every environment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub vars_files: Vec<String>,
}

/// Secret engine declaration. tivor records it but never decrypts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Secrets {
    pub engine: String,
    pub sops_config_path: Option<String>,
}

/// One entry of the `environments` list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvironmentDef {
    #[serde(default)]
    pub name: String,
    pub inherits: Option<String>,
    #[serde(default)]
    pub vars_files: Vec<String>,
    pub backend: Option<BackendSpec>,
}

/// Backend descriptor: a `type` tag plus a backend-specific map.
///
/// The map is turned into a typed configuration by `BackendRegistry`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackendSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl ProjectConfig {
    /// Load and validate the configuration file at `path`.
    ///
    /// `.toml` files are read as TOML, everything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TivorError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
        .map_err(|detail| TivorError::InvalidConfig {
            path: path.to_path_buf(),
            detail,
        })?;

        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            version = %config.version,
            environments = config.environments.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    fn from_yaml_str(content: &str) -> std::result::Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Check the structural invariants of the document.
    ///
    /// - `version` is present
    /// - at least one environment exists, every name is valid and unique
    /// - every `inherits` names an existing environment
    /// - the inheritance graph has no cycles
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(TivorError::ConfigValidation {
                detail: "version field is required".into(),
            });
        }

        if self.environments.is_empty() {
            return Err(TivorError::ConfigValidation {
                detail: "at least one environment is required".into(),
            });
        }

        let mut names = HashSet::new();
        for env in &self.environments {
            validate_env_name(&env.name)?;
            if !names.insert(env.name.as_str()) {
                return Err(TivorError::ConfigValidation {
                    detail: format!("duplicate environment name: {}", env.name),
                });
            }
        }

        for env in &self.environments {
            if let Some(parent) = &env.inherits {
                if !names.contains(parent.as_str()) {
                    return Err(TivorError::MissingParent {
                        env: env.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        let resolver = EnvResolver;
        for env in &self.environments {
            resolver.build_chain(&env.name, self)?;
        }

        Ok(())
    }

    /// Look up an environment definition by name.
    pub fn environment(&self, name: &str) -> Option<&EnvironmentDef> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// Comma-separated environment names, for error messages.
    pub fn environment_names(&self) -> String {
        if self.environments.is_empty() {
            return "(none)".into();
        }
        self.environments
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Secret engine name, when one is declared.
    pub fn secret_engine(&self) -> Option<&str> {
        self.secrets
            .as_ref()
            .map(|s| s.engine.as_str())
            .filter(|e| !e.is_empty())
    }
}

/// Validate an environment name.
///
/// Names end up as file stems (`<name>.tfvars`), so they must not contain
/// path separators or start with a dot.
pub fn validate_env_name(name: &str) -> Result<()> {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("environment name pattern is valid")
    });

    if name.is_empty() {
        return Err(TivorError::ConfigValidation {
            detail: "environment name is required".into(),
        });
    }
    if !re.is_match(name) {
        return Err(TivorError::ConfigValidation {
            detail: format!(
                "invalid environment name '{name}': use letters, digits, '_', '-' or '.', \
                 starting with a letter or digit"
            ),
        });
    }
    Ok(())
}
