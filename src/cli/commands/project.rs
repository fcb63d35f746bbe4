use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::adapters::backends::registry::BackendRegistry;
use crate::adapters::parsers::json_vars_parser::JsonVarsParser;
use crate::adapters::parsers::parser_for_path;
use crate::adapters::parsers::tfvars_parser::TfvarsParser;
use crate::cli::OutputFormat;
use crate::config::project_config::ProjectConfig;
use crate::core::errors::Result;
use crate::core::models::environment::EffectiveEnvironment;
use crate::core::models::fetch_context::FetchContext;
use crate::core::models::variable::VariableSet;
use crate::core::services::vars_loader::{LoadedVars, VarsLoader};
use crate::core::traits::parser::VarsParser;

/// A loaded configuration plus the directory relative paths hang off.
pub struct Project {
    pub config: ProjectConfig,
    pub root: PathBuf,
    backends: BackendRegistry,
}

impl Project {
    /// Load the configuration at `config_path`.
    ///
    /// Relative `vars_files` and local backend paths are anchored to the
    /// current working directory, wherever the configuration file lives.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = ProjectConfig::load(config_path)?;
        Ok(Self {
            config,
            root: PathBuf::from("."),
            backends: BackendRegistry::builtin(),
        })
    }

    fn loader(&self) -> VarsLoader<'_, BackendRegistry> {
        VarsLoader {
            config: &self.config,
            backends: &self.backends,
            parsers: parser_for_path,
            root: &self.root,
        }
    }

    pub fn resolve(&self, env: &str) -> Result<EffectiveEnvironment> {
        self.loader().resolve(env)
    }

    pub fn load_vars(&self, ctx: &FetchContext, env: &str) -> Result<LoadedVars> {
        self.loader().load(ctx, env)
    }
}

/// Render merged variables in the requested syntax.
pub fn render(vars: &VariableSet, env: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Tfvars => TfvarsParser.serialize(vars, Some(env)),
        OutputFormat::Json => JsonVarsParser.serialize(vars, Some(env)),
    }
}

/// SHA256 hex digest of rendered output.
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::variable::{Value, Variable};

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(fingerprint("a = 1\n").len(), 64);
    }

    #[test]
    fn load_resolves_without_reading_vars_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tivor.yaml");
        std::fs::write(
            &path,
            "version: '1'\nenvironments:\n  - name: dev\n    vars_files: [missing.tfvars]\n",
        )
        .unwrap();

        let project = Project::load(&path).unwrap();
        let resolved = project.resolve("dev").unwrap();

        assert_eq!(project.root, PathBuf::from("."));
        assert_eq!(resolved.vars_files, vec!["missing.tfvars"]);
    }

    #[test]
    fn render_formats() {
        let mut vars = VariableSet::new();
        vars.insert(Variable::new("a", Value::Bool(true), 1));

        assert_eq!(
            render(&vars, "dev", OutputFormat::Tfvars).unwrap(),
            "# Generated by tivor for environment: dev\na = true\n"
        );
        assert_eq!(
            render(&vars, "dev", OutputFormat::Json).unwrap(),
            "{\n  \"a\": true\n}\n"
        );
    }
}
