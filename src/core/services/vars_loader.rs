use std::path::Path;

use crate::config::project_config::ProjectConfig;
use crate::core::errors::{Result, TivorError};
use crate::core::models::environment::EffectiveEnvironment;
use crate::core::models::fetch_context::FetchContext;
use crate::core::models::variable::VariableSet;
use crate::core::services::env_resolver::EnvResolver;
use crate::core::services::vars_merger::VarsMerger;
use crate::core::traits::backend::BackendFactory;
use crate::core::traits::parser::VarsParser;

/// Picks the parser for a variable file path.
pub type ParserSelector = fn(&str) -> Box<dyn VarsParser>;

/// Result of loading one environment's variables.
#[derive(Debug, Clone)]
pub struct LoadedVars {
    pub environment: EffectiveEnvironment,
    pub variables: VariableSet,
}

/// Orchestrates a full load: resolve the environment, build its backend,
/// fetch and parse every vars file in order, and merge the results.
///
/// Files are fetched one after another in resolved order. Fetching them
/// concurrently and merging afterwards would give the same result, since
/// only the merge order matters.
pub struct VarsLoader<'a, F: BackendFactory> {
    pub config: &'a ProjectConfig,
    pub backends: &'a F,
    pub parsers: ParserSelector,
    /// Directory relative backend paths are anchored to.
    pub root: &'a Path,
}

impl<F: BackendFactory> VarsLoader<'_, F> {
    /// Resolve `env_name` without touching any file.
    pub fn resolve(&self, env_name: &str) -> Result<EffectiveEnvironment> {
        EnvResolver
            .resolve(self.config, env_name)
            .map_err(|source| TivorError::Resolution {
                env: env_name.to_string(),
                source: Box::new(source),
            })
    }

    /// Load and merge all variable files of `env_name`.
    ///
    /// Any file that cannot be fetched or parsed fails the whole load; no
    /// partial merge is returned.
    pub fn load(&self, ctx: &FetchContext, env_name: &str) -> Result<LoadedVars> {
        let environment = self.resolve(env_name)?;

        if let Some(engine) = self.config.secret_engine() {
            tracing::warn!(
                engine,
                "secret engine declared; vars files are read as-is and must already be decrypted"
            );
        }

        let backend = self.backends.create(environment.backend.as_ref(), self.root)?;
        tracing::info!(
            environment = %environment.name,
            backend = backend.name(),
            files = environment.vars_files.len(),
            "loading variable files"
        );

        let mut sets = Vec::with_capacity(environment.vars_files.len());
        for file in &environment.vars_files {
            ctx.check()?;
            let bytes = backend.fetch(ctx, file)?;
            let content = decode_utf8(bytes, file)?;
            let set = (self.parsers)(file)
                .parse(&content)
                .map_err(|e| e.in_file(file))?;
            tracing::debug!(file = %file, keys = ?set.keys(), "parsed vars file");
            sets.push(set);
        }

        let variables = VarsMerger.merge(&sets);
        for variable in variables.iter() {
            tracing::trace!(
                key = %variable.key,
                kind = variable.value.type_name(),
                line = variable.line,
                "merged variable"
            );
        }
        tracing::info!(
            environment = %environment.name,
            variables = variables.len(),
            "variables merged"
        );

        Ok(LoadedVars {
            environment,
            variables,
        })
    }
}

/// Decode file bytes as UTF-8, reporting the line of the first bad byte.
fn decode_utf8(bytes: Vec<u8>, file: &str) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        TivorError::Parse {
            file: file.to_string(),
            line,
            reason: "file is not valid UTF-8".into(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::adapters::parsers::parser_for_path;
    use crate::adapters::parsers::tfvars_parser::TfvarsParser;
    use crate::config::project_config::BackendSpec;
    use crate::core::models::variable::Value;
    use crate::core::traits::backend::VarsBackend;

    /// In-memory backend serving fixed file contents.
    struct MemoryBackend {
        files: HashMap<String, Vec<u8>>,
    }

    impl VarsBackend for MemoryBackend {
        fn fetch(&self, ctx: &FetchContext, path: &str) -> Result<Vec<u8>> {
            ctx.check()?;
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| TivorError::VarsFileNotFound { path: path.into() })
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    struct MemoryFactory {
        files: HashMap<String, Vec<u8>>,
    }

    impl MemoryFactory {
        fn new(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
                    .collect(),
            }
        }
    }

    impl BackendFactory for MemoryFactory {
        fn create(&self, spec: Option<&BackendSpec>, _root: &Path) -> Result<Box<dyn VarsBackend>> {
            match spec.map(|s| s.kind.as_str()) {
                None | Some("memory") => Ok(Box::new(MemoryBackend {
                    files: self.files.clone(),
                })),
                Some(other) => Err(TivorError::UnsupportedBackend {
                    kind: other.to_string(),
                    supported: "memory".into(),
                }),
            }
        }
    }

    fn config(yaml: &str) -> ProjectConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    const STAGING: &str = r#"
version: "1.0"
defaults:
  vars_files: [common.tfvars]
environments:
  - name: dev
    vars_files: [dev.tfvars]
  - name: staging
    inherits: dev
    vars_files: [staging.tfvars]
"#;

    fn load(config: &ProjectConfig, factory: &MemoryFactory, env: &str) -> Result<LoadedVars> {
        let loader = VarsLoader {
            config,
            backends: factory,
            parsers: parser_for_path,
            root: Path::new("."),
        };
        loader.load(&FetchContext::new(), env)
    }

    #[test]
    fn staging_scenario_merges_in_resolved_order() {
        let config = config(STAGING);
        let factory = MemoryFactory::new(&[
            ("common.tfvars", "region = \"us\"\nproject = \"acme\"\n"),
            ("dev.tfvars", "instance_count = 1\n"),
            ("staging.tfvars", "region = \"eu\"\ninstance_count = 2\n"),
        ]);

        let loaded = load(&config, &factory, "staging").unwrap();

        assert_eq!(
            loaded.environment.vars_files,
            vec!["common.tfvars", "dev.tfvars", "staging.tfvars"]
        );
        assert_eq!(
            loaded.variables.keys(),
            vec!["region", "project", "instance_count"]
        );
        assert_eq!(
            loaded.variables.get("region"),
            Some(&Value::String("eu".into()))
        );

        let rendered = TfvarsParser
            .serialize(&loaded.variables, Some("staging"))
            .unwrap();
        assert_eq!(rendered.matches("region =").count(), 1);
        assert!(rendered.contains("region = \"eu\""));
    }

    #[test]
    fn json_files_are_parsed_by_extension() {
        let config = config(
            "version: '1'\nenvironments:\n  - name: dev\n    vars_files: [a.tfvars, b.tfvars.json]\n",
        );
        let factory = MemoryFactory::new(&[
            ("a.tfvars", "x = 1\n"),
            ("b.tfvars.json", r#"{"x": 2, "y": [true]}"#),
        ]);

        let loaded = load(&config, &factory, "dev").unwrap();

        assert_eq!(loaded.variables.get("x"), Some(&Value::Number("2".into())));
        assert_eq!(
            loaded.variables.get("y"),
            Some(&Value::List(vec![Value::Bool(true)]))
        );
    }

    #[test]
    fn missing_file_fails_whole_load() {
        let config = config(STAGING);
        let factory = MemoryFactory::new(&[("common.tfvars", "a = 1\n"), ("dev.tfvars", "b = 2\n")]);

        let result = load(&config, &factory, "staging");

        assert!(matches!(result, Err(TivorError::VarsFileNotFound { .. })));
    }

    #[test]
    fn parse_error_names_the_file() {
        let config = config(STAGING);
        let factory = MemoryFactory::new(&[
            ("common.tfvars", "a = 1\n"),
            ("dev.tfvars", "b = 2\nbroken\n"),
            ("staging.tfvars", "c = 3\n"),
        ]);

        let err = load(&config, &factory, "staging").unwrap_err();

        match err {
            TivorError::Parse { file, line, .. } => {
                assert_eq!(file, "dev.tfvars");
                assert_eq!(line, 2);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let config = config("version: '1'\nenvironments:\n  - name: dev\n    vars_files: [bad.tfvars]\n");
        let mut factory = MemoryFactory::new(&[]);
        factory
            .files
            .insert("bad.tfvars".into(), b"a = 1\nb = \"\xff\"\n".to_vec());

        let err = load(&config, &factory, "dev").unwrap_err();

        match err {
            TivorError::Parse { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("UTF-8"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_environment_is_resolution_error() {
        let config = config(STAGING);
        let factory = MemoryFactory::new(&[]);

        let err = load(&config, &factory, "prod").unwrap_err();

        match err {
            TivorError::Resolution { env, source } => {
                assert_eq!(env, "prod");
                assert!(matches!(*source, TivorError::EnvironmentNotFound { .. }));
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[test]
    fn backend_errors_propagate() {
        let config = config(
            "version: '1'\nenvironments:\n  - name: dev\n    backend:\n      type: gcs\n",
        );
        let factory = MemoryFactory::new(&[]);

        let result = load(&config, &factory, "dev");

        assert!(matches!(
            result,
            Err(TivorError::UnsupportedBackend { .. })
        ));
    }

    #[test]
    fn cancelled_context_stops_loading() {
        let config = config(STAGING);
        let factory = MemoryFactory::new(&[]);
        let loader = VarsLoader {
            config: &config,
            backends: &factory,
            parsers: parser_for_path,
            root: Path::new("."),
        };
        let ctx = FetchContext::new();
        ctx.cancel();

        let result = loader.load(&ctx, "staging");

        assert!(matches!(result, Err(TivorError::Cancelled)));
    }

    #[test]
    fn environment_without_files_yields_empty_set() {
        let config = config("version: '1'\nenvironments:\n  - name: dev\n");
        let factory = MemoryFactory::new(&[]);

        let loaded = load(&config, &factory, "dev").unwrap();

        assert!(loaded.variables.is_empty());
        assert_eq!(loaded.environment.backend_kind(), "local");
    }
}
