use serde::de::DeserializeOwned;
use std::path::Path;

use crate::adapters::backends::local_backend::{LocalBackend, LocalBackendConfig};
use crate::adapters::backends::s3_backend::S3BackendConfig;
use crate::config::project_config::BackendSpec;
use crate::core::errors::{Result, TivorError};
use crate::core::traits::backend::{BackendFactory, VarsBackend};

type Constructor = fn(&BackendSpec, &Path) -> Result<Box<dyn VarsBackend>>;

/// Maps backend `type` names to constructors.
///
/// Each constructor converts the open `config` map of a `BackendSpec` into
/// its own typed configuration before building the backend.
pub struct BackendRegistry {
    entries: Vec<(&'static str, Constructor)>,
}

impl BackendRegistry {
    /// Registry with the backends shipped with tivor.
    pub fn builtin() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
        };
        registry.register("local", build_local);
        registry.register("s3", build_s3);
        registry
    }

    /// Add or replace the constructor for `kind`.
    pub fn register(&mut self, kind: &'static str, constructor: Constructor) {
        self.entries.retain(|(k, _)| *k != kind);
        self.entries.push((kind, constructor));
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }
}

impl BackendFactory for BackendRegistry {
    /// Build the backend described by `spec`, or a `local` backend rooted
    /// at `root` when no backend is declared.
    ///
    /// # Errors
    ///
    /// - `UnsupportedBackend` for an unknown `type`.
    /// - `InvalidBackendConfig` when `config` does not fit the type.
    /// - `BackendNotImplemented` for types that are declared but not
    ///   available yet (`s3`).
    fn create(&self, spec: Option<&BackendSpec>, root: &Path) -> Result<Box<dyn VarsBackend>> {
        let Some(spec) = spec else {
            return Ok(Box::new(LocalBackend::new(LocalBackendConfig::default(), root)));
        };

        let constructor = self
            .entries
            .iter()
            .find(|(k, _)| *k == spec.kind)
            .map(|(_, c)| *c)
            .ok_or_else(|| TivorError::UnsupportedBackend {
                kind: spec.kind.clone(),
                supported: self.kinds().join(", "),
            })?;

        constructor(spec, root)
    }
}

/// Convert a spec's open config map into a backend's typed configuration.
fn typed_config<T: DeserializeOwned>(spec: &BackendSpec) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(spec.config.clone())).map_err(|e| {
        TivorError::InvalidBackendConfig {
            kind: spec.kind.clone(),
            detail: e.to_string(),
        }
    })
}

fn build_local(spec: &BackendSpec, root: &Path) -> Result<Box<dyn VarsBackend>> {
    let config: LocalBackendConfig = typed_config(spec)?;
    let backend = LocalBackend::new(config, root);
    tracing::debug!(base_dir = %backend.base_dir().display(), "using local backend");
    Ok(Box::new(backend))
}

fn build_s3(spec: &BackendSpec, _root: &Path) -> Result<Box<dyn VarsBackend>> {
    let config: S3BackendConfig = typed_config(spec)?;
    tracing::debug!(
        bucket = %config.bucket,
        key = ?config.key,
        region = ?config.region,
        lock_table = ?config.dynamodb_table,
        "s3 backend requested"
    );
    Err(TivorError::BackendNotImplemented {
        kind: spec.kind.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fetch_context::FetchContext;

    fn spec(kind: &str, config: serde_json::Value) -> BackendSpec {
        let serde_json::Value::Object(config) = config else {
            panic!("config must be an object");
        };
        BackendSpec {
            kind: kind.to_string(),
            config,
        }
    }

    #[test]
    fn absent_spec_defaults_to_local_at_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.tfvars"), "a = 1").unwrap();

        let backend = BackendRegistry::builtin().create(None, dir.path()).unwrap();

        assert_eq!(backend.name(), "local");
        assert_eq!(
            backend.fetch(&FetchContext::new(), "a.tfvars").unwrap(),
            b"a = 1"
        );
    }

    #[test]
    fn local_spec_with_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("vars")).unwrap();
        std::fs::write(dir.path().join("vars/a.tfvars"), "a = 2").unwrap();
        let spec = spec("local", serde_json::json!({ "path": "vars" }));

        let backend = BackendRegistry::builtin()
            .create(Some(&spec), dir.path())
            .unwrap();

        assert_eq!(
            backend.fetch(&FetchContext::new(), "a.tfvars").unwrap(),
            b"a = 2"
        );
    }

    #[test]
    fn local_spec_with_invalid_path_type() {
        let spec = spec("local", serde_json::json!({ "path": 42 }));

        let result = BackendRegistry::builtin().create(Some(&spec), Path::new("."));

        assert!(matches!(
            result,
            Err(TivorError::InvalidBackendConfig { .. })
        ));
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let spec = spec("gcs", serde_json::json!({}));

        let err = BackendRegistry::builtin()
            .create(Some(&spec), Path::new("."))
            .err()
            .unwrap();

        match err {
            TivorError::UnsupportedBackend { kind, supported } => {
                assert_eq!(kind, "gcs");
                assert_eq!(supported, "local, s3");
            }
            other => panic!("expected unsupported backend, got {other:?}"),
        }
    }

    #[test]
    fn s3_is_not_implemented() {
        let spec = spec("s3", serde_json::json!({ "bucket": "state" }));

        let result = BackendRegistry::builtin().create(Some(&spec), Path::new("."));

        assert!(matches!(
            result,
            Err(TivorError::BackendNotImplemented { .. })
        ));
    }

    #[test]
    fn s3_config_is_validated_first() {
        let spec = spec("s3", serde_json::json!({ "region": "eu-west-1" }));

        let result = BackendRegistry::builtin().create(Some(&spec), Path::new("."));

        assert!(matches!(
            result,
            Err(TivorError::InvalidBackendConfig { .. })
        ));
    }

    #[test]
    fn register_replaces_existing_kind() {
        fn always_unsupported(spec: &BackendSpec, _: &Path) -> Result<Box<dyn VarsBackend>> {
            Err(TivorError::BackendNotImplemented {
                kind: spec.kind.clone(),
            })
        }
        let mut registry = BackendRegistry::builtin();
        registry.register("local", always_unsupported);

        assert_eq!(registry.kinds(), vec!["s3", "local"]);
        let spec = spec("local", serde_json::json!({}));
        assert!(registry.create(Some(&spec), Path::new(".")).is_err());
    }
}
