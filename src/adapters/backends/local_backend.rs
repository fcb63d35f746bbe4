use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::errors::{Result, TivorError};
use crate::core::models::fetch_context::FetchContext;
use crate::core::traits::backend::VarsBackend;

/// Typed configuration of the `local` backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalBackendConfig {
    /// Base directory for relative vars file paths.
    pub path: Option<PathBuf>,
}

/// Reads variable files from the local filesystem.
///
/// Relative paths are joined onto `base_dir`; absolute paths are used as
/// given.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    base_dir: PathBuf,
}

impl LocalBackend {
    /// Create a backend rooted at `root`, or at `config.path` resolved
    /// against `root` when one is configured.
    pub fn new(config: LocalBackendConfig, root: &Path) -> Self {
        let base_dir = match config.path {
            Some(path) if path.is_absolute() => path,
            Some(path) => root.join(path),
            None => root.to_path_buf(),
        };
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn full_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl VarsBackend for LocalBackend {
    fn fetch(&self, ctx: &FetchContext, path: &str) -> Result<Vec<u8>> {
        ctx.check()?;

        let full_path = self.full_path(path);
        match std::fs::read(&full_path) {
            Ok(content) => {
                tracing::debug!(path = %full_path.display(), bytes = content.len(), "read vars file");
                Ok(content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TivorError::VarsFileNotFound { path: full_path })
            }
            Err(source) => Err(TivorError::BackendIo {
                path: full_path,
                source,
            }),
        }
    }

    fn name(&self) -> &str {
        "local"
    }
}
