use std::path::Path;

use crate::config::project_config::BackendSpec;
use crate::core::errors::Result;
use crate::core::models::fetch_context::FetchContext;

/// Port for sources of variable-file bytes.
///
/// Implementations live in `adapters::backends`. The loader only depends on
/// this trait and obtains concrete backends from a `BackendFactory`.
pub trait VarsBackend: Send + Sync {
    /// Retrieve the raw content of the variable file at `path`.
    ///
    /// Implementations must honour `ctx` cancellation before doing I/O.
    fn fetch(&self, ctx: &FetchContext, path: &str) -> Result<Vec<u8>>;

    /// Backend type name as written in `tivor.yaml` (e.g. "local").
    fn name(&self) -> &str;
}

/// Port for turning a resolved backend descriptor into a `VarsBackend`.
///
/// `root` is the project root that relative paths are anchored to. An
/// absent descriptor must yield a local backend rooted at `root`.
pub trait BackendFactory {
    fn create(&self, spec: Option<&BackendSpec>, root: &Path) -> Result<Box<dyn VarsBackend>>;
}
