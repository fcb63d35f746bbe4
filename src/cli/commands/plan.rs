use std::path::Path;

use crate::cli::commands::project::Project;
use crate::cli::commands::terraform_helpers::{self, TerraformAction};
use crate::core::errors::Result;
use crate::core::models::fetch_context::FetchContext;

/// Execute the `tivor plan <env>` command.
pub fn execute(
    project: &Project,
    ctx: &FetchContext,
    terraform_bin: &Path,
    env: &str,
    working_dir: &Path,
    args: &[String],
) -> Result<()> {
    terraform_helpers::run(
        project,
        ctx,
        terraform_bin,
        env,
        working_dir,
        TerraformAction::Plan,
        args,
    )
}
