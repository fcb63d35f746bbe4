use std::path::Path;

use crate::cli::commands::project::Project;
use crate::cli::commands::terraform_helpers::{self, TerraformAction};
use crate::core::errors::Result;
use crate::core::models::fetch_context::FetchContext;

/// Execute the `tivor apply <env>` command.
///
/// Runs `terraform apply -auto-approve`; review with `tivor plan` first.
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
        TerraformAction::Apply,
        args,
    )
}
