use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::adapters::terraform::executor::TerraformExecutor;
use crate::cli::OutputFormat;
use crate::cli::commands::project::{self, Project};
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::fetch_context::FetchContext;

/// Terraform subcommands that consume a merged vars file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerraformAction {
    Plan,
    Apply,
}

impl TerraformAction {
    fn name(self) -> &'static str {
        match self {
            TerraformAction::Plan => "plan",
            TerraformAction::Apply => "apply",
        }
    }
}

/// Resolve `env`, write the merged variables to a private temp file and run
/// `terraform init` followed by `action` in `working_dir`.
///
/// The temp directory is removed when this returns, on success or failure.
pub fn run(
    project: &Project,
    ctx: &FetchContext,
    terraform_bin: &Path,
    env: &str,
    working_dir: &Path,
    action: TerraformAction,
    extra_args: &[String],
) -> Result<()> {
    let executor = TerraformExecutor::new(terraform_bin, working_dir);
    executor.validate_working_dir()?;

    let loaded = project.load_vars(ctx, env)?;
    let content = project::render(&loaded.variables, env, OutputFormat::Tfvars)?;

    let temp_dir = tempfile::Builder::new().prefix("tivor-").tempdir()?;
    let vars_file = write_private(temp_dir.path(), &format!("{env}.tfvars"), &content)?;
    tracing::debug!(path = %vars_file.display(), "wrote temporary vars file");

    output::header(&format!(
        "terraform {} for {env} in {}",
        action.name(),
        executor.working_dir().display()
    ));
    output::success(&format!(
        "Resolved {} variables from {} file(s)",
        loaded.variables.len(),
        loaded.environment.vars_files.len()
    ));

    ctx.check()?;
    executor.init()?;
    ctx.check()?;
    match action {
        TerraformAction::Plan => executor.plan(&vars_file, extra_args)?,
        TerraformAction::Apply => executor.apply(&vars_file, extra_args)?,
    }

    output::success(&format!("terraform {} completed", action.name()));
    Ok(())
}

/// Create `dir/name` readable by the owner only and write `content`.
///
/// Fails if the file already exists.
fn write_private(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&path)?;
    file.write_all(content.as_bytes())?;
    Ok(path)
}
