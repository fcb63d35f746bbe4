use std::path::Path;

use crate::cli::OutputFormat;
use crate::cli::commands::project::{self, Project};
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::fetch_context::FetchContext;

/// Execute the `tivor resolve <env>` command.
///
/// Merges the environment's variable files. Without `--output` the result
/// goes to stdout and nothing else is printed there, so it can be piped.
pub fn execute(
    project: &Project,
    ctx: &FetchContext,
    env: &str,
    out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let loaded = project.load_vars(ctx, env)?;
    if loaded.variables.is_empty() {
        tracing::warn!(environment = env, "no variables defined for this environment");
    }
    let content = project::render(&loaded.variables, env, format)?;

    let Some(path) = out else {
        print!("{content}");
        return Ok(());
    };

    output::header(&format!("Resolving environment: {env}"));
    output::success(&format!(
        "Inheritance chain: {}",
        loaded.environment.chain.join(" -> ")
    ));

    std::fs::write(path, &content)?;

    output::success(&format!(
        "Resolved {} variables from {} file(s)",
        loaded.variables.len(),
        loaded.environment.vars_files.len()
    ));
    output::success(&format!("Written to {}", path.display()));
    output::field("sha256", &project::fingerprint(&content));
    Ok(())
}
