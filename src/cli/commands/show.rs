use crate::cli::commands::project::Project;
use crate::cli::output;
use crate::core::errors::{Result, TivorError};

/// Execute the `tivor show <env>` command.
///
/// Prints the effective environment after inheritance, without reading
/// any variable file.
pub fn execute(project: &Project, env: &str, json: bool) -> Result<()> {
    let resolved = project.resolve(env)?;

    if json {
        let text = serde_json::to_string_pretty(&resolved).map_err(|e| TivorError::Serialize {
            detail: e.to_string(),
        })?;
        println!("{text}");
        return Ok(());
    }

    output::header(&format!("Environment: {}", resolved.name));
    output::field("chain", &resolved.chain.join(" -> "));
    output::field("backend", resolved.backend_kind());
    if let Some(backend) = &resolved.backend {
        for (key, value) in &backend.config {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            println!("               {key} = {value}");
        }
    }

    if resolved.vars_files.is_empty() {
        output::warning("No variable files");
    } else {
        println!("\n  Variable files (lowest priority first):");
        for (i, file) in resolved.vars_files.iter().enumerate() {
            println!("     {}. {file}", i + 1);
        }
    }
    Ok(())
}
