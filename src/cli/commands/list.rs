use colored::Colorize;

use crate::cli::commands::project::Project;
use crate::cli::output;
use crate::core::errors::Result;

/// Execute the `tivor list` command.
pub fn execute(project: &Project) -> Result<()> {
    output::header(&format!(
        "Environments (config version {})",
        project.config.version
    ));

    for env in &project.config.environments {
        let parent = match &env.inherits {
            Some(parent) => format!("inherits {parent}").dimmed().to_string(),
            None => String::new(),
        };
        let files = match env.vars_files.len() {
            1 => "1 file".to_string(),
            n => format!("{n} files"),
        };
        println!("  {:<16} {:<10} {}", env.name.cyan(), files, parent);
    }

    if let Some(defaults) = &project.config.defaults {
        if !defaults.vars_files.is_empty() {
            println!();
            output::field("defaults", &defaults.vars_files.join(", "));
        }
    }
    Ok(())
}
