use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::cli::output;
use crate::core::errors::Result;

const TEMPLATE: &str = r#"# tivor project configuration
version: "1.0"

# Files loaded first for every environment (lowest priority).
defaults:
  vars_files:
    - vars/common.tfvars

# Declared for documentation only: files must already be decrypted.
# secrets:
#   engine: sops
#   sops_config_path: .sops.yaml

environments:
  - name: dev
    vars_files:
      - vars/dev.tfvars
    backend:
      type: local

  # Later files override earlier ones, key by key.
  - name: staging
    inherits: dev
    vars_files:
      - vars/staging.tfvars

  - name: production
    inherits: staging
    vars_files:
      - vars/production.tfvars
    # backend:
    #   type: s3
    #   config:
    #     bucket: my-tfvars
    #     region: eu-west-1
"#;

/// Execute the `tivor init` command.
///
/// Writes a starter configuration at `config_path`. An existing file is
/// only replaced after confirmation, or with `--force`.
pub fn execute(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force && !confirm_overwrite(config_path)? {
        output::warning("Kept existing configuration");
        return Ok(());
    }

    output::header("tivor: initializing project");

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(config_path, TEMPLATE)?;
    output::success(&format!("Generated {}", config_path.display()));
    tracing::debug!(path = %config_path.display(), "configuration template written");

    print_next_steps();
    Ok(())
}

/// Ask before replacing an existing file. Anything but y/yes declines.
fn confirm_overwrite(path: &Path) -> Result<bool> {
    print!("  {} already exists. Overwrite? [y/N]: ", path.display());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let answer = input.trim().to_lowercase();

    Ok(answer == "y" || answer == "yes")
}

fn print_next_steps() {
    println!();
    println!("  Next steps:");
    println!("     1. Create the vars/*.tfvars files listed in the config");
    println!("     2. Run 'tivor list' to check the environments");
    println!("     3. Run 'tivor resolve dev' to see the merged variables");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::project_config::ProjectConfig;

    #[test]
    fn template_is_a_valid_config() {
        let config: ProjectConfig = serde_yaml::from_str(TEMPLATE).unwrap();

        config.validate().unwrap();
        assert_eq!(config.environment_names(), "dev, staging, production");
        assert_eq!(config.secret_engine(), None);
    }
}
