use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::errors::{Result, TivorError};

/// Runs the system `terraform` binary against a working directory.
///
/// stdin, stdout and stderr are inherited so Terraform's own prompts and
/// progress output reach the user unchanged.
pub struct TerraformExecutor {
    binary: PathBuf,
    working_dir: PathBuf,
}

impl TerraformExecutor {
    pub fn new(binary: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Check that the working directory exists and holds `*.tf` files.
    pub fn validate_working_dir(&self) -> Result<()> {
        if !self.working_dir.is_dir() {
            return Err(TivorError::InvalidWorkingDir {
                path: self.working_dir.clone(),
                detail: "not a directory".into(),
            });
        }

        let has_tf = std::fs::read_dir(&self.working_dir)?
            .filter_map(|entry| entry.ok())
            .any(|entry| {
                let path = entry.path();
                path.is_file() && path.extension().is_some_and(|ext| ext == "tf")
            });

        if !has_tf {
            return Err(TivorError::InvalidWorkingDir {
                path: self.working_dir.clone(),
                detail: "no *.tf files found".into(),
            });
        }
        Ok(())
    }

    /// `terraform init -input=false`
    pub fn init(&self) -> Result<()> {
        self.run("init", &[OsString::from("-input=false")])
    }

    /// `terraform plan -var-file=<vars_file> [extra...]`
    pub fn plan(&self, vars_file: &Path, extra: &[String]) -> Result<()> {
        self.run("plan", &Self::var_args(vars_file, false, extra))
    }

    /// `terraform apply -var-file=<vars_file> -auto-approve [extra...]`
    pub fn apply(&self, vars_file: &Path, extra: &[String]) -> Result<()> {
        self.run("apply", &Self::var_args(vars_file, true, extra))
    }

    fn var_args(vars_file: &Path, auto_approve: bool, extra: &[String]) -> Vec<OsString> {
        let mut var_file = OsString::from("-var-file=");
        var_file.push(vars_file.as_os_str());

        let mut args = vec![var_file];
        if auto_approve {
            args.push("-auto-approve".into());
        }
        args.extend(extra.iter().map(OsString::from));
        args
    }

    fn run(&self, subcommand: &str, args: &[OsString]) -> Result<()> {
        tracing::info!(
            binary = %self.binary.display(),
            dir = %self.working_dir.display(),
            subcommand,
            "running terraform"
        );

        let status = Command::new(&self.binary)
            .arg(subcommand)
            .args(args)
            .current_dir(&self.working_dir)
            .status()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => TivorError::TerraformNotFound {
                    binary: self.binary.clone(),
                },
                _ => TivorError::Io(e),
            })?;

        if !status.success() {
            let status = match status.code() {
                Some(code) => format!("exit code {code}"),
                None => "terminated by signal".to_string(),
            };
            return Err(TivorError::TerraformFailed {
                command: subcommand.to_string(),
                status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exec = TerraformExecutor::new("terraform", dir.path().join("missing"));

        let result = exec.validate_working_dir();

        assert!(matches!(result, Err(TivorError::InvalidWorkingDir { .. })));
    }

    #[test]
    fn validate_rejects_dir_without_tf_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "docs").unwrap();
        let exec = TerraformExecutor::new("terraform", dir.path());

        let err = exec.validate_working_dir().unwrap_err();

        assert!(err.to_string().contains("no *.tf files"));
    }

    #[test]
    fn validate_accepts_dir_with_tf_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.tf"), "").unwrap();
        let exec = TerraformExecutor::new("terraform", dir.path());

        assert!(exec.validate_working_dir().is_ok());
    }

    #[test]
    fn missing_binary_reported() {
        let dir = tempfile::tempdir().unwrap();
        let exec = TerraformExecutor::new(dir.path().join("no-such-terraform"), dir.path());

        let result = exec.init();

        assert!(matches!(result, Err(TivorError::TerraformNotFound { .. })));
    }

    #[test]
    fn var_args_layout() {
        let args = TerraformExecutor::var_args(
            Path::new("/tmp/x/staging.tfvars"),
            true,
            &["-target=module.a".to_string()],
        );

        assert_eq!(
            args,
            vec![
                OsString::from("-var-file=/tmp/x/staging.tfvars"),
                OsString::from("-auto-approve"),
                OsString::from("-target=module.a"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let exec = TerraformExecutor::new("false", dir.path());

        let err = exec.init().unwrap_err();

        match err {
            TivorError::TerraformFailed { command, status } => {
                assert_eq!(command, "init");
                assert_eq!(status, "exit code 1");
            }
            other => panic!("expected terraform failure, got {other:?}"),
        }
    }
}
