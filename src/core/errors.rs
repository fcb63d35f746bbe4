use std::path::PathBuf;

/// All domain errors for tivor.
///
/// Each variant provides enough context (file path, environment name,
/// line number) to act on the failure without a debugger.
#[derive(Debug, thiserror::Error)]
pub enum TivorError {
    #[error(
        "Configuration file not found: {path}\n\n  \
         Run 'tivor init' to generate a template, or pass --config <path>."
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse configuration file {path}: {detail}")]
    InvalidConfig { path: PathBuf, detail: String },

    #[error("Invalid configuration: {detail}")]
    ConfigValidation { detail: String },

    #[error(
        "Environment '{name}' not found\n\n  \
         Available environments: {available}\n  \
         Check the environments list in tivor.yaml."
    )]
    EnvironmentNotFound { name: String, available: String },

    #[error("Environment '{env}' inherits from non-existent environment '{parent}'")]
    MissingParent { env: String, parent: String },

    #[error(
        "Circular inheritance detected: {chain}\n\n  \
         Two or more environments inherit from each other, creating a loop.\n\n  \
         Fix: edit tivor.yaml and ensure inheritance forms a tree:\n    \
         → Valid:   dev → staging → production\n    \
         → Invalid: dev → staging → dev (cycle)"
    )]
    CircularInheritance { chain: String },

    #[error("Failed to resolve environment '{env}': {source}")]
    Resolution {
        env: String,
        #[source]
        source: Box<TivorError>,
    },

    #[error(
        "Variable file not found: {path}\n\n  \
         Check the vars_files entries of the environment and its parents."
    )]
    VarsFileNotFound { path: PathBuf },

    #[error("Failed to read variable file {path}: {source}")]
    BackendIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Unsupported backend type: '{kind}'\n\n  \
         Supported backend types: {supported}"
    )]
    UnsupportedBackend { kind: String, supported: String },

    #[error("The '{kind}' backend is not implemented yet")]
    BackendNotImplemented { kind: String },

    #[error("Invalid configuration for '{kind}' backend: {detail}")]
    InvalidBackendConfig { kind: String, detail: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error(
        "Parse error in {file} at line {line}: {reason}\n\n  \
         Expected format: name = value (strings, numbers, bools, lists, maps)."
    )]
    Parse {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Failed to render variables: {detail}")]
    Serialize { detail: String },

    #[error(
        "Terraform binary '{binary}' not found\n\n  \
         Install Terraform or point --terraform-bin at the binary."
    )]
    TerraformNotFound { binary: PathBuf },

    #[error("terraform {command} failed ({status})")]
    TerraformFailed { command: String, status: String },

    #[error("Invalid Terraform working directory {path}: {detail}")]
    InvalidWorkingDir { path: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TivorError {
    /// Attach the originating file to a parse error raised on raw text.
    ///
    /// Parsers only see file contents, so they report a placeholder name;
    /// the loader calls this once it knows which file was being read.
    pub fn in_file(self, file: &str) -> Self {
        match self {
            TivorError::Parse { line, reason, .. } => TivorError::Parse {
                file: file.to_string(),
                line,
                reason,
            },
            other => other,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TivorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_file_rewrites_parse_errors() {
        let err = TivorError::Parse {
            file: "<tfvars>".into(),
            line: 3,
            reason: "missing '='".into(),
        }
        .in_file("env/dev.tfvars");

        let msg = err.to_string();
        assert!(msg.contains("env/dev.tfvars"));
        assert!(msg.contains("line 3"));
    }

    #[test]
    fn in_file_leaves_other_errors_alone() {
        let err = TivorError::Cancelled.in_file("x.tfvars");
        assert!(matches!(err, TivorError::Cancelled));
    }

    #[test]
    fn resolution_error_includes_source() {
        let err = TivorError::Resolution {
            env: "staging".into(),
            source: Box::new(TivorError::CircularInheritance {
                chain: "a -> b -> a".into(),
            }),
        };

        let msg = err.to_string();
        assert!(msg.contains("staging"));
        assert!(msg.contains("a -> b -> a"));
    }
}
