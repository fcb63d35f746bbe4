pub mod commands;
pub mod logging;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Resolve layered Terraform variable files per environment.
#[derive(Parser, Debug)]
#[command(name = "tivor", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the project configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "TIVOR_CONFIG",
        default_value = crate::config::project_config::DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Diagnostic log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "TIVOR_LOG", default_value = "warn")]
    pub log_level: String,

    /// Terraform binary used by plan and apply
    #[arg(
        long,
        global = true,
        env = "TIVOR_TERRAFORM_BIN",
        default_value = "terraform"
    )]
    pub terraform_bin: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter configuration file
    Init {
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },

    /// List configured environments
    List,

    /// Show the effective settings of an environment
    Show {
        /// Environment name
        env: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge the environment's variable files and print the result
    Resolve {
        /// Environment name
        env: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output syntax
        #[arg(long, value_enum, default_value_t = OutputFormat::Tfvars)]
        format: OutputFormat,
    },

    /// Run `terraform plan` with the merged variables
    Plan {
        /// Environment name
        env: String,
        /// Terraform working directory
        #[arg(short = 'w', long, default_value = ".")]
        working_dir: PathBuf,
        /// Extra arguments passed through to terraform
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Run `terraform apply -auto-approve` with the merged variables
    Apply {
        /// Environment name
        env: String,
        /// Terraform working directory
        #[arg(short = 'w', long, default_value = ".")]
        working_dir: PathBuf,
        /// Extra arguments passed through to terraform
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print version information
    Version,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Native `name = value` syntax
    Tfvars,
    /// `.tfvars.json` object
    Json,
}
