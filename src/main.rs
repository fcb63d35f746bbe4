mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use crate::cli::commands::project::Project;
use crate::cli::{Cli, Commands};
use crate::core::errors::Result;
use crate::core::models::fetch_context::FetchContext;

fn main() {
    let args = Cli::parse();

    if let Err(e) = cli::logging::init(&args.log_level) {
        // stdout may carry `resolve` output.
        cli::output::error(&format!("Diagnostic logging disabled: {e}"));
    }

    let ctx = FetchContext::new();
    let handler_ctx = ctx.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nInterrupted, stopping...");
        handler_ctx.cancel();
    }) {
        tracing::warn!(error = %e, "could not install interrupt handler");
    }

    if let Err(e) = run(&args, &ctx) {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

fn run(args: &Cli, ctx: &FetchContext) -> Result<()> {
    let load = || Project::load(&args.config);

    match &args.command {
        Commands::Init { force } => cli::commands::init::execute(&args.config, *force),
        Commands::Version => cli::commands::version::execute(),
        Commands::List => cli::commands::list::execute(&load()?),
        Commands::Show { env, json } => cli::commands::show::execute(&load()?, env, *json),
        Commands::Resolve {
            env,
            output,
            format,
        } => cli::commands::resolve::execute(&load()?, ctx, env, output.as_deref(), *format),
        Commands::Plan {
            env,
            working_dir,
            args: extra,
        } => cli::commands::plan::execute(
            &load()?,
            ctx,
            &args.terraform_bin,
            env,
            working_dir,
            extra,
        ),
        Commands::Apply {
            env,
            working_dir,
            args: extra,
        } => cli::commands::apply::execute(
            &load()?,
            ctx,
            &args.terraform_bin,
            env,
            working_dir,
            extra,
        ),
    }
}
