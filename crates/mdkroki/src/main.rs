//! mdkroki CLI - render diagram code blocks in Markdown through Kroki.
//!
//! Provides commands for:
//! - `render`: Replace diagram fences in Markdown files with rendered images
//! - `types`: List enabled diagram types and their output extensions

mod commands;
mod error;
mod output;
mod pipeline;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, TypesArgs};
use output::Output;

/// mdkroki - Markdown diagrams via Kroki.
#[derive(Parser)]
#[command(name = "mdkroki", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render diagram blocks in Markdown files.
    Render(RenderArgs),
    /// List enabled diagram types.
    Types(TypesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Types(args) => args.execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
