//! `mdkroki types` command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use mdkroki_config::Config;
use mdkroki_diagrams::DiagramTypes;

use crate::error::CliError;
use crate::output::write_stdout;
use crate::pipeline;

/// Arguments for the types command.
#[derive(Args)]
pub(crate) struct TypesArgs {
    /// Path to configuration file (default: auto-discover mdkroki.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl TypesArgs {
    /// Execute the types command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let types = pipeline::diagram_types(&config)?;
        write_stdout(&format_types(&types))?;
        Ok(())
    }
}

/// One line per enabled type: fence language, extension and family.
fn format_types(types: &DiagramTypes) -> String {
    let rows: Vec<(String, &str, &str)> = types
        .iter()
        .map(|t| {
            (
                format!("{}{}", types.fence_prefix(), t.name()),
                t.extension(),
                t.family().as_str(),
            )
        })
        .collect();
    let width = rows.iter().map(|(lang, _, _)| lang.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (language, extension, family) in rows {
        let _ = writeln!(out, "{language:<width$}  {extension:<4}  {family}");
    }
    out
}
