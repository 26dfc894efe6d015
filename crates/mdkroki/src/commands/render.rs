//! `mdkroki render` command implementation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use mdkroki_config::{CliSettings, Config};
use mdkroki_diagrams::DiagramProcessor;

use crate::error::CliError;
use crate::output::{Output, write_stdout};
use crate::pipeline;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown files to render.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory to write rendered files to (default: stdout).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdkroki.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kroki server URL (overrides config).
    #[arg(long, env = "MDKROKI_SERVER_URL")]
    server_url: Option<String>,

    /// Directory `@from_file:` references are relative to (overrides config).
    #[arg(long)]
    docs_root: Option<PathBuf>,

    /// Disable the on-disk cache.
    #[arg(long)]
    no_cache: bool,

    /// Abort on the first diagram that fails to render.
    #[arg(long)]
    fail_fast: bool,

    /// Enable verbose output (show cache and render logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, a file cannot be read
    /// or written, or a document fails in fail-fast mode.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            server_url: self.server_url,
            cache_enabled: self.no_cache.then_some(false),
            fail_fast: self.fail_fast.then_some(true),
            docs_root: self.docs_root,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let processor = pipeline::processor(&config)?;

        if let Some(out_dir) = &self.out_dir {
            std::fs::create_dir_all(out_dir).map_err(|source| CliError::File {
                path: out_dir.clone(),
                source,
            })?;
        }

        for file in &self.files {
            let start = Instant::now();
            let rendered = render_file(&processor, file)?;

            match &self.out_dir {
                Some(out_dir) => {
                    let target = output_path(out_dir, file)?;
                    std::fs::write(&target, rendered).map_err(|source| CliError::File {
                        path: target.clone(),
                        source,
                    })?;
                    output.success(&format!("{} -> {}", file.display(), target.display()));
                }
                None => write_stdout(&rendered)?,
            }
            tracing::info!(
                file = %file.display(),
                elapsed = ?start.elapsed(),
                "rendered document"
            );
        }

        if self.out_dir.is_some() {
            output.info(&format!("Rendered {} file(s)", self.files.len()));
        }
        Ok(())
    }
}

fn render_file(processor: &DiagramProcessor, path: &Path) -> Result<String, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })?;
    processor
        .process_document(&text)
        .map_err(|source| CliError::Document {
            path: path.to_path_buf(),
            source,
        })
}

/// Target path for `file` inside `out_dir`, keeping its file name.
fn output_path(out_dir: &Path, file: &Path) -> Result<PathBuf, CliError> {
    let name = file.file_name().ok_or_else(|| {
        CliError::Validation(format!("not a file path: {}", file.display()))
    })?;
    Ok(out_dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_keeps_file_name() {
        let target = output_path(Path::new("/out"), Path::new("docs/guide/intro.md")).unwrap();
        assert_eq!(target, PathBuf::from("/out/intro.md"));
    }

    #[test]
    fn test_output_path_rejects_directory_like_path() {
        let err = output_path(Path::new("/out"), Path::new("..")).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)), "{err:?}");
    }
}
