//! Check command implementation

use std::path::{Path, PathBuf};

use miette::Result;
use tracing::{debug, error};
use valet_core::{CheckError, CheckRunner, Finding, Severity};

use crate::cli::{Cli, OutputFormat};
use crate::output::output_results;
use crate::utils::{create_tokio_runtime, format_hint};

/// Findings for one checked file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub findings: Vec<Finding>,
}

impl FileReport {
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity_level() == Severity::Error)
    }
}

pub fn run_check(
    cli: &Cli,
    files: &[PathBuf],
    ext: Option<&str>,
    format: OutputFormat,
) -> Result<bool> {
    let config = super::load_config(cli)?;
    let runner = config.runner();

    let (reports, failures) = create_tokio_runtime()?.block_on(check_files(&runner, files, ext))?;

    if !failures.is_empty() {
        eprintln!("\n{} file(s) failed to check:", failures.len());
        for (path, error) in &failures {
            eprintln!("  {}: {}", path.display(), error);
        }
    }

    let has_errors = output_results(&reports, format)?;
    Ok(has_errors || !failures.is_empty())
}

/// Checks every file in order.
///
/// Configuration errors (no executable, no config file) abort the run;
/// anything else is recorded against the file.
pub async fn check_files(
    runner: &CheckRunner,
    files: &[PathBuf],
    ext: Option<&str>,
) -> Result<(Vec<FileReport>, Vec<(PathBuf, String)>)> {
    let mut reports = Vec::new();
    let mut failures = Vec::new();

    for path in files {
        match check_file(runner, path, ext).await {
            Ok(findings) => reports.push(FileReport {
                path: path.clone(),
                findings,
            }),
            Err(FileError::Fatal(e)) => return Err(e),
            Err(FileError::Failed(message)) => {
                error!("Failed to check {}: {}", path.display(), message);
                failures.push((path.clone(), message));
            }
        }
    }

    Ok((reports, failures))
}

pub(crate) enum FileError {
    Fatal(miette::Report),
    Failed(String),
}

async fn check_file(
    runner: &CheckRunner,
    path: &Path,
    ext: Option<&str>,
) -> std::result::Result<Vec<Finding>, FileError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FileError::Failed(e.to_string()))?;
    let format = format_hint(path, ext);
    debug!("Checking {} as {}", path.display(), format);

    let findings = runner.run(&text, &format).await.map_err(FileError::from)?;
    Ok(findings.first_file_findings().to_vec())
}

impl From<CheckError> for FileError {
    fn from(e: CheckError) -> Self {
        if e.is_configuration_error() {
            FileError::Fatal(miette::miette!("{}", e))
        } else {
            FileError::Failed(e.to_string())
        }
    }
}
