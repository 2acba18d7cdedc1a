//! Fix command implementation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use miette::Result;
use tracing::{debug, error};
use valet_core::{CheckRunner, Severity};
use valet_document::{LintSession, SpellingCache};

use super::check::FileError;
use crate::cli::Cli;
use crate::utils::{create_tokio_runtime, format_hint};

/// Summary of applied fixes.
#[derive(Debug, Default)]
pub struct FixSummary {
    pub total_fixes: usize,
    pub files_fixed: usize,
    pub fixes_by_file: Vec<(PathBuf, usize)>,
    pub errors: Vec<(PathBuf, String)>,
    /// Error-severity findings left in place.
    pub unfixed_errors: usize,
}

/// Outcome of fixing one document in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixCount {
    pub applied: usize,
    pub unfixed_errors: usize,
}

pub fn run_fix(cli: &Cli, files: &[PathBuf], dry_run: bool) -> Result<bool> {
    let config = super::load_config(cli)?;
    let runner = config.runner();
    let spelling = Arc::new(SpellingCache::default());

    let summary =
        create_tokio_runtime()?.block_on(fix_files(&runner, &spelling, files, dry_run))?;
    output_fix_summary(&summary, dry_run);

    Ok(summary.unfixed_errors > 0 || !summary.errors.is_empty())
}

async fn fix_files(
    runner: &CheckRunner,
    spelling: &Arc<SpellingCache>,
    files: &[PathBuf],
    dry_run: bool,
) -> Result<FixSummary> {
    let mut summary = FixSummary::default();

    for path in files {
        let (text, count) = match fix_file(runner, spelling, path).await {
            Ok(fixed) => fixed,
            Err(FileError::Fatal(e)) => return Err(e),
            Err(FileError::Failed(message)) => {
                error!("Failed to fix {}: {}", path.display(), message);
                summary.errors.push((path.clone(), message));
                continue;
            }
        };

        summary.unfixed_errors += count.unfixed_errors;
        if count.applied == 0 {
            continue;
        }

        if !dry_run && let Err(e) = tokio::fs::write(path, text).await {
            error!("Failed to write {}: {}", path.display(), e);
            summary.errors.push((path.clone(), e.to_string()));
            continue;
        }

        summary.fixes_by_file.push((path.clone(), count.applied));
        summary.total_fixes += count.applied;
        summary.files_fixed += 1;
    }

    Ok(summary)
}

async fn fix_file(
    runner: &CheckRunner,
    spelling: &Arc<SpellingCache>,
    path: &Path,
) -> std::result::Result<(String, FixCount), FileError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FileError::Failed(e.to_string()))?;

    let mut session = LintSession::new(
        text,
        format_hint(path, None),
        runner.clone(),
        Arc::clone(spelling),
    );
    session.refresh().await.map_err(FileError::from)?;

    let count = apply_all(&mut session).await;
    Ok((session.document().text().to_string(), count))
}

/// Applies the first fix of every finding, last finding first.
///
/// Fixes are recomputed from each finding's line and span, so working
/// backwards keeps the earlier ones valid. A finding overlapping one that
/// was already fixed is skipped.
pub async fn apply_all(session: &mut LintSession) -> FixCount {
    let targets: Vec<_> = session
        .decorations()
        .iter()
        .rev()
        .map(|d| (d.id, d.range, d.severity))
        .collect();

    let mut count = FixCount::default();
    let mut limit = usize::MAX;

    for (id, range, severity) in targets {
        let fixed = if range.to <= limit {
            session.apply_action(id, None).await
        } else {
            debug!("Skipping overlapping fix at {}..{}", range.from, range.to);
            false
        };

        if fixed {
            count.applied += 1;
            limit = range.from;
        } else if severity == Severity::Error {
            count.unfixed_errors += 1;
        }
    }

    count
}

/// Outputs the fix summary.
pub fn output_fix_summary(summary: &FixSummary, dry_run: bool) {
    if summary.total_fixes == 0 && summary.errors.is_empty() {
        println!("No fixable issues found.");
        return;
    }

    if summary.total_fixes > 0 {
        let action = if dry_run { "Would fix" } else { "Fixed" };
        println!(
            "{} {} issues in {} files:",
            action, summary.total_fixes, summary.files_fixed
        );
        for (path, count) in &summary.fixes_by_file {
            println!("  {}: {} fixes", path.display(), count);
        }

        if dry_run {
            println!("\nRun without --dry-run to apply fixes.");
        }
    }

    if !summary.errors.is_empty() {
        eprintln!("\nFailed to fix {} file(s):", summary.errors.len());
        for (path, err) in &summary.errors {
            eprintln!("  {}: {}", path.display(), err);
        }
    }
}
