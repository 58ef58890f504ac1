//! Batch run over a posts directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::outcome::{ReconciliationOutcome, RunSummary};
use super::reconcile::FileReconciler;
use crate::frontmatter;
use crate::ports::{FileSystem, RemoteClient};

/// Skip reason for files without a frontmatter block.
pub const NO_FRONTMATTER: &str = "No frontmatter found";

/// Outcome for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Path as discovered.
    pub path: PathBuf,
    /// What happened.
    pub outcome: ReconciliationOutcome,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Counters per category.
    pub summary: RunSummary,
    /// Per-file outcomes in processing order.
    pub files: Vec<FileReport>,
}

impl RunReport {
    /// Returns true when at least one file failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}

/// Reconciles every markdown file under a directory, one at a time.
pub struct SyncRun<'a> {
    fs: &'a dyn FileSystem,
    reconciler: FileReconciler<'a>,
}

impl<'a> SyncRun<'a> {
    /// Creates a run over the given filesystem and remote.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, remote: &'a dyn RemoteClient) -> Self {
        Self { fs, reconciler: FileReconciler::new(remote) }
    }

    /// Processes every file under `root` in discovery order.
    ///
    /// A failing file is recorded and the run moves on.
    ///
    /// # Errors
    ///
    /// Returns an error only if `root` cannot be listed.
    pub async fn execute(&self, root: &Path) -> Result<RunReport, String> {
        let files = self
            .fs
            .find_markdown_files(root)
            .map_err(|e| format!("Failed to list markdown files in {}: {e}", root.display()))?;
        info!("Found {} markdown files", files.len());

        let mut report = RunReport::default();
        if files.is_empty() {
            warn!("No markdown files found in the specified directory");
            return Ok(report);
        }

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        for path in files {
            let outcome = self.process_file(&path, &mut seen).await;
            log_outcome(&path, &outcome);
            report.summary.record(&outcome);
            report.files.push(FileReport { path, outcome });
        }
        Ok(report)
    }

    async fn process_file(
        &self,
        path: &Path,
        seen: &mut HashMap<String, PathBuf>,
    ) -> ReconciliationOutcome {
        let text = match self.fs.read_to_string(path) {
            Ok(text) => text,
            Err(e) => return ReconciliationOutcome::failed(format!("failed to read file: {e}")),
        };
        let parsed = match frontmatter::parse(&text) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return ReconciliationOutcome::skipped(NO_FRONTMATTER),
            Err(e) => return ReconciliationOutcome::failed(e),
        };

        let slug = parsed.descriptor.slug.trim();
        if !slug.is_empty() {
            if let Some(previous) = seen.insert(slug.to_string(), path.to_path_buf()) {
                warn!(%slug, "slug also used by {}; both files are applied in order", previous.display());
            }
        }

        self.reconciler.reconcile(&parsed.descriptor, &parsed.content).await
    }
}

fn log_outcome(path: &Path, outcome: &ReconciliationOutcome) {
    let path = path.display();
    debug!(%path, status = outcome.status(), "file reconciled");
    match outcome {
        ReconciliationOutcome::Published { title, url } => {
            info!("✓ Published: {title}");
            info!("  URL: {}", url.as_deref().unwrap_or("-"));
        }
        ReconciliationOutcome::Updated { title, url } => {
            info!("✓ Updated: {title}");
            info!("  URL: {}", url.as_deref().unwrap_or("-"));
        }
        ReconciliationOutcome::Deleted { title } => info!("✓ Deleted: {title}"),
        ReconciliationOutcome::DraftCreated { title } => info!("✓ Draft created: {title}"),
        ReconciliationOutcome::DraftUpdated { title } => info!("✓ Draft updated: {title}"),
        ReconciliationOutcome::PublishedFromDraft { title, url } => {
            info!("✓ Published from draft: {title}");
            info!("  URL: {}", url.as_deref().unwrap_or("-"));
        }
        ReconciliationOutcome::Unchanged => info!("- Unchanged: {path}"),
        ReconciliationOutcome::Skipped { reason } => info!("- Skipped: {path} ({reason})"),
        ReconciliationOutcome::Failed { error: message } => {
            error!("✗ Failed: {path}");
            error!("  Error: {message}");
        }
    }
}
