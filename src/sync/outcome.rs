//! Per-file outcomes and run-level counters.

use serde::{Deserialize, Serialize};

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    /// A new post was published.
    Published {
        /// Post title as returned by the platform.
        title: String,
        /// Public URL.
        url: Option<String>,
    },
    /// An existing post was updated in place.
    Updated {
        /// Post title.
        title: String,
        /// Public URL.
        url: Option<String>,
    },
    /// The post was removed.
    Deleted {
        /// Title from the file.
        title: String,
    },
    /// A new draft was created.
    DraftCreated {
        /// Draft title.
        title: String,
    },
    /// An existing draft was updated.
    DraftUpdated {
        /// Draft title.
        title: String,
    },
    /// An existing draft was updated and then published.
    PublishedFromDraft {
        /// Post title.
        title: String,
        /// Public URL.
        url: Option<String>,
    },
    /// Nothing to do. Reserved: the reconciler does not diff content.
    Unchanged,
    /// Not processed; not an error.
    Skipped {
        /// Why the file was skipped.
        reason: String,
    },
    /// A remote call or parse step failed.
    Failed {
        /// Error detail.
        error: String,
    },
}

impl ReconciliationOutcome {
    /// Creates a skipped outcome.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped { reason: reason.into() }
    }

    /// Creates a failed outcome.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed { error: error.to_string() }
    }

    /// Snake-case status name, matching the summary keys.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Published { .. } => "published",
            Self::Updated { .. } => "updated",
            Self::Deleted { .. } => "deleted",
            Self::DraftCreated { .. } => "draft_created",
            Self::DraftUpdated { .. } => "draft_updated",
            Self::PublishedFromDraft { .. } => "published_from_draft",
            Self::Unchanged => "unchanged",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Counters per outcome category for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// New posts.
    pub published: u32,
    /// Updated posts.
    pub updated: u32,
    /// Removed posts.
    pub deleted: u32,
    /// New drafts.
    pub drafts_created: u32,
    /// Updated drafts.
    pub drafts_updated: u32,
    /// Drafts promoted to posts.
    pub published_from_draft: u32,
    /// Unchanged files.
    pub unchanged: u32,
    /// Skipped files.
    pub skipped: u32,
    /// Failed files.
    pub failed: u32,
}

impl RunSummary {
    /// Counts one outcome.
    pub fn record(&mut self, outcome: &ReconciliationOutcome) {
        let counter = match outcome {
            ReconciliationOutcome::Published { .. } => &mut self.published,
            ReconciliationOutcome::Updated { .. } => &mut self.updated,
            ReconciliationOutcome::Deleted { .. } => &mut self.deleted,
            ReconciliationOutcome::DraftCreated { .. } => &mut self.drafts_created,
            ReconciliationOutcome::DraftUpdated { .. } => &mut self.drafts_updated,
            ReconciliationOutcome::PublishedFromDraft { .. } => &mut self.published_from_draft,
            ReconciliationOutcome::Unchanged => &mut self.unchanged,
            ReconciliationOutcome::Skipped { .. } => &mut self.skipped,
            ReconciliationOutcome::Failed { .. } => &mut self.failed,
        };
        *counter += 1;
    }

    /// Total number of files counted.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.published
            + self.updated
            + self.deleted
            + self.drafts_created
            + self.drafts_updated
            + self.published_from_draft
            + self.unchanged
            + self.skipped
            + self.failed
    }

    /// Human-readable summary block.
    #[must_use]
    pub fn format(&self) -> String {
        [
            format!("Summary ({} files):", self.total()),
            format!("  Published: {}", self.published),
            format!("  Updated: {}", self.updated),
            format!("  Deleted: {}", self.deleted),
            format!("  Drafts created: {}", self.drafts_created),
            format!("  Drafts updated: {}", self.drafts_updated),
            format!("  Published from draft: {}", self.published_from_draft),
            format!("  Unchanged: {}", self.unchanged),
            format!("  Skipped: {}", self.skipped),
            format!("  Failed: {}", self.failed),
        ]
        .join("\n")
    }
}
