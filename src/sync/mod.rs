//! Reconciliation of local markdown files against the remote publication.
//!
//! Files are processed sequentially in discovery order. Each run re-reads
//! remote state from scratch; nothing is remembered between runs.

pub mod outcome;
pub mod reconcile;
pub mod run;
pub mod series;
pub mod slug;
pub mod tags;

pub use outcome::{ReconciliationOutcome, RunSummary};
pub use reconcile::FileReconciler;
pub use run::{FileReport, RunReport, SyncRun};
pub use series::SeriesResolver;
pub use slug::SlugResolver;
pub use tags::{normalize_tags, TagInput};
