//! Per-file decision procedure: maps a descriptor's intent and the slug's
//! remote state to exactly one sequence of remote calls.
//!
//! Branches, first match wins:
//!
//! 1. title or slug missing: skip, no remote calls
//! 2. `delete`: remove the post if one exists, otherwise skip
//! 3. `saveAsDraft`: update the draft if one exists, otherwise create one
//! 4. publish: resolve the series, then update the post if one exists,
//!    else update and promote a draft if one exists, else create a post
//!
//! A live post always wins over a draft with the same slug, so a slug that
//! has been published is never re-created from a stale draft.

use tracing::info;

use super::outcome::ReconciliationOutcome;
use super::series::SeriesResolver;
use super::slug::SlugResolver;
use crate::error::RemoteResult;
use crate::frontmatter::{FileDescriptor, Intent};
use crate::ports::RemoteClient;

/// Skip reason for descriptors without a title or slug.
pub const MISSING_FIELDS: &str = "Missing title or slug";
/// Skip reason for deletes of a slug with no post.
pub const NOTHING_TO_DELETE: &str = "Post not found for deletion";

/// Applies one file's intent to the remote publication.
pub struct FileReconciler<'a> {
    remote: &'a dyn RemoteClient,
    slugs: SlugResolver<'a>,
    series: SeriesResolver<'a>,
}

impl<'a> FileReconciler<'a> {
    /// Creates a reconciler over the given client.
    #[must_use]
    pub fn new(remote: &'a dyn RemoteClient) -> Self {
        Self { remote, slugs: SlugResolver::new(remote), series: SeriesResolver::new(remote) }
    }

    /// Reconciles one file. Remote failures abort the remaining steps for
    /// this file and come back as a failed outcome.
    pub async fn reconcile(
        &self,
        descriptor: &FileDescriptor,
        content: &str,
    ) -> ReconciliationOutcome {
        if !descriptor.has_required_fields() {
            return ReconciliationOutcome::skipped(MISSING_FIELDS);
        }

        let result = match descriptor.intent() {
            Intent::Delete => self.delete(descriptor).await,
            Intent::Draft => self.save_draft(descriptor, content).await,
            Intent::Publish => self.publish(descriptor, content).await,
        };
        result.unwrap_or_else(ReconciliationOutcome::failed)
    }

    // Drafts with the slug are left alone.
    async fn delete(&self, descriptor: &FileDescriptor) -> RemoteResult<ReconciliationOutcome> {
        let Some(post) = self.slugs.post(&descriptor.slug).await else {
            return Ok(ReconciliationOutcome::skipped(NOTHING_TO_DELETE));
        };
        self.remote.delete_post(&post.id).await?;
        Ok(ReconciliationOutcome::Deleted { title: descriptor.title.clone() })
    }

    async fn save_draft(
        &self,
        descriptor: &FileDescriptor,
        content: &str,
    ) -> RemoteResult<ReconciliationOutcome> {
        if let Some(existing) = self.slugs.draft(&descriptor.slug).await? {
            let draft = self.remote.update_draft(&existing.id, descriptor, content).await?;
            return Ok(ReconciliationOutcome::DraftUpdated { title: draft.title });
        }
        let draft = self.remote.create_draft(descriptor, content).await?;
        Ok(ReconciliationOutcome::DraftCreated { title: draft.title })
    }

    async fn publish(
        &self,
        descriptor: &FileDescriptor,
        content: &str,
    ) -> RemoteResult<ReconciliationOutcome> {
        let series_id = match descriptor.series_slug() {
            Some(slug) => {
                let series = self.series.resolve(slug, descriptor.series_name()).await?;
                if let Some(series) = &series {
                    info!("  Using series: {}", series.name);
                }
                series.map(|s| s.id)
            }
            None => None,
        };

        if let Some(existing) = self.slugs.post(&descriptor.slug).await {
            let post = self
                .remote
                .update_post(&existing.id, descriptor, content, series_id.as_deref())
                .await?;
            return Ok(ReconciliationOutcome::Updated { title: post.title, url: post.url });
        }

        // The draft mutations carry no series; the series is only attached
        // when the post is created or updated directly.
        if let Some(draft) = self.slugs.draft(&descriptor.slug).await? {
            self.remote.update_draft(&draft.id, descriptor, content).await?;
            let post = self.remote.promote_draft_to_post(&draft.id).await?;
            return Ok(ReconciliationOutcome::PublishedFromDraft { title: post.title, url: post.url });
        }

        let post = self.remote.create_post(descriptor, content, series_id.as_deref()).await?;
        Ok(ReconciliationOutcome::Published { title: post.title, url: post.url })
    }
}
