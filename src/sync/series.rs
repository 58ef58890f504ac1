//! Idempotent get-or-create for series.

use tracing::{debug, info};

use super::slug::settle;
use crate::error::{RemoteError, RemoteResult};
use crate::ports::{RemoteClient, RemoteSeries};

/// Finds a series by slug, creating it when absent.
pub struct SeriesResolver<'a> {
    remote: &'a dyn RemoteClient,
}

impl<'a> SeriesResolver<'a> {
    /// Creates a resolver over the given client.
    #[must_use]
    pub fn new(remote: &'a dyn RemoteClient) -> Self {
        Self { remote }
    }

    /// Returns the series for `slug`, creating it if needed.
    ///
    /// Returns `Ok(None)` only for a blank slug. When creation is rejected
    /// because the series already exists (another run created it after our
    /// lookup), the series is recovered from a publication snapshot. The
    /// snapshot is page-limited, so a series beyond the limit is not
    /// recovered and the original error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails for any other reason, or the
    /// conflict cannot be resolved from the snapshot.
    pub async fn resolve(
        &self,
        slug: &str,
        name_override: Option<&str>,
    ) -> RemoteResult<Option<RemoteSeries>> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Ok(None);
        }

        if let Some(series) = settle(self.remote.fetch_series_by_slug(slug).await, "series", slug)
        {
            debug!(%slug, id = %series.id, "series found");
            return Ok(Some(series));
        }

        let name = name_override
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| name_from_slug(slug), String::from);

        match self.remote.create_series(&name, slug).await {
            Ok(series) => {
                info!(%slug, id = %series.id, "created series {}", series.name);
                Ok(Some(series))
            }
            Err(err) if err.is_already_exists() => self.recover(slug, err).await.map(Some),
            Err(err) => Err(err),
        }
    }

    async fn recover(&self, slug: &str, conflict: RemoteError) -> RemoteResult<RemoteSeries> {
        debug!(%slug, "series creation conflicted, scanning publication snapshot");
        let snapshot = self.remote.fetch_publication_snapshot().await?;
        snapshot.and_then(|s| s.find_series(slug).cloned()).ok_or(conflict)
    }
}

/// Title-cases each hyphen-separated segment: `rust-in-action` becomes
/// `Rust In Action`.
#[must_use]
pub fn name_from_slug(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
