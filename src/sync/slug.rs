//! Current remote state of a slug.

use tracing::warn;

use crate::error::RemoteResult;
use crate::ports::{Lookup, RemoteClient, RemoteDraft, RemotePost};

/// Answers "is there a post with this slug?" and "is there a draft with this
/// slug?" as independent questions. Both may be true at once.
///
/// Nothing is cached; every call goes to the remote.
pub struct SlugResolver<'a> {
    remote: &'a dyn RemoteClient,
}

impl<'a> SlugResolver<'a> {
    /// Creates a resolver over the given client.
    #[must_use]
    pub fn new(remote: &'a dyn RemoteClient) -> Self {
        Self { remote }
    }

    /// The published post for `slug`, if any.
    ///
    /// A failed lookup counts as "no post"; the cause is logged.
    pub async fn post(&self, slug: &str) -> Option<RemotePost> {
        settle(self.remote.fetch_post_by_slug(slug).await, "post", slug)
    }

    /// The draft for `slug`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the publication snapshot cannot be read.
    pub async fn draft(&self, slug: &str) -> RemoteResult<Option<RemoteDraft>> {
        self.remote.fetch_draft_by_slug(slug).await
    }
}

/// Collapses a lookup to an option, logging when the lookup itself failed.
pub(crate) fn settle<T>(lookup: Lookup<T>, kind: &str, slug: &str) -> Option<T> {
    match lookup {
        Lookup::Found(value) => Some(value),
        Lookup::Missing => None,
        Lookup::Unavailable(err) => {
            warn!(%slug, "{kind} lookup failed, treating as not found: {err}");
            None
        }
    }
}
