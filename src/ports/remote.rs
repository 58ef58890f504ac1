//! Remote publication port: typed queries and mutations against the
//! blogging platform.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RemoteError, RemoteResult};
use crate::frontmatter::FileDescriptor;

/// Boxed future returned by fallible [`RemoteClient`] calls.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// Boxed future returned by single-item lookups, which never fail outright.
pub type LookupFuture<'a, T> = Pin<Box<dyn Future<Output = Lookup<T>> + Send + 'a>>;

/// Series reference embedded in a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesRef {
    /// Series id.
    pub id: String,
    /// Series slug.
    pub slug: String,
}

/// A published post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemotePost {
    /// Platform id; identity of the post.
    pub id: String,
    /// Post title.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Post slug, unique within the publication.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub slug: String,
    /// Public URL, when the platform returned one.
    #[serde(default)]
    pub url: Option<String>,
    /// Series the post belongs to.
    #[serde(default)]
    pub series: Option<SeriesRef>,
}

/// An unpublished draft. Drafts live in a separate namespace from posts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteDraft {
    /// Platform id.
    pub id: String,
    /// Draft title.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Draft slug.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub slug: String,
}

// Untitled drafts come back with `title: null`.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A named series of posts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteSeries {
    /// Platform id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Series slug.
    pub slug: String,
}

/// One read of a publication's collections.
///
/// Not a live view: anything created after the read is invisible to it, and
/// collections stop at the client's page limit (`truncated` is then set).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicationSnapshot {
    /// Publication id.
    pub id: String,
    /// Publication title.
    pub title: String,
    /// Published posts.
    pub posts: Vec<RemotePost>,
    /// Series.
    pub series: Vec<RemoteSeries>,
    /// Drafts.
    pub drafts: Vec<RemoteDraft>,
    /// True when at least one collection hit the page limit.
    #[serde(default)]
    pub truncated: bool,
}

impl PublicationSnapshot {
    /// Finds a draft by slug.
    #[must_use]
    pub fn find_draft(&self, slug: &str) -> Option<&RemoteDraft> {
        self.drafts.iter().find(|d| d.slug == slug)
    }

    /// Finds a series by slug.
    #[must_use]
    pub fn find_series(&self, slug: &str) -> Option<&RemoteSeries> {
        self.series.iter().find(|s| s.slug == slug)
    }
}

/// Outcome of a single-item lookup.
///
/// `Missing` and `Unavailable` drive the same branch in the reconciler;
/// they are kept apart so the cause can be logged.
#[derive(Debug)]
pub enum Lookup<T> {
    /// The entity exists.
    Found(T),
    /// The remote answered and the entity does not exist.
    Missing,
    /// The lookup itself failed.
    Unavailable(RemoteError),
}

impl<T> Lookup<T> {
    /// Builds a lookup from a fallible optional result.
    pub fn from_result(result: RemoteResult<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Self::Found(value),
            Ok(None) => Self::Missing,
            Err(err) => Self::Unavailable(err),
        }
    }

    /// Borrows the lookup as the result it was built from.
    ///
    /// # Errors
    ///
    /// Returns the cause when the lookup was unavailable.
    pub fn as_result(&self) -> Result<Option<&T>, &RemoteError> {
        match self {
            Self::Found(value) => Ok(Some(value)),
            Self::Missing => Ok(None),
            Self::Unavailable(err) => Err(err),
        }
    }
}

/// Typed operations against the remote publication.
///
/// Holds the authentication context and endpoint identity; carries no
/// business logic. Every method is independently fallible and a failed
/// mutation leaves remote state untouched.
pub trait RemoteClient: Send + Sync {
    /// Reads the publication with its posts, series and drafts.
    ///
    /// Returns `Ok(None)` only when no publication exists for the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails.
    fn fetch_publication_snapshot(&self) -> RemoteFuture<'_, Option<PublicationSnapshot>>;

    /// Looks up a published post by slug.
    fn fetch_post_by_slug<'a>(&'a self, slug: &'a str) -> LookupFuture<'a, RemotePost>;

    /// Looks up a series by slug.
    fn fetch_series_by_slug<'a>(&'a self, slug: &'a str) -> LookupFuture<'a, RemoteSeries>;

    /// Looks up a draft by slug by scanning a fresh snapshot.
    ///
    /// There is no direct draft-by-slug query, so drafts beyond the
    /// snapshot's page limit are not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be fetched.
    fn fetch_draft_by_slug<'a>(&'a self, slug: &'a str) -> RemoteFuture<'a, Option<RemoteDraft>> {
        Box::pin(async move {
            let snapshot = self.fetch_publication_snapshot().await?;
            Ok(snapshot.and_then(|s| s.find_draft(slug).cloned()))
        })
    }

    /// Publishes a new post.
    ///
    /// # Errors
    ///
    /// Returns the remote error payload if the mutation is rejected.
    fn create_post<'a>(
        &'a self,
        descriptor: &'a FileDescriptor,
        content: &'a str,
        series_id: Option<&'a str>,
    ) -> RemoteFuture<'a, RemotePost>;

    /// Replaces an existing post's content and metadata.
    ///
    /// # Errors
    ///
    /// Returns the remote error payload if the mutation is rejected.
    fn update_post<'a>(
        &'a self,
        id: &'a str,
        descriptor: &'a FileDescriptor,
        content: &'a str,
        series_id: Option<&'a str>,
    ) -> RemoteFuture<'a, RemotePost>;

    /// Removes a post.
    ///
    /// # Errors
    ///
    /// Returns the remote error payload if the mutation is rejected.
    fn delete_post<'a>(&'a self, id: &'a str) -> RemoteFuture<'a, RemotePost>;

    /// Creates a new draft.
    ///
    /// # Errors
    ///
    /// Returns the remote error payload if the mutation is rejected.
    fn create_draft<'a>(
        &'a self,
        descriptor: &'a FileDescriptor,
        content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft>;

    /// Replaces an existing draft's content and metadata.
    ///
    /// # Errors
    ///
    /// Returns the remote error payload if the mutation is rejected.
    fn update_draft<'a>(
        &'a self,
        id: &'a str,
        descriptor: &'a FileDescriptor,
        content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft>;

    /// Publishes a draft, consuming it.
    ///
    /// # Errors
    ///
    /// Returns the remote error payload if the mutation is rejected.
    fn promote_draft_to_post<'a>(&'a self, draft_id: &'a str) -> RemoteFuture<'a, RemotePost>;

    /// Creates a series.
    ///
    /// # Errors
    ///
    /// Returns the remote error payload if the mutation is rejected,
    /// including when the slug is already taken.
    fn create_series<'a>(&'a self, name: &'a str, slug: &'a str)
        -> RemoteFuture<'a, RemoteSeries>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> PublicationSnapshot {
        PublicationSnapshot {
            id: "pub-1".into(),
            title: "Blog".into(),
            posts: vec![],
            series: vec![RemoteSeries { id: "s1".into(), name: "Rust".into(), slug: "rust".into() }],
            drafts: vec![RemoteDraft { id: "d1".into(), title: "WIP".into(), slug: "wip".into() }],
            truncated: false,
        }
    }

    #[test]
    fn snapshot_finds_by_slug() {
        let snap = snapshot();
        assert_eq!(snap.find_draft("wip").map(|d| d.id.as_str()), Some("d1"));
        assert_eq!(snap.find_series("rust").map(|s| s.id.as_str()), Some("s1"));
        assert!(snap.find_draft("rust").is_none());
        assert!(snap.find_series("wip").is_none());
    }

    #[test]
    fn null_draft_fields_decode_as_empty() {
        let draft: RemoteDraft =
            serde_json::from_value(serde_json::json!({"id": "d1", "title": null, "slug": null}))
                .unwrap();
        assert_eq!(draft.title, "");
        assert_eq!(draft.slug, "");
    }

    #[test]
    fn lookup_from_result_splits_causes() {
        assert!(matches!(Lookup::from_result(Ok(Some(1))), Lookup::Found(1)));
        assert!(matches!(Lookup::<i32>::from_result(Ok(None)), Lookup::Missing));
        let failed = Lookup::<i32>::from_result(Err(RemoteError::MissingData("post")));
        assert!(matches!(failed.as_result(), Err(RemoteError::MissingData("post"))));
    }
}
