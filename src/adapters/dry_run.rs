//! Dry-run decorator for the `RemoteClient` port.
//!
//! Reads go to the wrapped client; mutations are logged and answered with
//! synthetic entities so a whole run can be previewed without touching the
//! publication.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use crate::frontmatter::FileDescriptor;
use crate::ports::{
    LookupFuture, PublicationSnapshot, RemoteClient, RemoteDraft, RemoteFuture, RemotePost,
    RemoteSeries,
};

/// Id given to every entity the dry run pretends to create.
pub const DRY_RUN_ID: &str = "dry-run";

/// Remote client that never mutates.
pub struct DryRunRemote {
    inner: Box<dyn RemoteClient>,
    draft_titles: Mutex<HashMap<String, String>>,
}

impl DryRunRemote {
    /// Wraps a client whose reads are passed through.
    #[must_use]
    pub fn new(inner: Box<dyn RemoteClient>) -> Self {
        Self { inner, draft_titles: Mutex::new(HashMap::new()) }
    }

    fn remember_draft(&self, id: &str, title: &str) {
        if let Ok(mut titles) = self.draft_titles.lock() {
            titles.insert(id.to_string(), title.to_string());
        }
    }

    fn draft_title(&self, id: &str) -> String {
        self.draft_titles.lock().ok().and_then(|t| t.get(id).cloned()).unwrap_or_default()
    }
}

fn synthetic_post(descriptor: &FileDescriptor) -> RemotePost {
    RemotePost {
        id: DRY_RUN_ID.to_string(),
        title: descriptor.title.clone(),
        slug: descriptor.slug.clone(),
        url: None,
        series: None,
    }
}

fn synthetic_draft(id: &str, descriptor: &FileDescriptor) -> RemoteDraft {
    RemoteDraft { id: id.to_string(), title: descriptor.title.clone(), slug: descriptor.slug.clone() }
}

impl RemoteClient for DryRunRemote {
    fn fetch_publication_snapshot(&self) -> RemoteFuture<'_, Option<PublicationSnapshot>> {
        self.inner.fetch_publication_snapshot()
    }

    fn fetch_post_by_slug<'a>(&'a self, slug: &'a str) -> LookupFuture<'a, RemotePost> {
        self.inner.fetch_post_by_slug(slug)
    }

    fn fetch_series_by_slug<'a>(&'a self, slug: &'a str) -> LookupFuture<'a, RemoteSeries> {
        self.inner.fetch_series_by_slug(slug)
    }

    fn create_post<'a>(
        &'a self,
        descriptor: &'a FileDescriptor,
        _content: &'a str,
        series_id: Option<&'a str>,
    ) -> RemoteFuture<'a, RemotePost> {
        Box::pin(async move {
            info!(slug = %descriptor.slug, series_id, "would publish post");
            Ok(synthetic_post(descriptor))
        })
    }

    fn update_post<'a>(
        &'a self,
        id: &'a str,
        descriptor: &'a FileDescriptor,
        _content: &'a str,
        series_id: Option<&'a str>,
    ) -> RemoteFuture<'a, RemotePost> {
        Box::pin(async move {
            info!(%id, slug = %descriptor.slug, series_id, "would update post");
            Ok(RemotePost { id: id.to_string(), ..synthetic_post(descriptor) })
        })
    }

    fn delete_post<'a>(&'a self, id: &'a str) -> RemoteFuture<'a, RemotePost> {
        Box::pin(async move {
            info!(%id, "would remove post");
            Ok(RemotePost {
                id: id.to_string(),
                title: String::new(),
                slug: String::new(),
                url: None,
                series: None,
            })
        })
    }

    fn create_draft<'a>(
        &'a self,
        descriptor: &'a FileDescriptor,
        _content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft> {
        Box::pin(async move {
            info!(slug = %descriptor.slug, "would create draft");
            Ok(synthetic_draft(DRY_RUN_ID, descriptor))
        })
    }

    fn update_draft<'a>(
        &'a self,
        id: &'a str,
        descriptor: &'a FileDescriptor,
        _content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft> {
        Box::pin(async move {
            info!(%id, slug = %descriptor.slug, "would update draft");
            self.remember_draft(id, &descriptor.title);
            Ok(synthetic_draft(id, descriptor))
        })
    }

    fn promote_draft_to_post<'a>(&'a self, draft_id: &'a str) -> RemoteFuture<'a, RemotePost> {
        Box::pin(async move {
            info!(%draft_id, "would publish draft");
            Ok(RemotePost {
                id: DRY_RUN_ID.to_string(),
                title: self.draft_title(draft_id),
                slug: String::new(),
                url: None,
                series: None,
            })
        })
    }

    fn create_series<'a>(
        &'a self,
        name: &'a str,
        slug: &'a str,
    ) -> RemoteFuture<'a, RemoteSeries> {
        Box::pin(async move {
            info!(%slug, %name, "would create series");
            Ok(RemoteSeries {
                id: DRY_RUN_ID.to_string(),
                name: name.to_string(),
                slug: slug.to_string(),
            })
        })
    }
}
