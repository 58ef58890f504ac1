//! Recording adapter for the `RemoteClient` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::frontmatter::FileDescriptor;
use crate::ports::{
    LookupFuture, PublicationSnapshot, RemoteClient, RemoteDraft, RemoteFuture, RemotePost,
    RemoteSeries,
};

/// Records remote interactions while delegating to an inner implementation.
pub struct RecordingRemote {
    inner: Box<dyn RemoteClient>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingRemote {
    /// Creates a new recording client wrapping the given implementation.
    pub fn new(inner: Box<dyn RemoteClient>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct SlugInput<'a> {
    slug: &'a str,
}

#[derive(Serialize)]
struct IdInput<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct WriteInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    slug: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    series_id: Option<&'a str>,
}

impl<'a> WriteInput<'a> {
    fn new(
        id: Option<&'a str>,
        descriptor: &'a FileDescriptor,
        series_id: Option<&'a str>,
    ) -> Self {
        Self { id, slug: &descriptor.slug, title: &descriptor.title, series_id }
    }
}

#[derive(Serialize)]
struct SeriesInput<'a> {
    name: &'a str,
    slug: &'a str,
}

impl RemoteClient for RecordingRemote {
    fn fetch_publication_snapshot(&self) -> RemoteFuture<'_, Option<PublicationSnapshot>> {
        Box::pin(async move {
            let result = self.inner.fetch_publication_snapshot().await;
            record_result(&self.recorder, "fetch_publication_snapshot", &(), &result);
            result
        })
    }

    fn fetch_post_by_slug<'a>(&'a self, slug: &'a str) -> LookupFuture<'a, RemotePost> {
        Box::pin(async move {
            let lookup = self.inner.fetch_post_by_slug(slug).await;
            record_result(
                &self.recorder,
                "fetch_post_by_slug",
                &SlugInput { slug },
                &lookup.as_result(),
            );
            lookup
        })
    }

    fn fetch_series_by_slug<'a>(&'a self, slug: &'a str) -> LookupFuture<'a, RemoteSeries> {
        Box::pin(async move {
            let lookup = self.inner.fetch_series_by_slug(slug).await;
            record_result(
                &self.recorder,
                "fetch_series_by_slug",
                &SlugInput { slug },
                &lookup.as_result(),
            );
            lookup
        })
    }

    fn create_post<'a>(
        &'a self,
        descriptor: &'a FileDescriptor,
        content: &'a str,
        series_id: Option<&'a str>,
    ) -> RemoteFuture<'a, RemotePost> {
        Box::pin(async move {
            let result = self.inner.create_post(descriptor, content, series_id).await;
            let input = WriteInput::new(None, descriptor, series_id);
            record_result(&self.recorder, "create_post", &input, &result);
            result
        })
    }

    fn update_post<'a>(
        &'a self,
        id: &'a str,
        descriptor: &'a FileDescriptor,
        content: &'a str,
        series_id: Option<&'a str>,
    ) -> RemoteFuture<'a, RemotePost> {
        Box::pin(async move {
            let result = self.inner.update_post(id, descriptor, content, series_id).await;
            let input = WriteInput::new(Some(id), descriptor, series_id);
            record_result(&self.recorder, "update_post", &input, &result);
            result
        })
    }

    fn delete_post<'a>(&'a self, id: &'a str) -> RemoteFuture<'a, RemotePost> {
        Box::pin(async move {
            let result = self.inner.delete_post(id).await;
            record_result(&self.recorder, "delete_post", &IdInput { id }, &result);
            result
        })
    }

    fn create_draft<'a>(
        &'a self,
        descriptor: &'a FileDescriptor,
        content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft> {
        Box::pin(async move {
            let result = self.inner.create_draft(descriptor, content).await;
            let input = WriteInput::new(None, descriptor, None);
            record_result(&self.recorder, "create_draft", &input, &result);
            result
        })
    }

    fn update_draft<'a>(
        &'a self,
        id: &'a str,
        descriptor: &'a FileDescriptor,
        content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft> {
        Box::pin(async move {
            let result = self.inner.update_draft(id, descriptor, content).await;
            let input = WriteInput::new(Some(id), descriptor, None);
            record_result(&self.recorder, "update_draft", &input, &result);
            result
        })
    }

    fn promote_draft_to_post<'a>(&'a self, draft_id: &'a str) -> RemoteFuture<'a, RemotePost> {
        Box::pin(async move {
            let result = self.inner.promote_draft_to_post(draft_id).await;
            let input = IdInput { id: draft_id };
            record_result(&self.recorder, "promote_draft_to_post", &input, &result);
            result
        })
    }

    fn create_series<'a>(
        &'a self,
        name: &'a str,
        slug: &'a str,
    ) -> RemoteFuture<'a, RemoteSeries> {
        Box::pin(async move {
            let result = self.inner.create_series(name, slug).await;
            record_result(&self.recorder, "create_series", &SeriesInput { name, slug }, &result);
            result
        })
    }
}
