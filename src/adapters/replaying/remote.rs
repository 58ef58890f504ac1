//! Replaying adapter for the `RemoteClient` port.

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::RemoteResult;
use crate::frontmatter::FileDescriptor;
use crate::ports::{
    Lookup, LookupFuture, PublicationSnapshot, RemoteClient, RemoteDraft, RemoteFuture,
    RemotePost, RemoteSeries,
};

/// Serves recorded remote calls from a cassette, in order per method.
///
/// Arguments are not matched against the recording; only the call order
/// per method matters.
pub struct ReplayingRemote {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingRemote {
    /// Create a replaying client backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn replay<T: DeserializeOwned>(&self, method: &str) -> RemoteResult<T> {
        replay_result(next_output(&self.replayer, method)?, method)
    }

    fn replay_lookup<T: DeserializeOwned>(&self, method: &str) -> Lookup<T> {
        Lookup::from_result(self.replay::<Option<T>>(method))
    }
}

impl RemoteClient for ReplayingRemote {
    fn fetch_publication_snapshot(&self) -> RemoteFuture<'_, Option<PublicationSnapshot>> {
        let result = self.replay("fetch_publication_snapshot");
        Box::pin(async move { result })
    }

    fn fetch_post_by_slug<'a>(&'a self, _slug: &'a str) -> LookupFuture<'a, RemotePost> {
        let lookup = self.replay_lookup("fetch_post_by_slug");
        Box::pin(async move { lookup })
    }

    fn fetch_series_by_slug<'a>(&'a self, _slug: &'a str) -> LookupFuture<'a, RemoteSeries> {
        let lookup = self.replay_lookup("fetch_series_by_slug");
        Box::pin(async move { lookup })
    }

    fn create_post<'a>(
        &'a self,
        _descriptor: &'a FileDescriptor,
        _content: &'a str,
        _series_id: Option<&'a str>,
    ) -> RemoteFuture<'a, RemotePost> {
        let result = self.replay("create_post");
        Box::pin(async move { result })
    }

    fn update_post<'a>(
        &'a self,
        _id: &'a str,
        _descriptor: &'a FileDescriptor,
        _content: &'a str,
        _series_id: Option<&'a str>,
    ) -> RemoteFuture<'a, RemotePost> {
        let result = self.replay("update_post");
        Box::pin(async move { result })
    }

    fn delete_post<'a>(&'a self, _id: &'a str) -> RemoteFuture<'a, RemotePost> {
        let result = self.replay("delete_post");
        Box::pin(async move { result })
    }

    fn create_draft<'a>(
        &'a self,
        _descriptor: &'a FileDescriptor,
        _content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft> {
        let result = self.replay("create_draft");
        Box::pin(async move { result })
    }

    fn update_draft<'a>(
        &'a self,
        _id: &'a str,
        _descriptor: &'a FileDescriptor,
        _content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft> {
        let result = self.replay("update_draft");
        Box::pin(async move { result })
    }

    fn promote_draft_to_post<'a>(&'a self, _draft_id: &'a str) -> RemoteFuture<'a, RemotePost> {
        let result = self.replay("promote_draft_to_post");
        Box::pin(async move { result })
    }

    fn create_series<'a>(
        &'a self,
        _name: &'a str,
        _slug: &'a str,
    ) -> RemoteFuture<'a, RemoteSeries> {
        let result = self.replay("create_series");
        Box::pin(async move { result })
    }
}
