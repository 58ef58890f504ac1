//! In-memory test doubles shared by unit tests.

use std::collections::{BTreeMap, HashMap};
use std::future::ready;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::RemoteError;
use crate::frontmatter::FileDescriptor;
use crate::ports::{
    FileSystem, Lookup, LookupFuture, PublicationSnapshot, RemoteClient, RemoteDraft, RemoteFuture,
    RemotePost, RemoteSeries,
};

/// One call observed by [`FakeRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Snapshot,
    PostBySlug(String),
    SeriesBySlug(String),
    CreatePost { slug: String, series_id: Option<String> },
    UpdatePost { id: String, series_id: Option<String> },
    DeletePost(String),
    CreateDraft(String),
    UpdateDraft(String),
    PromoteDraft(String),
    CreateSeries { name: String, slug: String },
}

impl Call {
    fn is_mutation(&self) -> bool {
        !matches!(self, Self::Snapshot | Self::PostBySlug(_) | Self::SeriesBySlug(_))
    }
}

#[derive(Default)]
struct State {
    posts: Vec<RemotePost>,
    drafts: Vec<RemoteDraft>,
    series: Vec<RemoteSeries>,
    next_id: u32,
    failures: HashMap<&'static str, String>,
    lookups_unavailable: bool,
    series_lookup_blind: bool,
}

/// Remote publication held in memory, recording every call.
///
/// Clones share state, so a clone can be handed to a decorator while the
/// original is inspected.
#[derive(Default, Clone)]
pub struct FakeRemote {
    state: Arc<Mutex<State>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post(self, slug: &str, id: &str) -> Self {
        self.state.lock().unwrap().posts.push(RemotePost {
            id: id.into(),
            title: format!("Remote {slug}"),
            slug: slug.into(),
            url: Some(format!("https://blog.test/{slug}")),
            series: None,
        });
        self
    }

    pub fn with_draft(self, slug: &str, id: &str) -> Self {
        self.state.lock().unwrap().drafts.push(RemoteDraft {
            id: id.into(),
            title: format!("Draft {slug}"),
            slug: slug.into(),
        });
        self
    }

    pub fn with_series(self, slug: &str, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().series.push(RemoteSeries {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
        });
        self
    }

    /// Makes the named method fail with a GraphQL error carrying `message`.
    pub fn fail_on(self, method: &'static str, message: &str) -> Self {
        self.state.lock().unwrap().failures.insert(method, message.into());
        self
    }

    /// Makes post and series lookups fail as if the network were down.
    pub fn lookups_unavailable(self) -> Self {
        self.state.lock().unwrap().lookups_unavailable = true;
        self
    }

    /// Makes series lookups miss even when the series exists, simulating
    /// a concurrent creator winning the race.
    pub fn series_lookup_blind(self) -> Self {
        self.state.lock().unwrap().series_lookup_blind = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn drafts(&self) -> Vec<RemoteDraft> {
        self.state.lock().unwrap().drafts.clone()
    }

    pub fn posts(&self) -> Vec<RemotePost> {
        self.state.lock().unwrap().posts.clone()
    }

    fn log(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, method: &'static str) -> Result<(), RemoteError> {
        match self.state.lock().unwrap().failures.get(method) {
            Some(msg) => Err(RemoteError::GraphQl(msg.clone())),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        format!("{prefix}-{}", state.next_id)
    }

    fn snapshot(&self) -> Result<Option<PublicationSnapshot>, RemoteError> {
        self.log(Call::Snapshot);
        self.check("snapshot")?;
        let state = self.state.lock().unwrap();
        Ok(Some(PublicationSnapshot {
            id: "pub-1".into(),
            title: "Test Blog".into(),
            posts: state.posts.clone(),
            series: state.series.clone(),
            drafts: state.drafts.clone(),
            truncated: false,
        }))
    }

    fn post_by_slug(&self, slug: &str) -> Lookup<RemotePost> {
        self.log(Call::PostBySlug(slug.into()));
        let state = self.state.lock().unwrap();
        if state.lookups_unavailable {
            return Lookup::Unavailable(RemoteError::Decode("connection reset".into()));
        }
        Lookup::from_result(Ok(state.posts.iter().find(|p| p.slug == slug).cloned()))
    }

    fn series_by_slug(&self, slug: &str) -> Lookup<RemoteSeries> {
        self.log(Call::SeriesBySlug(slug.into()));
        let state = self.state.lock().unwrap();
        if state.lookups_unavailable {
            return Lookup::Unavailable(RemoteError::Decode("connection reset".into()));
        }
        if state.series_lookup_blind {
            return Lookup::Missing;
        }
        Lookup::from_result(Ok(state.series.iter().find(|s| s.slug == slug).cloned()))
    }

    fn create_post_now(
        &self,
        descriptor: &FileDescriptor,
        series_id: Option<&str>,
    ) -> Result<RemotePost, RemoteError> {
        self.log(Call::CreatePost {
            slug: descriptor.slug.clone(),
            series_id: series_id.map(String::from),
        });
        self.check("create_post")?;
        let post = RemotePost {
            id: self.next_id("post"),
            title: descriptor.title.clone(),
            slug: descriptor.slug.clone(),
            url: Some(format!("https://blog.test/{}", descriptor.slug)),
            series: None,
        };
        self.state.lock().unwrap().posts.push(post.clone());
        Ok(post)
    }

    fn update_post_now(
        &self,
        id: &str,
        descriptor: &FileDescriptor,
        series_id: Option<&str>,
    ) -> Result<RemotePost, RemoteError> {
        self.log(Call::UpdatePost { id: id.into(), series_id: series_id.map(String::from) });
        self.check("update_post")?;
        let mut state = self.state.lock().unwrap();
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RemoteError::GraphQl(format!("post {id} not found")))?;
        post.title.clone_from(&descriptor.title);
        Ok(post.clone())
    }

    fn delete_post_now(&self, id: &str) -> Result<RemotePost, RemoteError> {
        self.log(Call::DeletePost(id.into()));
        self.check("delete_post")?;
        let mut state = self.state.lock().unwrap();
        let index = state
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RemoteError::GraphQl(format!("post {id} not found")))?;
        Ok(state.posts.remove(index))
    }

    fn create_draft_now(&self, descriptor: &FileDescriptor) -> Result<RemoteDraft, RemoteError> {
        self.log(Call::CreateDraft(descriptor.slug.clone()));
        self.check("create_draft")?;
        let draft = RemoteDraft {
            id: self.next_id("draft"),
            title: descriptor.title.clone(),
            slug: descriptor.slug.clone(),
        };
        self.state.lock().unwrap().drafts.push(draft.clone());
        Ok(draft)
    }

    fn update_draft_now(
        &self,
        id: &str,
        descriptor: &FileDescriptor,
    ) -> Result<RemoteDraft, RemoteError> {
        self.log(Call::UpdateDraft(id.into()));
        self.check("update_draft")?;
        let mut state = self.state.lock().unwrap();
        let draft = state
            .drafts
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| RemoteError::GraphQl(format!("draft {id} not found")))?;
        draft.title.clone_from(&descriptor.title);
        Ok(draft.clone())
    }

    fn promote_now(&self, draft_id: &str) -> Result<RemotePost, RemoteError> {
        self.log(Call::PromoteDraft(draft_id.into()));
        self.check("promote_draft")?;
        let id = self.next_id("post");
        let mut state = self.state.lock().unwrap();
        let index = state
            .drafts
            .iter()
            .position(|d| d.id == draft_id)
            .ok_or_else(|| RemoteError::GraphQl(format!("draft {draft_id} not found")))?;
        let draft = state.drafts.remove(index);
        let post = RemotePost {
            id,
            title: draft.title,
            url: Some(format!("https://blog.test/{}", draft.slug)),
            slug: draft.slug,
            series: None,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    fn create_series_now(&self, name: &str, slug: &str) -> Result<RemoteSeries, RemoteError> {
        self.log(Call::CreateSeries { name: name.into(), slug: slug.into() });
        self.check("create_series")?;
        if self.state.lock().unwrap().series.iter().any(|s| s.slug == slug) {
            return Err(RemoteError::GraphQl(format!(
                r#"[{{"message": "Series with slug {slug} already exists"}}]"#
            )));
        }
        let series = RemoteSeries { id: self.next_id("series"), name: name.into(), slug: slug.into() };
        self.state.lock().unwrap().series.push(series.clone());
        Ok(series)
    }
}

impl RemoteClient for FakeRemote {
    fn fetch_publication_snapshot(&self) -> RemoteFuture<'_, Option<PublicationSnapshot>> {
        Box::pin(ready(self.snapshot()))
    }

    fn fetch_post_by_slug<'a>(&'a self, slug: &'a str) -> LookupFuture<'a, RemotePost> {
        Box::pin(ready(self.post_by_slug(slug)))
    }

    fn fetch_series_by_slug<'a>(&'a self, slug: &'a str) -> LookupFuture<'a, RemoteSeries> {
        Box::pin(ready(self.series_by_slug(slug)))
    }

    fn create_post<'a>(
        &'a self,
        descriptor: &'a FileDescriptor,
        _content: &'a str,
        series_id: Option<&'a str>,
    ) -> RemoteFuture<'a, RemotePost> {
        Box::pin(ready(self.create_post_now(descriptor, series_id)))
    }

    fn update_post<'a>(
        &'a self,
        id: &'a str,
        descriptor: &'a FileDescriptor,
        _content: &'a str,
        series_id: Option<&'a str>,
    ) -> RemoteFuture<'a, RemotePost> {
        Box::pin(ready(self.update_post_now(id, descriptor, series_id)))
    }

    fn delete_post<'a>(&'a self, id: &'a str) -> RemoteFuture<'a, RemotePost> {
        Box::pin(ready(self.delete_post_now(id)))
    }

    fn create_draft<'a>(
        &'a self,
        descriptor: &'a FileDescriptor,
        _content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft> {
        Box::pin(ready(self.create_draft_now(descriptor)))
    }

    fn update_draft<'a>(
        &'a self,
        id: &'a str,
        descriptor: &'a FileDescriptor,
        _content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft> {
        Box::pin(ready(self.update_draft_now(id, descriptor)))
    }

    fn promote_draft_to_post<'a>(&'a self, draft_id: &'a str) -> RemoteFuture<'a, RemotePost> {
        Box::pin(ready(self.promote_now(draft_id)))
    }

    fn create_series<'a>(
        &'a self,
        name: &'a str,
        slug: &'a str,
    ) -> RemoteFuture<'a, RemoteSeries> {
        Box::pin(ready(self.create_series_now(name, slug)))
    }
}

/// In-memory filesystem keyed by path.
#[derive(Default)]
pub struct MemFs {
    files: BTreeMap<PathBuf, String>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(PathBuf::from(path), contents.into());
        self
    }
}

impl FileSystem for MemFs {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self.files.get(path).cloned().ok_or_else(|| format!("not found: {}", path.display()).into())
    }

    fn find_markdown_files(
        &self,
        root: &Path,
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .files
            .keys()
            .filter(|p| p.starts_with(root) && crate::ports::filesystem::is_markdown(p))
            .cloned()
            .collect())
    }
}
