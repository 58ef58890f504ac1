//! Live adapter for the `RemoteClient` port using the Hashnode GraphQL API.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{Config, PageLimits};
use crate::error::{RemoteError, RemoteResult};
use crate::frontmatter::FileDescriptor;
use crate::ports::{
    Lookup, LookupFuture, PublicationSnapshot, RemoteClient, RemoteDraft, RemoteFuture,
    RemotePost, RemoteSeries,
};
use crate::sync::tags::{co_authors, normalize_tags, TagInput};

const USER_AGENT: &str = concat!("hashsync/", env!("CARGO_PKG_VERSION"));

const SNAPSHOT_QUERY: &str = r"
query PublicationSnapshot($host: String!, $postsFirst: Int!, $seriesFirst: Int!, $draftsFirst: Int!) {
  publication(host: $host) {
    id
    title
    posts(first: $postsFirst) {
      edges { node { id slug title url } }
      pageInfo { hasNextPage endCursor }
    }
    seriesList(first: $seriesFirst) {
      edges { node { id slug name } }
      pageInfo { hasNextPage endCursor }
    }
    drafts(first: $draftsFirst) {
      edges { node { id slug title } }
      pageInfo { hasNextPage endCursor }
    }
  }
}";

const POSTS_PAGE_QUERY: &str = r"
query PublicationPosts($host: String!, $first: Int!, $after: String) {
  publication(host: $host) {
    posts(first: $first, after: $after) {
      edges { node { id slug title url } }
      pageInfo { hasNextPage endCursor }
    }
  }
}";

const SERIES_PAGE_QUERY: &str = r"
query PublicationSeries($host: String!, $first: Int!, $after: String) {
  publication(host: $host) {
    seriesList(first: $first, after: $after) {
      edges { node { id slug name } }
      pageInfo { hasNextPage endCursor }
    }
  }
}";

const DRAFTS_PAGE_QUERY: &str = r"
query PublicationDrafts($host: String!, $first: Int!, $after: String) {
  publication(host: $host) {
    drafts(first: $first, after: $after) {
      edges { node { id slug title } }
      pageInfo { hasNextPage endCursor }
    }
  }
}";

const POST_BY_SLUG_QUERY: &str = r"
query PostBySlug($host: String!, $slug: String!) {
  publication(host: $host) {
    post(slug: $slug) { id title slug url series { id slug } }
  }
}";

const SERIES_BY_SLUG_QUERY: &str = r"
query SeriesBySlug($host: String!, $slug: String!) {
  publication(host: $host) {
    series(slug: $slug) { id name slug }
  }
}";

const PUBLISH_POST_MUTATION: &str = r"
mutation PublishPost($input: PublishPostInput!) {
  publishPost(input: $input) { post { id slug url title } }
}";

const UPDATE_POST_MUTATION: &str = r"
mutation UpdatePost($input: UpdatePostInput!) {
  updatePost(input: $input) { post { id slug url title } }
}";

const REMOVE_POST_MUTATION: &str = r"
mutation RemovePost($id: ID!) {
  removePost(input: { id: $id }) { post { id title } }
}";

const CREATE_DRAFT_MUTATION: &str = r"
mutation CreateDraft($input: CreateDraftInput!) {
  createDraft(input: $input) { draft { id slug title } }
}";

const UPDATE_DRAFT_MUTATION: &str = r"
mutation UpdateDraft($input: UpdateDraftInput!) {
  updateDraft(input: $input) { draft { id slug title } }
}";

const PUBLISH_DRAFT_MUTATION: &str = r"
mutation PublishDraft($input: PublishDraftInput!) {
  publishDraft(input: $input) { post { id slug url title } }
}";

const CREATE_SERIES_MUTATION: &str = r"
mutation CreateSeries($input: CreateSeriesInput!) {
  createSeries(input: $input) { series { id name slug } }
}";

/// Live remote client that calls the Hashnode GraphQL endpoint.
pub struct HashnodeClient {
    client: Client,
    endpoint: String,
    access_token: String,
    publication_id: String,
    host: String,
    pages: PageLimits,
}

impl HashnodeClient {
    /// Creates a client for the configured publication.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> RemoteResult<Self> {
        let client =
            Client::builder().timeout(Duration::from_secs(60)).user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            endpoint: config.api_url.clone(),
            access_token: config.access_token.clone(),
            publication_id: config.publication_id.clone(),
            host: config.publication_host.clone(),
            pages: config.pages,
        })
    }

    /// Sends one GraphQL operation and returns its `data` payload.
    ///
    /// A response carrying `errors` is a failure even when `data` is also
    /// present.
    async fn request<T: DeserializeOwned>(&self, query: &str, variables: Value) -> RemoteResult<T> {
        debug!(operation = operation_name(query), "graphql request");
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let envelope = serde_json::from_str::<Envelope<T>>(&body);

        if !status.is_success() {
            // Some gateways answer 4xx with a proper GraphQL error list.
            if let Ok(Envelope { errors: Some(errors), .. }) = envelope {
                return Err(graphql_errors(&errors));
            }
            return Err(RemoteError::Status { status: status.as_u16(), body });
        }

        let envelope = envelope.map_err(|e| RemoteError::Decode(format!("{e}: {body}")))?;
        if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
            return Err(graphql_errors(&errors));
        }
        envelope.data.ok_or(RemoteError::MissingData("data"))
    }

    /// Runs a mutation and extracts `data.<field>.<entity>`.
    async fn mutate<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        field: &'static str,
        entity: &'static str,
    ) -> RemoteResult<T> {
        let data: Value = self.request(query, variables).await?;
        let node = data.get(field).and_then(|payload| payload.get(entity)).cloned();
        match node {
            Some(node) if !node.is_null() => {
                serde_json::from_value(node).map_err(|e| RemoteError::Decode(e.to_string()))
            }
            _ => Err(RemoteError::MissingData(field)),
        }
    }

    async fn snapshot(&self) -> RemoteResult<Option<PublicationSnapshot>> {
        let data: SnapshotData = self
            .request(
                SNAPSHOT_QUERY,
                json!({
                    "host": self.host,
                    "postsFirst": self.pages.posts,
                    "seriesFirst": self.pages.series,
                    "draftsFirst": self.pages.drafts,
                }),
            )
            .await?;
        let Some(publication) = data.publication else {
            return Ok(None);
        };

        let (posts, posts_cut) = self.follow(Collection::Posts, publication.posts).await?;
        let (series, series_cut) = self.follow(Collection::Series, publication.series_list).await?;
        let (drafts, drafts_cut) = self.follow(Collection::Drafts, publication.drafts).await?;

        Ok(Some(PublicationSnapshot {
            id: publication.id,
            title: publication.title,
            posts,
            series,
            drafts,
            truncated: posts_cut || series_cut || drafts_cut,
        }))
    }

    /// Follows continuation cursors until the collection is exhausted or
    /// the page cap is reached. Returns the items and whether they were cut.
    async fn follow<T: DeserializeOwned>(
        &self,
        collection: Collection,
        first: Connection<T>,
    ) -> RemoteResult<(Vec<T>, bool)> {
        let mut items: Vec<T> = first.edges.into_iter().map(|e| e.node).collect();
        let mut page_info = first.page_info;
        let mut pages = 1;

        while let Some(PageInfo { has_next_page: true, end_cursor: Some(cursor) }) = page_info {
            if pages >= self.pages.max_pages {
                warn!(
                    "{} list truncated after {pages} pages ({} items)",
                    collection.field(),
                    items.len()
                );
                return Ok((items, true));
            }
            let data: PageData = self
                .request(
                    collection.query(),
                    json!({
                        "host": self.host,
                        "first": collection.page_size(&self.pages),
                        "after": cursor,
                    }),
                )
                .await?;
            let connection = data
                .publication
                .and_then(|mut p| p.remove(collection.field()))
                .ok_or(RemoteError::MissingData("publication"))?;
            let page: Connection<T> =
                serde_json::from_value(connection).map_err(|e| RemoteError::Decode(e.to_string()))?;
            items.extend(page.edges.into_iter().map(|e| e.node));
            page_info = page.page_info;
            pages += 1;
        }
        Ok((items, false))
    }

    async fn post_by_slug(&self, slug: &str) -> RemoteResult<Option<RemotePost>> {
        let data: PostData =
            self.request(POST_BY_SLUG_QUERY, json!({ "host": self.host, "slug": slug })).await?;
        Ok(data.publication.and_then(|p| p.post))
    }

    async fn series_by_slug(&self, slug: &str) -> RemoteResult<Option<RemoteSeries>> {
        let data: SeriesData =
            self.request(SERIES_BY_SLUG_QUERY, json!({ "host": self.host, "slug": slug })).await?;
        Ok(data.publication.and_then(|p| p.series))
    }
}

impl RemoteClient for HashnodeClient {
    fn fetch_publication_snapshot(&self) -> RemoteFuture<'_, Option<PublicationSnapshot>> {
        Box::pin(self.snapshot())
    }

    fn fetch_post_by_slug<'a>(&'a self, slug: &'a str) -> LookupFuture<'a, RemotePost> {
        Box::pin(async move { Lookup::from_result(self.post_by_slug(slug).await) })
    }

    fn fetch_series_by_slug<'a>(&'a self, slug: &'a str) -> LookupFuture<'a, RemoteSeries> {
        Box::pin(async move { Lookup::from_result(self.series_by_slug(slug).await) })
    }

    fn create_post<'a>(
        &'a self,
        descriptor: &'a FileDescriptor,
        content: &'a str,
        series_id: Option<&'a str>,
    ) -> RemoteFuture<'a, RemotePost> {
        Box::pin(async move {
            let input = PostInput {
                publication_id: Some(&self.publication_id),
                published_at: non_empty(descriptor.published_at.as_deref()),
                ..PostInput::new(descriptor, content, series_id)
            };
            self.mutate(PUBLISH_POST_MUTATION, json!({ "input": input }), "publishPost", "post")
                .await
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
            let input = PostInput { id: Some(id), ..PostInput::new(descriptor, content, series_id) };
            self.mutate(UPDATE_POST_MUTATION, json!({ "input": input }), "updatePost", "post")
                .await
        })
    }

    fn delete_post<'a>(&'a self, id: &'a str) -> RemoteFuture<'a, RemotePost> {
        Box::pin(async move {
            self.mutate(REMOVE_POST_MUTATION, json!({ "id": id }), "removePost", "post").await
        })
    }

    fn create_draft<'a>(
        &'a self,
        descriptor: &'a FileDescriptor,
        content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft> {
        Box::pin(async move {
            let input = DraftInput {
                publication_id: Some(&self.publication_id),
                ..DraftInput::new(descriptor, content)
            };
            self.mutate(CREATE_DRAFT_MUTATION, json!({ "input": input }), "createDraft", "draft")
                .await
        })
    }

    fn update_draft<'a>(
        &'a self,
        id: &'a str,
        descriptor: &'a FileDescriptor,
        content: &'a str,
    ) -> RemoteFuture<'a, RemoteDraft> {
        Box::pin(async move {
            let input = DraftInput { id: Some(id), ..DraftInput::new(descriptor, content) };
            self.mutate(UPDATE_DRAFT_MUTATION, json!({ "input": input }), "updateDraft", "draft")
                .await
        })
    }

    fn promote_draft_to_post<'a>(&'a self, draft_id: &'a str) -> RemoteFuture<'a, RemotePost> {
        Box::pin(async move {
            self.mutate(
                PUBLISH_DRAFT_MUTATION,
                json!({ "input": { "draftId": draft_id } }),
                "publishDraft",
                "post",
            )
            .await
        })
    }

    fn create_series<'a>(
        &'a self,
        name: &'a str,
        slug: &'a str,
    ) -> RemoteFuture<'a, RemoteSeries> {
        Box::pin(async move {
            let input = json!({
                "name": name,
                "slug": slug,
                "publicationId": self.publication_id,
                "sortOrder": "asc",
            });
            self.mutate(CREATE_SERIES_MUTATION, json!({ "input": input }), "createSeries", "series")
                .await
        })
    }
}

// --- wire types ---

/// GraphQL response envelope.
#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct Connection<T> {
    edges: Vec<Edge<T>>,
    #[serde(rename = "pageInfo", default)]
    page_info: Option<PageInfo>,
}

#[derive(Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
struct SnapshotData {
    publication: Option<PublicationNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicationNode {
    id: String,
    title: String,
    posts: Connection<RemotePost>,
    series_list: Connection<RemoteSeries>,
    drafts: Connection<RemoteDraft>,
}

#[derive(Deserialize)]
struct PageData {
    publication: Option<serde_json::Map<String, Value>>,
}

#[derive(Deserialize)]
struct PostData {
    publication: Option<PostNode>,
}

#[derive(Deserialize)]
struct PostNode {
    post: Option<RemotePost>,
}

#[derive(Deserialize)]
struct SeriesData {
    publication: Option<SeriesNode>,
}

#[derive(Deserialize)]
struct SeriesNode {
    series: Option<RemoteSeries>,
}

/// Collections reachable from the publication that are paged by cursor.
#[derive(Debug, Clone, Copy)]
enum Collection {
    Posts,
    Series,
    Drafts,
}

impl Collection {
    fn field(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Series => "seriesList",
            Self::Drafts => "drafts",
        }
    }

    fn query(self) -> &'static str {
        match self {
            Self::Posts => POSTS_PAGE_QUERY,
            Self::Series => SERIES_PAGE_QUERY,
            Self::Drafts => DRAFTS_PAGE_QUERY,
        }
    }

    fn page_size(self, pages: &PageLimits) -> u32 {
        match self {
            Self::Posts => pages.posts,
            Self::Series => pages.series,
            Self::Drafts => pages.drafts,
        }
    }
}

/// Input shared by `publishPost` and `updatePost`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publication_id: Option<&'a str>,
    title: &'a str,
    slug: &'a str,
    content_markdown: &'a str,
    tags: Vec<TagInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtitle: Option<&'a str>,
    settings: PostSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_image_options: Option<CoverImage<'a>>,
    #[serde(rename = "originalArticleURL", skip_serializing_if = "Option::is_none")]
    original_article_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    series_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    published_at: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    co_authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta_tags: Option<MetaTags<'a>>,
}

impl<'a> PostInput<'a> {
    fn new(descriptor: &'a FileDescriptor, content: &'a str, series_id: Option<&'a str>) -> Self {
        let meta_title = non_empty(descriptor.meta_title.as_deref());
        let meta_description = non_empty(descriptor.meta_description.as_deref());
        Self {
            id: None,
            publication_id: None,
            title: &descriptor.title,
            slug: &descriptor.slug,
            content_markdown: content,
            tags: normalize_tags(descriptor.tags.as_ref()),
            subtitle: non_empty(descriptor.subtitle.as_deref()),
            settings: PostSettings {
                enable_table_of_content: descriptor.enable_toc,
                disable_comments: Some(descriptor.disable_comments),
            },
            cover_image_options: cover(descriptor),
            original_article_url: non_empty(descriptor.canonical_url.as_deref()),
            series_id: non_empty(series_id),
            published_at: None,
            co_authors: co_authors(descriptor.co_authors.as_ref()),
            meta_tags: (meta_title.is_some() || meta_description.is_some())
                .then_some(MetaTags { title: meta_title, description: meta_description }),
        }
    }
}

/// Input shared by `createDraft` and `updateDraft`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DraftInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publication_id: Option<&'a str>,
    title: &'a str,
    slug: &'a str,
    content_markdown: &'a str,
    tags: Vec<TagInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtitle: Option<&'a str>,
    settings: PostSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_image_options: Option<CoverImage<'a>>,
}

impl<'a> DraftInput<'a> {
    fn new(descriptor: &'a FileDescriptor, content: &'a str) -> Self {
        Self {
            id: None,
            publication_id: None,
            title: &descriptor.title,
            slug: &descriptor.slug,
            content_markdown: content,
            tags: normalize_tags(descriptor.tags.as_ref()),
            subtitle: non_empty(descriptor.subtitle.as_deref()),
            settings: PostSettings {
                enable_table_of_content: descriptor.enable_toc,
                disable_comments: None,
            },
            cover_image_options: cover(descriptor),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostSettings {
    enable_table_of_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    disable_comments: Option<bool>,
}

#[derive(Serialize)]
struct CoverImage<'a> {
    #[serde(rename = "coverImageURL")]
    cover_image_url: &'a str,
}

#[derive(Serialize)]
struct MetaTags<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

fn cover(descriptor: &FileDescriptor) -> Option<CoverImage<'_>> {
    non_empty(descriptor.cover_url.as_deref()).map(|url| CoverImage { cover_image_url: url })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn graphql_errors(errors: &[Value]) -> RemoteError {
    RemoteError::GraphQl(
        serde_json::to_string_pretty(errors).unwrap_or_else(|_| format!("{errors:?}")),
    )
}

/// First word after `query`/`mutation`, for logs.
fn operation_name(query: &str) -> &str {
    query
        .split_whitespace()
        .skip_while(|w| *w != "query" && *w != "mutation")
        .nth(1)
        .and_then(|name| name.split('(').next())
        .unwrap_or("anonymous")
}
