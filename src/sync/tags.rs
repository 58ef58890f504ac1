//! Normalization of list-valued frontmatter into mutation inputs.

use serde::{Deserialize, Serialize};

use crate::frontmatter::ListField;

/// Maximum number of tags the platform accepts per post.
pub const MAX_TAGS: usize = 5;

/// Tag as sent to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInput {
    /// URL-safe identifier.
    pub slug: String,
    /// Display text.
    pub name: String,
}

/// Builds tag inputs: first [`MAX_TAGS`] non-blank entries, in order.
///
/// No de-duplication; tags that collide after normalization are left for
/// the platform to merge.
#[must_use]
pub fn normalize_tags(tags: Option<&ListField>) -> Vec<TagInput> {
    let Some(tags) = tags else {
        return Vec::new();
    };
    tags.entries()
        .into_iter()
        .take(MAX_TAGS)
        .map(|name| TagInput { slug: tag_slug(name), name: name.to_string() })
        .collect()
}

/// Lowercases and joins whitespace-separated words with `-`.
#[must_use]
pub fn tag_slug(name: &str) -> String {
    name.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join("-")
}

/// Co-author usernames, trimmed, blanks dropped.
#[must_use]
pub fn co_authors(list: Option<&ListField>) -> Vec<String> {
    list.map(|l| l.entries().into_iter().map(String::from).collect()).unwrap_or_default()
}
