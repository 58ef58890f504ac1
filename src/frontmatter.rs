//! Frontmatter parsing: splits a markdown file into its metadata block and
//! body, and decodes the block into a [`FileDescriptor`].
//!
//! A file carries frontmatter when its first line is `---`; the block runs
//! until the next `---` line and is decoded as YAML using the camelCase keys
//! below.
//!
//! ```text
//! ---
//! title: Hello
//! slug: hello
//! tags: rust, cli
//! seriesSlug: getting-started
//! saveAsDraft: false
//! ---
//! Body goes here.
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use sha2::{Digest, Sha256};

use crate::error::FrontmatterError;

/// A list-valued field written either as `a, b, c` or as a YAML sequence.
///
/// Plain numbers and booleans are taken as their text, so `tags: 2024` and
/// `tags: [rust, 2024]` both decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ListField {
    /// Comma-separated string.
    Csv(String),
    /// YAML sequence.
    Items(Vec<String>),
}

impl ListField {
    /// Raw entries in declaration order, trimmed, with empties dropped.
    #[must_use]
    pub fn entries(&self) -> Vec<&str> {
        let raw: Vec<&str> = match self {
            Self::Csv(csv) => csv.split(',').collect(),
            Self::Items(items) => items.iter().map(String::as_str).collect(),
        };
        raw.into_iter().map(str::trim).filter(|entry| !entry.is_empty()).collect()
    }
}

impl<'de> Deserialize<'de> for ListField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Sequence(items) => items
                .into_iter()
                .map(|item| {
                    scalar_text(item)
                        .ok_or_else(|| D::Error::custom("list entries must be plain values"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Items),
            other => scalar_text(other).map(Self::Csv).ok_or_else(|| {
                D::Error::custom("expected a comma-separated string or a list of values")
            }),
        }
    }
}

// Null reads as empty; mappings and sequences have no text form.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    scalar_text(Value::deserialize(deserializer)?)
        .ok_or_else(|| D::Error::custom("expected a plain value"))
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

/// Declared intent of one markdown file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Post title. Required; null reads as empty.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub title: String,
    /// Post slug; the reconciliation key. Required; null reads as empty.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub slug: String,
    /// Tags; at most five are sent.
    #[serde(default)]
    pub tags: Option<ListField>,
    /// Subtitle.
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Cover image URL.
    #[serde(default, rename = "cover", alias = "coverUrl")]
    pub cover_url: Option<String>,
    /// Slug of the series the post belongs to.
    #[serde(default)]
    pub series_slug: Option<String>,
    /// Display name used if the series has to be created.
    #[serde(default)]
    pub series_name: Option<String>,
    /// Render a table of contents.
    #[serde(default, deserialize_with = "null_as_false")]
    pub enable_toc: bool,
    /// Keep the file as a draft instead of publishing it.
    #[serde(default, deserialize_with = "null_as_false")]
    pub save_as_draft: bool,
    /// Remove the published post.
    #[serde(default, deserialize_with = "null_as_false")]
    pub delete: bool,
    /// Original article URL for cross-posts.
    #[serde(default)]
    pub canonical_url: Option<String>,
    /// Turn off comments.
    #[serde(default, deserialize_with = "null_as_false")]
    pub disable_comments: bool,
    /// Backdated publication timestamp, passed through as written.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Co-author usernames.
    #[serde(default)]
    pub co_authors: Option<ListField>,
    /// SEO title.
    #[serde(default)]
    pub meta_title: Option<String>,
    /// SEO description.
    #[serde(default)]
    pub meta_description: Option<String>,
}

/// The single lifecycle action a descriptor asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Remove the published post.
    Delete,
    /// Create or update a draft.
    Draft,
    /// Create or update a published post.
    Publish,
}

impl FileDescriptor {
    /// Returns true when both title and slug are present.
    #[must_use]
    pub fn has_required_fields(&self) -> bool {
        !self.title.trim().is_empty() && !self.slug.trim().is_empty()
    }

    /// Resolves the intent. Delete wins over draft.
    #[must_use]
    pub fn intent(&self) -> Intent {
        if self.delete {
            Intent::Delete
        } else if self.save_as_draft {
            Intent::Draft
        } else {
            Intent::Publish
        }
    }

    /// Series slug, if one is set and non-blank.
    #[must_use]
    pub fn series_slug(&self) -> Option<&str> {
        non_blank(self.series_slug.as_deref())
    }

    /// Series name override, if one is set and non-blank.
    #[must_use]
    pub fn series_name(&self) -> Option<&str> {
        non_blank(self.series_name.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A file split into descriptor and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    /// Decoded metadata.
    pub descriptor: FileDescriptor,
    /// Markdown body after the closing fence.
    pub content: String,
}

/// Parses a markdown file.
///
/// Returns `Ok(None)` when the file has no frontmatter block.
///
/// # Errors
///
/// Returns an error if the block is unterminated or is not valid YAML.
pub fn parse(text: &str) -> Result<Option<ParsedFile>, FrontmatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if !is_fence(first) {
        return Ok(None);
    }

    let start = first.len();
    let mut pos = start;
    for line in lines {
        if is_fence(line) {
            let yaml = &text[start..pos];
            let body = &text[pos + line.len()..];
            let descriptor = if yaml.trim().is_empty() {
                FileDescriptor::default()
            } else {
                serde_yaml::from_str(yaml)?
            };
            return Ok(Some(ParsedFile {
                descriptor,
                content: body.trim_start_matches(['\r', '\n']).to_string(),
            }));
        }
        pos += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Hex SHA-256 digest of a body, for change reports.
#[must_use]
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
