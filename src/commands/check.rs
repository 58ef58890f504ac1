//! `hashsync check` command.

use std::path::{Path, PathBuf};

use chrono::DateTime;

use crate::adapters::live::LiveFileSystem;
use crate::frontmatter::{self, content_hash, Intent};
use crate::ports::FileSystem;
use crate::sync::reconcile::MISSING_FIELDS;
use crate::sync::run::NO_FRONTMATTER;
use crate::sync::tags::normalize_tags;

/// What `publish` would do with one file, determined offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The file would be reconciled with the given intent.
    Ready {
        /// Lifecycle action.
        intent: Intent,
        /// Post slug.
        slug: String,
        /// Normalized tag slugs.
        tags: Vec<String>,
        /// Digest of the body.
        hash: String,
        /// Non-fatal problems worth fixing.
        warnings: Vec<String>,
    },
    /// The file would be skipped.
    Skip(&'static str),
    /// The frontmatter does not parse.
    Invalid(String),
}

/// One checked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedFile {
    /// Path as discovered.
    pub path: PathBuf,
    /// Result of the check.
    pub verdict: Verdict,
}

/// Execute the `check` command.
///
/// # Errors
///
/// Returns an error string if the directory cannot be listed or any file
/// has invalid frontmatter.
pub fn run(posts_directory: &Path) -> Result<(), String> {
    let checked = check_files(&LiveFileSystem, posts_directory)?;
    if checked.is_empty() {
        println!("No markdown files found in {}.", posts_directory.display());
        return Ok(());
    }

    let mut invalid = 0;
    for file in &checked {
        let path = file.path.display();
        match &file.verdict {
            Verdict::Ready { intent, slug, tags, hash, warnings } => {
                println!("{path}: {} {slug}", intent_label(*intent));
                if !tags.is_empty() {
                    println!("  tags: {}", tags.join(", "));
                }
                println!("  sha256: {hash}");
                for warning in warnings {
                    println!("  warning: {warning}");
                }
            }
            Verdict::Skip(reason) => println!("{path}: skip ({reason})"),
            Verdict::Invalid(error) => {
                invalid += 1;
                println!("{path}: invalid ({error})");
            }
        }
    }

    println!("\n{} file(s) checked.", checked.len());
    if invalid > 0 {
        return Err(format!("{invalid} file(s) have invalid frontmatter"));
    }
    Ok(())
}

/// Parses every markdown file under `root` without touching the network.
///
/// # Errors
///
/// Returns an error string if `root` cannot be listed.
pub fn check_files(fs: &dyn FileSystem, root: &Path) -> Result<Vec<CheckedFile>, String> {
    let files = fs
        .find_markdown_files(root)
        .map_err(|e| format!("Failed to list markdown files in {}: {e}", root.display()))?;

    Ok(files
        .into_iter()
        .map(|path| {
            let verdict = match fs.read_to_string(&path) {
                Ok(text) => check_text(&text),
                Err(e) => Verdict::Invalid(format!("failed to read file: {e}")),
            };
            CheckedFile { path, verdict }
        })
        .collect())
}

fn check_text(text: &str) -> Verdict {
    let parsed = match frontmatter::parse(text) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => return Verdict::Skip(NO_FRONTMATTER),
        Err(e) => return Verdict::Invalid(e.to_string()),
    };
    let descriptor = &parsed.descriptor;
    if !descriptor.has_required_fields() {
        return Verdict::Skip(MISSING_FIELDS);
    }

    let mut warnings = Vec::new();
    if let Some(published_at) = descriptor.published_at.as_deref().filter(|v| !v.is_empty()) {
        if DateTime::parse_from_rfc3339(published_at).is_err() {
            warnings.push(format!("publishedAt {published_at:?} is not an RFC 3339 timestamp"));
        }
    }
    if descriptor.delete && descriptor.save_as_draft {
        warnings.push("delete and saveAsDraft are both set; delete wins".to_string());
    }

    Verdict::Ready {
        intent: descriptor.intent(),
        slug: descriptor.slug.clone(),
        tags: normalize_tags(descriptor.tags.as_ref()).into_iter().map(|t| t.slug).collect(),
        hash: content_hash(&parsed.content),
        warnings,
    }
}

fn intent_label(intent: Intent) -> &'static str {
    match intent {
        Intent::Delete => "delete",
        Intent::Draft => "draft",
        Intent::Publish => "publish",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemFs;

    #[test]
    fn reports_intent_tags_and_hash() {
        let fs = MemFs::new().with_file(
            "posts/a.md",
            "---\ntitle: A\nslug: a\ntags: Rust Lang, CLI\nsaveAsDraft: true\n---\nbody",
        );
        let checked = check_files(&fs, Path::new("posts")).unwrap();
        let Verdict::Ready { intent, tags, hash, warnings, .. } = &checked[0].verdict else {
            panic!("expected ready, got {:?}", checked[0].verdict);
        };
        assert_eq!(*intent, Intent::Draft);
        assert_eq!(tags, &["rust-lang", "cli"]);
        assert_eq!(hash, &content_hash("body"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn classifies_skips_and_invalid_files() {
        let fs = MemFs::new()
            .with_file("posts/a.md", "plain text")
            .with_file("posts/b.md", "---\ntitle: Only title\n---\n")
            .with_file("posts/c.md", "---\ntitle: [oops\n---\n")
            .with_file("posts/d.md", "---\ntitle: Open\n");
        let verdicts: Vec<_> =
            check_files(&fs, Path::new("posts")).unwrap().into_iter().map(|c| c.verdict).collect();
        assert_eq!(verdicts[0], Verdict::Skip(NO_FRONTMATTER));
        assert_eq!(verdicts[1], Verdict::Skip(MISSING_FIELDS));
        assert!(matches!(verdicts[2], Verdict::Invalid(_)));
        assert!(matches!(verdicts[3], Verdict::Invalid(_)));
    }

    #[test]
    fn warns_on_bad_published_at_and_conflicting_flags() {
        let verdict = check_text(
            "---\ntitle: A\nslug: a\npublishedAt: yesterday\ndelete: true\nsaveAsDraft: true\n---\n",
        );
        let Verdict::Ready { intent, warnings, .. } = verdict else {
            panic!("expected ready");
        };
        assert_eq!(intent, Intent::Delete);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("publishedAt"));
    }

    #[test]
    fn accepts_rfc3339_published_at() {
        let verdict = check_text("---\ntitle: A\nslug: a\npublishedAt: 2024-05-01T09:00:00Z\n---\n");
        assert!(matches!(verdict, Verdict::Ready { ref warnings, .. } if warnings.is_empty()));
    }
}
