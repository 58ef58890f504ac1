//! Live filesystem adapter using `std::fs` and `walkdir`.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::ports::filesystem::{is_markdown, FileSystem};

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn find_markdown_files(
        &self,
        root: &Path,
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>> {
        if !root.is_dir() {
            return Err(format!("{} is not a directory", root.display()).into());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).into_iter().filter_entry(|e| !ignored(e))
        {
            // Unreadable directories and symlink loops are skipped, not fatal.
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping {}: {err}", err.path().unwrap_or(root).display());
                    continue;
                }
            };
            if entry.file_type().is_file() && is_markdown(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Hidden directories and `node_modules` are never descended into.
fn ignored(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.') || name == "node_modules")
}
