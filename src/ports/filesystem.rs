//! Filesystem port for reading the posts directory.

use std::path::{Path, PathBuf};

/// Provides read access to the markdown sources.
///
/// Abstracting the filesystem lets the batch runner be tested against an
/// in-memory tree.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    /// Recursively lists markdown files under `root`, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be walked.
    fn find_markdown_files(
        &self,
        root: &Path,
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Returns true for paths with a markdown extension.
#[must_use]
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}
