//! Accumulates remote interactions and writes them out as a cassette.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;

use super::format::{Cassette, Interaction};

/// In-memory cassette that is flushed to `path` on [`finish`](Self::finish).
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    cassette: Cassette,
}

impl CassetteRecorder {
    /// Starts an empty cassette for `publication`, to be written at `path`.
    pub fn new(path: &Path, name: &str, publication: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            cassette: Cassette {
                name: name.to_string(),
                recorded_at: Utc::now(),
                publication: publication.to_string(),
                interactions: Vec::new(),
            },
        }
    }

    /// Appends one call; `seq` is its position in the cassette.
    pub fn record(&mut self, port: &str, method: &str, input: Value, output: Value) {
        let seq = self.cassette.interactions.len() as u64;
        self.cassette.interactions.push(Interaction {
            seq,
            port: port.to_string(),
            method: method.to_string(),
            input,
            output,
        });
    }

    /// Calls recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cassette.interactions.len()
    }

    /// True before the first call is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cassette.interactions.is_empty()
    }

    /// Writes the cassette as YAML, stamped with the current time, creating
    /// parent directories as needed. Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be rendered or the file written.
    pub fn finish(&self) -> std::io::Result<PathBuf> {
        let cassette = Cassette { recorded_at: Utc::now(), ..self.cassette.clone() };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path.clone())
    }
}
