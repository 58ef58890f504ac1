//! Service context bundling the port trait objects for one run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::adapters::dry_run::DryRunRemote;
use crate::adapters::live::{HashnodeClient, LiveFileSystem};
use crate::adapters::recording::RecordingRemote;
use crate::adapters::replaying::ReplayingRemote;
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::ports::filesystem::FileSystem;
use crate::ports::remote::RemoteClient;

/// Env var naming a cassette file to record remote calls into.
pub const RECORD_ENV: &str = "HASHSYNC_RECORD";
/// Env var naming a cassette file to serve remote calls from.
pub const REPLAY_ENV: &str = "HASHSYNC_REPLAY";

type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Bundles the port trait objects into a single context.
///
/// Constructors wire up different remote implementations (live,
/// recording, replaying), optionally behind the dry-run decorator. The
/// filesystem is always live.
pub struct ServiceContext {
    /// Remote publication.
    pub remote: Box<dyn RemoteClient>,
    /// Filesystem holding the markdown sources.
    pub fs: Box<dyn FileSystem>,
    /// Optional cassette recorder; written to disk on drop.
    recorder: Option<SharedRecorder>,
}

impl ServiceContext {
    /// Creates a context talking to the configured endpoint.
    ///
    /// `HASHSYNC_REPLAY=<file>` serves remote calls from a cassette instead;
    /// otherwise `HASHSYNC_RECORD=<file>` records them into one.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the replay
    /// cassette cannot be loaded.
    pub fn from_env(config: &Config, dry_run: bool) -> Result<Self, String> {
        if let Some(path) = env_path(REPLAY_ENV) {
            info!("Replaying remote calls from {}", path.display());
            return Self::replaying(&path, dry_run);
        }
        if let Some(path) = env_path(RECORD_ENV) {
            info!("Recording remote calls to {}", path.display());
            return Self::recording(config, &path, dry_run);
        }
        let live = HashnodeClient::new(config).map_err(|e| e.to_string())?;
        Ok(Self::assemble(Box::new(live), None, dry_run))
    }

    /// Creates a live context whose remote calls are written to a cassette
    /// at `path` when the context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn recording(config: &Config, path: &Path, dry_run: bool) -> Result<Self, String> {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            "hashsync-publish",
            config.publication_host.as_str(),
        )));
        let live = HashnodeClient::new(config).map_err(|e| e.to_string())?;
        let remote = RecordingRemote::new(Box::new(live), Arc::clone(&recorder));
        Ok(Self::assemble(Box::new(remote), Some(recorder), dry_run))
    }

    /// Creates a context whose remote is served from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path, dry_run: bool) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        let remote = ReplayingRemote::new(CassetteReplayer::new(&cassette));
        Ok(Self::assemble(Box::new(remote), None, dry_run))
    }

    fn assemble(
        remote: Box<dyn RemoteClient>,
        recorder: Option<SharedRecorder>,
        dry_run: bool,
    ) -> Self {
        let remote: Box<dyn RemoteClient> =
            if dry_run { Box::new(DryRunRemote::new(remote)) } else { remote };
        Self { remote, fs: Box::new(LiveFileSystem), recorder }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from)
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        let Ok(recorder) = recorder.lock() else {
            warn!("failed to write cassette: recorder lock poisoned");
            return;
        };
        match recorder.finish() {
            Ok(path) => info!("Recorded {} remote calls to {}", recorder.len(), path.display()),
            Err(e) => warn!("failed to write cassette: {e}"),
        }
    }
}
