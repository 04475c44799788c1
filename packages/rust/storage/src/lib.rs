//! Filesystem artifact store for generated documents.
//!
//! The [`ArtifactStore`] owns one flat directory. Every artifact is written
//! once under a unique name and never overwritten; readers look artifacts up
//! by that exact name.
//!
//! **Write rules:**
//! - files are created with `create_new`, so an existing artifact is never replaced
//! - a failed write removes the partially written file

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use clauseguard_shared::{ArtifactRef, ClauseGuardError, Result};

/// Attempts at finding a free name in [`ArtifactStore::put_unique`].
const MAX_NAME_ATTEMPTS: usize = 8;

/// Length of the random hex suffix in generated names.
const SUFFIX_LEN: usize = 8;

/// Handle to the artifact directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open (and create if needed) the artifact directory at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| ClauseGuardError::io(&root, e))?;
        debug!(root = %root.display(), "artifact store opened");
        Ok(Self { root })
    }

    /// The directory holding all artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `bytes` under `name`. Fails if `name` already exists.
    #[instrument(skip_all, fields(name = %name, size = bytes.len()))]
    pub fn put(&self, name: &str, bytes: &[u8]) -> Result<ArtifactRef> {
        let target = self.path_of(name)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|e| ClauseGuardError::io(&target, e))?;

        if let Err(e) = file.write_all(bytes).and_then(|()| file.sync_all()) {
            drop(file);
            remove_quietly(&target);
            return Err(ClauseGuardError::io(&target, e));
        }

        let artifact = ArtifactRef {
            name: name.to_string(),
            path: target.to_string_lossy().into_owned(),
            sha256: sha256_hex(bytes),
            size_bytes: bytes.len(),
        };

        info!(path = %artifact.path, sha256 = %artifact.sha256, "artifact stored");
        Ok(artifact)
    }

    /// Store `bytes` under a fresh `{prefix}_{8 hex chars}.{ext}` name.
    pub fn put_unique(&self, prefix: &str, ext: &str, bytes: &[u8]) -> Result<ArtifactRef> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = format!("{prefix}_{}.{ext}", random_suffix());
            match self.put(&name, bytes) {
                Err(ClauseGuardError::Io { source, .. })
                    if source.kind() == std::io::ErrorKind::AlreadyExists =>
                {
                    warn!(%name, "artifact name collision, retrying");
                }
                other => return other,
            }
        }

        Err(ClauseGuardError::validation(format!(
            "could not find a free artifact name for prefix '{prefix}'"
        )))
    }

    /// Read the artifact stored under exactly `name`.
    pub fn get(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_of(name)?;
        std::fs::read(&path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "artifact lookup failed");
            ClauseGuardError::not_found(name)
        })
    }

    /// Resolve `name` inside the store. Names with path components are refused.
    pub fn path_of(&self, name: &str) -> Result<PathBuf> {
        if !is_plain_name(name) {
            return Err(ClauseGuardError::not_found(name));
        }
        Ok(self.root.join(name))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

fn random_suffix() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(SUFFIX_LEN);
    hex
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove partial artifact");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
