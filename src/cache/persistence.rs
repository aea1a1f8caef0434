//! Integrity-verified persistence for the cache root.
//!
//! The data file and its manifest are written whole-file and only after the
//! entire in-memory index exists, so a reader never observes a half-written
//! cache. Verification runs the gates in a fixed order: manifest present,
//! size, parse, keyed digest, cardinalities. Any failure classifies the
//! cache as corrupt; the caller is expected to invalidate and rebuild.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::error::{CacheError, CacheResult, VerifyFailure};
use super::manifest::{VerificationManifest, keyed_digest};
use super::root::CacheRoot;

const DATA_FILE: &str = "cache.json";
const MANIFEST_FILE: &str = ".cache.json";

/// Manages the cache data file and its verification manifest.
#[derive(Debug)]
pub struct CachePersistence {
    data_path: PathBuf,
    manifest_path: PathBuf,
}

impl CachePersistence {
    /// Files live under `<cache_dir>/ours/`, separate from the dataset
    /// working copy.
    pub fn new(cache_dir: &Path) -> Self {
        let ours = cache_dir.join("ours");
        Self {
            data_path: ours.join(DATA_FILE),
            manifest_path: ours.join(MANIFEST_FILE),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Whether a persisted data file exists at all. Absence is a cold
    /// start, not corruption.
    pub fn exists(&self) -> bool {
        self.data_path.exists()
    }

    /// Persist the cache if it is dirty. Returns whether anything was
    /// written. Clears the dirty flag before serializing, so the persisted
    /// document always records a clean state.
    pub fn persist(&self, root: &mut CacheRoot, secret: &[u8]) -> CacheResult<bool> {
        if !root.dirty {
            return Ok(false);
        }

        info!("persisting cache to {}", self.data_path.display());
        root.dirty = false;

        let bytes = serde_json::to_vec(root)?;

        if let Some(parent) = self.data_path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&self.data_path, &bytes).map_err(|e| CacheError::Io {
            path: self.data_path.clone(),
            source: e,
        })?;

        let manifest = VerificationManifest::describe(root.counts(), secret, &bytes);
        manifest
            .save(&self.manifest_path)
            .map_err(|e| CacheError::Io {
                path: self.manifest_path.clone(),
                source: e,
            })?;

        debug!(
            "persisted {} bytes, checksum {}",
            manifest.size, manifest.checksum
        );
        Ok(true)
    }

    /// Validate and load the persisted cache.
    ///
    /// Gate order is part of the contract: manifest existence, recorded
    /// size against the actual file, JSON parse, keyed digest recomputed
    /// with the current installation secret, then per-index cardinalities.
    pub fn verify_and_load(&self, secret: &[u8]) -> Result<CacheRoot, VerifyFailure> {
        if !self.manifest_path.exists() {
            return Err(VerifyFailure::ManifestMissing);
        }
        let manifest = VerificationManifest::load(&self.manifest_path)
            .map_err(|e| VerifyFailure::Manifest(e.to_string()))?;

        let actual_size = fs::metadata(&self.data_path)
            .map(|m| m.len())
            .map_err(|e| VerifyFailure::Parse(e.to_string()))?;
        if manifest.size != actual_size {
            return Err(VerifyFailure::Size {
                expected: manifest.size,
                actual: actual_size,
            });
        }

        let bytes =
            fs::read(&self.data_path).map_err(|e| VerifyFailure::Parse(e.to_string()))?;
        let root: CacheRoot =
            serde_json::from_slice(&bytes).map_err(|e| VerifyFailure::Parse(e.to_string()))?;

        if root.dirty {
            // Persist always clears the flag first; seeing it set means the
            // writer did not follow the protocol. Accepted anyway.
            warn!("loaded a dirty cache");
        }

        if manifest.checksum != keyed_digest(secret, &bytes) {
            return Err(VerifyFailure::Checksum);
        }

        let counts = root.counts();
        for (index, expected) in &manifest.expect_lengths {
            if counts.get(index) != Some(expected) {
                return Err(VerifyFailure::Lengths {
                    index: index.clone(),
                });
            }
        }

        Ok(root)
    }

    /// Delete the persisted cache files. Best-effort.
    pub fn clear(&self) {
        for path in [&self.data_path, &self.manifest_path] {
            match fs::remove_file(path) {
                Ok(()) => debug!("removed {}", path.display()),
                Err(e) => debug!("cache clear {}: {e}", path.display()),
            }
        }
    }
}
