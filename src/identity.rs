//! Application installation identity and single-instance lock.
//!
//! Each installation carries a random secret id, persisted next to the cache
//! files. The secret keys the cache manifest's authenticating digest, so a
//! reset must delete the persisted cache state along with the secret:
//! whatever was written under the old secret can never verify again.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Failed to read installation id from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write installation id to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Another instance is already running (lock file {0} exists)")]
    Locked(PathBuf),
}

/// Owns the installation secret and the instance lock file.
///
/// Construct with the cache directory; all identity state lives beside the
/// cache files it protects.
#[derive(Debug)]
pub struct AppIdentity {
    id_path: PathBuf,
    lock_path: PathBuf,
    /// Files wiped as part of an installation reset, in addition to the
    /// secret itself. Registered by the cache subsystem.
    reset_targets: Vec<PathBuf>,
    secret: Option<String>,
}

impl AppIdentity {
    pub fn new(cache_dir: &Path) -> Self {
        let id_path = cache_dir.join("appid");
        let lock_path = cache_dir.join("appid.lock");
        Self {
            id_path,
            lock_path,
            reset_targets: Vec::new(),
            secret: None,
        }
    }

    /// Register a file to be deleted on installation reset.
    pub fn add_reset_target(&mut self, path: PathBuf) {
        self.reset_targets.push(path);
    }

    /// Ensure an installation secret exists, creating one (and wiping any
    /// stale persisted state) when absent. Returns the secret.
    pub fn ensure(&mut self) -> Result<&str, IdentityError> {
        if !self.id_path.exists() {
            info!("installation reset: generating new id");
            for target in &self.reset_targets {
                match fs::remove_file(target) {
                    Ok(()) => debug!("reset removed {}", target.display()),
                    Err(e) => debug!("reset skipped {}: {e}", target.display()),
                }
            }

            if let Some(parent) = self.id_path.parent() {
                fs::create_dir_all(parent).map_err(|e| IdentityError::Write {
                    path: self.id_path.clone(),
                    source: e,
                })?;
            }

            let fresh = uuid::Uuid::new_v4().to_string();
            fs::write(&self.id_path, &fresh).map_err(|e| IdentityError::Write {
                path: self.id_path.clone(),
                source: e,
            })?;
            self.secret = Some(fresh);
        } else if self.secret.is_none() {
            let read = fs::read_to_string(&self.id_path).map_err(|e| IdentityError::Read {
                path: self.id_path.clone(),
                source: e,
            })?;
            self.secret = Some(read.trim().to_string());
        }

        Ok(self.secret.as_deref().unwrap_or_default())
    }

    /// Current installation secret as digest-key bytes.
    ///
    /// Only valid after `ensure` has succeeded at least once.
    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_deref().unwrap_or_default().as_bytes()
    }

    /// Drop the current secret so the next `ensure` rotates it and wipes the
    /// registered persisted state.
    pub fn reset_installation(&mut self) {
        warn!("installation reset requested");
        if let Err(e) = fs::remove_file(&self.id_path) {
            debug!("reset: id file removal: {e}");
        }
        self.secret = None;
    }

    /// Acquire the single-instance lock. Fails if another instance holds it.
    pub fn acquire_lock(&self) -> Result<(), IdentityError> {
        if self.lock_path.exists() {
            return Err(IdentityError::Locked(self.lock_path.clone()));
        }

        if let Some(parent) = self.lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| IdentityError::Write {
                path: self.lock_path.clone(),
                source: e,
            })?;
        }
        fs::write(&self.lock_path, std::process::id().to_string()).map_err(|e| {
            IdentityError::Write {
                path: self.lock_path.clone(),
                source: e,
            }
        })
    }

    /// Release the single-instance lock. Best-effort.
    pub fn release_lock(&self) {
        if let Err(e) = fs::remove_file(&self.lock_path) {
            debug!("lock release: {e}");
        }
    }
}
