//! Dataset archive fetch and unpack.
//!
//! The SDE ships as a compressed archive of a few hundred megabytes; this is
//! a one-time setup cost per dataset release. Both steps are idempotent: a
//! previously fetched archive is not re-downloaded and an existing working
//! directory is not re-unpacked.

use std::fs;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, info};

use super::{SdeError, SdeResult};
use crate::config::SdeConfig;

/// Name of the unpacked working directory under the cache dir.
pub const UNPACK_DIR: &str = "sde";
/// Name of the downloaded archive file under the cache dir.
pub const ARCHIVE_FILE: &str = ".sde.tar.gz";

pub struct ArchiveLoader<'a> {
    config: &'a SdeConfig,
    cache_dir: &'a Path,
}

impl<'a> ArchiveLoader<'a> {
    pub fn new(config: &'a SdeConfig, cache_dir: &'a Path) -> Self {
        Self { config, cache_dir }
    }

    fn archive_path(&self) -> PathBuf {
        self.cache_dir.join(ARCHIVE_FILE)
    }

    fn unpack_dir(&self) -> PathBuf {
        self.cache_dir.join(UNPACK_DIR)
    }

    /// Ensure a decompressed working copy of the dataset exists, downloading
    /// and unpacking as needed. Returns the working directory path.
    pub async fn ensure(&self) -> SdeResult<PathBuf> {
        let unpack_dir = self.unpack_dir();

        if !unpack_dir.exists() {
            fs::create_dir_all(self.cache_dir).map_err(|e| SdeError::Io {
                path: self.cache_dir.to_path_buf(),
                source: e,
            })?;

            let archive_path = self.archive_path();
            if !archive_path.exists() {
                self.download(&archive_path).await?;
            }
            self.unpack(&archive_path)?;
        }

        if !unpack_dir.is_dir() {
            return Err(SdeError::Unpack(format!(
                "{} is not a directory",
                unpack_dir.display()
            )));
        }

        Ok(unpack_dir)
    }

    async fn download(&self, archive_path: &Path) -> SdeResult<()> {
        let url = &self.config.archive_url;
        info!("downloading dataset archive from {url} (one-time setup)");

        let resp = reqwest::get(url).await?;
        if !resp.status().is_success() {
            return Err(SdeError::Download {
                status: resp.status(),
                url: url.clone(),
            });
        }

        let bytes = resp.bytes().await?;
        info!(
            "downloaded {} MB of static data",
            bytes.len() / (1024 * 1024)
        );

        fs::write(archive_path, &bytes).map_err(|e| SdeError::Io {
            path: archive_path.to_path_buf(),
            source: e,
        })
    }

    fn unpack(&self, archive_path: &Path) -> SdeResult<()> {
        info!("unpacking dataset archive");

        let file = fs::File::open(archive_path).map_err(|e| SdeError::Io {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

        let mut archive = tar::Archive::new(GzDecoder::new(file));
        archive
            .unpack(self.cache_dir)
            .map_err(|e| SdeError::Unpack(e.to_string()))?;

        if !self.unpack_dir().exists() {
            return Err(SdeError::Unpack("output directory missing".to_string()));
        }

        Ok(())
    }

    /// Remove the unpacked working copy once indexing no longer needs it.
    /// The downloaded archive is kept so a later rebuild skips the fetch.
    pub fn cleanup(&self) {
        let unpack_dir = self.unpack_dir();
        match fs::remove_dir_all(&unpack_dir) {
            Ok(()) => debug!("removed working copy {}", unpack_dir.display()),
            Err(e) => debug!("working copy cleanup: {e}"),
        }
    }
}
