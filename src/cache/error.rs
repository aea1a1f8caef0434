use std::path::PathBuf;

use thiserror::Error;

use crate::esi::EsiError;
use crate::identity::IdentityError;
use crate::sde::SdeError;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Dataset load failed: {0}")]
    Sde(#[from] SdeError),

    #[error("Augmentation fetch failed: {0}")]
    Augmentation(#[from] EsiError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Why a persisted cache was rejected during verification.
///
/// Never propagated as an error: any variant triggers invalidation, an
/// installation reset, and a rebuild.
#[derive(Error, Debug)]
pub enum VerifyFailure {
    #[error("manifest missing")]
    ManifestMissing,

    #[error("manifest unreadable: {0}")]
    Manifest(String),

    #[error("size mismatch (manifest {expected}, file {actual})")]
    Size { expected: u64, actual: u64 },

    #[error("data file unreadable: {0}")]
    Parse(String),

    #[error("keyed digest mismatch")]
    Checksum,

    #[error("cardinality mismatch on '{index}'")]
    Lengths { index: String },
}
