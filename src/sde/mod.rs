//! Bulk dataset (SDE) loader.
//!
//! Obtains a working copy of the Static Data Export and parses its flat
//! entity lists. Split into [`archive`] (fetch + unpack, idempotent) and
//! [`parser`] (YAML entity lists into typed entries).

pub mod archive;
pub mod parser;

use std::path::PathBuf;

use thiserror::Error;

pub use archive::ArchiveLoader;
pub use parser::{Dataset, ItemEntry, NameEntry, parse_dataset};

#[derive(Error, Debug)]
pub enum SdeError {
    #[error("Dataset download returned {status} for {url}")]
    Download {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Dataset download failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unpacking failed: {0}")]
    Unpack(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yml::Error,
    },
}

pub type SdeResult<T> = Result<T, SdeError>;
