//! Static reference-data cache engine.
//!
//! Ingests the bulk dataset, builds derived lookup indices, persists them
//! with integrity verification, and lazily augments the index with records
//! fetched from ESI at runtime. See [`service::CacheService`] for the
//! lifecycle entry points.

pub mod builder;
pub mod error;
pub mod manifest;
pub mod persistence;
pub mod root;
pub mod service;

pub use builder::{BuildStats, IndexBuilder};
pub use error::{CacheError, CacheResult, VerifyFailure};
pub use manifest::VerificationManifest;
pub use persistence::CachePersistence;
pub use root::CacheRoot;
pub use service::CacheService;
