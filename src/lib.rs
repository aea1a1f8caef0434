pub mod cache;
pub mod cli;
pub mod config;
pub mod esi;
pub mod identity;
pub mod logging;
pub mod sde;
pub mod types;

pub use cache::{CacheError, CacheRoot, CacheService, VerificationManifest, VerifyFailure};
pub use config::{SecurityPreference, Settings};
pub use esi::{AugmentationSource, EsiClient, EsiError};
pub use identity::AppIdentity;
pub use types::{Record, RecordKind, RecordPayload};
