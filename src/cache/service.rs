//! The cache service: one value owning the cache root and its lifecycle.
//!
//! Dependencies (settings, installation identity, augmentation source) are
//! constructor-supplied; there is no ambient singleton. The service is the
//! only mutator of the cache after construction, and `resolve_by_id` takes
//! `&mut self`, so two in-flight resolutions for the same missing id cannot
//! exist.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::builder::{BuildStats, IndexBuilder};
use super::error::CacheResult;
use super::persistence::CachePersistence;
use super::root::CacheRoot;
use crate::config::Settings;
use crate::esi::AugmentationSource;
use crate::identity::AppIdentity;
use crate::sde::{ArchiveLoader, parse_dataset};
use crate::types::Record;

pub struct CacheService {
    settings: Arc<Settings>,
    identity: AppIdentity,
    persistence: CachePersistence,
    source: Box<dyn AugmentationSource + Send + Sync>,
    root: Option<CacheRoot>,
    build_stats: Option<BuildStats>,
}

impl CacheService {
    pub fn new(
        settings: Arc<Settings>,
        mut identity: AppIdentity,
        source: Box<dyn AugmentationSource + Send + Sync>,
    ) -> Self {
        let persistence = CachePersistence::new(&settings.cache.dir);

        // An installation reset must take the cache files with it: they can
        // never verify under a rotated secret.
        identity.add_reset_target(persistence.data_path().to_path_buf());
        identity.add_reset_target(persistence.manifest_path().to_path_buf());

        Self {
            settings,
            identity,
            persistence,
            source,
            root: None,
            build_stats: None,
        }
    }

    /// Whether the subsystem is active (configured on and initialized).
    pub fn enabled(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&CacheRoot> {
        self.root.as_ref()
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    pub fn build_stats(&self) -> Option<&BuildStats> {
        self.build_stats.as_ref()
    }

    /// Initialize the cache: validated disk load when possible, full
    /// rebuild otherwise. Rebuild failure is fatal to the subsystem and
    /// propagates to the host application.
    pub async fn init(&mut self) -> CacheResult<()> {
        if !self.settings.cache.enabled {
            info!("static data cache disabled; lookups will go to ESI");
            return Ok(());
        }

        self.identity.ensure()?;

        let root = match self.load_verified()? {
            Some(root) => {
                info!("cache verified");
                root
            }
            None => self.rebuild().await?,
        };

        self.root = Some(root);
        Ok(())
    }

    /// Warm path: load and validate the persisted cache. On verification
    /// failure the cache files are deleted and the installation is reset
    /// (rotating the secret) before `None` signals the caller to rebuild.
    fn load_verified(&mut self) -> CacheResult<Option<CacheRoot>> {
        if !self.persistence.exists() {
            debug!("no persisted cache; cold start");
            return Ok(None);
        }

        match self
            .persistence
            .verify_and_load(self.identity.secret_bytes())
        {
            Ok(root) => Ok(Some(root)),
            Err(failure) => {
                error!("cache verification failed on {failure}: resetting installation");
                self.persistence.clear();
                self.identity.reset_installation();
                self.identity.ensure()?;
                Ok(None)
            }
        }
    }

    /// Cold path: download, unpack, parse, index, persist.
    async fn rebuild(&mut self) -> CacheResult<CacheRoot> {
        info!("building cache from the bulk dataset; this can take a few minutes");

        let loader = ArchiveLoader::new(&self.settings.sde, &self.settings.cache.dir);
        let sde_root = loader.ensure().await?;
        let dataset = parse_dataset(&sde_root)?;

        let builder = IndexBuilder::new(&sde_root, &self.settings.sde.path_exceptions);
        let (mut root, stats) = builder.build(&dataset);
        self.build_stats = Some(stats);

        // The working copy has served its purpose
        loader.cleanup();

        self.persistence
            .persist(&mut root, self.identity.secret_bytes())?;
        Ok(root)
    }

    /// Resolve a record by id: static index, then augmentation index, then
    /// the remote source. Only the remote path mutates the cache. With the
    /// subsystem disabled every call goes remote and nothing is stored.
    pub async fn resolve_by_id(&mut self, id: u64) -> CacheResult<Record> {
        match &self.root {
            None => return Ok(self.source.fetch_record(id).await?),
            Some(root) => {
                if let Some(rec) = root.record(id) {
                    return Ok(rec.clone());
                }
            }
        }

        debug!("cache miss id {id}");
        let rec = self.source.fetch_record(id).await?;
        if let Some(root) = &mut self.root {
            root.items.insert(id, rec.clone());
            root.dirty = true;
        }
        Ok(rec)
    }

    /// Resolve a name against the derived name indices.
    pub fn lookup_name(&self, name: &str) -> Option<&[u64]> {
        self.root.as_ref()?.lookup_name(name)
    }

    /// Static or augmented record, without going remote.
    pub fn record(&self, id: u64) -> Option<&Record> {
        self.root.as_ref()?.record(id)
    }

    /// Containment chain for a container record (empty when unresolvable).
    pub fn containment_chain(&self, id: u64) -> Vec<&Record> {
        self.root
            .as_ref()
            .map(|root| root.containment_chain(id))
            .unwrap_or_default()
    }

    /// Write the cache to disk if it has diverged. Returns whether a write
    /// happened.
    pub fn flush(&mut self) -> CacheResult<bool> {
        match &mut self.root {
            Some(root) => self
                .persistence
                .persist(root, self.identity.secret_bytes()),
            None => Ok(false),
        }
    }

    /// Final flush before exit.
    pub fn shutdown(&mut self) -> CacheResult<()> {
        if self.flush()? {
            info!("cache persisted at shutdown");
        }
        Ok(())
    }

    /// Drop the persisted cache files so the next `init` rebuilds.
    pub fn clear_persisted(&self) {
        self.persistence.clear();
    }
}
