//! Shared fixtures for the integration tests: settings pointed at a scratch
//! directory, a synthetic dataset archive, and a canned augmentation source.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;

use evepal::config::Settings;
use evepal::esi::{AugmentationSource, EsiError, EsiResult};
use evepal::types::{Record, RecordKind};

/// Settings rooted at `dir`. The archive URL is unroutable on purpose: any
/// test that reaches the network is broken.
pub fn settings_for(dir: &Path, enabled: bool) -> Arc<Settings> {
    let mut settings = Settings::default();
    settings.cache.dir = dir.to_path_buf();
    settings.cache.enabled = enabled;
    settings.sde.archive_url = "http://127.0.0.1:1/sde.tar.gz".to_string();
    Arc::new(settings)
}

/// Write a dataset archive under `dir` describing a three-level universe:
/// Region A (10000001) > Constellation B (20000001) > Jita (30000001).
/// Rebuilds re-unpack from this archive without touching the network.
pub fn seed_sde_archive(dir: &Path) {
    let entries: &[(&str, &str)] = &[
        (
            "sde/bsd/invNames.yaml",
            "- itemID: 10000001\n  itemName: Region A\n\
             - itemID: 20000001\n  itemName: Constellation B\n\
             - itemID: 30000001\n  itemName: Jita\n",
        ),
        (
            "sde/bsd/invUniqueNames.yaml",
            "- itemID: 30000001\n  itemName: Jita\n",
        ),
        (
            "sde/bsd/invItems.yaml",
            "- itemID: 20000001\n  locationID: 10000001\n\
             - itemID: 30000001\n  locationID: 20000001\n",
        ),
        (
            "sde/fsd/universe/eve/RegionA/ConstellationB/Jita/solarsystem.staticdata",
            "security: 0.9459\nsecurityClass: B\n",
        ),
    ];

    std::fs::create_dir_all(dir).unwrap();
    let file = std::fs::File::create(dir.join(evepal::sde::archive::ARCHIVE_FILE)).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, contents.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Augmentation source that counts fetches and can be told to fail.
pub struct MockSource {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl MockSource {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                fail: false,
            },
            calls,
        )
    }

    pub fn failing() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                fail: true,
            },
            calls,
        )
    }
}

#[async_trait]
impl AugmentationSource for MockSource {
    async fn fetch_record(&self, id: u64) -> EsiResult<Record> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EsiError::Client("simulated outage".to_string()));
        }
        Ok(Record::new(id, format!("Type {id}"), RecordKind::Item))
    }
}

pub fn call_count(calls: &AtomicUsize) -> usize {
    calls.load(Ordering::SeqCst)
}
