//! Full pipeline: cold build from a synthetic dataset, warm verified load,
//! and corruption recovery through an installation reset.

mod common;

use tempfile::TempDir;

use common::{MockSource, seed_sde_archive, settings_for};
use evepal::cache::CacheService;
use evepal::identity::AppIdentity;
use evepal::types::RecordKind;

fn service_for(dir: &TempDir) -> CacheService {
    let settings = settings_for(dir.path(), true);
    let identity = AppIdentity::new(dir.path());
    let (source, _) = MockSource::new();
    CacheService::new(settings, identity, Box::new(source))
}

#[tokio::test]
async fn test_cold_build_resolves_containment_and_details() {
    let dir = TempDir::new().unwrap();
    seed_sde_archive(dir.path());

    let mut service = service_for(&dir);
    service.init().await.unwrap();

    let jita = service.record(30_000_001).unwrap();
    assert_eq!(jita.name, "Jita");
    assert_eq!(jita.kind, RecordKind::System);
    assert_eq!(jita.security(), Some(0.9459));

    let chain = service.containment_chain(30_000_001);
    assert_eq!(chain[0].id, 20_000_001);
    assert_eq!(chain[1].id, 10_000_001);
    assert_eq!(chain[1].kind, RecordKind::Region);

    // The working copy is gone, the archive and cache files remain
    assert!(!dir.path().join("sde").exists());
    assert!(dir.path().join("ours/cache.json").is_file());
    assert!(dir.path().join("ours/.cache.json").is_file());
}

#[tokio::test]
async fn test_warm_start_loads_without_rebuilding() {
    let dir = TempDir::new().unwrap();
    seed_sde_archive(dir.path());

    let mut cold = service_for(&dir);
    cold.init().await.unwrap();
    assert!(cold.build_stats().is_some());
    drop(cold);

    let mut warm = service_for(&dir);
    warm.init().await.unwrap();

    assert!(warm.build_stats().is_none(), "no rebuild on a verified load");
    assert_eq!(warm.record(30_000_001).unwrap().name, "Jita");
    assert_eq!(warm.lookup_name("Jita"), Some(&[30_000_001][..]));
}

#[tokio::test]
async fn test_corruption_triggers_reset_and_rebuild() {
    let dir = TempDir::new().unwrap();
    seed_sde_archive(dir.path());

    let mut service = service_for(&dir);
    service.init().await.unwrap();
    drop(service);

    let secret_before = std::fs::read_to_string(dir.path().join("appid")).unwrap();

    // Same-length corruption of the persisted data file
    let data_path = dir.path().join("ours/cache.json");
    let text = std::fs::read_to_string(&data_path).unwrap();
    std::fs::write(&data_path, text.replacen("Jita", "Jitb", 1)).unwrap();

    let mut service = service_for(&dir);
    service.init().await.unwrap();

    // Verification failed, the installation was reset, and a rebuild from
    // the dataset restored the real record
    let secret_after = std::fs::read_to_string(dir.path().join("appid")).unwrap();
    assert_ne!(secret_before, secret_after, "secret must rotate on reset");
    assert!(service.build_stats().is_some(), "a rebuild ran");
    assert_eq!(service.record(30_000_001).unwrap().name, "Jita");
}

#[tokio::test]
async fn test_truncation_recovery_restores_all_entries() {
    let dir = TempDir::new().unwrap();
    seed_sde_archive(dir.path());

    let mut service = service_for(&dir);
    service.init().await.unwrap();
    assert_eq!(service.root().unwrap().from_id.len(), 3);
    drop(service);

    // Simulated truncation with fully recomputed digests: the manifest's
    // expected count of 3 id-index entries is the only surviving witness
    let secret = std::fs::read_to_string(dir.path().join("appid")).unwrap();
    let data_path = dir.path().join("ours/cache.json");
    let manifest_path = dir.path().join("ours/.cache.json");

    let mut doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&data_path).unwrap()).unwrap();
    doc["fromId"].as_object_mut().unwrap().remove("30000001");
    assert_eq!(doc["fromId"].as_object().unwrap().len(), 2);
    let tampered = serde_json::to_vec(&doc).unwrap();
    std::fs::write(&data_path, &tampered).unwrap();

    let mut manifest = evepal::VerificationManifest::load(&manifest_path).unwrap();
    assert_eq!(manifest.expect_lengths["fromId"], 3);
    manifest.checksum = evepal::cache::manifest::keyed_digest(secret.trim().as_bytes(), &tampered);
    manifest.shasum = evepal::cache::manifest::content_digest(&tampered);
    manifest.size = tampered.len() as u64;
    manifest.save(&manifest_path).unwrap();

    let mut service = service_for(&dir);
    service.init().await.unwrap();

    assert_eq!(
        service.root().unwrap().from_id.len(),
        3,
        "rebuild restores every id-index entry"
    );
}

#[tokio::test]
async fn test_rebuild_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    // No archive seeded and an unroutable URL: the cold path must surface
    // a hard initialization error
    let mut service = service_for(&dir);
    assert!(service.init().await.is_err());
}
