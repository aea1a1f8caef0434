//! Sync command: verify the cache, building or rebuilding as needed.

use anyhow::Result;

use crate::cache::CacheService;
use crate::cli::style::{OK_CHAR, WARN_CHAR, WORKING_CHAR, hilite};

pub async fn run_sync(service: &mut CacheService, force: bool) -> Result<()> {
    if force {
        println!("{WORKING_CHAR} Discarding persisted cache");
        service.clear_persisted();
    }

    println!("{WORKING_CHAR} Verifying data cache\u{2026}");
    service.init().await?;

    if !service.enabled() {
        println!("{WARN_CHAR} Static data cache is disabled in configuration");
        return Ok(());
    }

    if let Some(stats) = service.build_stats() {
        println!(
            "{OK_CHAR} Cache built: {} names, {} regions, {} constellations, {} systems",
            hilite(stats.names),
            hilite(stats.regions),
            hilite(stats.constellations),
            hilite(stats.systems)
        );
        if stats.details_missing > 0 {
            println!(
                "{WARN_CHAR} Missed {} system detail payload(s)",
                hilite(stats.details_missing)
            );
        }
    } else if let Some(root) = service.root() {
        let counts = root.counts();
        println!(
            "{OK_CHAR} Data cache verified ({} ids, {} names)",
            hilite(counts["fromId"]),
            hilite(counts["all"])
        );
    }

    Ok(())
}
