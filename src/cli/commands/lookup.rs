//! Lookup command: resolve a universe entity by name or id.

use anyhow::{Result, bail};

use crate::cache::CacheService;
use crate::cli::style::{ALERT_CHAR, OK_CHAR, hilite, lolite};
use crate::types::Record;

pub async fn run_lookup(service: &mut CacheService, query: &str) -> Result<()> {
    service.init().await?;

    if let Ok(id) = query.parse::<u64>() {
        let record = service.resolve_by_id(id).await?;
        print_record(service, &record);
        return Ok(());
    }

    if !service.enabled() {
        bail!("name lookup requires the static data cache; enable it or pass a numeric id");
    }

    let Some(ids) = service.lookup_name(query).map(|ids| ids.to_vec()) else {
        println!("{ALERT_CHAR} Nothing found for '{}'", hilite(query));
        return Ok(());
    };

    println!(
        "{OK_CHAR} {} result(s) for '{}':",
        lolite(ids.len()),
        hilite(query)
    );
    for id in ids {
        let record = match service.record(id).cloned() {
            Some(record) => record,
            // Name indices cover more ids than the container index; resolve
            // the rest remotely
            None => service.resolve_by_id(id).await?,
        };
        print_record(service, &record);
    }

    Ok(())
}

fn print_record(service: &CacheService, record: &Record) {
    let chain = service.containment_chain(record.id);
    let context = if chain.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = chain.iter().map(|r| r.name.as_str()).collect();
        format!(" ({})", lolite(names.join(" < ")))
    };

    let security = record
        .security()
        .map(|sec| format!(" [{sec:.1}]"))
        .unwrap_or_default();

    println!(
        "  {} {:?} {}{security}{context}",
        hilite(record.id),
        record.kind,
        record.name
    );
}
