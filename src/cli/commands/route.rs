//! Route command: plot a route and annotate each hop with security status
//! and recent kill activity.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;

use crate::cache::CacheService;
use crate::cli::style::{ALERT_CHAR, OK_CHAR, hilite, lolite};
use crate::config::{SecurityPreference, Settings};
use crate::esi::{EsiClient, SystemKills};
use crate::types::SYSTEM_BAND;

pub async fn run_route(
    service: &mut CacheService,
    esi: &EsiClient,
    settings: &Settings,
    from: &str,
    to: &str,
    flag: Option<SecurityPreference>,
) -> Result<()> {
    service.init().await?;

    let flag = flag.unwrap_or(settings.route.security_preference);
    let from_id = resolve_system(service, from)?;
    let to_id = resolve_system(service, to)?;

    let route = esi
        .route(from_id, to_id, flag)
        .await
        .context("route request failed")?;

    let kills: HashMap<u64, SystemKills> = esi
        .system_kills()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|k| (k.system_id, k))
        .collect();

    let (from_name, _) = system_info(service, esi, from_id).await?;
    let (to_name, _) = system_info(service, esi, to_id).await?;
    println!(
        "{OK_CHAR} {} route from {} to {} is {} jumps:",
        lolite(flag.as_str()),
        hilite(&from_name),
        hilite(&to_name),
        (route.len().saturating_sub(1)).bold().green()
    );

    for system_id in route {
        let (name, security) = system_info(service, esi, system_id).await?;
        let danger = kills.get(&system_id);

        let name = match danger {
            Some(k) if k.pod_kills >= settings.route.super_danger_threshold => {
                name.bold().on_red().to_string()
            }
            Some(k) if k.pod_kills > 0 => name.bold().red().to_string(),
            Some(k) if k.ship_kills > 0 => name.bold().yellow().to_string(),
            _ => name.bold().to_string(),
        };

        let activity = danger
            .filter(|k| k.pod_kills > 0 || k.ship_kills > 0)
            .map(|k| format!(" ({} pod, {} ship kills)", k.pod_kills, k.ship_kills))
            .unwrap_or_default();

        println!(" \u{2022} {} {name}{activity}", sec_colored(security));
    }

    Ok(())
}

/// Resolve user input to a solar-system id: numeric ids pass through, names
/// go against the cache's name indices filtered to the system id band.
fn resolve_system(service: &CacheService, input: &str) -> Result<u64> {
    if let Ok(id) = input.parse::<u64>() {
        return Ok(id);
    }

    if !service.enabled() {
        bail!("system name resolution requires the static data cache; pass a system id");
    }

    let systems: Vec<u64> = service
        .lookup_name(input)
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|id| SYSTEM_BAND.contains(id))
        .collect();

    match systems.as_slice() {
        [] => bail!("{ALERT_CHAR} no solar system found for '{input}'"),
        [id] => Ok(*id),
        [first, ..] => {
            println!(
                "{ALERT_CHAR} {} systems match '{}'; using {}",
                lolite(systems.len()),
                hilite(input),
                hilite(first)
            );
            Ok(*first)
        }
    }
}

/// Name and security for a system, cache-first with ESI fallback for
/// systems whose detail payload never merged.
async fn system_info(
    service: &CacheService,
    esi: &EsiClient,
    system_id: u64,
) -> Result<(String, f64)> {
    if let Some(record) = service.record(system_id) {
        if let Some(security) = record.security() {
            return Ok((record.name.clone(), security));
        }
    }

    let system = esi
        .fetch_system(system_id)
        .await
        .with_context(|| format!("system {system_id} lookup failed"))?;
    Ok((system.name, system.security_status))
}

/// Security status colored by decile, high-sec green through null-sec red.
fn sec_colored(security: f64) -> String {
    let rounded = (security * 10.0).round() / 10.0;
    let text = format!("{rounded:4.1}");

    if rounded >= 1.0 {
        text.bold().green().to_string()
    } else if rounded >= 0.9 {
        text.green().to_string()
    } else if rounded >= 0.8 {
        text.cyan().to_string()
    } else if rounded >= 0.7 {
        text.blue().to_string()
    } else if rounded >= 0.6 {
        text.bold().yellow().to_string()
    } else if rounded >= 0.5 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}
