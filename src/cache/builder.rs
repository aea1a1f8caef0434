//! Index construction over the parsed dataset.
//!
//! Three passes over fixed record structures:
//! 1. name indices plus a partially-populated id index (name and kind only),
//! 2. containment resolution per container id band,
//! 3. per-system detail merge from the nested `solarsystem.staticdata`
//!    files, located by walking each system's containment chain.
//!
//! Pass 3 is best-effort: a missing or unreadable detail file leaves the
//! system without a payload and bumps a counter that is reported once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::CacheRoot;
use crate::sde::Dataset;
use crate::types::{Record, RecordKind, RecordPayload, SystemDetails};

/// Counters reported after a full build.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildStats {
    pub names: usize,
    pub unique_names: usize,
    pub regions: usize,
    pub constellations: usize,
    pub systems: usize,
    pub stations: usize,
    pub details_merged: usize,
    pub details_missing: usize,
}

pub struct IndexBuilder<'a> {
    sde_root: &'a Path,
    path_exceptions: &'a HashMap<String, String>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(sde_root: &'a Path, path_exceptions: &'a HashMap<String, String>) -> Self {
        Self {
            sde_root,
            path_exceptions,
        }
    }

    /// Run all three passes. The returned root is marked dirty: it has
    /// never been persisted.
    pub fn build(&self, dataset: &Dataset) -> (CacheRoot, BuildStats) {
        let mut stats = BuildStats::default();
        let mut root = CacheRoot::default();

        build_name_indices(dataset, &mut root, &mut stats);

        let locations = fold_locations(dataset);
        for kind in [
            RecordKind::Region,
            RecordKind::Constellation,
            RecordKind::System,
            RecordKind::Station,
        ] {
            let count = resolve_containment(&mut root, &locations, kind);
            match kind {
                RecordKind::Region => stats.regions = count,
                RecordKind::Constellation => stats.constellations = count,
                RecordKind::System => stats.systems = count,
                RecordKind::Station => stats.stations = count,
                RecordKind::Item => {}
            }
            info!("{count} {kind:?} records discovered");
        }

        self.merge_system_details(&mut root, &mut stats);
        if stats.details_missing > 0 {
            warn!(
                "{} system detail payloads merged, {} missing",
                stats.details_merged, stats.details_missing
            );
        } else {
            info!("{} system detail payloads merged", stats.details_merged);
        }

        root.dirty = true;
        (root, stats)
    }

    /// A name as it appears in the dataset's directory layout: whitespace
    /// stripped, then dataset-specific spelling exceptions applied.
    fn path_component(&self, name: &str) -> String {
        let mut component: String = name.split_whitespace().collect();
        for (from, to) in self.path_exceptions {
            component = component.replace(from.as_str(), to.as_str());
        }
        component
    }

    /// Detail file location for a system, derived from its containment
    /// chain. `None` when the chain does not resolve.
    fn system_detail_path(&self, root: &CacheRoot, system: &Record) -> Option<PathBuf> {
        let constellation = root.from_id.get(&system.parent()?)?;
        let region = root.from_id.get(&constellation.parent()?)?;

        Some(
            self.sde_root
                .join("fsd")
                .join("universe")
                .join("eve")
                .join(self.path_component(&region.name))
                .join(self.path_component(&constellation.name))
                .join(self.path_component(&system.name))
                .join("solarsystem.staticdata"),
        )
    }

    fn merge_system_details(&self, root: &mut CacheRoot, stats: &mut BuildStats) {
        // Resolve every path first: the chain walk needs shared access to
        // the index that the merge below mutates.
        let mut resolved: Vec<(u64, Option<PathBuf>)> = root
            .from_id
            .values()
            .filter(|rec| rec.kind == RecordKind::System)
            .map(|rec| (rec.id, self.system_detail_path(root, rec)))
            .collect();
        resolved.sort_unstable_by_key(|(id, _)| *id);

        for (id, path) in resolved {
            let details = path.as_deref().and_then(read_system_details);
            match details {
                Some(details) => {
                    if let Some(rec) = root.from_id.get_mut(&id) {
                        rec.payload = Some(RecordPayload::System(details));
                        stats.details_merged += 1;
                    }
                }
                None => {
                    debug!("no detail payload for system {id}");
                    stats.details_missing += 1;
                }
            }
        }
    }
}

fn build_name_indices(dataset: &Dataset, root: &mut CacheRoot, stats: &mut BuildStats) {
    for entry in &dataset.names {
        root.all
            .entry(entry.name.clone())
            .or_default()
            .push(entry.id);

        if let Some(kind) = RecordKind::from_id(entry.id) {
            root.from_id
                .insert(entry.id, Record::new(entry.id, entry.name.clone(), kind));
        }
    }
    stats.names = dataset.names.len();
    info!("{} names discovered", stats.names);

    for entry in &dataset.unique_names {
        root.uniq
            .entry(entry.name.clone())
            .or_default()
            .push(entry.id);
    }
    stats.unique_names = dataset.unique_names.len();
    info!("{} unique names discovered", stats.unique_names);
}

/// Item-location pairs folded into id -> containing location ids, ordered
/// as they appear in the dataset (first entry is the canonical parent).
fn fold_locations(dataset: &Dataset) -> HashMap<u64, Vec<u64>> {
    let mut locations: HashMap<u64, Vec<u64>> = HashMap::new();
    for entry in &dataset.item_locations {
        locations
            .entry(entry.id)
            .or_default()
            .push(entry.location_id);
    }
    locations
}

/// Attach containment to every indexed record in `kind`'s id band.
/// Returns how many records the band holds.
fn resolve_containment(
    root: &mut CacheRoot,
    locations: &HashMap<u64, Vec<u64>>,
    kind: RecordKind,
) -> usize {
    let Some(band) = kind.band() else {
        return 0;
    };

    let mut count = 0;
    for (id, rec) in root.from_id.iter_mut() {
        if band.contains(id) {
            count += 1;
            if let Some(parents) = locations.get(id) {
                rec.parent_ids = parents.clone();
            }
        }
    }
    count
}

fn read_system_details(path: &Path) -> Option<SystemDetails> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_yml::from_str(&text) {
        Ok(details) => Some(details),
        Err(e) => {
            debug!("unparseable detail file {}: {e}", path.display());
            None
        }
    }
}
