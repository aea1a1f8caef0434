//! The aggregate in-memory cache and its serialized form.
//!
//! Wire field names (`all`, `uniq`, `fromId`, `items`, `__dirty`) are the
//! stable on-disk contract; the manifest's expected-count keys must match
//! them exactly.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Record, RecordKind};

/// The unit of persistence: all derived indices plus the dirty flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheRoot {
    /// Name -> ids over every named entity; names are not unique
    pub all: HashMap<String, Vec<u64>>,

    /// Name -> ids over the asserted-unique subset. Still a list: the
    /// assertion is occasionally violated by the dataset.
    pub uniq: HashMap<String, Vec<u64>>,

    /// Id -> record for the container id bands, with resolved containment
    #[serde(rename = "fromId")]
    pub from_id: HashMap<u64, Record>,

    /// Records fetched on demand for ids absent from `from_id`
    pub items: HashMap<u64, Record>,

    /// True iff in-memory state has diverged from the persisted snapshot
    #[serde(rename = "__dirty")]
    pub dirty: bool,
}

impl CacheRoot {
    /// Element count of each top-level index, keyed by wire name.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        BTreeMap::from([
            ("all".to_string(), self.all.len()),
            ("uniq".to_string(), self.uniq.len()),
            ("fromId".to_string(), self.from_id.len()),
            ("items".to_string(), self.items.len()),
        ])
    }

    /// Look up a record by id, static index first, then augmentation.
    pub fn record(&self, id: u64) -> Option<&Record> {
        self.from_id.get(&id).or_else(|| self.items.get(&id))
    }

    /// Resolve a name to ids, preferring the unique-name index.
    pub fn lookup_name(&self, name: &str) -> Option<&[u64]> {
        self.uniq
            .get(name)
            .or_else(|| self.all.get(name))
            .map(Vec::as_slice)
    }

    /// Walk the canonical-parent chain from `id` upward.
    ///
    /// Best-effort: stops at the first record with no resolvable parent and
    /// logs the break instead of fabricating links. For a system the happy
    /// path yields `[constellation, region]`.
    pub fn containment_chain(&self, id: u64) -> Vec<&Record> {
        let mut chain = Vec::new();
        let mut current = id;

        while let Some(parent_id) = self.from_id.get(&current).and_then(Record::parent) {
            match self.from_id.get(&parent_id) {
                Some(parent) => {
                    chain.push(parent);
                    if parent.kind == RecordKind::Region {
                        break;
                    }
                    current = parent_id;
                }
                None => {
                    debug!("containment chain for {id} breaks at unknown id {parent_id}");
                    break;
                }
            }
        }

        chain
    }
}
