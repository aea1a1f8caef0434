//! Core record model for the static data cache.
//!
//! The SDE assigns every universe entity a numeric id, and container kinds
//! occupy disjoint id bands. Band membership is how the builder classifies
//! raw name entries without any per-kind input files.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Id band occupied by regions in the SDE.
pub const REGION_BAND: RangeInclusive<u64> = 10_000_000..=13_000_000;
/// Id band occupied by constellations.
pub const CONSTELLATION_BAND: RangeInclusive<u64> = 20_000_000..=23_000_000;
/// Id band occupied by solar systems.
pub const SYSTEM_BAND: RangeInclusive<u64> = 30_000_000..=33_000_000;
/// Id band occupied by stations.
pub const STATION_BAND: RangeInclusive<u64> = 60_000_000..=64_000_000;

/// Kind of a cached record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Region,
    Constellation,
    System,
    Station,
    /// Inventory type fetched on demand from ESI; never present in the SDE
    /// container bands.
    Item,
}

impl RecordKind {
    /// Classify an id by its SDE band. Returns `None` for ids outside the
    /// container bands (characters, corporations, inventory types, ...).
    pub fn from_id(id: u64) -> Option<Self> {
        if REGION_BAND.contains(&id) {
            Some(Self::Region)
        } else if CONSTELLATION_BAND.contains(&id) {
            Some(Self::Constellation)
        } else if SYSTEM_BAND.contains(&id) {
            Some(Self::System)
        } else if STATION_BAND.contains(&id) {
            Some(Self::Station)
        } else {
            None
        }
    }

    /// The id band for a container kind. `Item` has no band.
    pub fn band(self) -> Option<RangeInclusive<u64>> {
        match self {
            Self::Region => Some(REGION_BAND),
            Self::Constellation => Some(CONSTELLATION_BAND),
            Self::System => Some(SYSTEM_BAND),
            Self::Station => Some(STATION_BAND),
            Self::Item => None,
        }
    }
}

/// Per-system attributes merged from the nested `solarsystem.staticdata`
/// document during index construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemDetails {
    pub security: f64,
    #[serde(rename = "securityClass", default, skip_serializing_if = "Option::is_none")]
    pub security_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regional: Option<bool>,
}

/// Inventory-type attributes as returned by ESI `universe/types/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Kind-specific payload attached to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordPayload {
    System(SystemDetails),
    Item(TypeDetails),
}

impl RecordPayload {
    /// Security status for system payloads.
    pub fn security(&self) -> Option<f64> {
        match self {
            Self::System(details) => Some(details.security),
            Self::Item(_) => None,
        }
    }
}

/// A single cached universe entity.
///
/// `parent_ids` is ordered; the first entry is the canonical parent used for
/// containment-chain resolution (system -> constellation -> region).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub name: String,
    pub kind: RecordKind,
    #[serde(rename = "in", default, skip_serializing_if = "Vec::is_empty")]
    pub parent_ids: Vec<u64>,
    #[serde(rename = "info", default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<RecordPayload>,
}

impl Record {
    /// Create a record with no containment or payload yet.
    pub fn new(id: u64, name: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            parent_ids: Vec::new(),
            payload: None,
        }
    }

    /// Canonical parent id, when containment has been resolved.
    pub fn parent(&self) -> Option<u64> {
        self.parent_ids.first().copied()
    }

    pub fn security(&self) -> Option<f64> {
        self.payload.as_ref().and_then(RecordPayload::security)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_classification() {
        assert_eq!(RecordKind::from_id(10_000_001), Some(RecordKind::Region));
        assert_eq!(
            RecordKind::from_id(20_000_001),
            Some(RecordKind::Constellation)
        );
        assert_eq!(RecordKind::from_id(30_000_001), Some(RecordKind::System));
        assert_eq!(RecordKind::from_id(60_003_760), Some(RecordKind::Station));

        // Characters, corporations, and inventory types sit outside the bands
        assert_eq!(RecordKind::from_id(587), None);
        assert_eq!(RecordKind::from_id(95_465_499), None);
    }

    #[test]
    fn test_band_round_trip() {
        for kind in [
            RecordKind::Region,
            RecordKind::Constellation,
            RecordKind::System,
            RecordKind::Station,
        ] {
            let band = kind.band().unwrap();
            assert_eq!(RecordKind::from_id(*band.start()), Some(kind));
            assert_eq!(RecordKind::from_id(*band.end()), Some(kind));
        }
        assert!(RecordKind::Item.band().is_none());
    }

    #[test]
    fn test_record_parent() {
        let mut rec = Record::new(30_000_142, "Jita", RecordKind::System);
        assert_eq!(rec.parent(), None);

        rec.parent_ids = vec![20_000_020, 10_000_002];
        assert_eq!(rec.parent(), Some(20_000_020));
    }

    #[test]
    fn test_record_serde_field_names() {
        let mut rec = Record::new(30_000_142, "Jita", RecordKind::System);
        rec.parent_ids = vec![20_000_020];
        rec.payload = Some(RecordPayload::System(SystemDetails {
            security: 0.9459,
            security_class: Some("B".to_string()),
            radius: None,
            regional: None,
        }));

        let json = serde_json::to_value(&rec).unwrap();
        // Wire names mirror the original cache document
        assert!(json.get("in").is_some());
        assert!(json.get("info").is_some());
        assert_eq!(json["name"], "Jita");

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, rec);
        assert_eq!(back.security(), Some(0.9459));
    }
}
