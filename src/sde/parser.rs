//! Flat entity list parsing.
//!
//! The SDE's `bsd/` directory carries three flat YAML lists the index is
//! built from: every named entity, the subset with asserted-unique names,
//! and the item-location pairs that encode containment.

use std::path::Path;

use serde::Deserialize;

use super::{SdeError, SdeResult};

/// One entry of `invNames.yaml` / `invUniqueNames.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct NameEntry {
    #[serde(rename = "itemID")]
    pub id: u64,
    #[serde(rename = "itemName")]
    pub name: String,
}

/// One entry of `invItems.yaml`: an entity and the location containing it.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemEntry {
    #[serde(rename = "itemID")]
    pub id: u64,
    #[serde(rename = "locationID")]
    pub location_id: u64,
}

/// The parsed flat lists, input to the index builder.
#[derive(Debug)]
pub struct Dataset {
    pub names: Vec<NameEntry>,
    pub unique_names: Vec<NameEntry>,
    pub item_locations: Vec<ItemEntry>,
}

fn parse_file<T: serde::de::DeserializeOwned>(path: &Path) -> SdeResult<Vec<T>> {
    let text = std::fs::read_to_string(path).map_err(|e| SdeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_yml::from_str(&text).map_err(|e| SdeError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parse the three flat entity lists from an unpacked dataset directory.
pub fn parse_dataset(sde_root: &Path) -> SdeResult<Dataset> {
    let bsd = sde_root.join("bsd");

    let names = parse_file(&bsd.join("invNames.yaml"))?;
    let unique_names = parse_file(&bsd.join("invUniqueNames.yaml"))?;
    let item_locations = parse_file(&bsd.join("invItems.yaml"))?;

    Ok(Dataset {
        names,
        unique_names,
        item_locations,
    })
}
