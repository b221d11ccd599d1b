//! Region registry: the set of Region silos and their network addresses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One Region silo as configured on every deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    /// Base URL of the region's internal API, e.g. `http://us.internal:8200`.
    pub address: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegionRegistryError {
    #[error("invalid region registry JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate region name: {0}")]
    Duplicate(String),
    #[error("region {0} has an empty address")]
    EmptyAddress(String),
}

/// Name → address lookup, loaded once from configuration.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    regions: BTreeMap<String, Region>,
}

impl RegionRegistry {
    pub fn new(regions: Vec<Region>) -> Result<Self, RegionRegistryError> {
        let mut map = BTreeMap::new();
        for region in regions {
            if region.address.trim().is_empty() {
                return Err(RegionRegistryError::EmptyAddress(region.name));
            }
            if map.contains_key(&region.name) {
                return Err(RegionRegistryError::Duplicate(region.name));
            }
            map.insert(region.name.clone(), region);
        }
        Ok(Self { regions: map })
    }

    /// Parse the `SILO_REGIONS` JSON array: `[{"name": "us", "address": "http://..."}]`.
    pub fn from_json(raw: &str) -> Result<Self, RegionRegistryError> {
        Self::new(serde_json::from_str(raw)?)
    }

    pub fn get(&self, name: &str) -> Option<&Region> {
        self.regions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}
