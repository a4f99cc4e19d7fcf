use crate::utils::error::{MigrateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from a legacy integer code to the id the store assigned on
/// insert. Built once per phase, after the batch insert succeeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegacyIdMap {
    entries: BTreeMap<i64, String>,
}

impl LegacyIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zips the legacy codes of the submitted rows with the ids the store
    /// returned, relying on the store echoing rows in request order. A count
    /// mismatch or a duplicate legacy code invalidates the whole map.
    pub fn correlate(entity: &str, legacy_codes: &[i64], new_ids: Vec<String>) -> Result<Self> {
        if legacy_codes.len() != new_ids.len() {
            return Err(MigrateError::Store {
                status: 0,
                message: format!(
                    "{} insert returned {} rows for {} submitted; cannot correlate legacy ids",
                    entity,
                    new_ids.len(),
                    legacy_codes.len()
                ),
            });
        }

        let mut entries = BTreeMap::new();
        for (&legacy, new_id) in legacy_codes.iter().zip(new_ids) {
            if entries.insert(legacy, new_id).is_some() {
                return Err(MigrateError::validation(format!(
                    "duplicate legacy {} code {} in source file",
                    entity, legacy
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, legacy_code: i64) -> Option<&str> {
        self.entries.get(&legacy_code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries = serde_json::from_str(json)?;
        Ok(Self { entries })
    }
}
