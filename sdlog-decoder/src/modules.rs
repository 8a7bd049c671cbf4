//! Module name lookup
//!
//! Maps frame identifiers to human-readable module and reason names using an
//! externally supplied table. The table is loaded once per run into an
//! immutable value and passed explicitly to the dispatcher - there is no
//! ambient global state and no re-loading per call.
//!
//! File format: a JSON object with two named groups, `module_reason` and
//! `module`, each a list of `{ "id": "...", "name": "..." }` entries. Keys
//! match by exact string equality.

use crate::types::{DecodeError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default)]
    module_reason: Vec<TableEntry>,
    #[serde(default)]
    module: Vec<TableEntry>,
}

#[derive(Debug, Deserialize)]
struct TableEntry {
    id: String,
    name: String,
}

/// Names resolved for one identifier; unmatched parts are empty, never an
/// error
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleNames {
    pub reason: String,
    pub module: String,
}

impl ModuleNames {
    /// Single display string: reason and module joined, empty parts dropped
    pub fn display(&self) -> String {
        match (self.reason.is_empty(), self.module.is_empty()) {
            (false, false) => format!("{} {}", self.reason, self.module),
            (false, true) => self.reason.clone(),
            (true, false) => self.module.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Immutable identifier-to-name table
///
/// Read-only after load; shareable across decoder instances without
/// synchronization.
#[derive(Debug, Clone, Default)]
pub struct ModuleLookup {
    reasons: HashMap<String, String>,
    modules: HashMap<String, String>,
}

impl ModuleLookup {
    /// An empty table; every resolution misses
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the table from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        log::info!("Loading module table: {:?}", path);
        let bytes = std::fs::read(path)?;
        let table: TableFile = serde_json::from_slice(&bytes)
            .map_err(|e| DecodeError::TableParse(e.to_string()))?;

        let lookup = Self {
            reasons: table
                .module_reason
                .into_iter()
                .map(|e| (e.id, e.name))
                .collect(),
            modules: table.module.into_iter().map(|e| (e.id, e.name)).collect(),
        };
        log::info!(
            "Module table loaded: {} reasons, {} modules",
            lookup.reasons.len(),
            lookup.modules.len()
        );
        Ok(lookup)
    }

    /// Resolve an identifier to its reason and module names
    ///
    /// Two keys are derived from the identifier's decimal digits: the reason
    /// key is the first two digits padded with `"00"`, the module key is the
    /// remaining digits. Misses resolve to empty names.
    pub fn resolve(&self, identifier: u16) -> ModuleNames {
        let digits = identifier.to_string();
        let split = digits.len().min(2);
        let (prefix, rest) = digits.split_at(split);
        let reason_key = format!("{}00", prefix);

        ModuleNames {
            reason: self.reasons.get(&reason_key).cloned().unwrap_or_default(),
            module: self.modules.get(rest).cloned().unwrap_or_default(),
        }
    }

    /// Number of entries across both groups
    pub fn len(&self) -> usize {
        self.reasons.len() + self.modules.len()
    }

    /// True when no entries are loaded
    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty() && self.modules.is_empty()
    }
}
