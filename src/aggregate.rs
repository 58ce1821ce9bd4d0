//! Cross-file aggregation of per-type declarations.
//!
//! Each input file contributes one [`ParsedUnit`] per type name it
//! mentions. The registry folds them into one record per type name in
//! file-processing order. Nothing is deduplicated here; later stages see
//! the full history.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::analysis::ParsedUnit;

/// The merged view of a type across every input file.
pub type TypeRecord = ParsedUnit;

/// Merge an incoming unit into an existing record, if any.
///
/// Methods and imports always append. Embedded names append when both
/// sides carry embedding information; a side without any (a file that only
/// declares methods on the type) never erases the other side's.
pub fn merge(existing: Option<TypeRecord>, incoming: ParsedUnit) -> TypeRecord {
    let Some(mut record) = existing else {
        return incoming;
    };

    record.methods.extend(incoming.methods);
    record.imports.extend(incoming.imports);
    record.embedded = match (record.embedded, incoming.embedded) {
        (Some(mut current), Some(more)) => {
            current.extend(more);
            Some(current)
        }
        (current, None) => current,
        (None, more) => more,
    };
    record
}

/// Caller-owned accumulator of type records for one run.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    records: HashMap<String, TypeRecord>,
    files: usize,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one unit.
    pub fn merge_unit(&mut self, unit: ParsedUnit) {
        let name = unit.type_name.clone();
        let existing = self.records.remove(&name);
        trace!(type_name = %name, merged = existing.is_some(), "merging unit");
        self.records.insert(name, merge(existing, unit));
    }

    /// Merge every unit of one file. Files must be merged in input order.
    pub fn merge_file(&mut self, units: BTreeMap<String, ParsedUnit>) {
        for unit in units.into_values() {
            self.merge_unit(unit);
        }
        self.files += 1;
    }

    /// Look up the record for a type name.
    pub fn get(&self, type_name: &str) -> Option<&TypeRecord> {
        self.records.get(type_name)
    }

    /// Number of distinct type names seen.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no types have been seen.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of files merged so far.
    pub fn file_count(&self) -> usize {
        self.files
    }
}
