//! Field-level diff between two snapshots.
//!
//! Pure functions over JSON mappings: no IO, no knowledge of which fields an
//! event has. Keys missing on one side read as `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::version::{EventSnapshot, SnapshotMap};

/// Old and new value of one differing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: JsonValue,
    pub new: JsonValue,
}

/// Field name → change. Only differing fields are present.
pub type SnapshotDiff = BTreeMap<String, FieldChange>;

/// Diff two snapshot mappings over the union of their keys.
pub fn diff(a: &SnapshotMap, b: &SnapshotMap) -> SnapshotDiff {
    let mut out = SnapshotDiff::new();
    for key in a.keys().chain(b.keys()) {
        if out.contains_key(key) {
            continue;
        }
        let old = a.get(key).unwrap_or(&JsonValue::Null);
        let new = b.get(key).unwrap_or(&JsonValue::Null);
        if old != new {
            out.insert(
                key.clone(),
                FieldChange {
                    old: old.clone(),
                    new: new.clone(),
                },
            );
        }
    }
    out
}

/// Diff two typed snapshots.
pub fn diff_snapshots(a: &EventSnapshot, b: &EventSnapshot) -> SnapshotDiff {
    diff(&a.to_map(), &b.to_map())
}
