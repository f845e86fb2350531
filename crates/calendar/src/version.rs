//! Immutable version records.
//!
//! A version is written once, on every successful create or update of its event,
//! and never modified afterwards. History only grows; a rollback is recorded as a
//! new version carrying the restored values.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use eventshare_core::{EventId, UserId, VersionId};

use crate::event::{Event, EventChanges, EventDraft, Recurrence};

/// JSON mapping form of a snapshot (field name → value).
pub type SnapshotMap = Map<String, JsonValue>;

/// Field-complete copy of an event at the moment a version was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    pub is_recurring: bool,
    pub recurrence: Recurrence,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventSnapshot {
    pub fn capture(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            location: event.location.clone(),
            is_recurring: event.is_recurring,
            recurrence: event.recurrence,
            created_by: event.created_by,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }

    /// The mutable fields only; `created_by`, `created_at` and `updated_at` are excluded.
    pub fn draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            is_recurring: self.is_recurring,
            recurrence: self.recurrence,
        }
    }

    /// A complete change set that restores this snapshot's mutable fields.
    pub fn restore_changes(&self) -> EventChanges {
        EventChanges::from(self.draft())
    }

    /// JSON mapping with ISO-8601 timestamps, identical to the serde form.
    pub fn to_map(&self) -> SnapshotMap {
        let mut map = Map::new();
        map.insert("title".into(), JsonValue::from(self.title.clone()));
        map.insert("description".into(), JsonValue::from(self.description.clone()));
        map.insert("start_time".into(), iso8601(self.start_time));
        map.insert("end_time".into(), iso8601(self.end_time));
        map.insert("location".into(), JsonValue::from(self.location.clone()));
        map.insert("is_recurring".into(), JsonValue::from(self.is_recurring));
        map.insert("recurrence".into(), JsonValue::from(self.recurrence.as_str()));
        map.insert("created_by".into(), JsonValue::from(self.created_by.to_string()));
        map.insert("created_at".into(), iso8601(self.created_at));
        map.insert("updated_at".into(), iso8601(self.updated_at));
        map
    }
}

fn iso8601(ts: DateTime<Utc>) -> JsonValue {
    JsonValue::from(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// One numbered entry in an event's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventVersion {
    pub id: VersionId,
    pub event_id: EventId,
    /// 1-based, gap-free, strictly increasing per event.
    pub version_number: u64,
    pub snapshot: EventSnapshot,
    /// Actor whose write produced this version.
    pub changed_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl EventVersion {
    pub fn record(
        event: &Event,
        version_number: u64,
        changed_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: VersionId::new(),
            event_id: event.id,
            version_number,
            snapshot: EventSnapshot::capture(event),
            changed_by,
            created_at: now,
        }
    }
}
