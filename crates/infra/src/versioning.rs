//! Append-only version arena.
//!
//! Versions are keyed by `(event_id, version_number)`. Numbers are allocated
//! as `max + 1` (or 1) inside the caller's write scope, so allocation and
//! append happen atomically with the field update they record.
//!
//! ## Invariants
//!
//! - Numbers per event are exactly `1..=n` with no gaps.
//! - A version's snapshot equals the event state at commit time.
//! - No operation here modifies or removes an existing version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventshare_calendar::{Event, EventVersion};
use eventshare_core::{EventId, UserId, VersionId};

use crate::error::ServiceError;
use crate::store::{StoreError, StoreRead, StoreTx};

/// Listing order for an event's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionOrder {
    #[default]
    Ascending,
    Descending,
}

/// Snapshot `event` as its next version and append it.
pub fn record_version<T>(
    tx: &mut T,
    event: &Event,
    changed_by: UserId,
    now: DateTime<Utc>,
) -> Result<EventVersion, StoreError>
where
    T: StoreTx + ?Sized,
{
    let next = tx
        .latest_version_number(event.id)?
        .map_or(1, |latest| latest + 1);
    let version = EventVersion::record(event, next, changed_by, now);
    tx.insert_version(version.clone())?;

    tracing::info!(
        event_id = %event.id,
        version_number = next,
        changed_by = %changed_by,
        "version recorded"
    );
    Ok(version)
}

pub fn list_versions<R>(
    store: &R,
    event_id: EventId,
    order: VersionOrder,
) -> Result<Vec<EventVersion>, StoreError>
where
    R: StoreRead + ?Sized,
{
    let mut versions = store.versions_for_event(event_id)?;
    if order == VersionOrder::Descending {
        versions.reverse();
    }
    Ok(versions)
}

/// Fetch a version by id, requiring that it belongs to `event_id`.
pub fn get_version<R>(
    store: &R,
    event_id: EventId,
    version_id: VersionId,
) -> Result<EventVersion, ServiceError>
where
    R: StoreRead + ?Sized,
{
    match store.get_version(version_id)? {
        Some(version) if version.event_id == event_id => Ok(version),
        _ => Err(ServiceError::not_found(format!(
            "version {version_id} of event {event_id}"
        ))),
    }
}

pub fn get_version_by_number<R>(
    store: &R,
    event_id: EventId,
    version_number: u64,
) -> Result<EventVersion, ServiceError>
where
    R: StoreRead + ?Sized,
{
    store
        .versions_for_event(event_id)?
        .into_iter()
        .find(|v| v.version_number == version_number)
        .ok_or_else(|| {
            ServiceError::not_found(format!("version {version_number} of event {event_id}"))
        })
}
