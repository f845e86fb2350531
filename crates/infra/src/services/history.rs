//! Read-only history queries: paginated versions, changelog, diffs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use eventshare_auth::AuthProvider;
use eventshare_calendar::{diff, diff_snapshots, EventVersion, SnapshotDiff, SnapshotMap};
use eventshare_core::{EventId, UserId, VersionId};

use super::require_visible;
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::query::{Pagination, VersionPage};
use crate::store::CalendarStore;
use crate::versioning::{get_version, get_version_by_number, list_versions, VersionOrder};

/// What one version changed relative to its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub version_number: u64,
    pub version_id: VersionId,
    pub changed_by: UserId,
    pub created_at: DateTime<Utc>,
    /// Diff against the previous version; version 1 diffs against an empty mapping.
    pub changes: SnapshotDiff,
}

#[derive(Debug, Clone)]
pub struct HistoryService<S> {
    store: S,
    config: ServiceConfig,
}

impl<S> HistoryService<S> {
    pub fn new(store: S, config: ServiceConfig) -> Self {
        Self { store, config }
    }
}

impl<S> HistoryService<S>
where
    S: CalendarStore,
{
    /// Versions newest first, one page at a time.
    #[instrument(skip_all, fields(event_id = %event_id), err)]
    pub fn history(
        &self,
        auth: &dyn AuthProvider,
        event_id: EventId,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<VersionPage, ServiceError> {
        let caller = auth.current_user();
        let pagination = Pagination::resolve(limit, offset, &self.config);

        self.store.read(|r| -> Result<VersionPage, ServiceError> {
            require_visible(r, &caller, event_id)?;
            let versions = list_versions(r, event_id, VersionOrder::Descending)?;
            let (page, has_more) = pagination.page(&versions);
            Ok(VersionPage {
                versions: page,
                total: versions.len() as u64,
                pagination,
                has_more,
            })
        })
    }

    #[instrument(skip_all, fields(event_id = %event_id, version_id = %version_id), err)]
    pub fn get_version(
        &self,
        auth: &dyn AuthProvider,
        event_id: EventId,
        version_id: VersionId,
    ) -> Result<EventVersion, ServiceError> {
        let caller = auth.current_user();
        self.store.read(|r| -> Result<EventVersion, ServiceError> {
            require_visible(r, &caller, event_id)?;
            get_version(r, event_id, version_id)
        })
    }

    pub fn version_by_number(
        &self,
        auth: &dyn AuthProvider,
        event_id: EventId,
        version_number: u64,
    ) -> Result<EventVersion, ServiceError> {
        let caller = auth.current_user();
        self.store.read(|r| -> Result<EventVersion, ServiceError> {
            require_visible(r, &caller, event_id)?;
            get_version_by_number(r, event_id, version_number)
        })
    }

    /// Every version oldest first, each with its diff from the one before.
    #[instrument(skip_all, fields(event_id = %event_id), err)]
    pub fn changelog(
        &self,
        auth: &dyn AuthProvider,
        event_id: EventId,
    ) -> Result<Vec<ChangelogEntry>, ServiceError> {
        let caller = auth.current_user();
        let versions = self.store.read(|r| -> Result<Vec<EventVersion>, ServiceError> {
            require_visible(r, &caller, event_id)?;
            Ok(list_versions(r, event_id, VersionOrder::Ascending)?)
        })?;

        let mut previous = SnapshotMap::new();
        let entries = versions
            .into_iter()
            .map(|v| {
                let current = v.snapshot.to_map();
                let changes = diff(&previous, &current);
                previous = current;
                ChangelogEntry {
                    version_number: v.version_number,
                    version_id: v.id,
                    changed_by: v.changed_by,
                    created_at: v.created_at,
                    changes,
                }
            })
            .collect();
        Ok(entries)
    }

    /// Field-level diff from `version_a` to `version_b`; both must belong to the event.
    #[instrument(skip_all, fields(event_id = %event_id), err)]
    pub fn diff_versions(
        &self,
        auth: &dyn AuthProvider,
        event_id: EventId,
        version_a: VersionId,
        version_b: VersionId,
    ) -> Result<SnapshotDiff, ServiceError> {
        let caller = auth.current_user();
        let (a, b) = self.store.read(|r| -> Result<(EventVersion, EventVersion), ServiceError> {
            require_visible(r, &caller, event_id)?;
            Ok((
                get_version(r, event_id, version_a)?,
                get_version(r, event_id, version_b)?,
            ))
        })?;
        Ok(diff_snapshots(&a.snapshot, &b.snapshot))
    }
}
