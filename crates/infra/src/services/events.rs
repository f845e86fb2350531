//! Event lifecycle: `nonexistent → active → deleted`.
//!
//! Every write that changes an event's fields also appends a version in the
//! same scope, and every created event gets its OWNER row and version 1
//! before the scope commits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use eventshare_auth::{AuthProvider, Role, RoleSet};
use eventshare_calendar::{Event, EventChanges, EventDraft, EventPermission};
use eventshare_core::{EventId, UserId, VersionId};

use super::{load_event, require_role, require_visible, Revision};
use crate::config::ServiceConfig;
use crate::conflict::find_conflict;
use crate::error::ServiceError;
use crate::store::{CalendarStore, StoreRead, StoreTx};
use crate::versioning::{get_version, record_version};

/// An event the caller can see, with the role that lets them see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibleEvent {
    pub event: Event,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct EventService<S> {
    store: S,
    config: ServiceConfig,
}

impl<S> EventService<S> {
    pub fn new(store: S, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

impl<S> EventService<S>
where
    S: CalendarStore,
{
    /// Create an event owned by the caller.
    ///
    /// Conflict check, event row, OWNER row and version 1 commit together.
    #[instrument(skip_all, fields(title = %draft.title), err)]
    pub fn create(&self, auth: &dyn AuthProvider, draft: EventDraft) -> Result<Event, ServiceError> {
        let owner = auth.current_user().require_user()?;
        draft.validate()?;

        let event = self.store.transaction(move |tx| -> Result<Event, ServiceError> {
            let now = Utc::now();
            let event = Event::create(EventId::new(), draft, owner, now)?;
            ensure_registered(&*tx, owner)?;
            ensure_free(&*tx, &event, None, owner)?;
            insert_with_bookkeeping(&mut *tx, &event, now)?;
            Ok(event)
        })?;

        tracing::info!(event_id = %event.id, owner = %owner, "event created");
        Ok(event)
    }

    /// Apply a partial change set. Requires EDITOR or OWNER.
    #[instrument(skip_all, fields(event_id = %event_id), err)]
    pub fn update(
        &self,
        auth: &dyn AuthProvider,
        event_id: EventId,
        changes: EventChanges,
    ) -> Result<Revision, ServiceError> {
        let caller = auth.current_user();

        let revision = self.store.transaction(|tx| -> Result<Revision, ServiceError> {
            let current = load_event(&*tx, event_id)?;
            let actor = require_role(&*tx, &caller, event_id, RoleSet::WRITERS, "update")?;
            revise(&mut *tx, &current, &changes, actor)
        })?;

        tracing::info!(
            event_id = %event_id,
            version_number = revision.version.version_number,
            "event updated"
        );
        Ok(revision)
    }

    /// Create several events in one scope; any failure creates none of them.
    ///
    /// Each item is checked against the caller's pre-existing events only;
    /// items within the same batch are not checked against each other.
    #[instrument(skip_all, fields(count = drafts.len()), err)]
    pub fn batch_create(
        &self,
        auth: &dyn AuthProvider,
        drafts: Vec<EventDraft>,
    ) -> Result<Vec<Event>, ServiceError> {
        let owner = auth.current_user().require_user()?;
        if drafts.is_empty() {
            return Err(ServiceError::validation("events", "must contain at least one event"));
        }
        if drafts.len() > self.config.max_batch_size {
            return Err(ServiceError::validation(
                "events",
                format!("must contain at most {} events", self.config.max_batch_size),
            ));
        }

        for (i, draft) in drafts.iter().enumerate() {
            draft.validate().map_err(|e| e.within(format!("events[{i}]")))?;
        }

        let events = self.store.transaction(move |tx| -> Result<Vec<Event>, ServiceError> {
            let now = Utc::now();
            let events = drafts
                .into_iter()
                .map(|draft| Event::create(EventId::new(), draft, owner, now))
                .collect::<Result<Vec<_>, _>>()?;
            ensure_registered(&*tx, owner)?;
            for (i, event) in events.iter().enumerate() {
                ensure_free(&*tx, event, None, owner).map_err(|e| match e {
                    ServiceError::Conflict(msg) => ServiceError::Conflict(format!("events[{i}]: {msg}")),
                    other => other,
                })?;
            }
            for event in &events {
                insert_with_bookkeeping(&mut *tx, event, now)?;
            }
            Ok(events)
        })?;

        tracing::info!(owner = %owner, count = events.len(), "event batch created");
        Ok(events)
    }

    /// Restore the mutable fields captured in `version_id` as a new version.
    ///
    /// `created_by` and `created_at` are never taken from the snapshot.
    #[instrument(skip_all, fields(event_id = %event_id, version_id = %version_id), err)]
    pub fn rollback(
        &self,
        auth: &dyn AuthProvider,
        event_id: EventId,
        version_id: VersionId,
    ) -> Result<Revision, ServiceError> {
        let caller = auth.current_user();

        let revision = self.store.transaction(|tx| -> Result<Revision, ServiceError> {
            let current = load_event(&*tx, event_id)?;
            let actor = require_role(&*tx, &caller, event_id, RoleSet::WRITERS, "roll back")?;
            let target = get_version(&*tx, event_id, version_id)?;
            revise(&mut *tx, &current, &target.snapshot.restore_changes(), actor)
        })?;

        tracing::info!(
            event_id = %event_id,
            version_number = revision.version.version_number,
            "event rolled back"
        );
        Ok(revision)
    }

    /// Delete the event with its permissions and history. Requires OWNER.
    #[instrument(skip_all, fields(event_id = %event_id), err)]
    pub fn delete(&self, auth: &dyn AuthProvider, event_id: EventId) -> Result<(), ServiceError> {
        let caller = auth.current_user();
        self.store.transaction(|tx| -> Result<(), ServiceError> {
            load_event(&*tx, event_id)?;
            require_role(&*tx, &caller, event_id, RoleSet::OWNER, "delete")?;
            if !tx.delete_event(event_id)? {
                return Err(ServiceError::not_found(format!("event {event_id}")));
            }
            Ok(())
        })?;

        tracing::info!(event_id = %event_id, "event deleted");
        Ok(())
    }

    #[instrument(skip_all, fields(event_id = %event_id), err)]
    pub fn get(&self, auth: &dyn AuthProvider, event_id: EventId) -> Result<Event, ServiceError> {
        let caller = auth.current_user();
        self.store.read(|r| -> Result<Event, ServiceError> {
            require_visible(r, &caller, event_id)?;
            load_event(r, event_id)
        })
    }

    /// Events created by the caller that they still hold a role on, earliest first.
    pub fn list_owned(&self, auth: &dyn AuthProvider) -> Result<Vec<Event>, ServiceError> {
        let owner = auth.current_user().require_user()?;
        let mut events = self.store.read(|r| -> Result<Vec<Event>, ServiceError> {
            let mut out = Vec::new();
            for event in r.events_owned_by(owner)? {
                if r.get_permission(owner, event.id)?.is_some() {
                    out.push(event);
                }
            }
            Ok(out)
        })?;
        events.sort_by_key(|e| (e.start_time, e.id));
        Ok(events)
    }

    /// Every event the caller holds a role on, earliest first.
    pub fn list_accessible(
        &self,
        auth: &dyn AuthProvider,
    ) -> Result<Vec<AccessibleEvent>, ServiceError> {
        let user = auth.current_user().require_user()?;
        let mut visible = self.store.read(|r| -> Result<Vec<AccessibleEvent>, ServiceError> {
            let mut out = Vec::new();
            for permission in r.permissions_for_user(user)? {
                if let Some(event) = r.get_event(permission.event_id)? {
                    out.push(AccessibleEvent {
                        event,
                        role: permission.role,
                    });
                }
            }
            Ok(out)
        })?;
        visible.sort_by_key(|a| (a.event.start_time, a.event.id));
        Ok(visible)
    }
}

/// An authenticated id must also be a known user before it can own events.
fn ensure_registered<R>(store: &R, user_id: UserId) -> Result<(), ServiceError>
where
    R: StoreRead + ?Sized,
{
    match store.get_user(user_id)? {
        Some(_) => Ok(()),
        None => Err(ServiceError::Unauthenticated),
    }
}

/// `Conflict` if `event` overlaps another event in its owner's calendar.
///
/// The clashing event is only described when `actor` holds a role on it.
fn ensure_free<R>(
    store: &R,
    event: &Event,
    exclude: Option<EventId>,
    actor: UserId,
) -> Result<(), ServiceError>
where
    R: StoreRead + ?Sized,
{
    let Some(clash) =
        find_conflict(store, event.created_by, event.start_time, event.end_time, exclude)?
    else {
        return Ok(());
    };
    if store.get_permission(actor, clash.id)?.is_some() {
        Err(ServiceError::Conflict(format!(
            "overlaps event {} ({} to {})",
            clash.id, clash.start_time, clash.end_time
        )))
    } else {
        Err(ServiceError::Conflict(
            "overlaps an existing event in the owner's calendar".to_string(),
        ))
    }
}

fn insert_with_bookkeeping<T>(tx: &mut T, event: &Event, now: DateTime<Utc>) -> Result<(), ServiceError>
where
    T: StoreTx + ?Sized,
{
    tx.insert_event(event.clone())?;
    tx.insert_permission(EventPermission::owner(event.created_by, event.id))?;
    record_version(tx, event, event.created_by, now)?;
    Ok(())
}

/// Validate, conflict-check, store and version one change set.
fn revise<T>(
    tx: &mut T,
    current: &Event,
    changes: &EventChanges,
    actor: UserId,
) -> Result<Revision, ServiceError>
where
    T: StoreTx + ?Sized,
{
    // Read under the write scope so timestamps follow commit order.
    let now = Utc::now().max(current.updated_at);
    let next = current.with_changes(changes, now)?;
    ensure_free(&*tx, &next, Some(next.id), actor)?;
    tx.update_event(next.clone())?;
    let version = record_version(tx, &next, actor, now)?;
    Ok(Revision {
        event: next,
        version,
    })
}
