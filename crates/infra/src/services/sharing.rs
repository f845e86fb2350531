//! Role assignment on events.
//!
//! At most one role row exists per (user, event); sharing again replaces the
//! role instead of adding a row. An event always keeps at least one OWNER.

use tracing::instrument;

use eventshare_auth::{AuthProvider, Role, RoleSet};
use eventshare_calendar::{EventPermission, PermissionEntry};
use eventshare_core::{EventId, UserId};

use super::{load_event, require_role};
use crate::access::evaluate;
use crate::error::ServiceError;
use crate::store::{CalendarStore, StoreRead};

#[derive(Debug, Clone)]
pub struct SharingService<S> {
    store: S,
}

impl<S> SharingService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> SharingService<S>
where
    S: CalendarStore,
{
    /// Grant `role` on the event to `target`, replacing any role they held.
    #[instrument(skip_all, fields(event_id = %event_id, target = %target, role = %role), err)]
    pub fn share(
        &self,
        auth: &dyn AuthProvider,
        event_id: EventId,
        target: UserId,
        role: Role,
    ) -> Result<EventPermission, ServiceError> {
        let caller = auth.current_user();
        let (permission, previous) = self.store.transaction(
            |tx| -> Result<(EventPermission, Option<Role>), ServiceError> {
                load_event(&*tx, event_id)?;
                require_role(&*tx, &caller, event_id, RoleSet::OWNER, "share")?;
                if tx.get_user(target)?.is_none() {
                    return Err(ServiceError::not_found(format!("user {target}")));
                }
                let permission = EventPermission::new(target, event_id, role);
                let previous = tx.upsert_permission(permission)?;
                ensure_owner_remains(&*tx, event_id)?;
                Ok((permission, previous))
            },
        )?;

        tracing::info!(
            event_id = %event_id,
            target = %target,
            role = %role,
            previous = ?previous,
            "permission granted"
        );
        Ok(permission)
    }

    /// Everyone holding a role on the event, by role rank then username.
    ///
    /// A missing event, or a requester without a role, yields an empty list.
    #[instrument(skip_all, fields(event_id = %event_id), err)]
    pub fn list_permissions(
        &self,
        auth: &dyn AuthProvider,
        event_id: EventId,
    ) -> Result<Vec<PermissionEntry>, ServiceError> {
        let caller = auth.current_user();
        self.store.read(|r| -> Result<Vec<PermissionEntry>, ServiceError> {
            if !evaluate(r, &caller, event_id, RoleSet::ANY)?.is_granted() {
                return Ok(Vec::new());
            }
            let mut entries = Vec::new();
            for permission in r.permissions_for_event(event_id)? {
                if let Some(user) = r.get_user(permission.user_id)? {
                    entries.push(PermissionEntry {
                        user_id: user.id,
                        username: user.username,
                        role: permission.role,
                    });
                }
            }
            entries.sort_by(|a, b| a.role.cmp(&b.role).then_with(|| a.username.cmp(&b.username)));
            Ok(entries)
        })
    }

    /// Change the role of an existing row.
    #[instrument(skip_all, fields(event_id = %event_id, target = %target, role = %role), err)]
    pub fn update_permission(
        &self,
        auth: &dyn AuthProvider,
        event_id: EventId,
        target: UserId,
        role: Role,
    ) -> Result<EventPermission, ServiceError> {
        let caller = auth.current_user();
        let (permission, previous) =
            self.store.transaction(|tx| -> Result<(EventPermission, Role), ServiceError> {
                load_event(&*tx, event_id)?;
                require_role(&*tx, &caller, event_id, RoleSet::OWNER, "change permissions on")?;
                let existing = tx
                    .get_permission(target, event_id)?
                    .ok_or_else(|| missing_row(target, event_id))?;
                let permission = EventPermission::new(target, event_id, role);
                tx.upsert_permission(permission)?;
                ensure_owner_remains(&*tx, event_id)?;
                Ok((permission, existing.role))
            })?;

        tracing::info!(
            event_id = %event_id,
            target = %target,
            role = %role,
            previous = %previous,
            "permission changed"
        );
        Ok(permission)
    }

    /// Remove `target`'s role row.
    #[instrument(skip_all, fields(event_id = %event_id, target = %target), err)]
    pub fn revoke_permission(
        &self,
        auth: &dyn AuthProvider,
        event_id: EventId,
        target: UserId,
    ) -> Result<(), ServiceError> {
        let caller = auth.current_user();
        self.store.transaction(|tx| -> Result<(), ServiceError> {
            load_event(&*tx, event_id)?;
            require_role(&*tx, &caller, event_id, RoleSet::OWNER, "change permissions on")?;
            if !tx.delete_permission(target, event_id)? {
                return Err(missing_row(target, event_id));
            }
            ensure_owner_remains(&*tx, event_id)
        })?;

        tracing::info!(event_id = %event_id, target = %target, "permission revoked");
        Ok(())
    }
}

fn missing_row(target: UserId, event_id: EventId) -> ServiceError {
    ServiceError::not_found(format!("permission of user {target} on event {event_id}"))
}

/// `Conflict` once the event would have no OWNER row left.
fn ensure_owner_remains<R>(store: &R, event_id: EventId) -> Result<(), ServiceError>
where
    R: StoreRead + ?Sized,
{
    let owners = store
        .permissions_for_event(event_id)?
        .iter()
        .filter(|p| p.role == Role::Owner)
        .count();
    if owners == 0 {
        return Err(ServiceError::Conflict(format!(
            "event {event_id} must keep at least one owner"
        )));
    }
    Ok(())
}
