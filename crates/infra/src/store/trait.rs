use std::sync::Arc;

use thiserror::Error;

use eventshare_auth::{Role, User};
use eventshare_calendar::{Event, EventPermission, EventVersion};
use eventshare_core::{EventId, UserId, VersionId};

/// Persistence operation error.
///
/// These are **infrastructure errors** (constraints, transaction lifecycle,
/// availability) as opposed to domain errors (validation, overlaps, access).
///
/// ## Error Categories
///
/// - **Constraint**: unique / foreign-key violations, missing rows on update
/// - **Transaction**: aborted or timed out; nothing was committed
/// - **Availability**: backend unreachable, or internally broken (poisoned lock)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key violated: {0}")]
    ForeignKeyViolation(String),

    #[error("row not found: {0}")]
    RowNotFound(String),

    #[error("transaction aborted: {0}")]
    Aborted(String),

    #[error("transaction timed out")]
    Timeout,

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("internal storage failure: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether re-running the whole operation may succeed.
    ///
    /// A failed scope never commits anything, so aborts, timeouts, outages and
    /// unique races (a concurrent writer claimed the same key) are safe to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::UniqueViolation(_)
                | StoreError::Aborted(_)
                | StoreError::Timeout
                | StoreError::Unavailable(_)
        )
    }
}

/// Read access to the calendar tables.
pub trait StoreRead {
    fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Seeded role catalog, in rank order.
    fn roles(&self) -> Result<Vec<Role>, StoreError>;

    fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError>;

    /// Events whose `created_by` is `owner`.
    fn events_owned_by(&self, owner: UserId) -> Result<Vec<Event>, StoreError>;

    fn get_permission(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<Option<EventPermission>, StoreError>;

    fn permissions_for_event(&self, event_id: EventId) -> Result<Vec<EventPermission>, StoreError>;

    fn permissions_for_user(&self, user_id: UserId) -> Result<Vec<EventPermission>, StoreError>;

    /// Highest `version_number` recorded for the event, if any.
    fn latest_version_number(&self, event_id: EventId) -> Result<Option<u64>, StoreError>;

    /// All versions of the event in ascending `version_number` order.
    fn versions_for_event(&self, event_id: EventId) -> Result<Vec<EventVersion>, StoreError>;

    fn get_version(&self, id: VersionId) -> Result<Option<EventVersion>, StoreError>;
}

/// Write access inside an atomic scope.
///
/// Implementations must enforce:
/// - uniqueness of `(user_id, event_id)` permission rows
/// - uniqueness of `(event_id, version_number)` version rows
/// - foreign keys from permissions/versions to events, and from events/permissions to users
/// - cascade deletion of an event's permissions and versions
///
/// There is deliberately no way to modify or delete a single version.
pub trait StoreTx: StoreRead {
    fn insert_user(&mut self, user: User) -> Result<(), StoreError>;

    /// Insert a catalog role if missing. Returns `true` when inserted.
    fn ensure_role(&mut self, role: Role) -> Result<bool, StoreError>;

    fn insert_event(&mut self, event: Event) -> Result<(), StoreError>;

    fn update_event(&mut self, event: Event) -> Result<(), StoreError>;

    /// Delete the event and cascade. Returns `false` when it did not exist.
    fn delete_event(&mut self, id: EventId) -> Result<bool, StoreError>;

    fn insert_permission(&mut self, permission: EventPermission) -> Result<(), StoreError>;

    /// Insert or overwrite the row for `(user_id, event_id)`. Returns the previous role.
    fn upsert_permission(&mut self, permission: EventPermission) -> Result<Option<Role>, StoreError>;

    /// Returns `false` when no row existed.
    fn delete_permission(&mut self, user_id: UserId, event_id: EventId) -> Result<bool, StoreError>;

    fn insert_version(&mut self, version: EventVersion) -> Result<(), StoreError>;
}

/// Transactional persistence boundary.
///
/// ## Scope Semantics
///
/// - `transaction()`: the closure's writes become visible all together when it
///   returns `Ok`, and not at all when it returns `Err`. Scopes are serializable.
/// - `read()`: a consistent view; never observes a half-applied scope.
///
/// Every core operation runs inside exactly one scope, so check-then-write
/// sequences (conflict detection, version numbering) cannot interleave.
pub trait CalendarStore: Send + Sync {
    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreRead) -> Result<T, E>,
        E: From<StoreError>;

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>;
}

impl<S> CalendarStore for Arc<S>
where
    S: CalendarStore,
{
    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreRead) -> Result<T, E>,
        E: From<StoreError>,
    {
        (**self).read(f)
    }

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        (**self).transaction(f)
    }
}
