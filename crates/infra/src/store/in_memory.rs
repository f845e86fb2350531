use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use eventshare_auth::{Role, User};
use eventshare_calendar::{Event, EventPermission, EventVersion};
use eventshare_core::{EventId, UserId, VersionId};

use super::r#trait::{CalendarStore, StoreError, StoreRead, StoreTx};

#[derive(Debug, Default, Clone)]
struct Tables {
    users: HashMap<UserId, User>,
    roles: BTreeSet<Role>,
    events: HashMap<EventId, Event>,
    permissions: HashMap<(UserId, EventId), EventPermission>,
    versions: HashMap<VersionId, EventVersion>,
    /// Unique index on `(event_id, version_number)`.
    version_index: BTreeMap<(EventId, u64), VersionId>,
}

/// In-memory transactional calendar store.
///
/// Intended for tests/dev. Not optimized for performance: every write scope
/// stages its changes on a copy of all tables and swaps the copy in on success.
#[derive(Debug, Default)]
pub struct InMemoryCalendarStore {
    tables: RwLock<Tables>,
}

impl InMemoryCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total `(events, permissions, versions)` rows, for orphan checks in tests.
    #[cfg(test)]
    pub(crate) fn row_counts(&self) -> (usize, usize, usize) {
        let tables = self.tables.read().unwrap();
        (tables.events.len(), tables.permissions.len(), tables.versions.len())
    }
}

impl CalendarStore for InMemoryCalendarStore {
    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreRead) -> Result<T, E>,
        E: From<StoreError>,
    {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Internal("lock poisoned".to_string()))?;
        f(&*tables)
    }

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Internal("lock poisoned".to_string()))?;

        // Dropping `staged` on error is the rollback.
        let mut staged = tables.clone();
        let out = f(&mut staged)?;
        *tables = staged;
        Ok(out)
    }
}

impl Tables {
    fn version_range(&self, event_id: EventId) -> impl DoubleEndedIterator<Item = &VersionId> + '_ {
        self.version_index
            .range((event_id, u64::MIN)..=(event_id, u64::MAX))
            .map(|(_, id)| id)
    }
}

impl StoreRead for Tables {
    fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.values().find(|u| u.username == username).cloned())
    }

    fn roles(&self) -> Result<Vec<Role>, StoreError> {
        Ok(self.roles.iter().copied().collect())
    }

    fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.events.get(&id).cloned())
    }

    fn events_owned_by(&self, owner: UserId) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .events
            .values()
            .filter(|e| e.created_by == owner)
            .cloned()
            .collect())
    }

    fn get_permission(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<Option<EventPermission>, StoreError> {
        Ok(self.permissions.get(&(user_id, event_id)).copied())
    }

    fn permissions_for_event(&self, event_id: EventId) -> Result<Vec<EventPermission>, StoreError> {
        Ok(self
            .permissions
            .values()
            .filter(|p| p.event_id == event_id)
            .copied()
            .collect())
    }

    fn permissions_for_user(&self, user_id: UserId) -> Result<Vec<EventPermission>, StoreError> {
        Ok(self
            .permissions
            .values()
            .filter(|p| p.user_id == user_id)
            .copied()
            .collect())
    }

    fn latest_version_number(&self, event_id: EventId) -> Result<Option<u64>, StoreError> {
        Ok(self
            .version_index
            .range((event_id, u64::MIN)..=(event_id, u64::MAX))
            .next_back()
            .map(|((_, n), _)| *n))
    }

    fn versions_for_event(&self, event_id: EventId) -> Result<Vec<EventVersion>, StoreError> {
        self.version_range(event_id)
            .map(|id| {
                self.versions
                    .get(id)
                    .cloned()
                    .ok_or_else(|| StoreError::Internal(format!("dangling version index entry {id}")))
            })
            .collect()
    }

    fn get_version(&self, id: VersionId) -> Result<Option<EventVersion>, StoreError> {
        Ok(self.versions.get(&id).cloned())
    }
}

impl StoreTx for Tables {
    fn insert_user(&mut self, user: User) -> Result<(), StoreError> {
        if self.users.contains_key(&user.id) {
            return Err(StoreError::UniqueViolation(format!("users.id {}", user.id)));
        }
        if self.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation(format!(
                "users.username '{}'",
                user.username
            )));
        }
        self.users.insert(user.id, user);
        Ok(())
    }

    fn ensure_role(&mut self, role: Role) -> Result<bool, StoreError> {
        Ok(self.roles.insert(role))
    }

    fn insert_event(&mut self, event: Event) -> Result<(), StoreError> {
        if !self.users.contains_key(&event.created_by) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "events.created_by {}",
                event.created_by
            )));
        }
        if self.events.contains_key(&event.id) {
            return Err(StoreError::UniqueViolation(format!("events.id {}", event.id)));
        }
        self.events.insert(event.id, event);
        Ok(())
    }

    fn update_event(&mut self, event: Event) -> Result<(), StoreError> {
        match self.events.get_mut(&event.id) {
            Some(row) => {
                *row = event;
                Ok(())
            }
            None => Err(StoreError::RowNotFound(format!("events.id {}", event.id))),
        }
    }

    fn delete_event(&mut self, id: EventId) -> Result<bool, StoreError> {
        if self.events.remove(&id).is_none() {
            return Ok(false);
        }
        self.permissions.retain(|(_, event_id), _| *event_id != id);
        let doomed: Vec<(EventId, u64)> = self
            .version_index
            .range((id, u64::MIN)..=(id, u64::MAX))
            .map(|(key, _)| *key)
            .collect();
        for key in doomed {
            if let Some(version_id) = self.version_index.remove(&key) {
                self.versions.remove(&version_id);
            }
        }
        Ok(true)
    }

    fn insert_permission(&mut self, permission: EventPermission) -> Result<(), StoreError> {
        self.check_permission_keys(&permission)?;
        let key = (permission.user_id, permission.event_id);
        if self.permissions.contains_key(&key) {
            return Err(StoreError::UniqueViolation(format!(
                "event_permissions ({}, {})",
                permission.user_id, permission.event_id
            )));
        }
        self.permissions.insert(key, permission);
        Ok(())
    }

    fn upsert_permission(&mut self, permission: EventPermission) -> Result<Option<Role>, StoreError> {
        self.check_permission_keys(&permission)?;
        let previous = self
            .permissions
            .insert((permission.user_id, permission.event_id), permission);
        Ok(previous.map(|p| p.role))
    }

    fn delete_permission(&mut self, user_id: UserId, event_id: EventId) -> Result<bool, StoreError> {
        Ok(self.permissions.remove(&(user_id, event_id)).is_some())
    }

    fn insert_version(&mut self, version: EventVersion) -> Result<(), StoreError> {
        if !self.events.contains_key(&version.event_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "event_versions.event_id {}",
                version.event_id
            )));
        }
        let key = (version.event_id, version.version_number);
        if self.version_index.contains_key(&key) || self.versions.contains_key(&version.id) {
            return Err(StoreError::UniqueViolation(format!(
                "event_versions ({}, {})",
                version.event_id, version.version_number
            )));
        }
        self.version_index.insert(key, version.id);
        self.versions.insert(version.id, version);
        Ok(())
    }
}

impl Tables {
    fn check_permission_keys(&self, permission: &EventPermission) -> Result<(), StoreError> {
        if !self.events.contains_key(&permission.event_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "event_permissions.event_id {}",
                permission.event_id
            )));
        }
        if !self.users.contains_key(&permission.user_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "event_permissions.user_id {}",
                permission.user_id
            )));
        }
        Ok(())
    }
}
