use serde::{Deserialize, Serialize};

use eventshare_auth::Role;
use eventshare_core::{EventId, UserId};

/// Role row for one (user, event) pair. At most one exists per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventPermission {
    pub user_id: UserId,
    pub event_id: EventId,
    pub role: Role,
}

impl EventPermission {
    pub fn new(user_id: UserId, event_id: EventId, role: Role) -> Self {
        Self {
            user_id,
            event_id,
            role,
        }
    }

    pub fn owner(user_id: UserId, event_id: EventId) -> Self {
        Self::new(user_id, event_id, Role::Owner)
    }
}

/// Listing form of a permission row, joined with the user's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}
