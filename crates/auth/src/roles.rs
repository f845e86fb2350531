use core::str::FromStr;

use serde::{Deserialize, Serialize};

use eventshare_core::DomainError;

/// Role a user holds on a single event.
///
/// Declaration order is rank order: `Owner` sorts before `Editor` before `Viewer`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Editor,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Owner, Role::Editor, Role::Viewer];

    /// Wire name (`OWNER`, `EDITOR`, `VIEWER`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Editor => "EDITOR",
            Role::Viewer => "VIEWER",
        }
    }

    /// Human-readable catalog name (`Owner`, `Editor`, `Viewer`).
    pub fn label(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Editor => "Editor",
            Role::Viewer => "Viewer",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Role::Owner => 0b001,
            Role::Editor => 0b010,
            Role::Viewer => 0b100,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OWNER" => Ok(Role::Owner),
            "EDITOR" => Ok(Role::Editor),
            "VIEWER" => Ok(Role::Viewer),
            _ => Err(DomainError::validation(
                "role",
                "must be one of: OWNER, EDITOR, VIEWER",
            )),
        }
    }
}

/// A set of roles that satisfies an access requirement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    /// Only owners: sharing, permission management, deletion.
    pub const OWNER: RoleSet = RoleSet(0b001);
    /// Owners and editors: update, rollback.
    pub const WRITERS: RoleSet = RoleSet(0b011);
    /// Any role: reads, history, listing permissions.
    pub const ANY: RoleSet = RoleSet(0b111);

    pub fn of(roles: &[Role]) -> Self {
        Self(roles.iter().fold(0, |acc, r| acc | r.bit()))
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|r| self.contains(*r))
    }
}

impl core::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.roles().map(|r| r.as_str()).collect();
        f.write_str(&names.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Editor).unwrap(), "\"EDITOR\"");
        let parsed: Role = serde_json::from_str("\"VIEWER\"").unwrap();
        assert_eq!(parsed, Role::Viewer);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("owner".parse::<Role>().unwrap(), Role::Owner);
        assert!(matches!(
            "admin".parse::<Role>(),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn role_sets() {
        assert!(RoleSet::WRITERS.contains(Role::Editor));
        assert!(!RoleSet::WRITERS.contains(Role::Viewer));
        assert!(!RoleSet::OWNER.contains(Role::Editor));
        assert_eq!(RoleSet::of(&[Role::Owner, Role::Editor]), RoleSet::WRITERS);
        assert_eq!(RoleSet::ANY.to_string(), "OWNER|EDITOR|VIEWER");
    }

    #[test]
    fn rank_order() {
        let mut roles = vec![Role::Viewer, Role::Owner, Role::Editor];
        roles.sort();
        assert_eq!(roles, Role::ALL.to_vec());
    }
}
