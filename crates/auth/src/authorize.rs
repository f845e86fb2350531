use serde::Serialize;

use crate::{Caller, Role, RoleSet};

/// Outcome of checking a caller's role on one event against a requirement.
///
/// Absence of a role row is an ordinary denial, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    Granted { role: Role },
    Denied { held: Option<Role> },
    Anonymous,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted { .. })
    }

    /// The role the caller holds on the event, if any.
    pub fn held(&self) -> Option<Role> {
        match self {
            AccessDecision::Granted { role } => Some(*role),
            AccessDecision::Denied { held } => *held,
            AccessDecision::Anonymous => None,
        }
    }

    /// Short explanation suitable for a `Forbidden` message or a log line.
    pub fn reason(&self, required: RoleSet) -> String {
        match self {
            AccessDecision::Granted { role } => format!("role {role} satisfies {required}"),
            AccessDecision::Denied { held: Some(role) } => {
                format!("role {role} does not satisfy {required}")
            }
            AccessDecision::Denied { held: None } => "no role on this event".to_string(),
            AccessDecision::Anonymous => "caller is not authenticated".to_string(),
        }
    }
}

/// Decide access from the caller and the role row found for it (if any).
///
/// - No IO
/// - No creator special case: ownership comes only from the role row
pub fn decide(caller: &Caller, held: Option<Role>, required: RoleSet) -> AccessDecision {
    if !caller.is_authenticated() {
        return AccessDecision::Anonymous;
    }
    match held {
        Some(role) if required.contains(role) => AccessDecision::Granted { role },
        other => AccessDecision::Denied { held: other },
    }
}
