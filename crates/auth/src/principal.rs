use serde::{Deserialize, Serialize};

use eventshare_core::{DomainError, DomainResult, UserId};

/// Identity of whoever issued the current request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum Caller {
    Authenticated(UserId),
    Anonymous,
}

impl Caller {
    pub fn user(user_id: UserId) -> Self {
        Caller::Authenticated(user_id)
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Caller::Authenticated(id) => Some(*id),
            Caller::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::Authenticated(_))
    }

    /// The caller's identity, or `Unauthenticated`.
    pub fn require_user(&self) -> DomainResult<UserId> {
        self.user_id().ok_or(DomainError::Unauthenticated)
    }
}

impl From<UserId> for Caller {
    fn from(value: UserId) -> Self {
        Caller::Authenticated(value)
    }
}

/// Source of the current request's identity.
///
/// Token issuance and verification live outside this crate; implementations
/// only report who (if anyone) is calling.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Caller;
}

impl AuthProvider for Caller {
    fn current_user(&self) -> Caller {
        *self
    }
}

impl<P> AuthProvider for std::sync::Arc<P>
where
    P: AuthProvider + ?Sized,
{
    fn current_user(&self) -> Caller {
        (**self).current_user()
    }
}
