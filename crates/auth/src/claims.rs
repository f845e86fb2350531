use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eventshare_core::UserId;

use crate::{AuthProvider, Caller};

/// Identity claims model (transport-agnostic).
///
/// This is the minimal set of claims expected once a token has been decoded
/// and its signature verified by the external auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate identity claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding is
/// intentionally outside this crate.
pub fn validate_claims(
    claims: &IdentityClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

/// Auth provider backed by already-verified claims.
///
/// Missing or invalid claims yield `Caller::Anonymous`, which the permission
/// evaluator treats as "no access".
#[derive(Debug, Clone)]
pub struct ClaimsAuthProvider {
    claims: Option<IdentityClaims>,
    checked_at: DateTime<Utc>,
}

impl ClaimsAuthProvider {
    pub fn new(claims: Option<IdentityClaims>, checked_at: DateTime<Utc>) -> Self {
        Self { claims, checked_at }
    }
}

impl AuthProvider for ClaimsAuthProvider {
    fn current_user(&self) -> Caller {
        let Some(claims) = &self.claims else {
            return Caller::Anonymous;
        };
        match validate_claims(claims, self.checked_at) {
            Ok(()) => Caller::Authenticated(claims.sub),
            Err(err) => {
                tracing::debug!(user_id = %claims.sub, error = %err, "rejecting identity claims");
                Caller::Anonymous
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(now: DateTime<Utc>) -> IdentityClaims {
        IdentityClaims {
            sub: UserId::new(),
            issued_at: now - Duration::minutes(5),
            expires_at: now + Duration::minutes(55),
        }
    }

    #[test]
    fn valid_claims_authenticate() {
        let now = Utc::now();
        let c = claims(now);
        let provider = ClaimsAuthProvider::new(Some(c.clone()), now);
        assert_eq!(provider.current_user(), Caller::Authenticated(c.sub));
    }

    #[test]
    fn expired_claims_are_anonymous() {
        let now = Utc::now();
        let c = claims(now);
        assert_eq!(
            validate_claims(&c, now + Duration::hours(2)),
            Err(TokenValidationError::Expired)
        );
        let provider = ClaimsAuthProvider::new(Some(c), now + Duration::hours(2));
        assert_eq!(provider.current_user(), Caller::Anonymous);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let mut c = claims(now);
        c.expires_at = c.issued_at;
        assert_eq!(
            validate_claims(&c, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn future_claims_are_not_yet_valid() {
        let now = Utc::now();
        let c = claims(now + Duration::hours(1));
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn missing_claims_are_anonymous() {
        let provider = ClaimsAuthProvider::new(None, Utc::now());
        assert_eq!(provider.current_user(), Caller::Anonymous);
    }
}
