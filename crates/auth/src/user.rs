//! User record as seen by the sharing core.
//!
//! Registration, credentials and token issuance belong to the auth provider;
//! the core only needs to know that a user exists and how to display it.

use serde::{Deserialize, Serialize};

use eventshare_core::{DomainError, DomainResult, UserId};

const MAX_USERNAME_LEN: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl User {
    /// Build a validated user record.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> DomainResult<Self> {
        let username: String = username.into();
        let username = username.trim().to_string();
        let email: String = email.into();
        let email = email.trim().to_string();

        if username.is_empty() {
            return Err(DomainError::validation("username", "must not be blank"));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::validation(
                "username",
                format!("must be at most {MAX_USERNAME_LEN} characters"),
            ));
        }
        if username.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("username", "must not contain whitespace"));
        }
        if !email.is_empty() && !is_plausible_email(&email) {
            return Err(DomainError::validation("email", "is not a valid address"));
        }

        Ok(Self { id, username, email })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}
