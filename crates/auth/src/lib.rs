//! `eventshare-auth`: identity and per-event role boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{decide, AccessDecision};
pub use claims::{validate_claims, ClaimsAuthProvider, IdentityClaims, TokenValidationError};
pub use principal::{AuthProvider, Caller};
pub use roles::{Role, RoleSet};
pub use user::User;
