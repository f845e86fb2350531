//! Application services: event lifecycle, history queries, sharing.
//!
//! Each public operation runs in exactly one store scope. Mutations use
//! `transaction()`, so a failure at any step leaves nothing behind; queries
//! use `read()`.
//!
//! ## Access policy
//!
//! - Read paths answer `NotFound` when the caller holds no role, so the
//!   existence of an event is never leaked.
//! - Mutating paths answer `NotFound` for a missing event and `Forbidden`
//!   when the caller's role (or lack of one) does not satisfy the operation.

pub mod events;
pub mod history;
pub mod sharing;

pub use events::{AccessibleEvent, EventService};
pub use history::{ChangelogEntry, HistoryService};
pub use sharing::SharingService;

use serde::{Deserialize, Serialize};

use eventshare_auth::{AccessDecision, Caller, Role, RoleSet};
use eventshare_calendar::{Event, EventVersion};
use eventshare_core::{EventId, UserId};

use crate::access::evaluate;
use crate::error::ServiceError;
use crate::store::StoreRead;

/// An event together with the version its latest write produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub event: Event,
    pub version: EventVersion,
}

pub(crate) fn load_event<R>(store: &R, event_id: EventId) -> Result<Event, ServiceError>
where
    R: StoreRead + ?Sized,
{
    store
        .get_event(event_id)?
        .ok_or_else(|| ServiceError::not_found(format!("event {event_id}")))
}

/// Gate a mutation: the caller's id when granted, `Forbidden` otherwise.
pub(crate) fn require_role<R>(
    store: &R,
    caller: &Caller,
    event_id: EventId,
    required: RoleSet,
    action: &'static str,
) -> Result<UserId, ServiceError>
where
    R: StoreRead + ?Sized,
{
    let decision = evaluate(store, caller, event_id, required)?;
    match (decision, caller.user_id()) {
        (AccessDecision::Granted { .. }, Some(user_id)) => Ok(user_id),
        _ => {
            let reason = decision.reason(required);
            tracing::warn!(event_id = %event_id, action, reason = %reason, "mutation denied");
            Err(ServiceError::Forbidden(format!("cannot {action} event {event_id}: {reason}")))
        }
    }
}

/// Gate a query: the caller's role when it holds any, `NotFound` otherwise.
pub(crate) fn require_visible<R>(
    store: &R,
    caller: &Caller,
    event_id: EventId,
) -> Result<Role, ServiceError>
where
    R: StoreRead + ?Sized,
{
    match evaluate(store, caller, event_id, RoleSet::ANY)? {
        AccessDecision::Granted { role } => Ok(role),
        _ => Err(ServiceError::not_found(format!("event {event_id}"))),
    }
}
