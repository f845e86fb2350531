//! Permission evaluation against stored role rows.

use eventshare_auth::{decide, AccessDecision, Caller, RoleSet};
use eventshare_core::EventId;

use crate::store::{StoreError, StoreRead};

/// Look up the caller's role row on `event_id` and decide against `required`.
///
/// Anonymous callers are decided without touching the store.
pub fn evaluate<R>(
    store: &R,
    caller: &Caller,
    event_id: EventId,
    required: RoleSet,
) -> Result<AccessDecision, StoreError>
where
    R: StoreRead + ?Sized,
{
    let held = match caller.user_id() {
        Some(user_id) => store.get_permission(user_id, event_id)?.map(|p| p.role),
        None => None,
    };
    let decision = decide(caller, held, required);
    tracing::debug!(
        event_id = %event_id,
        required = %required,
        granted = decision.is_granted(),
        "access evaluated"
    );
    Ok(decision)
}

/// `true` iff the caller holds a role on the event that is in `required`.
///
/// A missing role row is `false`, not an error.
pub fn has_permission<R>(
    store: &R,
    caller: &Caller,
    event_id: EventId,
    required: RoleSet,
) -> Result<bool, StoreError>
where
    R: StoreRead + ?Sized,
{
    Ok(evaluate(store, caller, event_id, required)?.is_granted())
}
