//! Conflict detection: does an interval collide with the owner's calendar?
//!
//! Callers must run this inside the same transaction as the write it guards;
//! otherwise two concurrent creates could both pass and both commit.

use chrono::{DateTime, Utc};

use eventshare_calendar::Event;
use eventshare_core::{EventId, UserId};

use crate::store::{StoreError, StoreRead};

/// First event owned by `owner` overlapping `[start, end)`, skipping `exclude`.
pub fn find_conflict<R>(
    store: &R,
    owner: UserId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<EventId>,
) -> Result<Option<Event>, StoreError>
where
    R: StoreRead + ?Sized,
{
    let mut clashes: Vec<Event> = store
        .events_owned_by(owner)?
        .into_iter()
        .filter(|e| Some(e.id) != exclude && e.overlaps(start, end))
        .collect();
    clashes.sort_by_key(|e| (e.start_time, e.id));
    Ok(clashes.into_iter().next())
}

/// Whether any event owned by `owner` overlaps `[start, end)`.
///
/// Events that merely touch (one ends exactly when the other starts) do not conflict.
pub fn has_conflict<R>(
    store: &R,
    owner: UserId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<EventId>,
) -> Result<bool, StoreError>
where
    R: StoreRead + ?Sized,
{
    Ok(find_conflict(store, owner, start, end, exclude)?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use eventshare_auth::User;
    use eventshare_calendar::EventDraft;

    use crate::store::{CalendarStore, InMemoryCalendarStore};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, hour, minute, 0).unwrap()
    }

    /// Store holding one 10:00–11:00 event for `owner`.
    fn setup() -> (InMemoryCalendarStore, UserId, Event) {
        let store = InMemoryCalendarStore::new();
        let owner = User::new(UserId::new(), "owner", "").unwrap();
        let event = Event::create(
            EventId::new(),
            EventDraft::new("A", at(10, 0), at(11, 0)),
            owner.id,
            at(8, 0),
        )
        .unwrap();
        store
            .transaction(|tx| -> Result<(), StoreError> {
                tx.insert_user(owner.clone())?;
                tx.insert_event(event.clone())
            })
            .unwrap();
        (store, owner.id, event)
    }

    fn check(
        store: &InMemoryCalendarStore,
        owner: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<EventId>,
    ) -> bool {
        store
            .read(|r| has_conflict(r, owner, start, end, exclude))
            .unwrap()
    }

    #[test]
    fn back_to_back_is_not_a_conflict() {
        let (store, owner, _) = setup();
        assert!(!check(&store, owner, at(11, 0), at(12, 0), None));
        assert!(!check(&store, owner, at(9, 0), at(10, 0), None));
    }

    #[test]
    fn partial_overlap_is_a_conflict() {
        let (store, owner, _) = setup();
        assert!(check(&store, owner, at(10, 30), at(11, 30), None));
        assert!(check(&store, owner, at(9, 0), at(13, 0), None));
    }

    #[test]
    fn excluded_event_is_ignored() {
        let (store, owner, event) = setup();
        assert!(!check(&store, owner, at(10, 15), at(10, 45), Some(event.id)));
    }

    #[test]
    fn other_owners_do_not_conflict() {
        let (store, _, _) = setup();
        assert!(!check(&store, UserId::new(), at(10, 0), at(11, 0), None));
    }

    #[test]
    fn find_reports_the_clashing_event() {
        let (store, owner, event) = setup();
        let found = store
            .read(|r| find_conflict(r, owner, at(10, 59), at(11, 1), None))
            .unwrap();
        assert_eq!(found.map(|e| e.id), Some(event.id));
    }
}
