use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventshare_core::{DomainError, DomainResult, EventId, UserId};

const MAX_TITLE_LEN: usize = 250;
const MAX_LOCATION_LEN: usize = 250;

/// Recurrence label stored on an event. Expansion into occurrences is not
/// performed anywhere in the core.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    BiMonthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

impl Recurrence {
    pub const ALL: [Recurrence; 9] = [
        Recurrence::None,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::BiWeekly,
        Recurrence::Monthly,
        Recurrence::BiMonthly,
        Recurrence::Quarterly,
        Recurrence::SemiAnnually,
        Recurrence::Annually,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::None => "NONE",
            Recurrence::Daily => "DAILY",
            Recurrence::Weekly => "WEEKLY",
            Recurrence::BiWeekly => "BI-WEEKLY",
            Recurrence::Monthly => "MONTHLY",
            Recurrence::BiMonthly => "BI-MONTHLY",
            Recurrence::Quarterly => "QUARTERLY",
            Recurrence::SemiAnnually => "SEMI-ANNUALLY",
            Recurrence::Annually => "ANNUALLY",
        }
    }
}

impl core::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Recurrence::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| DomainError::validation("recurrence", format!("unknown value '{s}'")))
    }
}

/// The mutable attributes of an event, as supplied on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence: Recurrence,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            location: String::new(),
            start_time,
            end_time,
            is_recurring: false,
            recurrence: Recurrence::None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn recurring(mut self, recurrence: Recurrence) -> Self {
        self.is_recurring = recurrence != Recurrence::None;
        self.recurrence = recurrence;
        self
    }

    /// Field-level validation. Reports the first offending field.
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title", "must not be blank"));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::validation(
                "title",
                format!("must be at most {MAX_TITLE_LEN} characters"),
            ));
        }
        if self.location.chars().count() > MAX_LOCATION_LEN {
            return Err(DomainError::validation(
                "location",
                format!("must be at most {MAX_LOCATION_LEN} characters"),
            ));
        }
        if self.start_time >= self.end_time {
            return Err(DomainError::validation("end_time", "must be after start_time"));
        }
        Ok(())
    }
}

/// A partial update: `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

impl EventChanges {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn times(mut self, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self.end_time = Some(end_time);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == EventChanges::default()
    }

    fn apply_to(&self, draft: &mut EventDraft) {
        if let Some(v) = &self.title {
            draft.title = v.clone();
        }
        if let Some(v) = &self.description {
            draft.description = v.clone();
        }
        if let Some(v) = &self.location {
            draft.location = v.clone();
        }
        if let Some(v) = self.start_time {
            draft.start_time = v;
        }
        if let Some(v) = self.end_time {
            draft.end_time = v;
        }
        if let Some(v) = self.is_recurring {
            draft.is_recurring = v;
        }
        if let Some(v) = self.recurrence {
            draft.recurrence = v;
        }
    }
}

impl From<EventDraft> for EventChanges {
    fn from(d: EventDraft) -> Self {
        Self {
            title: Some(d.title),
            description: Some(d.description),
            location: Some(d.location),
            start_time: Some(d.start_time),
            end_time: Some(d.end_time),
            is_recurring: Some(d.is_recurring),
            recurrence: Some(d.recurrence),
        }
    }
}

/// A live calendar event.
///
/// # Invariants
/// - `start_time < end_time`.
/// - `created_by` and `created_at` never change after creation.
/// - `updated_at` moves only when a mutable field actually changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_recurring: bool,
    pub recurrence: Recurrence,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn create(
        id: EventId,
        draft: EventDraft,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            start_time: draft.start_time,
            end_time: draft.end_time,
            is_recurring: draft.is_recurring,
            recurrence: draft.recurrence,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// The mutable attributes as a draft.
    pub fn draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            is_recurring: self.is_recurring,
            recurrence: self.recurrence,
        }
    }

    /// Return the event with `changes` applied and validated.
    ///
    /// Identity, `created_by` and `created_at` are carried over untouched.
    pub fn with_changes(&self, changes: &EventChanges, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut draft = self.draft();
        changes.apply_to(&mut draft);
        draft.validate()?;

        if draft == self.draft() {
            return Ok(self.clone());
        }

        Ok(Self {
            id: self.id,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            start_time: draft.start_time,
            end_time: draft.end_time,
            is_recurring: draft.is_recurring,
            recurrence: draft.recurrence,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: now,
        })
    }

    /// Whether this event's interval overlaps `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        intervals_overlap(self.start_time, self.end_time, start, end)
    }
}

/// Open-interval overlap: intervals sharing only an endpoint do not overlap.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, hour, minute, 0).unwrap()
    }

    fn standup() -> Event {
        Event::create(
            EventId::new(),
            EventDraft::new("Standup", at(10, 0), at(11, 0)),
            UserId::new(),
            at(8, 0),
        )
        .unwrap()
    }

    #[test]
    fn rejects_inverted_and_empty_intervals() {
        let err = EventDraft::new("x", at(11, 0), at(10, 0)).validate().unwrap_err();
        assert_eq!(err, DomainError::validation("end_time", "must be after start_time"));
        assert!(EventDraft::new("x", at(10, 0), at(10, 0)).validate().is_err());
    }

    #[test]
    fn rejects_blank_and_long_titles() {
        assert!(EventDraft::new("  ", at(10, 0), at(11, 0)).validate().is_err());
        let long = "t".repeat(251);
        match EventDraft::new(long, at(10, 0), at(11, 0)).validate() {
            Err(DomainError::Validation { field, .. }) => assert_eq!(field, "title"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn recurrence_wire_names() {
        assert_eq!(
            serde_json::to_string(&Recurrence::SemiAnnually).unwrap(),
            "\"SEMI-ANNUALLY\""
        );
        assert_eq!("bi-weekly".parse::<Recurrence>().unwrap(), Recurrence::BiWeekly);
        assert!("FORTNIGHTLY".parse::<Recurrence>().is_err());

        for r in Recurrence::ALL {
            let wire = serde_json::to_string(&r).unwrap();
            assert_eq!(wire, format!("\"{}\"", r.as_str()));
            assert_eq!(serde_json::from_str::<Recurrence>(&wire).unwrap(), r);
        }
    }

    #[test]
    fn draft_defaults_when_deserializing() {
        let json = serde_json::json!({
            "title": "Review",
            "start_time": "2025-03-14T10:00:00Z",
            "end_time": "2025-03-14T11:00:00Z",
        });
        let draft: EventDraft = serde_json::from_value(json).unwrap();
        assert_eq!(draft.recurrence, Recurrence::None);
        assert!(!draft.is_recurring);
        assert_eq!(draft.description, "");
    }

    #[test]
    fn with_changes_keeps_identity_and_creation_fields() {
        let event = standup();
        let later = at(9, 0);
        let next = event
            .with_changes(&EventChanges::default().title("Sync"), later)
            .unwrap();
        assert_eq!(next.title, "Sync");
        assert_eq!(next.id, event.id);
        assert_eq!(next.created_by, event.created_by);
        assert_eq!(next.created_at, event.created_at);
        assert_eq!(next.updated_at, later);
    }

    #[test]
    fn unchanged_fields_do_not_touch_updated_at() {
        let event = standup();
        let same = event
            .with_changes(&EventChanges::default().title("Standup"), at(9, 30))
            .unwrap();
        assert_eq!(same, event);
    }

    #[test]
    fn with_changes_validates_the_result() {
        let event = standup();
        let changes = EventChanges {
            end_time: Some(at(9, 0)),
            ..Default::default()
        };
        assert!(event.with_changes(&changes, at(9, 0)).is_err());
    }

    #[test]
    fn full_draft_converts_to_complete_changes() {
        let draft = EventDraft::new("All", at(1, 0), at(2, 0)).with_location("Room 4");
        let changes = EventChanges::from(draft.clone());
        let event = standup().with_changes(&changes, at(9, 0)).unwrap();
        assert_eq!(event.draft(), draft);
    }

    #[test]
    fn back_to_back_does_not_overlap() {
        assert!(!intervals_overlap(at(10, 0), at(11, 0), at(11, 0), at(12, 0)));
        assert!(intervals_overlap(at(10, 0), at(11, 0), at(10, 30), at(11, 30)));
        assert!(standup().overlaps(at(9, 0), at(12, 0)));
    }

    proptest! {
        /// Property: overlap is symmetric.
        #[test]
        fn overlap_is_symmetric(
            a in 0i64..10_000, a_len in 1i64..500,
            b in 0i64..10_000, b_len in 1i64..500,
        ) {
            let base = at(0, 0);
            let (a0, a1) = (base + Duration::minutes(a), base + Duration::minutes(a + a_len));
            let (b0, b1) = (base + Duration::minutes(b), base + Duration::minutes(b + b_len));
            prop_assert_eq!(
                intervals_overlap(a0, a1, b0, b1),
                intervals_overlap(b0, b1, a0, a1)
            );
        }

        /// Property: an interval always overlaps itself and never its immediate successor.
        #[test]
        fn self_overlap_and_adjacency(start in 0i64..10_000, len in 1i64..500) {
            let base = at(0, 0);
            let s = base + Duration::minutes(start);
            let e = s + Duration::minutes(len);
            prop_assert!(intervals_overlap(s, e, s, e));
            prop_assert!(!intervals_overlap(s, e, e, e + Duration::minutes(len)));
        }
    }
}
