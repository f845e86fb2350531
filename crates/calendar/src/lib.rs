//! Calendar domain module.
//!
//! Events, their per-user role rows, immutable version records and the
//! snapshot diff engine, implemented purely as deterministic domain logic
//! (no IO, no storage).

pub mod diff;
pub mod event;
pub mod permission;
pub mod version;

pub use diff::{diff, diff_snapshots, FieldChange, SnapshotDiff};
pub use event::{intervals_overlap, Event, EventChanges, EventDraft, Recurrence};
pub use permission::{EventPermission, PermissionEntry};
pub use version::{EventSnapshot, EventVersion, SnapshotMap};
