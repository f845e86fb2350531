//! Transactional persistence boundary for events, roles and versions.
//!
//! This module defines the storage contract the services are written against,
//! plus an in-memory implementation for tests/dev.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryCalendarStore;
pub use r#trait::{CalendarStore, StoreError, StoreRead, StoreTx};
