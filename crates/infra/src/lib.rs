//! Persistence boundary and application services for shared calendar events.
//!
//! Layering, bottom-up:
//!
//! - [`store`]: transactional `CalendarStore` contract + in-memory implementation
//! - [`conflict`], [`access`], [`versioning`]: evaluators and the version arena,
//!   always called inside a caller-provided scope
//! - [`services`]: event lifecycle, history and sharing operations
//! - [`bootstrap`]: role seeding and service wiring

pub mod access;
pub mod bootstrap;
pub mod config;
pub mod conflict;
pub mod error;
pub mod query;
pub mod services;
pub mod store;
pub mod versioning;


pub use bootstrap::{register_user, seed_default_roles, EventShare};
pub use config::{ConfigError, ServiceConfig};
pub use error::ServiceError;
pub use query::{Pagination, VersionPage};
pub use services::{
    AccessibleEvent, ChangelogEntry, EventService, HistoryService, Revision, SharingService,
};
pub use store::{CalendarStore, InMemoryCalendarStore, StoreError, StoreRead, StoreTx};
