//! Process start-up: role catalog seeding, user registration, service wiring.

use eventshare_auth::{Role, User};
use eventshare_core::UserId;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::services::{EventService, HistoryService, SharingService};
use crate::store::{CalendarStore, StoreError};

/// Insert any missing catalog role. Returns how many were created; 0 on re-run.
pub fn seed_default_roles<S>(store: &S) -> Result<usize, StoreError>
where
    S: CalendarStore,
{
    let created = store.transaction(|tx| -> Result<usize, StoreError> {
        let mut created = 0;
        for role in Role::ALL {
            if tx.ensure_role(role)? {
                created += 1;
            }
        }
        Ok(created)
    })?;

    if created > 0 {
        tracing::info!(created, "default roles seeded");
    }
    Ok(created)
}

/// Validate and insert a new user. A taken username is a validation error.
pub fn register_user<S>(store: &S, username: &str, email: &str) -> Result<User, ServiceError>
where
    S: CalendarStore,
{
    let user = User::new(UserId::new(), username, email)?;
    let user = store.transaction(move |tx| -> Result<User, ServiceError> {
        if tx.find_user_by_username(&user.username)?.is_some() {
            return Err(ServiceError::validation("username", "is already taken"));
        }
        tx.insert_user(user.clone())?;
        Ok(user)
    })?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// The three services wired over one shared store.
#[derive(Debug, Clone)]
pub struct EventShare<S> {
    store: S,
    pub events: EventService<S>,
    pub history: HistoryService<S>,
    pub sharing: SharingService<S>,
}

impl<S> EventShare<S>
where
    S: CalendarStore + Clone,
{
    /// Validate `config`, seed the role catalog and build the services.
    pub fn bootstrap(store: S, config: ServiceConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        seed_default_roles(&store)?;
        Ok(Self {
            events: EventService::new(store.clone(), config.clone()),
            history: HistoryService::new(store.clone(), config),
            sharing: SharingService::new(store.clone()),
            store,
        })
    }

    pub fn register_user(&self, username: &str, email: &str) -> Result<User, ServiceError> {
        register_user(&self.store, username, email)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
