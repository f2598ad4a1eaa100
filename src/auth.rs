//! Admin session gate.
//!
//! Credentials and the logged-in flag live in the same storage as the
//! content they protect, so anyone who can edit storage can bypass the gate.
//! It decides what the admin screens show; it is not a security boundary.

use chrono::{DateTime, Utc};

use crate::content_model::AdminCredentials;
use crate::content_store::{ContentStore, StorageKey};
use crate::key_value::KeyValueStorage;
use crate::routes::{Route, RouteDecision};
use crate::store_error::{StoreError, StoreResult};

pub struct AuthGate<'a, S> {
    store: &'a ContentStore<S>,
}

impl<'a, S: KeyValueStorage> AuthGate<'a, S> {
    pub fn new(store: &'a ContentStore<S>) -> Self {
        Self { store }
    }

    /// Checks the pair against the stored credentials.
    ///
    /// On a match the session flag and login time are written. A mismatch
    /// writes nothing.
    pub fn login(&self, username: &str, password: &str) -> StoreResult<bool> {
        self.login_at(username, password, Utc::now())
    }

    pub fn login_at(&self, username: &str, password: &str, now: DateTime<Utc>) -> StoreResult<bool> {
        let credentials = self.store.get_admin_credentials()?;
        if credentials.username != username || credentials.password != password {
            log::warn!("ADMIN_LOGIN_REJECTED username={}", username);
            return Ok(false);
        }

        self.store.write(StorageKey::LoggedIn, &true)?;
        self.store.write(StorageKey::LoginTime, &now)?;
        log::info!("ADMIN_LOGIN username={}", username);
        Ok(true)
    }

    pub fn is_logged_in(&self) -> StoreResult<bool> {
        Ok(self.store.read::<bool>(StorageKey::LoggedIn)?.unwrap_or(false))
    }

    pub fn login_time(&self) -> StoreResult<Option<DateTime<Utc>>> {
        if !self.is_logged_in()? {
            return Ok(None);
        }
        self.store.read(StorageKey::LoginTime)
    }

    pub fn logout(&self) -> StoreResult<()> {
        self.store.remove(StorageKey::LoggedIn)?;
        self.store.remove(StorageKey::LoginTime)?;
        log::info!("ADMIN_LOGOUT");
        Ok(())
    }

    /// Replaces the credentials when `current_password` matches.
    ///
    /// Returns `Ok(false)` on a wrong current password.
    pub fn change_credentials(
        &self,
        current_password: &str,
        new_credentials: AdminCredentials,
    ) -> StoreResult<bool> {
        if new_credentials.username.trim().is_empty() || new_credentials.password.is_empty() {
            return Err(StoreError::InvalidRecord(
                "username and password must not be empty".into(),
            ));
        }

        let current = self.store.get_admin_credentials()?;
        if current.password != current_password {
            log::warn!("ADMIN_CREDENTIALS_CHANGE_REJECTED username={}", current.username);
            return Ok(false);
        }

        self.store.save_admin_credentials(&new_credentials)?;
        log::info!("ADMIN_CREDENTIALS_CHANGED username={}", new_credentials.username);
        Ok(true)
    }

    /// Route guard run when a route mounts.
    pub fn guard(&self, route: &Route) -> StoreResult<RouteDecision> {
        if route.requires_session() && !self.is_logged_in()? {
            log::debug!("ROUTE_REDIRECT from={} to={}", route, Route::Admin);
            return Ok(RouteDecision::Redirect(Route::Admin));
        }
        Ok(RouteDecision::Allow)
    }
}
