// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: owns the in-memory session and keeps it in step with the
//! durable credential pair.
//!
//! Ordering rules:
//! - The pair is persisted before the in-memory state becomes authenticated.
//! - The pair is deleted before the in-memory state becomes anonymous.
//!
//! State lives in a `watch` channel so observers see every transition.

use super::state::{reduce, AuthAction, SessionPhase, SessionState};
use crate::error::ClientError;
use crate::events::{AuthEvent, EventBus};
use crate::models::{AuthResponse, LoginCredentials, RegisterData, User, UserChanges};
use crate::services::AuthService;
use crate::storage::{CredentialVault, Credentials};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Cloneable handle to the process-wide session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    vault: CredentialVault,
    auth: AuthService,
    events: EventBus,
    state: watch::Sender<SessionState>,
    init_started: AtomicBool,
    exchange_in_flight: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let slot = match self.listener.get_mut() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

/// A login/register exchange in progress. Dropping it unfinished (the
/// caller's future was cancelled) fails the session back to anonymous.
struct Exchange<'a> {
    store: &'a SessionStore,
    finished: bool,
}

impl Exchange<'_> {
    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for Exchange<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("Authentication request abandoned before completion");
            self.store.dispatch(AuthAction::Fail);
        }
        self.store
            .inner
            .exchange_in_flight
            .store(false, Ordering::SeqCst);
    }
}

impl SessionStore {
    /// Build an uninitialized store. Does no I/O.
    pub fn new(vault: CredentialVault, auth: AuthService, events: EventBus) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                vault,
                auth,
                events,
                state,
                init_started: AtomicBool::new(false),
                exchange_in_flight: AtomicBool::new(false),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Rehydrate from durable storage and start listening for
    /// session-invalidated events. Later calls do nothing.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn init(&self) {
        if self.inner.init_started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Session store already initialized");
            return;
        }

        // Subscribe before reading storage so no invalidation is missed.
        let events = self.inner.events.subscribe();

        match self.inner.vault.load() {
            Ok(Some(Credentials { token, user })) => {
                tracing::info!(user_id = %user.id, role = user.role.as_str(), "Restored session");
                self.dispatch(AuthAction::Success { user, token });
            }
            Ok(None) => {
                tracing::debug!("No stored session");
                self.dispatch(AuthAction::SetInitialized);
            }
            Err(ClientError::StorageCorrupt(reason)) => {
                tracing::warn!(reason = %reason, "Discarding corrupt stored credentials");
                if let Err(e) = self.inner.vault.clear() {
                    tracing::error!(error = %e, "Failed to discard corrupt credentials");
                }
                self.dispatch(AuthAction::SetInitialized);
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not read stored credentials");
                self.dispatch(AuthAction::SetInitialized);
            }
        }

        self.start_listener(events);
    }

    /// Stop reacting to session-invalidated events. State is kept.
    pub fn dispose(&self) {
        if let Some(handle) = self.listener_slot().take() {
            handle.abort();
            tracing::debug!("Session store listener stopped");
        }
    }

    /// Exchange email and password for a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let exchange = self.begin_exchange()?;
        let credentials = LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self.inner.auth.login(&credentials).await;
        self.complete_exchange(exchange, result)
    }

    /// Create an account and start a session for it.
    pub async fn register(&self, data: &RegisterData) -> Result<User, ClientError> {
        let exchange = self.begin_exchange()?;
        let result = self.inner.auth.register(data).await;
        self.complete_exchange(exchange, result)
    }

    /// End the session. Always succeeds and may be called repeatedly.
    pub fn logout(&self) {
        if let Err(e) = self.inner.vault.clear() {
            tracing::error!(error = %e, "Failed to clear stored credentials");
        }
        self.dispatch(AuthAction::Logout);
        tracing::info!("Logged out");
    }

    /// Replace the identity record, keeping the token.
    pub fn update_profile(&self, user: User) -> Result<(), ClientError> {
        self.ensure_authenticated()?;
        if let Some(field) = user.missing_identity_field() {
            return Err(ClientError::Validation(format!("Profile is missing {}", field)));
        }

        self.inner.vault.replace_user(&user)?;
        tracing::debug!(user_id = %user.id, "Profile updated");
        self.dispatch(AuthAction::UpdateUser(user));
        Ok(())
    }

    /// Reload the identity record from `GET /auth/me`.
    pub async fn refresh_profile(&self) -> Result<User, ClientError> {
        self.ensure_authenticated()?;
        let user = self.inner.auth.me().await?;
        self.update_profile(user.clone())?;
        Ok(user)
    }

    /// Send profile changes and adopt the server's copy of the result.
    pub async fn save_profile(&self, changes: &UserChanges) -> Result<User, ClientError> {
        self.ensure_authenticated()?;
        let user = self.inner.auth.update_me(changes).await?;
        self.update_profile(user.clone())?;
        Ok(user)
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.state.borrow().current_user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    fn dispatch(&self, action: AuthAction) {
        self.inner.state.send_modify(|state| {
            *state = reduce(std::mem::take(state), action);
            tracing::debug!(phase = ?state.phase(), "Session state changed");
        });
    }

    fn ensure_authenticated(&self) -> Result<(), ClientError> {
        let state = self.inner.state.borrow();
        if !state.is_initialized {
            return Err(ClientError::NotInitialized);
        }
        if !state.is_authenticated {
            return Err(ClientError::NotAuthenticated);
        }
        Ok(())
    }

    /// Claim the single exchange slot and enter LOADING.
    fn begin_exchange(&self) -> Result<Exchange<'_>, ClientError> {
        if !self.inner.state.borrow().is_initialized {
            return Err(ClientError::NotInitialized);
        }
        if self
            .inner
            .exchange_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ClientError::SessionBusy);
        }
        let exchange = Exchange {
            store: self,
            finished: false,
        };

        // Switching accounts: the old pair goes before anything else happens.
        if self.is_authenticated() {
            tracing::info!("Replacing existing session");
            if let Err(e) = self.inner.vault.clear() {
                tracing::error!(error = %e, "Failed to clear previous credentials");
            }
            self.dispatch(AuthAction::Logout);
        }

        self.dispatch(AuthAction::Start);
        Ok(exchange)
    }

    /// Validate the exchange result, persist, then commit.
    fn complete_exchange(
        &self,
        exchange: Exchange<'_>,
        result: Result<AuthResponse, ClientError>,
    ) -> Result<User, ClientError> {
        let outcome = result.and_then(credentials_from).and_then(|credentials| {
            self.inner.vault.save(&credentials)?;
            Ok(credentials)
        });

        let outcome = match outcome {
            Ok(Credentials { token, user }) => {
                tracing::info!(
                    user_id = %user.id,
                    role = user.role.as_str(),
                    token_len = token.len(),
                    "Authenticated"
                );
                self.dispatch(AuthAction::Success {
                    user: user.clone(),
                    token,
                });
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Authentication failed");
                self.dispatch(AuthAction::Fail);
                Err(e)
            }
        };
        exchange.finish();
        outcome
    }

    fn start_listener(&self, mut events: broadcast::Receiver<AuthEvent>) {
        let store = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::SessionInvalidated)
                    | Err(broadcast::error::RecvError::Lagged(_)) => {
                        let Some(inner) = store.upgrade() else {
                            break;
                        };
                        tracing::info!("Session invalidated by server");
                        SessionStore { inner }.logout();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        *self.listener_slot() = Some(handle);
    }

    fn listener_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner
            .listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A usable pair needs a token and a complete identity record.
fn credentials_from(response: AuthResponse) -> Result<Credentials, ClientError> {
    let (user, token) = response.into_parts();
    let user = user.ok_or_else(|| ClientError::MalformedResponse("missing user".to_string()))?;
    let token = token.ok_or_else(|| ClientError::MalformedResponse("missing token".to_string()))?;
    if let Some(field) = user.missing_identity_field() {
        return Err(ClientError::MalformedResponse(format!("user missing {}", field)));
    }
    Ok(Credentials { token, user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::ApiClient;
    use crate::storage::{MemoryStorage, SlotStorage};

    fn store_with(storage: MemoryStorage) -> (SessionStore, EventBus) {
        let config = Config::default();
        let events = EventBus::new();
        let vault = CredentialVault::new(Arc::new(storage), &config);
        let client = ApiClient::new(&config, vault.clone(), events.clone()).unwrap();
        let store = SessionStore::new(vault, AuthService::new(client), events.clone());
        (store, events)
    }

    fn user() -> User {
        User {
            id: "1".to_string(),
            first_name: "A".to_string(),
            email: "a@x.com".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn operations_before_init_are_rejected() {
        let (store, _) = store_with(MemoryStorage::new());
        assert_eq!(store.phase(), SessionPhase::Uninitialized);
        assert!(matches!(
            store.login("a@x.com", "pw").await,
            Err(ClientError::NotInitialized)
        ));
        assert!(matches!(
            store.update_profile(user()),
            Err(ClientError::NotInitialized)
        ));
        assert_eq!(store.phase(), SessionPhase::Uninitialized);
    }

    #[tokio::test]
    async fn init_twice_is_a_noop() {
        let storage = MemoryStorage::new();
        let (store, events) = store_with(storage);
        store.init();
        store.init();
        assert_eq!(store.phase(), SessionPhase::Anonymous);
        assert_eq!(events.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn corrupt_pair_is_discarded() {
        let storage = MemoryStorage::new();
        storage.set("driverxp_token", "tok").unwrap();
        storage.set("driverxp_user", r#"{"id":"1"}"#).unwrap();

        let (store, _) = store_with(storage.clone());
        store.init();

        assert_eq!(store.phase(), SessionPhase::Anonymous);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn update_profile_requires_session() {
        let (store, _) = store_with(MemoryStorage::new());
        store.init();
        assert!(matches!(
            store.update_profile(user()),
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn update_profile_keeps_token() {
        let storage = MemoryStorage::new();
        storage.set("driverxp_token", "tok").unwrap();
        storage
            .set("driverxp_user", &serde_json::to_string(&user()).unwrap())
            .unwrap();
        let (store, _) = store_with(storage.clone());
        store.init();

        let renamed = User {
            first_name: "B".to_string(),
            ..user()
        };
        store.update_profile(renamed).unwrap();

        let state = store.snapshot();
        assert_eq!(state.token.as_deref(), Some("tok"));
        assert_eq!(state.current_user.unwrap().first_name, "B");
        assert!(storage.get("driverxp_user").unwrap().unwrap().contains("\"B\""));
        assert_eq!(storage.get("driverxp_token").unwrap().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn dispose_stops_listening() {
        let storage = MemoryStorage::new();
        storage.set("driverxp_token", "tok").unwrap();
        storage
            .set("driverxp_user", &serde_json::to_string(&user()).unwrap())
            .unwrap();
        let (store, events) = store_with(storage);
        store.init();
        store.dispose();

        events.publish(AuthEvent::SessionInvalidated);
        tokio::task::yield_now().await;
        assert_eq!(store.phase(), SessionPhase::Authenticated);
    }

    #[test]
    fn credentials_need_token_and_identity() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"data":{"user":{"id":"1","firstName":"A","email":"a@x.com"}}}"#,
        )
        .unwrap();
        assert!(matches!(
            credentials_from(response),
            Err(ClientError::MalformedResponse(_))
        ));

        let response: AuthResponse =
            serde_json::from_str(r#"{"data":{"user":{"id":"1"}},"token":"t"}"#).unwrap();
        assert!(matches!(
            credentials_from(response),
            Err(ClientError::MalformedResponse(_))
        ));
    }
}
