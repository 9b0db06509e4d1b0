// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! DriverXP client: session management and typed access to the DriverXP
//! driving-school API.
//!
//! The core is a session store that persists a `(token, user)` pair and a
//! request pipeline that attaches the token and tears the session down when
//! the backend rejects it.

pub mod bookings;
pub mod config;
pub mod error;
pub mod events;
pub mod middleware;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;
pub mod time_utils;

use config::Config;
use error::ClientError;
use events::EventBus;
use services::{ApiClient, AuthService, BookingService, CarService, UserService};
use session::SessionStore;
use std::sync::Arc;
use storage::{CredentialVault, SlotStorage};

/// Shared application state: one of these per process.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub events: EventBus,
    pub vault: CredentialVault,
    pub session: SessionStore,
    pub auth: AuthService,
    pub bookings: BookingService,
    pub users: UserService,
    pub cars: CarService,
}

impl AppState {
    /// Wire the pipeline, services and session store over `storage`.
    ///
    /// The session store is not initialized; call `session.init()` from
    /// within a Tokio runtime.
    pub fn new(config: Config, storage: Arc<dyn SlotStorage>) -> Result<Self, ClientError> {
        let events = EventBus::new();
        let vault = CredentialVault::new(storage, &config);
        let client = ApiClient::new(&config, vault.clone(), events.clone())?;

        let auth = AuthService::new(client.clone());
        let session = SessionStore::new(vault.clone(), auth.clone(), events.clone());

        Ok(Self {
            events,
            vault,
            session,
            auth,
            bookings: BookingService::new(client.clone()),
            users: UserService::new(client.clone()),
            cars: CarService::new(client),
            config,
        })
    }
}
