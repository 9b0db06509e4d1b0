// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication session: state machine and store.

pub mod state;
pub mod store;

pub use state::{reduce, AuthAction, SessionPhase, SessionState};
pub use store::SessionStore;
