// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session state and its pure transition function.

use crate::models::User;

/// In-memory authentication state.
///
/// `is_authenticated` implies both `current_user` and `token` are set.
/// `is_initialized` only ever goes from false to true.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub current_user: Option<User>,
    pub token: Option<String>,
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub is_initialized: bool,
}

/// Four-state view of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Loading,
    Authenticated,
    Anonymous,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if !self.is_initialized {
            SessionPhase::Uninitialized
        } else if self.is_loading {
            SessionPhase::Loading
        } else if self.is_authenticated {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }
}

/// Every way the session state can change.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    Start,
    Success { user: User, token: String },
    Fail,
    Logout,
    UpdateUser(User),
    SetInitialized,
}

/// Apply `action` to `state`.
pub fn reduce(state: SessionState, action: AuthAction) -> SessionState {
    match action {
        AuthAction::Start => SessionState {
            is_loading: true,
            ..state
        },
        AuthAction::Success { user, token } => SessionState {
            current_user: Some(user),
            token: Some(token),
            is_loading: false,
            is_authenticated: true,
            is_initialized: true,
        },
        AuthAction::Fail | AuthAction::Logout => SessionState {
            current_user: None,
            token: None,
            is_loading: false,
            is_authenticated: false,
            is_initialized: true,
        },
        // Ignored while anonymous so the user/auth invariant holds.
        AuthAction::UpdateUser(user) if state.is_authenticated => SessionState {
            current_user: Some(user),
            ..state
        },
        AuthAction::UpdateUser(_) => state,
        AuthAction::SetInitialized => SessionState {
            is_loading: false,
            is_initialized: true,
            ..state
        },
    }
}
