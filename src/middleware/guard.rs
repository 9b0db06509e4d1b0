// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Protected-route decision.

use crate::models::Role;
use crate::session::SessionState;

/// What a protected view should do for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not rehydrated yet; show a spinner.
    Loading,
    RedirectToLogin,
    /// Signed in with the wrong role.
    RedirectToDashboard,
    Allow,
}

/// Decide access for a view that optionally requires `required_role`.
pub fn guard(state: &SessionState, required_role: Option<Role>) -> GuardDecision {
    if !state.is_initialized {
        return GuardDecision::Loading;
    }

    let user = match (&state.current_user, state.is_authenticated) {
        (Some(user), true) => user,
        _ => return GuardDecision::RedirectToLogin,
    };

    match required_role {
        Some(role) if user.role != role => {
            tracing::debug!(
                required = role.as_str(),
                actual = user.role.as_str(),
                "Role mismatch, redirecting to dashboard"
            );
            GuardDecision::RedirectToDashboard
        }
        _ => GuardDecision::Allow,
    }
}
