// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access control for views that need a session.

pub mod guard;

pub use guard::{guard, GuardDecision};
