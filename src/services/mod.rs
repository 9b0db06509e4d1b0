// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - typed access to the DriverXP backend.

pub mod auth;
pub mod bookings;
pub mod cars;
pub mod http;
pub mod users;

pub use auth::AuthService;
pub use bookings::BookingService;
pub use cars::CarService;
pub use http::{is_auth_endpoint, ApiClient};
pub use users::UserService;
