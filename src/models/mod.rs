// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models exchanged with the DriverXP API.

pub mod analytics;
pub mod api;
pub mod booking;
pub mod car;
pub mod user;

pub use analytics::{AnalyticsQuery, AnalyticsReport, InstructorFeedback};
pub use api::{
    ApiResponse, AuthResponse, LoginCredentials, NewUser, PasswordChange, PasswordReset,
    RegisterData, UserQuery,
};
pub use booking::{
    Booking, BookingFormData, BookingStatus, BookingStatusUpdate, FeedbackSubmission, LessonType,
    Location, PaymentStatus,
};
pub use car::{Car, CarInput, CarQuery, CarStatus, FuelType, Transmission};
pub use user::{Role, User, UserChanges};
