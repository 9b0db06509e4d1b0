// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lesson booking model and the payloads that create or modify bookings.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

use crate::models::{Car, User};
use crate::time_utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum LessonType {
    Theory,
    Practical,
    TestPreparation,
    RoadTest,
}

impl LessonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonType::Theory => "theory",
            LessonType::Practical => "practical",
            LessonType::TestPreparation => "test_preparation",
            LessonType::RoadTest => "road_test",
        }
    }

    /// Human label, e.g. `test preparation`.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// Pending and confirmed lessons still lie ahead of the student.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::NoShow => "Lesson Missed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

/// Pickup or drop-off point: either a bare address or a geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub enum Location {
    Address(String),
    Place {
        #[serde(default)]
        address: Option<String>,
        #[serde(default)]
        lat: Option<f64>,
        #[serde(default)]
        lng: Option<f64>,
    },
}

impl Location {
    pub fn address(&self) -> Option<&str> {
        match self {
            Location::Address(address) => Some(address),
            Location::Place { address, .. } => address.as_deref(),
        }
    }
}

/// Lesson booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Booking {
    pub id: String,
    pub student_id: String,
    pub instructor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_id: Option<String>,
    /// Lesson date (YYYY-MM-DD)
    pub lesson_date: String,
    /// Start time (HH:MM)
    pub start_time: String,
    /// End time (HH:MM)
    pub end_time: String,
    /// Duration in minutes
    #[serde(default)]
    pub duration: u32,
    pub lesson_type: LessonType,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropoff_location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_notes: Option<String>,
    /// Decimal string as sent by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<String>,
    #[serde(default)]
    pub reminder_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car: Option<Car>,
}

impl Booking {
    pub fn date(&self) -> Option<NaiveDate> {
        time_utils::parse_lesson_date(&self.lesson_date)
    }

    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        time_utils::lesson_datetime(&self.lesson_date, &self.start_time)
    }

    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        time_utils::lesson_datetime(&self.lesson_date, &self.end_time)
    }

    pub fn pickup_address(&self) -> Option<&str> {
        self.pickup_location.as_ref().and_then(Location::address)
    }
}

/// Payload for `POST /bookings`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_booking_window"))]
pub struct BookingFormData {
    #[validate(length(min = 1, message = "Please select an instructor"))]
    pub instructor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_id: Option<String>,
    #[validate(custom(function = "validate_date"))]
    pub lesson_date: String,
    #[validate(custom(function = "validate_time"))]
    pub start_time: String,
    #[validate(custom(function = "validate_time"))]
    pub end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_type: Option<LessonType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl BookingFormData {
    /// Booking for a slot starting at `start_time` with the default lesson length.
    pub fn with_default_end(
        instructor_id: impl Into<String>,
        lesson_date: NaiveDate,
        start_time: &str,
    ) -> Option<Self> {
        Some(Self {
            instructor_id: instructor_id.into(),
            car_id: None,
            lesson_date: time_utils::format_lesson_date(lesson_date),
            start_time: start_time.to_string(),
            end_time: time_utils::default_end_time(start_time)?,
            duration: Some((time_utils::DEFAULT_LESSON_HOURS * 60) as u32),
            lesson_type: Some(LessonType::Practical),
            pickup_location: None,
            dropoff_location: None,
            notes: None,
            price: None,
        })
    }
}

fn validate_date(value: &str) -> Result<(), ValidationError> {
    time_utils::parse_lesson_date(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("date").with_message("Invalid lesson date".into()))
}

fn validate_time(value: &str) -> Result<(), ValidationError> {
    time_utils::parse_lesson_time(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("time").with_message("Invalid lesson time".into()))
}

fn validate_booking_window(form: &BookingFormData) -> Result<(), ValidationError> {
    let start = time_utils::parse_lesson_time(&form.start_time);
    let end = time_utils::parse_lesson_time(&form.end_time);
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(ValidationError::new("window")
                .with_message("End time must be after start time".into()));
        }
    }
    Ok(())
}

/// Payload for `PATCH /bookings/{id}/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Payload for `PATCH /bookings/{id}/feedback`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
    #[validate(length(max = 1000))]
    pub feedback: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_accepts_string_or_object() {
        let bare: Location = serde_json::from_str(r#""12 George St""#).unwrap();
        assert_eq!(bare.address(), Some("12 George St"));

        let place: Location =
            serde_json::from_str(r#"{"address":"Town Hall","lat":-33.87,"lng":151.2}"#).unwrap();
        assert_eq!(place.address(), Some("Town Hall"));
    }

    #[test]
    fn form_with_default_end_validates() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let form = BookingFormData::with_default_end("i1", date, "09:00").unwrap();
        assert_eq!(form.end_time, "11:00");
        assert_eq!(form.lesson_date, "2025-06-02");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn form_rejects_missing_instructor_and_inverted_window() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let mut form = BookingFormData::with_default_end("", date, "09:00").unwrap();
        assert!(form.validate().is_err());

        form.instructor_id = "i1".to_string();
        form.end_time = "08:00".to_string();
        assert!(form.validate().is_err());
    }

    #[test]
    fn feedback_rating_bounds() {
        let ok = FeedbackSubmission {
            rating: 5,
            feedback: "Great".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = FeedbackSubmission {
            rating: 0,
            feedback: String::new(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn lesson_type_label() {
        assert_eq!(LessonType::TestPreparation.label(), "test preparation");
        assert!(BookingStatus::Confirmed.is_active());
        assert!(!BookingStatus::NoShow.is_active());
    }
}
