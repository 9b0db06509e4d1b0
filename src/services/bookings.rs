// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lesson booking endpoints.

use super::auth::validate;
use super::http::ApiClient;
use super::users::resource_path;
use crate::error::ClientError;
use crate::models::{
    AnalyticsQuery, AnalyticsReport, ApiResponse, Booking, BookingFormData, BookingStatusUpdate,
    FeedbackSubmission, InstructorFeedback,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct BookingList {
    #[serde(default)]
    bookings: Vec<Booking>,
}

#[derive(Deserialize)]
struct BookingPayload {
    booking: Option<Booking>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Cancellation<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    cancellation_reason: Option<&'a str>,
}

/// Service for `/bookings/*`.
#[derive(Clone)]
pub struct BookingService {
    client: ApiClient,
}

impl BookingService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /bookings/my-bookings`. The backend scopes by the caller's role.
    pub async fn my_bookings(&self) -> Result<Vec<Booking>, ClientError> {
        let response: ApiResponse<BookingList> = self.client.get("/bookings/my-bookings").await?;
        let bookings = response.into_data("bookings")?.bookings;
        tracing::debug!(count = bookings.len(), "Fetched bookings");
        Ok(bookings)
    }

    pub async fn get(&self, id: &str) -> Result<Booking, ClientError> {
        let response: ApiResponse<BookingPayload> =
            self.client.get(&resource_path("bookings", id)?).await?;
        booking_from(response)
    }

    /// `POST /bookings`.
    pub async fn create(&self, form: &BookingFormData) -> Result<Booking, ClientError> {
        validate(form)?;
        let response: ApiResponse<BookingPayload> = self.client.post("/bookings", form).await?;
        let booking = booking_from(response)?;
        tracing::info!(booking_id = %booking.id, date = %booking.lesson_date, "Booking created");
        Ok(booking)
    }

    /// `PATCH /bookings/{id}/cancel`.
    pub async fn cancel(&self, id: &str, reason: Option<&str>) -> Result<Booking, ClientError> {
        let path = format!("{}/cancel", resource_path("bookings", id)?);
        let body = Cancellation {
            cancellation_reason: reason.filter(|r| !r.trim().is_empty()),
        };
        let response: ApiResponse<BookingPayload> = self.client.patch(&path, &body).await?;
        tracing::info!(booking_id = id, "Booking cancelled");
        booking_from(response)
    }

    /// `PATCH /bookings/{id}/status` (instructor or admin).
    pub async fn update_status(
        &self,
        id: &str,
        update: &BookingStatusUpdate,
    ) -> Result<Booking, ClientError> {
        validate(update)?;
        let path = format!("{}/status", resource_path("bookings", id)?);
        let response: ApiResponse<BookingPayload> = self.client.patch(&path, update).await?;
        booking_from(response)
    }

    /// `PATCH /bookings/{id}/feedback` (student, completed lessons).
    pub async fn submit_feedback(
        &self,
        id: &str,
        feedback: &FeedbackSubmission,
    ) -> Result<Booking, ClientError> {
        validate(feedback)?;
        let path = format!("{}/feedback", resource_path("bookings", id)?);
        let response: ApiResponse<BookingPayload> = self.client.patch(&path, feedback).await?;
        booking_from(response)
    }

    /// `GET /bookings/instructor/{id}/feedback`.
    pub async fn instructor_feedback(
        &self,
        instructor_id: &str,
    ) -> Result<InstructorFeedback, ClientError> {
        let path = format!(
            "{}/feedback",
            resource_path("bookings/instructor", instructor_id)?
        );
        let response: ApiResponse<InstructorFeedback> = self.client.get(&path).await?;
        response.into_data("feedback")
    }

    /// `GET /bookings/analytics` (admin).
    pub async fn analytics(&self, range: &AnalyticsQuery) -> Result<AnalyticsReport, ClientError> {
        let response: ApiResponse<AnalyticsReport> = self
            .client
            .get_with_query("/bookings/analytics", range)
            .await?;
        response.into_data("analytics")
    }
}

fn booking_from(response: ApiResponse<BookingPayload>) -> Result<Booking, ClientError> {
    response
        .into_data("booking")?
        .booking
        .ok_or_else(|| ClientError::MalformedResponse("missing booking".to_string()))
}
