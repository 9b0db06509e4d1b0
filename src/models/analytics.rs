// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reporting payloads computed by the backend for admins and instructors.
//!
//! Maps are keyed the way the API keys them (hour of day, lesson type,
//! `YYYY-MM-DD`), so they stay `BTreeMap<String, _>` for stable output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Booking totals over the requested range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_bookings: u32,
    pub completed_bookings: u32,
    pub cancelled_bookings: u32,
    pub no_show_bookings: u32,
    pub revenue: f64,
    /// Percentage (0-100)
    pub completion_rate: f64,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorPerformance {
    pub name: String,
    pub total: u32,
    pub completed: u32,
    pub cancelled: u32,
    pub no_show: u32,
    pub average_rating: Option<f64>,
}

/// `GET /bookings/analytics` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub summary: AnalyticsSummary,
    #[serde(default)]
    pub instructor_performance: Vec<InstructorPerformance>,
    #[serde(default)]
    pub peak_hours: BTreeMap<String, u32>,
    #[serde(default)]
    pub lesson_types: BTreeMap<String, u32>,
    #[serde(default)]
    pub daily_trend: BTreeMap<String, u32>,
}

impl AnalyticsReport {
    /// Busiest hour bucket, ties broken by the earliest key.
    pub fn busiest_hour(&self) -> Option<(&str, u32)> {
        self.peak_hours
            .iter()
            .fold(None, |best: Option<(&str, u32)>, (hour, &count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((hour.as_str(), count)),
            })
    }
}

/// Query parameters for `GET /bookings/analytics`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    /// YYYY-MM-DD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// YYYY-MM-DD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStatistics {
    pub total_ratings: u32,
    pub average_rating: f64,
    #[serde(default)]
    pub rating_distribution: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub id: String,
    pub rating: u8,
    #[serde(default)]
    pub feedback: String,
    pub lesson_date: String,
    pub lesson_type: String,
    pub student_name: String,
    pub created_at: String,
}

/// `GET /bookings/instructor/{id}/feedback` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructorFeedback {
    pub statistics: FeedbackStatistics,
    #[serde(default)]
    pub feedback: Vec<FeedbackEntry>,
}
