// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side booking views: filtering, search, ordering, dashboard
//! groupings and calendar events.
//!
//! Everything here is pure and takes "now" explicitly.

use crate::models::{Booking, BookingStatus, Role};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cmp::Reverse;
use std::str::FromStr;

/// Lessons shown on each dashboard list.
const DASHBOARD_LIST_LEN: usize = 5;

/// Status tab on the bookings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingFilter {
    #[default]
    All,
    /// Pending or confirmed, on or after today
    Upcoming,
    Completed,
    Cancelled,
}

impl FromStr for BookingFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(BookingFilter::All),
            "upcoming" => Ok(BookingFilter::Upcoming),
            "completed" => Ok(BookingFilter::Completed),
            "cancelled" => Ok(BookingFilter::Cancelled),
            other => Err(format!("Unknown booking filter: {}", other)),
        }
    }
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking, today: NaiveDate) -> bool {
        match self {
            BookingFilter::All => true,
            BookingFilter::Upcoming => is_upcoming(booking, today),
            BookingFilter::Completed => booking.status == BookingStatus::Completed,
            BookingFilter::Cancelled => booking.status == BookingStatus::Cancelled,
        }
    }
}

fn is_upcoming(booking: &Booking, today: NaiveDate) -> bool {
    booking.status.is_active() && booking.date().is_some_and(|d| d >= today)
}

/// Case-insensitive match against instructor name, car, pickup address and
/// lesson type. A blank query matches everything.
pub fn matches_search(booking: &Booking, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    let instructor = booking
        .instructor
        .as_ref()
        .map(|i| format!("{} {}", i.first_name, i.last_name))
        .unwrap_or_default();
    let car = booking.car.as_ref().map(|c| c.describe()).unwrap_or_default();
    let pickup = booking.pickup_address().unwrap_or_default();

    [
        instructor.as_str(),
        car.as_str(),
        pickup,
        booking.lesson_type.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&query))
}

/// Newest lesson first. Bookings with unreadable dates sink to the end.
pub fn sort_newest_first(bookings: &mut [Booking]) {
    bookings.sort_by_key(|b| Reverse(b.starts_at()));
}

/// Filter, search and order, as the bookings page lists them.
pub fn select_bookings(
    bookings: &[Booking],
    filter: BookingFilter,
    query: &str,
    today: NaiveDate,
) -> Vec<Booking> {
    let mut selected: Vec<Booking> = bookings
        .iter()
        .filter(|b| filter.matches(b, today) && matches_search(b, query))
        .cloned()
        .collect();
    sort_newest_first(&mut selected);
    selected
}

/// Counts shown above the bookings list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingStats {
    pub total: usize,
    pub upcoming: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl BookingStats {
    pub fn from_bookings(bookings: &[Booking], today: NaiveDate) -> Self {
        let mut stats = Self {
            total: bookings.len(),
            ..Default::default()
        };
        for booking in bookings {
            if is_upcoming(booking, today) {
                stats.upcoming += 1;
            }
            match booking.status {
                BookingStatus::Completed => stats.completed += 1,
                BookingStatus::Cancelled => stats.cancelled += 1,
                _ => {}
            }
        }
        stats
    }
}

/// Instructor dashboard groupings.
#[derive(Debug, Clone, Default)]
pub struct InstructorAgenda {
    /// Active lessons today
    pub today: Vec<Booking>,
    /// Active lessons after today, soonest first
    pub upcoming: Vec<Booking>,
    /// Completed lessons in the order received
    pub recent_completed: Vec<Booking>,
    /// Lessons that ended but were never marked completed or cancelled
    pub needs_attention: Vec<Booking>,
    /// Today's lessons plus upcoming ones within seven days
    pub this_week: usize,
    pub total_completed: usize,
}

impl InstructorAgenda {
    pub fn build(bookings: &[Booking], now: NaiveDateTime) -> Self {
        let today = now.date();
        let week_end = today + Duration::days(7);
        let mut agenda = Self::default();

        for booking in bookings {
            let date = booking.date();
            let active = booking.status.is_active();

            if active && date == Some(today) {
                agenda.today.push(booking.clone());
            } else if active && date.is_some_and(|d| d > today) {
                agenda.upcoming.push(booking.clone());
            }

            if booking.status == BookingStatus::Completed {
                agenda.total_completed += 1;
                if agenda.recent_completed.len() < DASHBOARD_LIST_LEN {
                    agenda.recent_completed.push(booking.clone());
                }
            }

            if active && booking.ends_at().is_some_and(|end| end < now) {
                agenda.needs_attention.push(booking.clone());
            }
        }

        agenda.today.sort_by_key(|b| b.starts_at());
        agenda.upcoming.sort_by_key(|b| b.starts_at());
        agenda.this_week = agenda.today.len()
            + agenda
                .upcoming
                .iter()
                .filter(|b| b.date().is_some_and(|d| d <= week_end))
                .count();
        agenda
    }
}

/// A student's next active lessons strictly after today, soonest first.
pub fn next_lessons(bookings: &[Booking], today: NaiveDate) -> Vec<Booking> {
    let mut next: Vec<Booking> = bookings
        .iter()
        .filter(|b| b.status.is_active() && b.date().is_some_and(|d| d > today))
        .cloned()
        .collect();
    next.sort_by_key(|b| b.starts_at());
    next.truncate(DASHBOARD_LIST_LEN);
    next
}

/// Booking placed on the schedule calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    /// Hex colour keyed by status
    pub color: &'static str,
}

impl CalendarEvent {
    /// Event for `booking` as seen by a `viewer`. `None` if the booking's
    /// date or times do not parse.
    pub fn from_booking(booking: &Booking, viewer: Role) -> Option<Self> {
        Some(Self {
            id: booking.id.clone(),
            title: event_title(booking, viewer),
            start: booking.starts_at()?,
            end: booking.ends_at()?,
            status: booking.status,
            color: status_color(booking.status),
        })
    }
}

/// Events for every booking with a readable schedule.
pub fn calendar_events(bookings: &[Booking], viewer: Role) -> Vec<CalendarEvent> {
    bookings
        .iter()
        .filter_map(|b| CalendarEvent::from_booking(b, viewer))
        .collect()
}

fn event_title(booking: &Booking, viewer: Role) -> String {
    let label = booking.lesson_type.label();
    let first_name = |user: Option<&crate::models::User>| {
        user.map(|u| u.first_name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "TBD".to_string())
    };

    match viewer {
        Role::Student => format!("{} - {}", label, first_name(booking.instructor.as_ref())),
        Role::Instructor => {
            let student = booking
                .student
                .as_ref()
                .map(|s| s.full_name())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "TBD".to_string());
            format!("{} - {}", student, label)
        }
        Role::Admin => format!(
            "{} - {} - {}",
            first_name(booking.student.as_ref()),
            first_name(booking.instructor.as_ref()),
            label
        ),
    }
}

fn status_color(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Completed => "#10b981",
        BookingStatus::Cancelled => "#ef4444",
        BookingStatus::NoShow => "#6b7280",
        BookingStatus::Pending => "#f59e0b",
        BookingStatus::Confirmed => "#3b82f6",
    }
}
