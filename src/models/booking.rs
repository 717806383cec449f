//! Bookings and their lifecycle.
//!
//! A booking starts out `PENDING`. The normal flow is
//! `PENDING -> CONFIRMED -> COMPLETED`, with `CANCELLED` reachable from either
//! of the first two states. `REFUNDED` is set explicitly by a vendor or admin.
//! Status writes are unconditional overwrites; the predicates below only
//! report what the current state allows.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff_diesel::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Status
// ============================================================================

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
    DbEnum,
)]
#[db_enum(existing_type_path = "crate::schema::sql_types::BookingStatus")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    Refunded,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
        BookingStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Refunded => "REFUNDED",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
            BookingStatus::Refunded => "Refunded",
        }
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// Statuses that still describe an event that is going to happen.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown booking status: {}", s))
    }
}

// ============================================================================
// Booking Models (Query/Insert)
// ============================================================================

#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::schema::bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Booking {
    pub id: i32,
    pub user_id: i32,
    pub vendor_id: i32,
    pub event_date: Timestamp,
    pub event_location: Option<String>,
    pub event_type: Option<String>,
    pub event_description: Option<String>,
    pub guest_count: Option<i32>,
    pub budget: Option<BigDecimal>,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    pub fn can_be_cancelled(&self) -> bool {
        self.status.can_be_cancelled()
    }

    /// A confirmed booking can be completed once its event date has passed.
    pub fn can_be_completed(&self, now: jiff::Timestamp) -> bool {
        self.status == BookingStatus::Confirmed && self.event_date.to_jiff() < now
    }

    /// Completed bookings accept exactly one review.
    pub fn can_be_reviewed(&self, has_review: bool) -> bool {
        self.status == BookingStatus::Completed && !has_review
    }

    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }
}

/// Insert model. New bookings always start as `PENDING`.
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::bookings)]
pub struct NewBooking {
    pub user_id: i32,
    pub vendor_id: i32,
    pub event_date: Timestamp,
    pub event_location: Option<String>,
    pub event_type: Option<String>,
    pub event_description: Option<String>,
    pub guest_count: Option<i32>,
    pub budget: Option<BigDecimal>,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;
    use jiff_diesel::ToDiesel;

    fn booking(status: BookingStatus, event_date: jiff::Timestamp) -> Booking {
        let now = jiff::Timestamp::now().to_diesel();
        Booking {
            id: 1,
            user_id: 10,
            vendor_id: 20,
            event_date: event_date.to_diesel(),
            event_location: None,
            event_type: None,
            event_description: None,
            guest_count: Some(50),
            budget: None,
            special_requests: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_cancellable_states() {
        let cancellable: Vec<_> = BookingStatus::ALL
            .into_iter()
            .filter(BookingStatus::can_be_cancelled)
            .collect();
        assert_eq!(
            cancellable,
            vec![BookingStatus::Pending, BookingStatus::Confirmed]
        );
    }

    #[test]
    fn test_can_be_completed_requires_confirmed_and_past_event() {
        let now = jiff::Timestamp::now();
        let yesterday = now - SignedDuration::from_hours(24);
        let tomorrow = now + SignedDuration::from_hours(24);

        assert!(booking(BookingStatus::Confirmed, yesterday).can_be_completed(now));
        assert!(!booking(BookingStatus::Confirmed, tomorrow).can_be_completed(now));
        assert!(!booking(BookingStatus::Pending, yesterday).can_be_completed(now));
        assert!(!booking(BookingStatus::Completed, yesterday).can_be_completed(now));
    }

    #[test]
    fn test_can_be_reviewed_only_once_after_completion() {
        let past = jiff::Timestamp::now() - SignedDuration::from_hours(48);
        assert!(booking(BookingStatus::Completed, past).can_be_reviewed(false));
        assert!(!booking(BookingStatus::Completed, past).can_be_reviewed(true));
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Refunded,
        ] {
            assert!(!booking(status, past).can_be_reviewed(false), "{status}");
        }
    }

    #[test]
    fn test_status_parse_and_serde() {
        assert_eq!(
            "completed".parse::<BookingStatus>().unwrap(),
            BookingStatus::Completed
        );
        assert!("DONE".parse::<BookingStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&BookingStatus::Refunded).unwrap(),
            "\"REFUNDED\""
        );
        assert_eq!(BookingStatus::default(), BookingStatus::Pending);
    }

    #[test]
    fn test_status_binds_to_enum_column() {
        use crate::schema::bookings;

        let query = bookings::table
            .filter(bookings::status.eq(BookingStatus::Completed))
            .select(bookings::id);
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&query).to_string();
        assert!(sql.contains("\"bookings\".\"status\" = $1"), "{sql}");
        assert!(sql.contains("Completed"), "{sql}");
    }
}
