//! Booking DTOs.

use bigdecimal::BigDecimal;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::vendor::check_money;
use crate::models::{BookingStatus, VendorCategory};
use crate::services::BookingDetails;

fn valid_budget(value: &BigDecimal) -> Result<(), ValidationError> {
    check_money(value, "Budget")
}

/// Body for `POST /api/bookings`.
///
/// Whether `event_date` lies in the future is decided by the booking service.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateBookingRequest {
    pub vendor_id: i32,
    #[schema(value_type = String, format = DateTime, example = "2026-12-24T18:00:00Z")]
    pub event_date: Timestamp,
    #[validate(length(max = 255, message = "Event location must be at most 255 characters"))]
    pub event_location: Option<String>,
    #[validate(length(max = 100, message = "Event type must be at most 100 characters"))]
    #[schema(example = "Wedding")]
    pub event_type: Option<String>,
    pub event_description: Option<String>,
    #[validate(range(min = 1, message = "Guest count must be at least 1"))]
    pub guest_count: Option<i32>,
    #[validate(custom(function = "valid_budget"))]
    #[schema(value_type = Option<String>, example = "2500.00")]
    pub budget: Option<BigDecimal>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusQuery {
    /// Status code, case-insensitive (e.g. `pending`)
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DateRangeQuery {
    #[serde(alias = "startDate")]
    #[param(value_type = String, format = DateTime)]
    pub start_date: Timestamp,
    #[serde(alias = "endDate")]
    #[param(value_type = String, format = DateTime)]
    pub end_date: Timestamp,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: i32,
    #[schema(value_type = String, format = DateTime)]
    pub event_date: Timestamp,
    pub event_location: Option<String>,
    pub event_type: Option<String>,
    pub event_description: Option<String>,
    pub guest_count: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub budget: Option<BigDecimal>,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    #[schema(example = "Pending")]
    pub status_display_name: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,

    pub user_id: i32,
    pub user_full_name: Option<String>,
    pub user_email: Option<String>,

    pub vendor_id: i32,
    pub vendor_business_name: Option<String>,
    pub vendor_category: Option<VendorCategory>,
    pub vendor_profile_image: Option<String>,

    pub can_be_cancelled: bool,
    pub can_be_completed: bool,
    pub can_be_reviewed: bool,
    pub has_review: bool,
    pub review_rating: Option<i32>,
}

impl BookingResponse {
    /// Flattens a booking with its related rows; predicates are evaluated at `now`.
    pub fn from_details(details: BookingDetails, now: Timestamp) -> Self {
        let BookingDetails {
            booking,
            customer,
            vendor,
            review,
        } = details;
        let has_review = review.is_some();

        Self {
            can_be_cancelled: booking.can_be_cancelled(),
            can_be_completed: booking.can_be_completed(now),
            can_be_reviewed: booking.can_be_reviewed(has_review),
            has_review,
            review_rating: review.map(|r| r.rating),

            user_full_name: customer.as_ref().map(|u| u.full_name()),
            user_email: customer.map(|u| u.email),
            vendor_business_name: vendor.as_ref().map(|v| v.business_name.clone()),
            vendor_category: vendor.as_ref().map(|v| v.category),
            vendor_profile_image: vendor.and_then(|v| v.profile_image_url),

            id: booking.id,
            event_date: booking.event_date.to_jiff(),
            event_location: booking.event_location,
            event_type: booking.event_type,
            event_description: booking.event_description,
            guest_count: booking.guest_count,
            budget: booking.budget,
            special_requests: booking.special_requests,
            status_display_name: booking.status.display_name().to_string(),
            status: booking.status,
            created_at: booking.created_at.to_jiff(),
            updated_at: booking.updated_at.to_jiff(),
            user_id: booking.user_id,
            vendor_id: booking.vendor_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq, Default)]
pub struct BookingStatsResponse {
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub completed_bookings: i64,
    pub cancelled_bookings: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Booking, Review};
    use jiff::SignedDuration;
    use jiff_diesel::ToDiesel;

    fn booking(status: BookingStatus, event_date: Timestamp) -> Booking {
        let created = Timestamp::now().to_diesel();
        Booking {
            id: 5,
            user_id: 1,
            vendor_id: 2,
            event_date: event_date.to_diesel(),
            event_location: Some("Abuja".to_string()),
            event_type: Some("Birthday".to_string()),
            event_description: None,
            guest_count: Some(80),
            budget: None,
            special_requests: None,
            status,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_predicates_for_completed_booking_without_review() {
        let now = Timestamp::now();
        let details = BookingDetails {
            booking: booking(BookingStatus::Completed, now - SignedDuration::from_hours(2)),
            customer: None,
            vendor: None,
            review: None,
        };
        let response = BookingResponse::from_details(details, now);

        assert!(!response.can_be_cancelled);
        assert!(!response.can_be_completed);
        assert!(response.can_be_reviewed);
        assert!(!response.has_review);
        assert_eq!(response.review_rating, None);
        assert_eq!(response.status_display_name, "Completed");
    }

    #[test]
    fn test_existing_review_is_reported() {
        let now = Timestamp::now();
        let review = Review {
            id: 9,
            user_id: 1,
            vendor_id: 2,
            booking_id: 5,
            rating: 4,
            comment: None,
            created_at: now.to_diesel(),
            updated_at: now.to_diesel(),
        };
        let details = BookingDetails {
            booking: booking(BookingStatus::Completed, now - SignedDuration::from_hours(2)),
            customer: None,
            vendor: None,
            review: Some(review),
        };
        let response = BookingResponse::from_details(details, now);

        assert!(response.has_review);
        assert!(!response.can_be_reviewed);
        assert_eq!(response.review_rating, Some(4));
    }

    #[test]
    fn test_confirmed_past_booking_can_be_completed() {
        let now = Timestamp::now();
        let details = BookingDetails {
            booking: booking(BookingStatus::Confirmed, now - SignedDuration::from_hours(1)),
            customer: None,
            vendor: None,
            review: None,
        };
        let json = serde_json::to_value(BookingResponse::from_details(details, now)).unwrap();
        assert_eq!(json["can_be_completed"], true);
        assert_eq!(json["can_be_cancelled"], true);
        assert_eq!(json["status"], "CONFIRMED");
    }

    #[test]
    fn test_guest_count_must_be_positive() {
        let request: CreateBookingRequest = serde_json::from_str(
            r#"{"vendor_id": 2, "event_date": "2030-01-01T10:00:00Z", "guest_count": 0}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());

        let request: CreateBookingRequest = serde_json::from_str(
            r#"{"vendor_id": 2, "event_date": "2030-01-01T10:00:00Z", "guest_count": 1}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_long_location_and_huge_budget_fail_validation() {
        let request: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "vendor_id": 2,
            "event_date": "2030-01-01T10:00:00Z",
            "event_location": "x".repeat(300),
            "budget": "123456789012.00",
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("event_location"));
        assert!(fields.contains_key("budget"));

        let request: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "vendor_id": 2,
            "event_date": "2030-01-01T10:00:00Z",
            "event_location": "x".repeat(255),
            "budget": "99999999.99",
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }
}
