//! Booking lifecycle and queries.

use std::collections::HashMap;

use jiff::Timestamp;
use jiff_diesel::ToDiesel;

use crate::api::dto::{BookingStatsResponse, CreateBookingRequest};
use crate::error::{AppError, AppResult};
use crate::models::{Booking, BookingStatus, NewBooking, Review, User, Vendor};
use crate::repositories::{
    BookingRepository, BookingScope, ReviewRepository, UserRepository, VendorRepository,
};

/// A booking with the customer, vendor and review it refers to.
#[derive(Debug, Clone)]
pub struct BookingDetails {
    pub booking: Booking,
    pub customer: Option<User>,
    pub vendor: Option<Vendor>,
    pub review: Option<Review>,
}

fn ensure_future_event(event_date: Timestamp, now: Timestamp) -> AppResult<()> {
    if event_date <= now {
        return Err(AppError::bad_request("Event date must be in the future"));
    }
    Ok(())
}

fn ensure_ordered_range(start: Timestamp, end: Timestamp) -> AppResult<()> {
    if start > end {
        return Err(AppError::bad_request("Start date must not be after end date"));
    }
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct BookingService {
    users: UserRepository,
    vendors: VendorRepository,
    bookings: BookingRepository,
    reviews: ReviewRepository,
}

impl BookingService {
    pub fn new(
        users: UserRepository,
        vendors: VendorRepository,
        bookings: BookingRepository,
        reviews: ReviewRepository,
    ) -> Self {
        Self {
            users,
            vendors,
            bookings,
            reviews,
        }
    }

    /// Places a `PENDING` booking for `user_id`.
    pub async fn create_booking(
        &self,
        user_id: i32,
        request: CreateBookingRequest,
    ) -> AppResult<BookingDetails> {
        let customer = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", "id", user_id))?;
        let vendor = self
            .vendors
            .find_by_id(request.vendor_id)
            .await?
            .ok_or_else(|| AppError::not_found("Vendor", "id", request.vendor_id))?;

        let now = Timestamp::now();
        ensure_future_event(request.event_date, now)?;

        let new_booking = NewBooking {
            user_id,
            vendor_id: vendor.id,
            event_date: request.event_date.to_diesel(),
            event_location: trimmed(request.event_location),
            event_type: trimmed(request.event_type),
            event_description: trimmed(request.event_description),
            guest_count: request.guest_count,
            budget: request.budget,
            special_requests: trimmed(request.special_requests),
            status: BookingStatus::Pending,
            created_at: now.to_diesel(),
            updated_at: now.to_diesel(),
        };
        let booking = self.bookings.create(new_booking).await?;

        tracing::info!(
            booking_id = booking.id,
            user_id,
            vendor_id = vendor.id,
            event_date = %request.event_date,
            "Booking created"
        );
        Ok(BookingDetails {
            booking,
            customer: Some(customer),
            vendor: Some(vendor),
            review: None,
        })
    }

    /// Overwrites the status. Transitions are not checked here.
    pub async fn update_status(
        &self,
        booking_id: i32,
        status: BookingStatus,
    ) -> AppResult<BookingDetails> {
        let previous = self.find_booking(booking_id).await?.status;
        let booking = self.bookings.update_status(booking_id, status).await?;

        tracing::info!(
            booking_id,
            from = %previous,
            to = %status,
            "Booking status updated"
        );
        self.details(booking).await
    }

    pub async fn confirm_booking(&self, booking_id: i32) -> AppResult<BookingDetails> {
        self.update_status(booking_id, BookingStatus::Confirmed).await
    }

    pub async fn complete_booking(&self, booking_id: i32) -> AppResult<BookingDetails> {
        self.update_status(booking_id, BookingStatus::Completed).await
    }

    pub async fn cancel_booking(&self, booking_id: i32) -> AppResult<BookingDetails> {
        self.update_status(booking_id, BookingStatus::Cancelled).await
    }

    /// Bare booking row, or `NotFound`.
    pub async fn find_booking(&self, booking_id: i32) -> AppResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking", "id", booking_id))
    }

    pub async fn get_booking(&self, booking_id: i32) -> AppResult<BookingDetails> {
        let booking = self.find_booking(booking_id).await?;
        self.details(booking).await
    }

    pub async fn get_user_bookings(
        &self,
        user_id: i32,
        status: Option<BookingStatus>,
    ) -> AppResult<Vec<BookingDetails>> {
        let bookings = self.bookings.find_by_user(user_id, status).await?;
        self.details_for(bookings).await
    }

    pub async fn get_vendor_bookings(
        &self,
        vendor_id: i32,
        status: Option<BookingStatus>,
    ) -> AppResult<Vec<BookingDetails>> {
        let bookings = self.bookings.find_by_vendor(vendor_id, status).await?;
        self.details_for(bookings).await
    }

    pub async fn get_upcoming_bookings(
        &self,
        scope: BookingScope,
    ) -> AppResult<Vec<BookingDetails>> {
        let bookings = self.bookings.find_upcoming(scope, Timestamp::now()).await?;
        self.details_for(bookings).await
    }

    pub async fn get_past_bookings(&self, scope: BookingScope) -> AppResult<Vec<BookingDetails>> {
        let bookings = self.bookings.find_past(scope, Timestamp::now()).await?;
        self.details_for(bookings).await
    }

    /// Bookings in `scope` whose event falls in `[start, end]`.
    pub async fn get_bookings_between(
        &self,
        scope: BookingScope,
        start: Timestamp,
        end: Timestamp,
    ) -> AppResult<Vec<BookingDetails>> {
        ensure_ordered_range(start, end)?;
        let bookings = self.bookings.find_between(scope, start, end).await?;
        self.details_for(bookings).await
    }

    pub async fn count_user_bookings(
        &self,
        user_id: i32,
        status: Option<BookingStatus>,
    ) -> AppResult<i64> {
        self.bookings.count_by_user(user_id, status).await
    }

    pub async fn count_vendor_bookings(
        &self,
        vendor_id: i32,
        status: Option<BookingStatus>,
    ) -> AppResult<i64> {
        self.bookings.count_by_vendor(vendor_id, status).await
    }

    pub async fn user_booking_stats(&self, user_id: i32) -> AppResult<BookingStatsResponse> {
        Ok(BookingStatsResponse {
            total_bookings: self.count_user_bookings(user_id, None).await?,
            pending_bookings: self
                .count_user_bookings(user_id, Some(BookingStatus::Pending))
                .await?,
            confirmed_bookings: self
                .count_user_bookings(user_id, Some(BookingStatus::Confirmed))
                .await?,
            completed_bookings: self
                .count_user_bookings(user_id, Some(BookingStatus::Completed))
                .await?,
            cancelled_bookings: self
                .count_user_bookings(user_id, Some(BookingStatus::Cancelled))
                .await?,
        })
    }

    pub async fn vendor_booking_stats(&self, vendor_id: i32) -> AppResult<BookingStatsResponse> {
        Ok(BookingStatsResponse {
            total_bookings: self.count_vendor_bookings(vendor_id, None).await?,
            pending_bookings: self
                .count_vendor_bookings(vendor_id, Some(BookingStatus::Pending))
                .await?,
            confirmed_bookings: self
                .count_vendor_bookings(vendor_id, Some(BookingStatus::Confirmed))
                .await?,
            completed_bookings: self
                .count_vendor_bookings(vendor_id, Some(BookingStatus::Completed))
                .await?,
            cancelled_bookings: self
                .count_vendor_bookings(vendor_id, Some(BookingStatus::Cancelled))
                .await?,
        })
    }

    async fn details(&self, booking: Booking) -> AppResult<BookingDetails> {
        let customer = self.users.find_by_id(booking.user_id).await?;
        let vendor = self.vendors.find_by_id(booking.vendor_id).await?;
        let review = self.reviews.find_by_booking(booking.id).await?;
        Ok(BookingDetails {
            booking,
            customer,
            vendor,
            review,
        })
    }

    /// Decorates a listing with three batch lookups instead of one per row.
    async fn details_for(&self, bookings: Vec<Booking>) -> AppResult<Vec<BookingDetails>> {
        if bookings.is_empty() {
            return Ok(Vec::new());
        }
        let user_ids: Vec<i32> = bookings.iter().map(|b| b.user_id).collect();
        let vendor_ids: Vec<i32> = bookings.iter().map(|b| b.vendor_id).collect();
        let booking_ids: Vec<i32> = bookings.iter().map(|b| b.id).collect();

        let users: HashMap<i32, User> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let vendors: HashMap<i32, Vendor> = self
            .vendors
            .find_by_ids(&vendor_ids)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();
        let mut reviews: HashMap<i32, Review> = self
            .reviews
            .find_by_bookings(&booking_ids)
            .await?
            .into_iter()
            .map(|r| (r.booking_id, r))
            .collect();

        Ok(bookings
            .into_iter()
            .map(|booking| BookingDetails {
                customer: users.get(&booking.user_id).cloned(),
                vendor: vendors.get(&booking.vendor_id).cloned(),
                review: reviews.remove(&booking.id),
                booking,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;

    #[test]
    fn test_event_date_must_be_after_now() {
        let now = Timestamp::now();
        let err = ensure_future_event(now, now).unwrap_err();
        assert_eq!(err.to_string(), "Event date must be in the future");
        assert!(ensure_future_event(now - SignedDuration::from_secs(1), now).is_err());
        assert!(ensure_future_event(now + SignedDuration::from_hours(24), now).is_ok());
    }

    #[test]
    fn test_date_range_must_be_ordered() {
        let start = Timestamp::now();
        let end = start + SignedDuration::from_hours(1);
        assert!(ensure_ordered_range(start, end).is_ok());
        assert!(ensure_ordered_range(start, start).is_ok());
        assert!(matches!(
            ensure_ordered_range(end, start),
            Err(AppError::BadRequest { .. })
        ));
    }

    #[test]
    fn test_blank_text_fields_are_dropped() {
        assert_eq!(trimmed(Some("  Wedding ".to_string())).as_deref(), Some("Wedding"));
        assert_eq!(trimmed(Some("   ".to_string())), None);
        assert_eq!(trimmed(None), None);
    }
}
