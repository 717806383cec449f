//! Reviews and the vendor rating they feed.
//!
//! Every write goes through the review repository, which recomputes the
//! vendor's aggregate inside the same transaction.

use std::collections::HashMap;

use jiff::Timestamp;
use jiff_diesel::ToDiesel;

use crate::api::dto::{CreateReviewRequest, PagedResponse, PaginationParams, UpdateReviewRequest};
use crate::error::{AppError, AppResult};
use crate::models::{
    Booking, BookingStatus, MAX_RATING, MIN_RATING, NewReview, RatingDistribution, RatingSummary,
    Review, ReviewChangeset, User, Vendor,
};
use crate::repositories::{BookingRepository, ReviewRepository, UserRepository, VendorRepository};

/// A review with its author and the reviewed vendor.
#[derive(Debug, Clone)]
pub struct ReviewDetails {
    pub review: Review,
    pub reviewer: Option<User>,
    pub vendor: Option<Vendor>,
}

/// Aggregate and per-star breakdown for one vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewStats {
    pub summary: RatingSummary,
    pub distribution: RatingDistribution,
}

impl ReviewStats {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        Self {
            summary: RatingSummary::from_ratings(ratings),
            distribution: RatingDistribution::from_ratings(ratings),
        }
    }
}

/// Rules for leaving a review, checked in order.
fn ensure_reviewable(booking: &Booking, user_id: i32, has_review: bool) -> AppResult<()> {
    if !booking.is_owned_by(user_id) {
        return Err(AppError::bad_request("You can only review your own bookings"));
    }
    if booking.status != BookingStatus::Completed {
        return Err(AppError::bad_request("You can only review completed bookings"));
    }
    if has_review {
        return Err(AppError::bad_request("Review already exists for this booking"));
    }
    Ok(())
}

fn ensure_editable(review: &Review, now: Timestamp) -> AppResult<()> {
    if !review.is_editable(now) {
        return Err(AppError::bad_request(
            "Review can only be edited within 7 days of creation",
        ));
    }
    Ok(())
}

fn ensure_rating(rating: i32) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::bad_request("Rating must be between 1 and 5"));
    }
    Ok(())
}

fn duplicate_review(err: AppError) -> AppError {
    if err.is_duplicate_of("reviews", "booking_id") {
        AppError::bad_request("Review already exists for this booking")
    } else {
        err
    }
}

fn normalized_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[derive(Clone)]
pub struct ReviewService {
    users: UserRepository,
    vendors: VendorRepository,
    bookings: BookingRepository,
    reviews: ReviewRepository,
}

impl ReviewService {
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

    /// Reviews a completed booking owned by `user_id`.
    pub async fn create_review(
        &self,
        user_id: i32,
        request: CreateReviewRequest,
    ) -> AppResult<ReviewDetails> {
        ensure_rating(request.rating)?;
        let booking = self
            .bookings
            .find_by_id(request.booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking", "id", request.booking_id))?;
        let has_review = self.reviews.exists_for_booking(booking.id).await?;
        ensure_reviewable(&booking, user_id, has_review)?;

        let now = Timestamp::now().to_diesel();
        let new_review = NewReview {
            user_id,
            vendor_id: booking.vendor_id,
            booking_id: booking.id,
            rating: request.rating,
            comment: normalized_comment(request.comment),
            created_at: now,
            updated_at: now,
        };
        let (review, summary) = self
            .reviews
            .create(new_review)
            .await
            .map_err(duplicate_review)?;

        tracing::info!(
            review_id = review.id,
            booking_id = review.booking_id,
            vendor_id = review.vendor_id,
            rating = review.rating,
            average_rating = %summary.average_rating,
            total_reviews = summary.total_reviews,
            "Review created"
        );
        self.details(review).await
    }

    /// Changes rating and comment while the edit window is open.
    pub async fn update_review(
        &self,
        review_id: i32,
        request: UpdateReviewRequest,
    ) -> AppResult<ReviewDetails> {
        ensure_rating(request.rating)?;
        let current = self.find_review(review_id).await?;
        let now = Timestamp::now();
        ensure_editable(&current, now)?;

        let changes = ReviewChangeset {
            rating: request.rating,
            comment: normalized_comment(request.comment),
            updated_at: now.to_diesel(),
        };
        let (review, summary) = self.reviews.update(review_id, changes).await?;

        match summary {
            Some(summary) => tracing::info!(
                review_id,
                vendor_id = review.vendor_id,
                rating = review.rating,
                average_rating = %summary.average_rating,
                "Review updated, vendor rating recomputed"
            ),
            None => tracing::info!(review_id, "Review comment updated"),
        }
        self.details(review).await
    }

    pub async fn delete_review(&self, review_id: i32) -> AppResult<RatingSummary> {
        let summary = self.reviews.delete(review_id).await?;
        tracing::info!(
            review_id,
            average_rating = %summary.average_rating,
            total_reviews = summary.total_reviews,
            "Review deleted"
        );
        Ok(summary)
    }

    /// Bare review row, or `NotFound`.
    pub async fn find_review(&self, review_id: i32) -> AppResult<Review> {
        self.reviews
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::not_found("Review", "id", review_id))
    }

    pub async fn get_review(&self, review_id: i32) -> AppResult<ReviewDetails> {
        let review = self.find_review(review_id).await?;
        self.details(review).await
    }

    pub async fn get_vendor_reviews(&self, vendor_id: i32) -> AppResult<Vec<ReviewDetails>> {
        let reviews = self.reviews.find_by_vendor(vendor_id).await?;
        self.details_for(reviews).await
    }

    pub async fn get_vendor_reviews_paginated(
        &self,
        vendor_id: i32,
        pagination: &PaginationParams,
    ) -> AppResult<PagedResponse<ReviewDetails>> {
        let (reviews, total) = self
            .reviews
            .find_by_vendor_paginated(vendor_id, pagination.offset(), pagination.limit())
            .await?;
        let details = self.details_for(reviews).await?;
        Ok(PagedResponse::new(
            details,
            pagination,
            u64::try_from(total).unwrap_or(0),
        ))
    }

    pub async fn get_user_reviews(&self, user_id: i32) -> AppResult<Vec<ReviewDetails>> {
        let reviews = self.reviews.find_by_user(user_id).await?;
        self.details_for(reviews).await
    }

    pub async fn get_review_by_booking(&self, booking_id: i32) -> AppResult<ReviewDetails> {
        let review = self
            .reviews
            .find_by_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Review", "booking_id", booking_id))?;
        self.details(review).await
    }

    pub async fn get_vendor_reviews_by_rating(
        &self,
        vendor_id: i32,
        rating: i32,
    ) -> AppResult<Vec<ReviewDetails>> {
        ensure_rating(rating)?;
        let reviews = self.reviews.find_by_vendor_and_rating(vendor_id, rating).await?;
        self.details_for(reviews).await
    }

    pub async fn get_high_rated_vendor_reviews(
        &self,
        vendor_id: i32,
        min_rating: i32,
    ) -> AppResult<Vec<ReviewDetails>> {
        ensure_rating(min_rating)?;
        let reviews = self.reviews.find_high_rated(vendor_id, min_rating).await?;
        self.details_for(reviews).await
    }

    pub async fn get_recent_reviews_with_comments(
        &self,
        limit: i64,
    ) -> AppResult<Vec<ReviewDetails>> {
        let reviews = self.reviews.find_recent_with_comments(limit).await?;
        self.details_for(reviews).await
    }

    /// Computed from the current ratings rather than the stored aggregate.
    pub async fn get_vendor_review_stats(&self, vendor_id: i32) -> AppResult<ReviewStats> {
        let ratings = self.reviews.ratings_for_vendor(vendor_id).await?;
        Ok(ReviewStats::from_ratings(&ratings))
    }

    /// True iff the booking exists, belongs to the user, is completed and
    /// has not been reviewed yet.
    pub async fn can_user_review_booking(&self, user_id: i32, booking_id: i32) -> AppResult<bool> {
        let Some(booking) = self.bookings.find_by_id(booking_id).await? else {
            return Ok(false);
        };
        if !booking.is_owned_by(user_id) {
            return Ok(false);
        }
        let has_review = self.reviews.exists_for_booking(booking_id).await?;
        Ok(booking.can_be_reviewed(has_review))
    }

    async fn details(&self, review: Review) -> AppResult<ReviewDetails> {
        let reviewer = self.users.find_by_id(review.user_id).await?;
        let vendor = self.vendors.find_by_id(review.vendor_id).await?;
        Ok(ReviewDetails {
            review,
            reviewer,
            vendor,
        })
    }

    async fn details_for(&self, reviews: Vec<Review>) -> AppResult<Vec<ReviewDetails>> {
        if reviews.is_empty() {
            return Ok(Vec::new());
        }
        let user_ids: Vec<i32> = reviews.iter().map(|r| r.user_id).collect();
        let vendor_ids: Vec<i32> = reviews.iter().map(|r| r.vendor_id).collect();

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

        Ok(reviews
            .into_iter()
            .map(|review| ReviewDetails {
                reviewer: users.get(&review.user_id).cloned(),
                vendor: vendors.get(&review.vendor_id).cloned(),
                review,
            })
            .collect())
    }
}
