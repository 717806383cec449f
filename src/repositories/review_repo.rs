//! Review repository.
//!
//! Every write runs in a transaction that first locks the reviewed vendor's
//! row and finishes by recomputing that vendor's rating from all of its
//! reviews. Concurrent writes for one vendor therefore serialize on the lock
//! and the stored aggregate always matches the committed review set.

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use jiff_diesel::ToDiesel;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewReview, RatingSummary, Review, ReviewChangeset};
use crate::schema::{reviews, vendors};

/// A write to the reviews of one vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RatingWrite {
    Created,
    Updated { before: i32, after: i32 },
    Deleted,
}

impl RatingWrite {
    /// Whether the vendor aggregate must be recomputed after this write.
    fn moves_aggregate(self) -> bool {
        match self {
            RatingWrite::Created | RatingWrite::Deleted => true,
            RatingWrite::Updated { before, after } => before != after,
        }
    }
}

/// Recomputes the aggregate when `write` changed it.
async fn refresh_after(
    conn: &mut AsyncPgConnection,
    vendor_id: i32,
    write: RatingWrite,
) -> AppResult<Option<RatingSummary>> {
    if !write.moves_aggregate() {
        return Ok(None);
    }
    refresh_vendor_rating(conn, vendor_id).await.map(Some)
}

fn not_recomputed() -> AppError {
    AppError::Internal {
        source: anyhow::anyhow!("vendor rating was not recomputed"),
    }
}

/// Takes the row lock that serializes rating updates for `vendor_id`.
async fn lock_vendor(conn: &mut AsyncPgConnection, vendor_id: i32) -> AppResult<()> {
    vendors::table
        .find(vendor_id)
        .select(vendors::id)
        .for_update()
        .first::<i32>(conn)
        .await
        .optional()?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Vendor", "id", vendor_id))
}

/// Recomputes and stores the vendor's average rating and review count.
async fn refresh_vendor_rating(
    conn: &mut AsyncPgConnection,
    vendor_id: i32,
) -> AppResult<RatingSummary> {
    let ratings: Vec<i32> = reviews::table
        .filter(reviews::vendor_id.eq(vendor_id))
        .select(reviews::rating)
        .load(conn)
        .await?;
    let summary = RatingSummary::from_ratings(&ratings);

    diesel::update(vendors::table.find(vendor_id))
        .set((
            vendors::average_rating.eq(&summary.average_rating),
            vendors::total_reviews.eq(summary.total_reviews),
            vendors::updated_at.eq(jiff::Timestamp::now().to_diesel()),
        ))
        .execute(conn)
        .await?;

    tracing::debug!(
        vendor_id,
        average_rating = %summary.average_rating,
        total_reviews = summary.total_reviews,
        "Vendor rating recomputed"
    );
    Ok(summary)
}

#[derive(Clone)]
pub struct ReviewRepository {
    pool: AsyncDbPool,
}

impl ReviewRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Inserts the review and refreshes the vendor aggregate in one transaction.
    pub async fn create(&self, new_review: NewReview) -> AppResult<(Review, RatingSummary)> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                lock_vendor(conn, new_review.vendor_id).await?;

                let review = diesel::insert_into(reviews::table)
                    .values(&new_review)
                    .returning(Review::as_returning())
                    .get_result(conn)
                    .await?;

                let summary = refresh_after(conn, review.vendor_id, RatingWrite::Created)
                    .await?
                    .ok_or_else(not_recomputed)?;
                Ok((review, summary))
            }
            .scope_boxed()
        })
        .await
    }

    /// Applies `changes`; the aggregate is only recomputed when the rating moved.
    pub async fn update(
        &self,
        review_id: i32,
        changes: ReviewChangeset,
    ) -> AppResult<(Review, Option<RatingSummary>)> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let current = reviews::table
                    .find(review_id)
                    .select(Review::as_select())
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("Review", "id", review_id))?;

                lock_vendor(conn, current.vendor_id).await?;

                let updated = diesel::update(reviews::table.find(review_id))
                    .set(&changes)
                    .returning(Review::as_returning())
                    .get_result(conn)
                    .await?;

                let write = RatingWrite::Updated {
                    before: current.rating,
                    after: updated.rating,
                };
                let summary = refresh_after(conn, updated.vendor_id, write).await?;
                Ok((updated, summary))
            }
            .scope_boxed()
        })
        .await
    }

    /// Deletes the review and refreshes the vendor aggregate.
    pub async fn delete(&self, review_id: i32) -> AppResult<RatingSummary> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let vendor_id = reviews::table
                    .find(review_id)
                    .select(reviews::vendor_id)
                    .first::<i32>(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("Review", "id", review_id))?;

                lock_vendor(conn, vendor_id).await?;

                diesel::delete(reviews::table.find(review_id))
                    .execute(conn)
                    .await?;

                refresh_after(conn, vendor_id, RatingWrite::Deleted)
                    .await?
                    .ok_or_else(not_recomputed)
            }
            .scope_boxed()
        })
        .await
    }

    pub async fn find_by_id(&self, review_id: i32) -> AppResult<Option<Review>> {
        let mut conn = self.pool.get().await?;

        Ok(reviews::table
            .find(review_id)
            .select(Review::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    pub async fn find_by_booking(&self, booking_id: i32) -> AppResult<Option<Review>> {
        let mut conn = self.pool.get().await?;

        Ok(reviews::table
            .filter(reviews::booking_id.eq(booking_id))
            .select(Review::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    pub async fn exists_for_booking(&self, booking_id: i32) -> AppResult<bool> {
        let mut conn = self.pool.get().await?;

        Ok(diesel::select(diesel::dsl::exists(
            reviews::table.filter(reviews::booking_id.eq(booking_id)),
        ))
        .get_result(&mut conn)
        .await?)
    }

    /// Reviews for the given bookings, used to decorate booking listings.
    pub async fn find_by_bookings(&self, booking_ids: &[i32]) -> AppResult<Vec<Review>> {
        if booking_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        Ok(reviews::table
            .filter(reviews::booking_id.eq_any(booking_ids))
            .select(Review::as_select())
            .load(&mut conn)
            .await?)
    }

    pub async fn find_by_vendor(&self, vendor_id: i32) -> AppResult<Vec<Review>> {
        let mut conn = self.pool.get().await?;

        Ok(reviews::table
            .filter(reviews::vendor_id.eq(vendor_id))
            .order((reviews::created_at.desc(), reviews::id.desc()))
            .select(Review::as_select())
            .load(&mut conn)
            .await?)
    }

    /// # Returns
    /// Tuple of (reviews on the page, total count for the vendor)
    pub async fn find_by_vendor_paginated(
        &self,
        vendor_id: i32,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Review>, i64)> {
        let mut conn = self.pool.get().await?;

        let items = reviews::table
            .filter(reviews::vendor_id.eq(vendor_id))
            .order((reviews::created_at.desc(), reviews::id.desc()))
            .offset(offset)
            .limit(limit)
            .select(Review::as_select())
            .load(&mut conn)
            .await?;

        let total = reviews::table
            .filter(reviews::vendor_id.eq(vendor_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok((items, total))
    }

    pub async fn find_by_user(&self, user_id: i32) -> AppResult<Vec<Review>> {
        let mut conn = self.pool.get().await?;

        Ok(reviews::table
            .filter(reviews::user_id.eq(user_id))
            .order((reviews::created_at.desc(), reviews::id.desc()))
            .select(Review::as_select())
            .load(&mut conn)
            .await?)
    }

    pub async fn find_by_vendor_and_rating(
        &self,
        vendor_id: i32,
        rating: i32,
    ) -> AppResult<Vec<Review>> {
        let mut conn = self.pool.get().await?;

        Ok(reviews::table
            .filter(reviews::vendor_id.eq(vendor_id))
            .filter(reviews::rating.eq(rating))
            .order(reviews::created_at.desc())
            .select(Review::as_select())
            .load(&mut conn)
            .await?)
    }

    pub async fn find_high_rated(&self, vendor_id: i32, min_rating: i32) -> AppResult<Vec<Review>> {
        let mut conn = self.pool.get().await?;

        Ok(reviews::table
            .filter(reviews::vendor_id.eq(vendor_id))
            .filter(reviews::rating.ge(min_rating))
            .order(reviews::created_at.desc())
            .select(Review::as_select())
            .load(&mut conn)
            .await?)
    }

    /// Newest reviews that carry a non-empty comment.
    pub async fn find_recent_with_comments(&self, limit: i64) -> AppResult<Vec<Review>> {
        let mut conn = self.pool.get().await?;

        Ok(reviews::table
            .filter(reviews::comment.is_not_null())
            .filter(reviews::comment.ne(""))
            .order(reviews::created_at.desc())
            .limit(limit)
            .select(Review::as_select())
            .load(&mut conn)
            .await?)
    }

    pub async fn ratings_for_vendor(&self, vendor_id: i32) -> AppResult<Vec<i32>> {
        let mut conn = self.pool.get().await?;

        Ok(reviews::table
            .filter(reviews::vendor_id.eq(vendor_id))
            .select(reviews::rating)
            .load(&mut conn)
            .await?)
    }
}
