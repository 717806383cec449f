//! Booking repository for async database operations.

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff_diesel::ToDiesel;

use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::models::{Booking, BookingStatus, NewBooking};
use crate::schema::bookings;

/// Which bookings a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    /// No restriction. Admin listings.
    All,
    /// Bookings the user made, plus those made with their vendor profile.
    Party {
        user_id: i32,
        vendor_id: Option<i32>,
    },
}

fn scoped(scope: BookingScope) -> bookings::BoxedQuery<'static, Pg> {
    let query = bookings::table.into_boxed();
    match scope {
        BookingScope::All => query,
        BookingScope::Party {
            user_id,
            vendor_id: Some(vendor_id),
        } => query.filter(
            bookings::user_id
                .eq(user_id)
                .or(bookings::vendor_id.eq(vendor_id)),
        ),
        BookingScope::Party {
            user_id,
            vendor_id: None,
        } => query.filter(bookings::user_id.eq(user_id)),
    }
}

fn upcoming_bookings(
    scope: BookingScope,
    now: jiff::Timestamp,
) -> bookings::BoxedQuery<'static, Pg> {
    scoped(scope)
        .filter(bookings::event_date.gt(now.to_diesel()))
        .order((bookings::event_date.asc(), bookings::id.asc()))
}

fn past_bookings(scope: BookingScope, now: jiff::Timestamp) -> bookings::BoxedQuery<'static, Pg> {
    scoped(scope)
        .filter(bookings::event_date.lt(now.to_diesel()))
        .order((bookings::event_date.desc(), bookings::id.desc()))
}

fn bookings_between(
    scope: BookingScope,
    start: jiff::Timestamp,
    end: jiff::Timestamp,
) -> bookings::BoxedQuery<'static, Pg> {
    scoped(scope)
        .filter(bookings::event_date.between(start.to_diesel(), end.to_diesel()))
        .order((bookings::event_date.asc(), bookings::id.asc()))
}

#[derive(Clone)]
pub struct BookingRepository {
    pool: AsyncDbPool,
}

impl BookingRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_booking: NewBooking) -> AppResult<Booking> {
        let mut conn = self.pool.get().await?;

        Ok(diesel::insert_into(bookings::table)
            .values(&new_booking)
            .returning(Booking::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    pub async fn find_by_id(&self, booking_id: i32) -> AppResult<Option<Booking>> {
        let mut conn = self.pool.get().await?;

        Ok(bookings::table
            .find(booking_id)
            .select(Booking::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    /// A user's bookings, newest first, optionally narrowed to one status.
    pub async fn find_by_user(
        &self,
        user_id: i32,
        status: Option<BookingStatus>,
    ) -> AppResult<Vec<Booking>> {
        let mut conn = self.pool.get().await?;

        let mut query = bookings::table
            .filter(bookings::user_id.eq(user_id))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(bookings::status.eq(status));
        }

        Ok(query
            .order((bookings::created_at.desc(), bookings::id.desc()))
            .select(Booking::as_select())
            .load(&mut conn)
            .await?)
    }

    /// A vendor's bookings, newest first, optionally narrowed to one status.
    pub async fn find_by_vendor(
        &self,
        vendor_id: i32,
        status: Option<BookingStatus>,
    ) -> AppResult<Vec<Booking>> {
        let mut conn = self.pool.get().await?;

        let mut query = bookings::table
            .filter(bookings::vendor_id.eq(vendor_id))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(bookings::status.eq(status));
        }

        Ok(query
            .order((bookings::created_at.desc(), bookings::id.desc()))
            .select(Booking::as_select())
            .load(&mut conn)
            .await?)
    }

    /// Overwrites the status without checking the current one.
    pub async fn update_status(&self, booking_id: i32, status: BookingStatus) -> AppResult<Booking> {
        let mut conn = self.pool.get().await?;

        Ok(diesel::update(bookings::table.find(booking_id))
            .set((
                bookings::status.eq(status),
                bookings::updated_at.eq(jiff::Timestamp::now().to_diesel()),
            ))
            .returning(Booking::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    /// Bookings in `scope` with `event_date > now`, soonest first.
    pub async fn find_upcoming(
        &self,
        scope: BookingScope,
        now: jiff::Timestamp,
    ) -> AppResult<Vec<Booking>> {
        let mut conn = self.pool.get().await?;

        Ok(upcoming_bookings(scope, now)
            .select(Booking::as_select())
            .load(&mut conn)
            .await?)
    }

    /// Bookings in `scope` with `event_date < now`, most recent first.
    pub async fn find_past(
        &self,
        scope: BookingScope,
        now: jiff::Timestamp,
    ) -> AppResult<Vec<Booking>> {
        let mut conn = self.pool.get().await?;

        Ok(past_bookings(scope, now)
            .select(Booking::as_select())
            .load(&mut conn)
            .await?)
    }

    /// Bookings in `scope` with `start <= event_date <= end`, soonest first.
    pub async fn find_between(
        &self,
        scope: BookingScope,
        start: jiff::Timestamp,
        end: jiff::Timestamp,
    ) -> AppResult<Vec<Booking>> {
        let mut conn = self.pool.get().await?;

        Ok(bookings_between(scope, start, end)
            .select(Booking::as_select())
            .load(&mut conn)
            .await?)
    }

    pub async fn count_by_user(&self, user_id: i32, status: Option<BookingStatus>) -> AppResult<i64> {
        let mut conn = self.pool.get().await?;

        let mut query = bookings::table
            .filter(bookings::user_id.eq(user_id))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(bookings::status.eq(status));
        }

        Ok(query.count().get_result(&mut conn).await?)
    }

    pub async fn count_by_vendor(
        &self,
        vendor_id: i32,
        status: Option<BookingStatus>,
    ) -> AppResult<i64> {
        let mut conn = self.pool.get().await?;

        let mut query = bookings::table
            .filter(bookings::vendor_id.eq(vendor_id))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(bookings::status.eq(status));
        }

        Ok(query.count().get_result(&mut conn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> jiff::Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn test_party_scope_covers_customer_and_vendor_side() {
        let scope = BookingScope::Party {
            user_id: 7,
            vendor_id: Some(3),
        };
        let sql =
            diesel::debug_query::<Pg, _>(&upcoming_bookings(scope, ts("2026-01-01T00:00:00Z")))
                .to_string();

        assert!(sql.contains("(\"bookings\".\"user_id\" = $1 OR \"bookings\".\"vendor_id\" = $2)"));
        assert!(sql.contains("\"bookings\".\"event_date\" > $3"));
        assert!(sql.contains("ORDER BY \"bookings\".\"event_date\" ASC"));
    }

    #[test]
    fn test_customer_scope_without_vendor_profile() {
        let scope = BookingScope::Party {
            user_id: 7,
            vendor_id: None,
        };
        let sql = diesel::debug_query::<Pg, _>(&past_bookings(scope, ts("2026-01-01T00:00:00Z")))
            .to_string();

        assert!(sql.contains("\"bookings\".\"user_id\" = $1"));
        assert!(!sql.contains("\"vendor_id\" ="));
        assert!(sql.contains("ORDER BY \"bookings\".\"event_date\" DESC"));
    }

    #[test]
    fn test_admin_scope_is_unrestricted() {
        let sql = diesel::debug_query::<Pg, _>(&bookings_between(
            BookingScope::All,
            ts("2026-01-01T00:00:00Z"),
            ts("2026-02-01T00:00:00Z"),
        ))
        .to_string();

        assert!(!sql.contains("\"user_id\" ="));
        assert!(!sql.contains("\"vendor_id\" ="));
        assert!(sql.contains("\"bookings\".\"event_date\" BETWEEN $1 AND $2"));
    }
}
