//! Reviews left against completed bookings.

use diesel::prelude::*;
use jiff::SignedDuration;
use jiff_diesel::Timestamp;

/// How long after creation a review may still be edited.
pub const REVIEW_EDIT_WINDOW: SignedDuration = SignedDuration::from_hours(7 * 24);

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::schema::reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Review {
    pub id: i32,
    pub user_id: i32,
    pub vendor_id: i32,
    pub booking_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Review {
    /// Editable while less than [`REVIEW_EDIT_WINDOW`] has passed since creation.
    pub fn is_editable(&self, now: jiff::Timestamp) -> bool {
        now.duration_since(self.created_at.to_jiff()) < REVIEW_EDIT_WINDOW
    }
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::reviews)]
pub struct NewReview {
    pub user_id: i32,
    pub vendor_id: i32,
    pub booking_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::reviews)]
#[diesel(treat_none_as_null = true)]
pub struct ReviewChangeset {
    pub rating: i32,
    pub comment: Option<String>,
    pub updated_at: Timestamp,
}
