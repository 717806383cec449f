//! Repository layer for data access operations.

mod booking_repo;
mod review_repo;
mod user_repo;
mod vendor_repo;

pub use booking_repo::{BookingRepository, BookingScope};
pub use review_repo::ReviewRepository;
pub use user_repo::UserRepository;
pub use vendor_repo::{
    SortDirection, TOP_RATED_THRESHOLD, VendorRepository, VendorSearchFilter, VendorSort,
    VendorSortField,
};

use crate::db::AsyncDbPool;

/// Aggregates all repositories. Cloning shares the pool.
#[derive(Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub vendors: VendorRepository,
    pub bookings: BookingRepository,
    pub reviews: ReviewRepository,
}

impl Repositories {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            vendors: VendorRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool.clone()),
            reviews: ReviewRepository::new(pool),
        }
    }
}
