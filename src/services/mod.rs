//! Service layer for business logic operations.
//!
//! Services validate input, enforce the business rules and coordinate the
//! repositories. Handlers only translate between HTTP and these calls.

mod auth_service;
mod booking_service;
mod review_service;
mod user_service;
mod vendor_service;

pub use auth_service::AuthService;
pub use booking_service::{BookingDetails, BookingService};
pub use review_service::{ReviewDetails, ReviewService, ReviewStats};
pub use user_service::UserService;
pub use vendor_service::{VendorProfile, VendorService};

use crate::config::JwtConfig;
use crate::repositories::Repositories;

/// Aggregates all services; used as part of the axum state.
///
/// Cloning is cheap since the repositories share one pool.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub users: UserService,
    pub vendors: VendorService,
    pub bookings: BookingService,
    pub reviews: ReviewService,
}

impl Services {
    pub fn new(repos: Repositories, jwt: JwtConfig) -> Self {
        let Repositories {
            users,
            vendors,
            bookings,
            reviews,
        } = repos;

        Self {
            auth: AuthService::new(users.clone(), vendors.clone(), jwt),
            users: UserService::new(users.clone(), vendors.clone()),
            vendors: VendorService::new(users.clone(), vendors.clone()),
            bookings: BookingService::new(
                users.clone(),
                vendors.clone(),
                bookings.clone(),
                reviews.clone(),
            ),
            reviews: ReviewService::new(users, vendors, bookings, reviews),
        }
    }
}
