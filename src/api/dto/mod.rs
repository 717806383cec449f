//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain. Request types carry `validator` rules,
//! response types are built from models or service views.

mod auth;
mod booking;
mod error;
mod health;
mod pagination;
mod review;
mod user;
mod vendor;

pub use auth::{
    AuthResponse, EmailQuery, ExistsResponse, LoginRequest, RegisterRequest,
    TokenValidationResponse, UsernameQuery, ValidateTokenRequest,
};
pub use booking::{
    BookingResponse, BookingStatsResponse, CreateBookingRequest, DateRangeQuery, StatusQuery,
    UpdateStatusRequest,
};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use pagination::{MAX_PAGE_SIZE, PagedResponse, PaginationMeta, PaginationParams};
pub use review::{
    CanReviewResponse, CreateReviewRequest, MessageResponse, MinRatingQuery, ReviewResponse,
    ReviewStatsResponse, UpdateReviewRequest,
};
pub use user::{MeResponse, UserResponse};
pub use vendor::{
    CategoryInfo, LimitQuery, TextSearchQuery, VendorDashboardResponse, VendorRequest,
    VendorResponse, VendorSearchQuery,
};
