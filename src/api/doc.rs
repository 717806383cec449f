use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const AUTH_TAG: &str = "Auth";
pub const USER_TAG: &str = "Users";
pub const VENDOR_TAG: &str = "Vendors";
pub const BOOKING_TAG: &str = "Bookings";
pub const REVIEW_TAG: &str = "Reviews";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EventEase",
        description = "Event-planning marketplace API: vendors, bookings and reviews",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::models::UserRole,
            crate::models::VendorCategory,
            crate::models::BookingStatus,
        )
    ),
    tags(
        (name = AUTH_TAG, description = "Registration, login and token checks"),
        (name = USER_TAG, description = "Current account"),
        (name = VENDOR_TAG, description = "Vendor profiles, search and verification"),
        (name = BOOKING_TAG, description = "Booking lifecycle"),
        (name = REVIEW_TAG, description = "Reviews and vendor ratings"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /api/auth/login"))
                        .build(),
                ),
            )
        }
    }
}
