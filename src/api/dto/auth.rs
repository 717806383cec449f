//! Authentication-related Data Transfer Objects

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::UserRole;

/// Registration payload.
///
/// Length caps mirror the column sizes. The business rules (minimum lengths,
/// email shape, a name being present) are enforced by the auth service so
/// they report the documented messages.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(length(max = 50, message = "Username must be at most 50 characters"))]
    #[schema(example = "jane_planner", min_length = 3, max_length = 50)]
    pub username: String,
    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    #[schema(example = "jane@example.com", format = "email")]
    pub email: String,
    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    #[schema(example = "secret123", format = "password", min_length = 6)]
    pub password: String,
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    #[schema(example = "Jane")]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    #[schema(example = "Doe")]
    pub last_name: Option<String>,
    #[validate(length(max = 32, message = "Phone number must be at most 32 characters"))]
    #[schema(example = "+2348012345678")]
    pub phone_number: Option<String>,
    /// Only `USER` is accepted. Vendors are promoted when they create a profile.
    #[serde(default)]
    #[schema(example = "USER")]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "jane_planner")]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "secret123", format = "password")]
    pub password: String,
}

/// Token issued on registration or login, with a summary of the user.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    pub user_id: i32,
    pub username: String,
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    pub role: UserRole,
    pub is_vendor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateTokenRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenValidationResponse {
    pub valid: bool,
    #[schema(example = "Token is valid")]
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmailQuery {
    pub email: String,
}

/// Availability check result for usernames and emails.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExistsResponse {
    pub exists: bool,
    #[schema(example = "Username is available")]
    pub message: String,
}
