//! Bearer authentication and the per-operation authorization predicate.
//!
//! The token only identifies the caller. Role and active flag are re-read
//! from the database on every request, so demotions and deactivations take
//! effect immediately.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::models::{Booking, Review, User, UserRole};
use crate::state::AppState;
use crate::utils::jwt::validate_access_token;

/// Authenticated principal, inserted into request extensions by
/// [`auth_middleware`] and read with `Extension<AuthUser>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Fails with `Forbidden` unless the caller holds one of `allowed`.
    pub fn require_any(&self, allowed: &[UserRole]) -> AppResult<()> {
        if allowed.contains(&self.role) {
            return Ok(());
        }
        let roles: Vec<&str> = allowed.iter().map(UserRole::as_str).collect();
        Err(AppError::forbidden(format!(
            "Access denied: requires role {}",
            roles.join(" or ")
        )))
    }

    /// The customer, the booked vendor (`own_vendor_id`) or an admin.
    pub fn can_access_booking(&self, booking: &Booking, own_vendor_id: Option<i32>) -> bool {
        self.is_admin()
            || booking.is_owned_by(self.user_id)
            || own_vendor_id == Some(booking.vendor_id)
    }

    pub fn ensure_booking_access(
        &self,
        booking: &Booking,
        own_vendor_id: Option<i32>,
    ) -> AppResult<()> {
        if self.can_access_booking(booking, own_vendor_id) {
            Ok(())
        } else {
            Err(AppError::forbidden("You do not have access to this booking"))
        }
    }

    /// Vendors may only act on bookings made with their own profile.
    pub fn ensure_booked_vendor(&self, booking: &Booking, own_vendor_id: i32) -> AppResult<()> {
        if booking.vendor_id == own_vendor_id {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "You can only manage bookings for your own vendor profile",
            ))
        }
    }

    /// Authors may change their own reviews; admins may change any.
    pub fn ensure_review_author(&self, review: &Review) -> AppResult<()> {
        if self.is_admin() || review.user_id == self.user_id {
            Ok(())
        } else {
            Err(AppError::forbidden("You can only modify your own reviews"))
        }
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format. Expected: Bearer <token>")
        })
}

/// Rejects the request with 401 unless it carries a valid token for an
/// active account.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let claims = validate_access_token(token, &state.jwt_config.secret)?;
    let user = state
        .services
        .users
        .get_active_user(claims.user_id()?)
        .await?;

    tracing::debug!(user_id = user.id, role = %user.role, "Request authenticated");
    request.extensions_mut().insert(AuthUser::from(&user));
    Ok(next.run(request).await)
}
