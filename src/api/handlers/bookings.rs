//! Booking endpoints. Every route requires a token.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use jiff::Timestamp;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::BOOKING_TAG;
use crate::api::dto::{
    BookingResponse, BookingStatsResponse, CreateBookingRequest, DateRangeQuery, StatusQuery,
    UpdateStatusRequest,
};
use crate::api::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::{BookingStatus, UserRole};
use crate::repositories::BookingScope;
use crate::services::BookingDetails;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates the booking routes
///
/// # Routes
/// - `POST /` - Place a booking
/// - `GET /my-bookings`, `GET /vendor-bookings` - Own bookings, optionally by status
/// - `GET /{id}` - One booking (customer, booked vendor or admin)
/// - `PUT /{id}/cancel|confirm|complete|status` - Status changes
/// - `GET /upcoming`, `GET /past`, `GET /date-range` - Date based listings
/// - `GET /stats/user`, `GET /stats/vendor` - Counts per status
pub fn booking_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_booking))
        .routes(routes!(get_my_bookings))
        .routes(routes!(get_vendor_bookings))
        .routes(routes!(get_upcoming_bookings))
        .routes(routes!(get_past_bookings))
        .routes(routes!(get_bookings_between))
        .routes(routes!(get_user_stats))
        .routes(routes!(get_vendor_stats))
        .routes(routes!(get_booking))
        .routes(routes!(cancel_booking))
        .routes(routes!(confirm_booking))
        .routes(routes!(complete_booking))
        .routes(routes!(update_booking_status))
}

fn parse_status(status: Option<&str>) -> AppResult<Option<BookingStatus>> {
    status
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<BookingStatus>().map_err(AppError::bad_request))
        .transpose()
}

/// The caller's vendor profile id, if they are a vendor with a profile.
async fn own_vendor_id(state: &AppState, auth_user: &AuthUser) -> AppResult<Option<i32>> {
    if auth_user.role != UserRole::Vendor {
        return Ok(None);
    }
    match state.services.vendors.find_vendor_by_user(auth_user.user_id).await {
        Ok(vendor) => Ok(Some(vendor.id)),
        Err(AppError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Vendor id of the caller, who must hold the `VENDOR` role.
async fn require_vendor_id(state: &AppState, auth_user: &AuthUser) -> AppResult<i32> {
    auth_user.require_any(&[UserRole::Vendor])?;
    let vendor = state
        .services
        .vendors
        .find_vendor_by_user(auth_user.user_id)
        .await?;
    Ok(vendor.id)
}

fn respond(details: BookingDetails) -> Json<BookingResponse> {
    Json(BookingResponse::from_details(details, Timestamp::now()))
}

fn respond_all(details: Vec<BookingDetails>) -> Json<Vec<BookingResponse>> {
    let now = Timestamp::now();
    Json(
        details
            .into_iter()
            .map(|d| BookingResponse::from_details(d, now))
            .collect(),
    )
}

/// Bookings the caller may list. Admins see everything.
async fn visibility(state: &AppState, auth_user: &AuthUser) -> AppResult<BookingScope> {
    if auth_user.is_admin() {
        return Ok(BookingScope::All);
    }
    Ok(BookingScope::Party {
        user_id: auth_user.user_id,
        vendor_id: own_vendor_id(state, auth_user).await?,
    })
}

#[utoipa::path(
    post,
    path = "/",
    tag = BOOKING_TAG,
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking placed as PENDING", body = BookingResponse),
        (status = 400, description = "Invalid data or event date not in the future"),
        (status = 404, description = "Vendor not found")
    ),
    security(("bearerAuth" = []))
)]
async fn create_booking(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    let details = state
        .services
        .bookings
        .create_booking(auth_user.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, respond(details)))
}

#[utoipa::path(
    get,
    path = "/my-bookings",
    tag = BOOKING_TAG,
    params(StatusQuery),
    responses(
        (status = 200, description = "The caller's bookings, newest first", body = [BookingResponse]),
        (status = 400, description = "Unknown status")
    ),
    security(("bearerAuth" = []))
)]
async fn get_my_bookings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let status = parse_status(query.status.as_deref())?;
    let details = state
        .services
        .bookings
        .get_user_bookings(auth_user.user_id, status)
        .await?;
    Ok(respond_all(details))
}

#[utoipa::path(
    get,
    path = "/vendor-bookings",
    tag = BOOKING_TAG,
    params(StatusQuery),
    responses(
        (status = 200, description = "Bookings made with the caller's vendor profile", body = [BookingResponse]),
        (status = 403, description = "Caller is not a vendor")
    ),
    security(("bearerAuth" = []))
)]
async fn get_vendor_bookings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let vendor_id = require_vendor_id(&state, &auth_user).await?;
    let status = parse_status(query.status.as_deref())?;
    let details = state
        .services
        .bookings
        .get_vendor_bookings(vendor_id, status)
        .await?;
    Ok(respond_all(details))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = BOOKING_TAG,
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = BookingResponse),
        (status = 403, description = "Not the customer, the booked vendor or an admin"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearerAuth" = []))
)]
async fn get_booking(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookingResponse>> {
    let details = state.services.bookings.get_booking(id).await?;
    let vendor_id = own_vendor_id(&state, &auth_user).await?;
    auth_user.ensure_booking_access(&details.booking, vendor_id)?;
    Ok(respond(details))
}

#[utoipa::path(
    put,
    path = "/{id}/cancel",
    tag = BOOKING_TAG,
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingResponse),
        (status = 403, description = "Not the customer, the booked vendor or an admin"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearerAuth" = []))
)]
async fn cancel_booking(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookingResponse>> {
    let booking = state.services.bookings.find_booking(id).await?;
    let vendor_id = own_vendor_id(&state, &auth_user).await?;
    auth_user.ensure_booking_access(&booking, vendor_id)?;
    let details = state.services.bookings.cancel_booking(id).await?;
    Ok(respond(details))
}

#[utoipa::path(
    put,
    path = "/{id}/confirm",
    tag = BOOKING_TAG,
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking confirmed", body = BookingResponse),
        (status = 403, description = "Not the booked vendor"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearerAuth" = []))
)]
async fn confirm_booking(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookingResponse>> {
    let vendor_id = require_vendor_id(&state, &auth_user).await?;
    let booking = state.services.bookings.find_booking(id).await?;
    auth_user.ensure_booked_vendor(&booking, vendor_id)?;
    let details = state.services.bookings.confirm_booking(id).await?;
    Ok(respond(details))
}

#[utoipa::path(
    put,
    path = "/{id}/complete",
    tag = BOOKING_TAG,
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking completed", body = BookingResponse),
        (status = 403, description = "Not the booked vendor"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearerAuth" = []))
)]
async fn complete_booking(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookingResponse>> {
    let vendor_id = require_vendor_id(&state, &auth_user).await?;
    let booking = state.services.bookings.find_booking(id).await?;
    auth_user.ensure_booked_vendor(&booking, vendor_id)?;
    let details = state.services.bookings.complete_booking(id).await?;
    Ok(respond(details))
}

/// PUT /api/bookings/{id}/status - Set any status, including `REFUNDED`
///
/// Vendors are limited to their own bookings; admins may update any.
#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = BOOKING_TAG,
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status overwritten", body = BookingResponse),
        (status = 403, description = "Caller is neither the booked vendor nor an admin"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearerAuth" = []))
)]
async fn update_booking_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<BookingResponse>> {
    auth_user.require_any(&[UserRole::Vendor, UserRole::Admin])?;
    if !auth_user.is_admin() {
        let vendor_id = require_vendor_id(&state, &auth_user).await?;
        let booking = state.services.bookings.find_booking(id).await?;
        auth_user.ensure_booked_vendor(&booking, vendor_id)?;
    }
    let details = state
        .services
        .bookings
        .update_status(id, payload.status)
        .await?;
    Ok(respond(details))
}

#[utoipa::path(
    get,
    path = "/upcoming",
    tag = BOOKING_TAG,
    responses(
        (status = 200, description = "Bookings whose event is still ahead, soonest first", body = [BookingResponse])
    ),
    security(("bearerAuth" = []))
)]
async fn get_upcoming_bookings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let scope = visibility(&state, &auth_user).await?;
    let details = state.services.bookings.get_upcoming_bookings(scope).await?;
    Ok(respond_all(details))
}

#[utoipa::path(
    get,
    path = "/past",
    tag = BOOKING_TAG,
    responses(
        (status = 200, description = "Bookings whose event has passed, latest first", body = [BookingResponse])
    ),
    security(("bearerAuth" = []))
)]
async fn get_past_bookings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let scope = visibility(&state, &auth_user).await?;
    let details = state.services.bookings.get_past_bookings(scope).await?;
    Ok(respond_all(details))
}

#[utoipa::path(
    get,
    path = "/date-range",
    tag = BOOKING_TAG,
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Bookings with an event date in the range", body = [BookingResponse]),
        (status = 400, description = "Start date after end date")
    ),
    security(("bearerAuth" = []))
)]
async fn get_bookings_between(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let scope = visibility(&state, &auth_user).await?;
    let details = state
        .services
        .bookings
        .get_bookings_between(scope, query.start_date, query.end_date)
        .await?;
    Ok(respond_all(details))
}

#[utoipa::path(
    get,
    path = "/stats/user",
    tag = BOOKING_TAG,
    responses(
        (status = 200, description = "Counts of the caller's bookings by status", body = BookingStatsResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_user_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<BookingStatsResponse>> {
    let stats = state
        .services
        .bookings
        .user_booking_stats(auth_user.user_id)
        .await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/stats/vendor",
    tag = BOOKING_TAG,
    responses(
        (status = 200, description = "Counts of the vendor's bookings by status", body = BookingStatsResponse),
        (status = 403, description = "Caller is not a vendor")
    ),
    security(("bearerAuth" = []))
)]
async fn get_vendor_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<BookingStatsResponse>> {
    let vendor_id = require_vendor_id(&state, &auth_user).await?;
    let stats = state.services.bookings.vendor_booking_stats(vendor_id).await?;
    Ok(Json(stats))
}
