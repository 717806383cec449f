//! Vendor endpoints.
//!
//! Browsing is public. Creating a profile needs any authenticated account,
//! managing one needs the `VENDOR` role and verification is admin-only.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::VENDOR_TAG;
use crate::api::dto::{
    CategoryInfo, LimitQuery, PagedResponse, TextSearchQuery, VendorDashboardResponse,
    VendorRequest, VendorResponse, VendorSearchQuery,
};
use crate::api::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::{UserRole, VendorCategory};
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Routes that need no token.
///
/// # Routes
/// - `GET /search` - Filtered, sorted, paginated listing
/// - `GET /search/text` - Free-text search
/// - `GET /categories` - Categories with verified vendor counts
/// - `GET /category/{category}` - Listed vendors in one category
/// - `GET /top-rated`, `GET /recent`
/// - `GET /{id}/public` - Public profile
pub fn vendor_public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(search_vendors))
        .routes(routes!(search_vendors_by_term))
        .routes(routes!(list_categories))
        .routes(routes!(get_vendors_by_category))
        .routes(routes!(get_top_rated_vendors))
        .routes(routes!(get_recent_vendors))
        .routes(routes!(get_public_profile))
}

/// Routes mounted behind the auth middleware.
pub fn vendor_protected_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_profile, get_own_profile, update_own_profile))
        .routes(routes!(toggle_availability))
        .routes(routes!(get_dashboard))
        .routes(routes!(verify_vendor))
}

fn vendor_list(profiles: Vec<crate::services::VendorProfile>) -> Json<Vec<VendorResponse>> {
    Json(profiles.into_iter().map(VendorResponse::from).collect())
}

#[utoipa::path(
    get,
    path = "/search",
    tag = VENDOR_TAG,
    params(VendorSearchQuery),
    responses(
        (status = 200, description = "One page of listed vendors", body = PagedResponse<VendorResponse>),
        (status = 400, description = "Unknown category or sort field")
    )
)]
async fn search_vendors(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<VendorSearchQuery>,
) -> AppResult<Json<PagedResponse<VendorResponse>>> {
    let page = state.services.vendors.search_vendors(&query).await?;
    Ok(Json(page.map(VendorResponse::from)))
}

#[utoipa::path(
    get,
    path = "/search/text",
    tag = VENDOR_TAG,
    params(TextSearchQuery),
    responses(
        (status = 200, description = "Vendors whose name, description or location match", body = [VendorResponse])
    )
)]
async fn search_vendors_by_term(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<TextSearchQuery>,
) -> AppResult<Json<Vec<VendorResponse>>> {
    let profiles = state.services.vendors.search_vendors_by_term(&query.q).await?;
    Ok(vendor_list(profiles))
}

#[utoipa::path(
    get,
    path = "/categories",
    tag = VENDOR_TAG,
    responses(
        (status = 200, description = "Every category with its verified vendor count", body = [CategoryInfo])
    )
)]
async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<CategoryInfo>>> {
    Ok(Json(state.services.vendors.list_categories().await?))
}

#[utoipa::path(
    get,
    path = "/category/{category}",
    tag = VENDOR_TAG,
    params(("category" = String, Path, description = "Category code, e.g. catering")),
    responses(
        (status = 200, description = "Listed vendors in the category", body = [VendorResponse]),
        (status = 400, description = "Unknown category")
    )
)]
async fn get_vendors_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<VendorResponse>>> {
    let category: VendorCategory = category.parse().map_err(AppError::bad_request)?;
    let profiles = state.services.vendors.get_vendors_by_category(category).await?;
    Ok(vendor_list(profiles))
}

#[utoipa::path(
    get,
    path = "/top-rated",
    tag = VENDOR_TAG,
    params(LimitQuery),
    responses(
        (status = 200, description = "Vendors rated 4.00 or higher", body = [VendorResponse])
    )
)]
async fn get_top_rated_vendors(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<LimitQuery>,
) -> AppResult<Json<Vec<VendorResponse>>> {
    let profiles = state.services.vendors.get_top_rated_vendors(query.limit).await?;
    Ok(vendor_list(profiles))
}

#[utoipa::path(
    get,
    path = "/recent",
    tag = VENDOR_TAG,
    params(LimitQuery),
    responses(
        (status = 200, description = "Most recently joined verified vendors", body = [VendorResponse])
    )
)]
async fn get_recent_vendors(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<LimitQuery>,
) -> AppResult<Json<Vec<VendorResponse>>> {
    let profiles = state
        .services
        .vendors
        .get_recently_joined_vendors(query.limit)
        .await?;
    Ok(vendor_list(profiles))
}

#[utoipa::path(
    get,
    path = "/{id}/public",
    tag = VENDOR_TAG,
    params(("id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor profile", body = VendorResponse),
        (status = 404, description = "Vendor not found")
    )
)]
async fn get_public_profile(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<VendorResponse>> {
    let profile = state.services.vendors.get_vendor(id).await?;
    Ok(Json(VendorResponse::from(profile)))
}

/// POST /api/vendors/profile - Become a vendor
///
/// Promotes the caller to `VENDOR` in the same transaction.
#[utoipa::path(
    post,
    path = "/profile",
    tag = VENDOR_TAG,
    request_body = VendorRequest,
    responses(
        (status = 201, description = "Vendor profile created", body = VendorResponse),
        (status = 400, description = "Invalid data or profile already exists"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
async fn create_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<VendorRequest>,
) -> AppResult<(StatusCode, Json<VendorResponse>)> {
    let profile = state
        .services
        .vendors
        .create_vendor_profile(auth_user.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(VendorResponse::from(profile))))
}

#[utoipa::path(
    get,
    path = "/profile",
    tag = VENDOR_TAG,
    responses(
        (status = 200, description = "The caller's vendor profile", body = VendorResponse),
        (status = 403, description = "Caller is not a vendor"),
        (status = 404, description = "No vendor profile")
    ),
    security(("bearerAuth" = []))
)]
async fn get_own_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<VendorResponse>> {
    auth_user.require_any(&[UserRole::Vendor])?;
    let profile = state
        .services
        .vendors
        .get_vendor_by_user(auth_user.user_id)
        .await?;
    Ok(Json(VendorResponse::from(profile)))
}

#[utoipa::path(
    put,
    path = "/profile",
    tag = VENDOR_TAG,
    request_body = VendorRequest,
    responses(
        (status = 200, description = "Vendor profile updated", body = VendorResponse),
        (status = 400, description = "Invalid data"),
        (status = 403, description = "Caller is not a vendor")
    ),
    security(("bearerAuth" = []))
)]
async fn update_own_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<VendorRequest>,
) -> AppResult<Json<VendorResponse>> {
    auth_user.require_any(&[UserRole::Vendor])?;
    let vendor = state
        .services
        .vendors
        .find_vendor_by_user(auth_user.user_id)
        .await?;
    let profile = state
        .services
        .vendors
        .update_vendor_profile(vendor.id, payload)
        .await?;
    Ok(Json(VendorResponse::from(profile)))
}

#[utoipa::path(
    put,
    path = "/profile/availability",
    tag = VENDOR_TAG,
    responses(
        (status = 200, description = "Availability flipped", body = VendorResponse),
        (status = 403, description = "Caller is not a vendor")
    ),
    security(("bearerAuth" = []))
)]
async fn toggle_availability(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<VendorResponse>> {
    auth_user.require_any(&[UserRole::Vendor])?;
    let vendor = state
        .services
        .vendors
        .find_vendor_by_user(auth_user.user_id)
        .await?;
    let profile = state.services.vendors.toggle_availability(vendor.id).await?;
    Ok(Json(VendorResponse::from(profile)))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = VENDOR_TAG,
    responses(
        (status = 200, description = "Vendor dashboard summary", body = VendorDashboardResponse),
        (status = 403, description = "Caller is not a vendor")
    ),
    security(("bearerAuth" = []))
)]
async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<VendorDashboardResponse>> {
    auth_user.require_any(&[UserRole::Vendor])?;
    let profile = state
        .services
        .vendors
        .get_vendor_by_user(auth_user.user_id)
        .await?;
    Ok(Json(VendorDashboardResponse::from(profile)))
}

#[utoipa::path(
    put,
    path = "/{id}/verify",
    tag = VENDOR_TAG,
    params(("id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor verified", body = VendorResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Vendor not found")
    ),
    security(("bearerAuth" = []))
)]
async fn verify_vendor(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<VendorResponse>> {
    auth_user.require_any(&[UserRole::Admin])?;
    let profile = state.services.vendors.verify_vendor(id).await?;
    Ok(Json(VendorResponse::from(profile)))
}
