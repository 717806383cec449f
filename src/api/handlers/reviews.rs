//! Review endpoints.
//!
//! Reads are public. Writing needs a token, and only the author or an admin
//! may change or remove a review.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use jiff::Timestamp;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::REVIEW_TAG;
use crate::api::dto::{
    CanReviewResponse, CreateReviewRequest, LimitQuery, MessageResponse, MinRatingQuery,
    PagedResponse, PaginationParams, ReviewResponse, ReviewStatsResponse, UpdateReviewRequest,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::services::ReviewDetails;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

pub fn review_public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_vendor_reviews))
        .routes(routes!(get_vendor_reviews_paginated))
        .routes(routes!(get_vendor_reviews_by_rating))
        .routes(routes!(get_vendor_review_stats))
        .routes(routes!(get_high_rated_reviews))
        .routes(routes!(get_recent_reviews))
        .routes(routes!(get_review_by_booking))
        .routes(routes!(get_review))
}

pub fn review_protected_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_review))
        .routes(routes!(get_my_reviews))
        .routes(routes!(can_review_booking))
        .routes(routes!(update_review, delete_review))
}

fn respond_all(details: Vec<ReviewDetails>) -> Json<Vec<ReviewResponse>> {
    let now = Timestamp::now();
    Json(
        details
            .into_iter()
            .map(|d| ReviewResponse::from_details(d, now))
            .collect(),
    )
}

#[utoipa::path(
    get,
    path = "/vendor/{vendor_id}",
    tag = REVIEW_TAG,
    params(("vendor_id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "All reviews of the vendor, newest first", body = [ReviewResponse])
    )
)]
async fn get_vendor_reviews(
    State(state): State<AppState>,
    Path(vendor_id): Path<i32>,
) -> AppResult<Json<Vec<ReviewResponse>>> {
    let details = state.services.reviews.get_vendor_reviews(vendor_id).await?;
    Ok(respond_all(details))
}

#[utoipa::path(
    get,
    path = "/vendor/{vendor_id}/paginated",
    tag = REVIEW_TAG,
    params(("vendor_id" = i32, Path, description = "Vendor ID"), PaginationParams),
    responses(
        (status = 200, description = "One page of the vendor's reviews", body = PagedResponse<ReviewResponse>)
    )
)]
async fn get_vendor_reviews_paginated(
    State(state): State<AppState>,
    Path(vendor_id): Path<i32>,
    ValidatedQuery(pagination): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<PagedResponse<ReviewResponse>>> {
    let page = state
        .services
        .reviews
        .get_vendor_reviews_paginated(vendor_id, &pagination)
        .await?;
    let now = Timestamp::now();
    Ok(Json(page.map(|d| ReviewResponse::from_details(d, now))))
}

#[utoipa::path(
    get,
    path = "/vendor/{vendor_id}/rating/{rating}",
    tag = REVIEW_TAG,
    params(
        ("vendor_id" = i32, Path, description = "Vendor ID"),
        ("rating" = i32, Path, description = "Exact star rating, 1 to 5")
    ),
    responses(
        (status = 200, description = "The vendor's reviews with that rating", body = [ReviewResponse]),
        (status = 400, description = "Rating outside 1..5")
    )
)]
async fn get_vendor_reviews_by_rating(
    State(state): State<AppState>,
    Path((vendor_id, rating)): Path<(i32, i32)>,
) -> AppResult<Json<Vec<ReviewResponse>>> {
    let details = state
        .services
        .reviews
        .get_vendor_reviews_by_rating(vendor_id, rating)
        .await?;
    Ok(respond_all(details))
}

#[utoipa::path(
    get,
    path = "/vendor/{vendor_id}/stats",
    tag = REVIEW_TAG,
    params(("vendor_id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Average, total and per-star counts", body = ReviewStatsResponse)
    )
)]
async fn get_vendor_review_stats(
    State(state): State<AppState>,
    Path(vendor_id): Path<i32>,
) -> AppResult<Json<ReviewStatsResponse>> {
    let stats = state
        .services
        .reviews
        .get_vendor_review_stats(vendor_id)
        .await?;
    Ok(Json(ReviewStatsResponse::from(stats)))
}

#[utoipa::path(
    get,
    path = "/vendor/{vendor_id}/high-rated",
    tag = REVIEW_TAG,
    params(("vendor_id" = i32, Path, description = "Vendor ID"), MinRatingQuery),
    responses(
        (status = 200, description = "The vendor's reviews at or above min_rating", body = [ReviewResponse])
    )
)]
async fn get_high_rated_reviews(
    State(state): State<AppState>,
    Path(vendor_id): Path<i32>,
    ValidatedQuery(query): ValidatedQuery<MinRatingQuery>,
) -> AppResult<Json<Vec<ReviewResponse>>> {
    let details = state
        .services
        .reviews
        .get_high_rated_vendor_reviews(vendor_id, query.min_rating)
        .await?;
    Ok(respond_all(details))
}

#[utoipa::path(
    get,
    path = "/recent",
    tag = REVIEW_TAG,
    params(LimitQuery),
    responses(
        (status = 200, description = "Newest reviews that have a comment", body = [ReviewResponse])
    )
)]
async fn get_recent_reviews(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<LimitQuery>,
) -> AppResult<Json<Vec<ReviewResponse>>> {
    let details = state
        .services
        .reviews
        .get_recent_reviews_with_comments(query.limit)
        .await?;
    Ok(respond_all(details))
}

#[utoipa::path(
    get,
    path = "/booking/{booking_id}",
    tag = REVIEW_TAG,
    params(("booking_id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "The review left for the booking", body = ReviewResponse),
        (status = 404, description = "No review for this booking")
    )
)]
async fn get_review_by_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<i32>,
) -> AppResult<Json<ReviewResponse>> {
    let details = state
        .services
        .reviews
        .get_review_by_booking(booking_id)
        .await?;
    Ok(Json(ReviewResponse::from_details(details, Timestamp::now())))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = REVIEW_TAG,
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review", body = ReviewResponse),
        (status = 404, description = "Review not found")
    )
)]
async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ReviewResponse>> {
    let details = state.services.reviews.get_review(id).await?;
    Ok(Json(ReviewResponse::from_details(details, Timestamp::now())))
}

/// POST /api/reviews - Review a completed booking
///
/// The vendor's average rating and review count are refreshed in the same
/// transaction.
#[utoipa::path(
    post,
    path = "/",
    tag = REVIEW_TAG,
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Not the caller's booking, not completed, or already reviewed"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearerAuth" = []))
)]
async fn create_review(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewResponse>)> {
    let details = state
        .services
        .reviews
        .create_review(auth_user.user_id, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse::from_details(details, Timestamp::now())),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = REVIEW_TAG,
    params(("id" = i32, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Edit window closed"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearerAuth" = []))
)]
async fn update_review(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateReviewRequest>,
) -> AppResult<Json<ReviewResponse>> {
    let review = state.services.reviews.find_review(id).await?;
    auth_user.ensure_review_author(&review)?;
    let details = state.services.reviews.update_review(id, payload).await?;
    Ok(Json(ReviewResponse::from_details(details, Timestamp::now())))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = REVIEW_TAG,
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted", body = MessageResponse),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearerAuth" = []))
)]
async fn delete_review(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    let review = state.services.reviews.find_review(id).await?;
    auth_user.ensure_review_author(&review)?;
    state.services.reviews.delete_review(id).await?;
    Ok(Json(MessageResponse::new("Review deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/my-reviews",
    tag = REVIEW_TAG,
    responses(
        (status = 200, description = "Reviews written by the caller", body = [ReviewResponse])
    ),
    security(("bearerAuth" = []))
)]
async fn get_my_reviews(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<ReviewResponse>>> {
    let details = state
        .services
        .reviews
        .get_user_reviews(auth_user.user_id)
        .await?;
    Ok(respond_all(details))
}

#[utoipa::path(
    get,
    path = "/can-review/{booking_id}",
    tag = REVIEW_TAG,
    params(("booking_id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Whether the caller may review the booking", body = CanReviewResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn can_review_booking(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(booking_id): Path<i32>,
) -> AppResult<Json<CanReviewResponse>> {
    let can_review = state
        .services
        .reviews
        .can_user_review_booking(auth_user.user_id, booking_id)
        .await?;
    Ok(Json(CanReviewResponse::new(can_review)))
}
