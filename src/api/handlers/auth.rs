//! Registration, login and token/availability checks. All routes are public.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{
    AuthResponse, EmailQuery, ExistsResponse, LoginRequest, RegisterRequest,
    TokenValidationResponse, UsernameQuery, ValidateTokenRequest,
};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates the authentication routes
///
/// # Routes
/// - `POST /register` - Create an account and get a token
/// - `POST /login` - Authenticate and get a token
/// - `POST /validate-token` - Check whether a token is still usable
/// - `GET /check-username` - Username availability
/// - `GET /check-email` - Email availability
pub fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(validate_token))
        .routes(routes!(check_username))
        .routes(routes!(check_email))
}

/// POST /api/auth/register - Register a new customer account
#[utoipa::path(
    post,
    path = "/register",
    tag = AUTH_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid registration data, or username/email taken")
    )
)]
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response = state.services.auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login - Authenticate with username and password
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid username or password")
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state
        .services
        .auth
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(response))
}

/// POST /api/auth/validate-token
///
/// Always answers 200; an unusable token yields `valid: false`.
#[utoipa::path(
    post,
    path = "/validate-token",
    tag = AUTH_TAG,
    request_body = ValidateTokenRequest,
    responses(
        (status = 200, description = "Validation result", body = TokenValidationResponse)
    )
)]
async fn validate_token(
    State(state): State<AppState>,
    Json(payload): Json<ValidateTokenRequest>,
) -> Json<TokenValidationResponse> {
    Json(state.services.auth.validate_token(&payload.token))
}

#[utoipa::path(
    get,
    path = "/check-username",
    tag = AUTH_TAG,
    params(UsernameQuery),
    responses(
        (status = 200, description = "Whether the username is taken", body = ExistsResponse)
    )
)]
async fn check_username(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> AppResult<Json<ExistsResponse>> {
    let response = state.services.auth.username_exists(&query.username).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/check-email",
    tag = AUTH_TAG,
    params(EmailQuery),
    responses(
        (status = 200, description = "Whether the email is registered", body = ExistsResponse)
    )
)]
async fn check_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<ExistsResponse>> {
    let response = state.services.auth.email_exists(&query.email).await?;
    Ok(Json(response))
}
