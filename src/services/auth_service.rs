//! Registration, login and token checks.

use regex::Regex;
use std::sync::LazyLock;

use crate::api::dto::{AuthResponse, ExistsResponse, RegisterRequest, TokenValidationResponse};
use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserRole};
use crate::repositories::{UserRepository, VendorRepository};
use crate::utils::jwt::{generate_access_token, validate_access_token};
use crate::utils::password::{hash_password, verify_password};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@(.+)$").expect("valid email regex"));

const MIN_USERNAME_LENGTH: usize = 3;
const MIN_PASSWORD_LENGTH: usize = 6;
const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Registration input after validation and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Registration {
    username: String,
    email: String,
    password: String,
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Applies the registration rules in order and normalizes the input.
///
/// The username is trimmed, the email trimmed and lowercased, and blank
/// optional fields become `None`.
fn validate_registration(request: RegisterRequest) -> AppResult<Registration> {
    let username = request.username.trim().to_string();
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(AppError::bad_request(
            "Username must be at least 3 characters long",
        ));
    }

    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !EMAIL_PATTERN.is_match(&email) {
        return Err(AppError::bad_request("Invalid email format"));
    }

    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::bad_request(
            "Password must be at least 6 characters long",
        ));
    }

    if request.role.is_some_and(|role| role != UserRole::User) {
        return Err(AppError::bad_request(
            "Only the USER role can be chosen at registration",
        ));
    }

    let first_name = non_blank(request.first_name);
    let last_name = non_blank(request.last_name);
    if first_name.is_none() && last_name.is_none() {
        return Err(AppError::bad_request(
            "At least first name or last name is required",
        ));
    }

    Ok(Registration {
        username,
        email,
        password: request.password,
        first_name,
        last_name,
        phone_number: non_blank(request.phone_number),
    })
}

/// Maps a unique violation raised by a concurrent registration to the
/// message the pre-checks would have produced.
fn registration_conflict(err: AppError) -> AppError {
    if err.is_duplicate_of("users", "username") {
        AppError::bad_request("Username already exists")
    } else if err.is_duplicate_of("users", "email") {
        AppError::bad_request("Email already exists")
    } else {
        err
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    vendors: VendorRepository,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(users: UserRepository, vendors: VendorRepository, jwt: JwtConfig) -> Self {
        Self { users, vendors, jwt }
    }

    /// Creates a `USER` account and signs a token for it.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let registration = validate_registration(request)?;

        if self.users.exists_by_username(&registration.username).await? {
            return Err(AppError::bad_request("Username already exists"));
        }
        if self.users.exists_by_email(&registration.email).await? {
            return Err(AppError::bad_request("Email already exists"));
        }

        let new_user = NewUser {
            password: hash_password(&registration.password)?,
            username: registration.username,
            email: registration.email,
            first_name: registration.first_name,
            last_name: registration.last_name,
            phone_number: registration.phone_number,
            role: UserRole::User,
            is_active: true,
        };
        let user = self
            .users
            .create(new_user)
            .await
            .map_err(registration_conflict)?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        self.auth_response(&user, None)
    }

    /// Checks credentials. Unknown users, inactive users and wrong passwords
    /// all fail with the same message.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthResponse> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::bad_request("Username is required"));
        }
        if password.is_empty() {
            return Err(AppError::bad_request("Password is required"));
        }

        let user = match self.users.find_by_username(username).await? {
            Some(user) if user.is_active => user,
            _ => {
                tracing::warn!(username, "Login rejected: unknown or inactive user");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
        };
        if !verify_password(password, &user.password)? {
            tracing::warn!(user_id = user.id, "Login rejected: wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let vendor_id = self.vendors.find_by_user_id(user.id).await?.map(|v| v.id);
        tracing::info!(user_id = user.id, "User logged in");
        self.auth_response(&user, vendor_id)
    }

    /// Signature and expiry check only; the account is not looked up.
    pub fn validate_token(&self, token: &str) -> TokenValidationResponse {
        let valid = !token.trim().is_empty() && validate_access_token(token.trim(), &self.jwt.secret).is_ok();
        TokenValidationResponse {
            valid,
            message: if valid {
                "Token is valid".to_string()
            } else {
                "Token is invalid or expired".to_string()
            },
        }
    }

    pub async fn username_exists(&self, username: &str) -> AppResult<ExistsResponse> {
        let exists = self.users.exists_by_username(username.trim()).await?;
        Ok(ExistsResponse {
            exists,
            message: if exists {
                "Username is already taken".to_string()
            } else {
                "Username is available".to_string()
            },
        })
    }

    pub async fn email_exists(&self, email: &str) -> AppResult<ExistsResponse> {
        let exists = self
            .users
            .exists_by_email(&email.trim().to_lowercase())
            .await?;
        Ok(ExistsResponse {
            exists,
            message: if exists {
                "Email is already registered".to_string()
            } else {
                "Email is available".to_string()
            },
        })
    }

    fn auth_response(&self, user: &User, vendor_id: Option<i32>) -> AppResult<AuthResponse> {
        let token = generate_access_token(user, &self.jwt.secret, self.jwt.access_token_expiration)?;
        Ok(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name(),
            role: user.role,
            is_vendor: user.is_vendor(),
            vendor_id,
        })
    }
}
