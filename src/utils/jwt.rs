use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{User, UserRole};

/// Kind of token. Only access tokens are issued.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
}

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub email: String,
    /// Role at the time the token was issued. Authorization re-reads the
    /// current role from the database.
    pub role: UserRole,
    pub token_type: TokenType,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Builds claims for `user` valid for `expiration_hours` from `now`.
    pub fn for_user(user: &User, now: Timestamp, expiration_hours: i64) -> Self {
        let exp = now.saturating_add(SignedDuration::from_hours(expiration_hours));
        Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            token_type: TokenType::Access,
            iat: now.as_second(),
            exp: exp.map(|ts| ts.as_second()).unwrap_or(i64::MAX),
        }
    }

    /// Parses `sub` back into the numeric user id.
    pub fn user_id(&self) -> AppResult<i32> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid token subject"))
    }
}

/// Signs an access token for `user` with HS256.
///
/// # Arguments
/// * `user` - The authenticated user
/// * `secret` - The secret key for signing the token
/// * `expiration_hours` - Token validity duration in hours
pub fn generate_access_token(user: &User, secret: &str, expiration_hours: i64) -> AppResult<String> {
    let claims = Claims::for_user(user, Timestamp::now(), expiration_hours);
    encode_claims(&claims, secret)
}

pub fn encode_claims(claims: &Claims, secret: &str) -> AppResult<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

/// Validates signature and expiry and returns the decoded claims.
///
/// Every failure is reported as `Unauthorized`.
pub fn validate_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::unauthorized("Token has expired")
        }
        jsonwebtoken::errors::ErrorKind::InvalidToken => AppError::unauthorized("Invalid token"),
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::unauthorized("Invalid token signature")
        }
        _ => AppError::unauthorized(format!("Token validation failed: {}", e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff_diesel::ToDiesel;

    const TEST_SECRET: &str = "test_secret_key_for_jwt_testing_0123456789";

    fn user() -> User {
        let now = Timestamp::now().to_diesel();
        User {
            id: 42,
            username: "planner".to_string(),
            email: "planner@example.com".to_string(),
            password: "hash".to_string(),
            first_name: Some("Pat".to_string()),
            last_name: None,
            phone_number: None,
            role: UserRole::Vendor,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_round_trip_keeps_identity_and_role() {
        let token = generate_access_token(&user(), TEST_SECRET, 24).unwrap();
        assert_eq!(token.matches('.').count(), 2);

        let claims = validate_access_token(&token, TEST_SECRET).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.username, "planner");
        assert_eq!(claims.email, "planner@example.com");
        assert_eq!(claims.role, UserRole::Vendor);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_access_token(&user(), TEST_SECRET, 1).unwrap();
        let err = validate_access_token(&token, "another_secret_that_is_long_enough_too").unwrap_err();
        match err {
            AppError::Unauthorized { message } => assert_eq!(message, "Invalid token signature"),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issued = Timestamp::now() - SignedDuration::from_hours(5);
        let claims = Claims::for_user(&user(), issued, 1);
        let token = encode_claims(&claims, TEST_SECRET).unwrap();
        let err = validate_access_token(&token, TEST_SECRET).unwrap_err();
        match err {
            AppError::Unauthorized { message } => assert_eq!(message, "Token has expired"),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let result = validate_access_token("not.a.token", TEST_SECRET);
        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[test]
    fn test_non_numeric_subject() {
        let mut claims = Claims::for_user(&user(), Timestamp::now(), 1);
        claims.sub = "abc".to_string();
        assert!(claims.user_id().is_err());
    }
}
