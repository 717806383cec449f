//! Vendor profile DTOs.

use std::borrow::Cow;

use bigdecimal::{BigDecimal, Zero};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::PaginationParams;
use crate::models::VendorCategory;
use crate::services::VendorProfile;

fn not_blank_business_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("Business name is required")));
    }
    Ok(())
}

/// Exclusive upper bound for amounts stored as `NUMERIC(10, 2)`.
pub const MAX_MONEY_AMOUNT: i64 = 100_000_000;

/// Money amounts must fit the column: non-negative and below [`MAX_MONEY_AMOUNT`].
pub(super) fn check_money(value: &BigDecimal, label: &str) -> Result<(), ValidationError> {
    if value < &BigDecimal::zero() {
        return Err(ValidationError::new("range")
            .with_message(Cow::Owned(format!("{} must be non-negative", label))));
    }
    if value >= &BigDecimal::from(MAX_MONEY_AMOUNT) {
        return Err(ValidationError::new("range").with_message(Cow::Owned(format!(
            "{} must be less than {}",
            label, MAX_MONEY_AMOUNT
        ))));
    }
    Ok(())
}

fn valid_min_price(value: &BigDecimal) -> Result<(), ValidationError> {
    check_money(value, "Minimum price")
}

fn valid_max_price(value: &BigDecimal) -> Result<(), ValidationError> {
    check_money(value, "Maximum price")
}

/// Body for creating or replacing a vendor profile.
///
/// The price range ordering is checked by the vendor service since it spans
/// two fields.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct VendorRequest {
    #[validate(
        custom(function = "not_blank_business_name"),
        length(max = 200, message = "Business name must be at most 200 characters")
    )]
    #[schema(example = "Golden Spoon Catering")]
    pub business_name: String,
    pub description: Option<String>,
    pub category: VendorCategory,
    #[validate(length(max = 255, message = "Service location must be at most 255 characters"))]
    #[schema(example = "Lagos")]
    pub service_location: Option<String>,
    #[validate(custom(function = "valid_min_price"))]
    #[schema(value_type = Option<String>, example = "150.00")]
    pub min_price: Option<BigDecimal>,
    #[validate(custom(function = "valid_max_price"))]
    #[schema(value_type = Option<String>, example = "900.00")]
    pub max_price: Option<BigDecimal>,
    #[validate(length(max = 512, message = "Profile image URL must be at most 512 characters"))]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    #[validate(range(min = 0, message = "Years of experience must be non-negative"))]
    pub years_of_experience: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorResponse {
    pub id: i32,
    pub user_id: i32,
    pub business_name: String,
    pub description: Option<String>,
    pub category: VendorCategory,
    #[schema(example = "DJ & Music")]
    pub category_display_name: String,
    pub service_location: Option<String>,
    #[schema(value_type = Option<String>)]
    pub min_price: Option<BigDecimal>,
    #[schema(value_type = Option<String>)]
    pub max_price: Option<BigDecimal>,
    #[schema(value_type = String, example = "4.67")]
    pub average_rating: BigDecimal,
    pub total_reviews: i32,
    pub profile_image_url: Option<String>,
    pub gallery_images: Vec<String>,
    pub years_of_experience: Option<i32>,
    pub is_verified: bool,
    pub is_available: bool,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    /// Owner's full name
    pub owner_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl From<VendorProfile> for VendorResponse {
    fn from(profile: VendorProfile) -> Self {
        let VendorProfile { vendor, owner } = profile;
        Self {
            id: vendor.id,
            user_id: vendor.user_id,
            business_name: vendor.business_name,
            description: vendor.description,
            category_display_name: vendor.category.display_name().to_string(),
            category: vendor.category,
            service_location: vendor.service_location,
            min_price: vendor.min_price,
            max_price: vendor.max_price,
            average_rating: vendor.average_rating,
            total_reviews: vendor.total_reviews,
            profile_image_url: vendor.profile_image_url,
            gallery_images: vendor.gallery_images,
            years_of_experience: vendor.years_of_experience,
            is_verified: vendor.is_verified,
            is_available: vendor.is_available,
            created_at: vendor.created_at.to_jiff(),
            owner_name: owner.as_ref().map(|u| u.full_name()),
            email: owner.as_ref().map(|u| u.email.clone()),
            phone_number: owner.and_then(|u| u.phone_number),
        }
    }
}

/// Filters, paging and ordering for `GET /api/vendors/search`.
#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct VendorSearchQuery {
    /// Category code, case-insensitive (e.g. `catering`)
    pub category: Option<String>,
    /// Substring of the service location
    pub location: Option<String>,
    #[serde(default, alias = "minPrice")]
    #[param(value_type = Option<String>)]
    pub min_price: Option<BigDecimal>,
    #[serde(default, alias = "maxPrice")]
    #[param(value_type = Option<String>)]
    pub max_price: Option<BigDecimal>,
    #[serde(default, alias = "minRating")]
    #[param(value_type = Option<String>)]
    pub min_rating: Option<BigDecimal>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,
    #[serde(default = "default_search_page_size", alias = "size")]
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: u32,
    /// One of averageRating, businessName, minPrice, maxPrice, totalReviews,
    /// yearsOfExperience, createdAt
    #[serde(default, alias = "sortBy")]
    pub sort_by: Option<String>,
    /// `desc` (default) or `asc`
    #[serde(default, alias = "sortDir")]
    pub sort_dir: Option<String>,
}

impl VendorSearchQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_search_page_size() -> u32 {
    10
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 10)]
    pub limit: i64,
}

pub(crate) fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct TextSearchQuery {
    #[validate(length(min = 1, message = "Search term is required"))]
    pub q: String,
}

/// One entry of `GET /api/vendors/categories`.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct CategoryInfo {
    pub name: VendorCategory,
    #[schema(example = "Event Planning")]
    pub display_name: String,
    /// Number of verified vendors in the category
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorDashboardResponse {
    pub vendor: VendorResponse,
    pub is_verified: bool,
    pub is_available: bool,
    #[schema(value_type = String)]
    pub average_rating: BigDecimal,
    pub total_reviews: i32,
}

impl From<VendorProfile> for VendorDashboardResponse {
    fn from(profile: VendorProfile) -> Self {
        let vendor = VendorResponse::from(profile);
        Self {
            is_verified: vendor.is_verified,
            is_available: vendor.is_available,
            average_rating: vendor.average_rating.clone(),
            total_reviews: vendor.total_reviews,
            vendor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::str::FromStr;

    fn request(json: &str) -> VendorRequest {
        serde_json::from_str(json).unwrap()
    }

    fn messages(req: &VendorRequest) -> Vec<String> {
        match AppError::from(req.validate().unwrap_err()) {
            AppError::ValidationErrors { errors } => errors.into_iter().map(|e| e.message).collect(),
            other => panic!("Expected ValidationErrors, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_request_is_valid() {
        let req = request(r#"{"business_name": "Snap Studio", "category": "PHOTOGRAPHY"}"#);
        assert!(req.validate().is_ok());
        assert!(req.gallery_images.is_empty());
    }

    #[test]
    fn test_blank_business_name_is_rejected() {
        let req = request(r#"{"business_name": "   ", "category": "VENUE"}"#);
        assert_eq!(messages(&req), vec!["Business name is required"]);
    }

    #[test]
    fn test_negative_prices_are_rejected() {
        let req = request(
            r#"{"business_name": "Beats", "category": "DJ_MUSIC", "min_price": "-1", "max_price": -5}"#,
        );
        assert_eq!(
            messages(&req),
            vec![
                "Maximum price must be non-negative",
                "Minimum price must be non-negative"
            ]
        );
    }

    #[test]
    fn test_prices_must_fit_the_column() {
        let req = request(
            r#"{"business_name": "Hall", "category": "VENUE", "min_price": "123456789012.00", "max_price": "99999999.99"}"#,
        );
        assert_eq!(
            messages(&req),
            vec![format!("Minimum price must be less than {}", MAX_MONEY_AMOUNT)]
        );
    }

    #[test]
    fn test_text_fields_are_bounded_by_column_width() {
        let body = serde_json::json!({
            "business_name": "Hall",
            "category": "VENUE",
            "service_location": "x".repeat(256),
            "profile_image_url": format!("https://img.example.com/{}", "a".repeat(500)),
        });
        let req: VendorRequest = serde_json::from_value(body).unwrap();
        let messages = messages(&req);
        assert_eq!(messages.len(), 2, "{messages:?}");
        assert!(messages.contains(&"Service location must be at most 255 characters".to_string()));
        assert!(messages.contains(&"Profile image URL must be at most 512 characters".to_string()));

        let at_limit: VendorRequest = serde_json::from_value(serde_json::json!({
            "business_name": "Hall",
            "category": "VENUE",
            "service_location": "x".repeat(255),
        }))
        .unwrap();
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_missing_category_fails_to_parse() {
        let parsed = serde_json::from_str::<VendorRequest>(r#"{"business_name": "X"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_search_query_accepts_camel_case_aliases() {
        let query: VendorSearchQuery = serde_json::from_value(serde_json::json!({
            "minPrice": "100.50",
            "sortBy": "businessName",
            "sortDir": "asc",
            "size": 5
        }))
        .unwrap();
        assert_eq!(query.min_price, Some(BigDecimal::from_str("100.50").unwrap()));
        assert_eq!(query.sort_by.as_deref(), Some("businessName"));
        assert_eq!(query.pagination().page, 1);
        assert_eq!(query.pagination().page_size, 5);
    }

    #[test]
    fn test_limit_defaults_to_ten() {
        let query: LimitQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 10);
        assert!(query.validate().is_ok());
    }
}
