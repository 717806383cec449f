//! Review DTOs.

use bigdecimal::BigDecimal;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::services::{ReviewDetails, ReviewStats};

/// Body for `POST /api/reviews`.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateReviewRequest {
    pub booking_id: i32,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(minimum = 1, maximum = 5, example = 5)]
    pub rating: i32,
    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// Body for `PUT /api/reviews/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(minimum = 1, maximum = 5, example = 4)]
    pub rating: i32,
    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    pub booking_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
    pub user_id: i32,
    pub user_full_name: Option<String>,
    pub vendor_id: i32,
    pub vendor_business_name: Option<String>,
    /// Whether the edit window is still open
    pub is_editable: bool,
}

impl ReviewResponse {
    pub fn from_details(details: ReviewDetails, now: Timestamp) -> Self {
        let ReviewDetails {
            review,
            reviewer,
            vendor,
        } = details;
        Self {
            is_editable: review.is_editable(now),
            id: review.id,
            booking_id: review.booking_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at.to_jiff(),
            updated_at: review.updated_at.to_jiff(),
            user_id: review.user_id,
            user_full_name: reviewer.map(|u| u.full_name()),
            vendor_id: review.vendor_id,
            vendor_business_name: vendor.map(|v| v.business_name),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewStatsResponse {
    #[schema(value_type = String, example = "4.33")]
    pub average_rating: BigDecimal,
    pub total_reviews: i64,
    pub five_star_count: i64,
    pub four_star_count: i64,
    pub three_star_count: i64,
    pub two_star_count: i64,
    pub one_star_count: i64,
}

impl From<ReviewStats> for ReviewStatsResponse {
    fn from(stats: ReviewStats) -> Self {
        let ReviewStats {
            summary,
            distribution,
        } = stats;
        Self {
            average_rating: summary.average_rating,
            total_reviews: distribution.total(),
            five_star_count: distribution.count(5),
            four_star_count: distribution.count(4),
            three_star_count: distribution.count(3),
            two_star_count: distribution.count(2),
            one_star_count: distribution.count(1),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CanReviewResponse {
    pub can_review: bool,
    #[schema(example = "You can review this booking")]
    pub message: String,
}

impl CanReviewResponse {
    pub fn new(can_review: bool) -> Self {
        let message = if can_review {
            "You can review this booking"
        } else {
            "This booking cannot be reviewed (not completed or already reviewed)"
        };
        Self {
            can_review,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Review deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct MinRatingQuery {
    #[serde(default = "default_min_rating", alias = "minRating")]
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[param(minimum = 1, maximum = 5, example = 4)]
    pub min_rating: i32,
}

fn default_min_rating() -> i32 {
    4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RatingDistribution, RatingSummary};

    #[test]
    fn test_stats_response_counts_each_star() {
        let ratings = [5, 4, 4, 1];
        let response = ReviewStatsResponse::from(ReviewStats {
            summary: RatingSummary::from_ratings(&ratings),
            distribution: RatingDistribution::from_ratings(&ratings),
        });

        assert_eq!(response.average_rating.to_string(), "3.50");
        assert_eq!(response.total_reviews, 4);
        assert_eq!(response.five_star_count, 1);
        assert_eq!(response.four_star_count, 2);
        assert_eq!(response.three_star_count, 0);
        assert_eq!(response.one_star_count, 1);
    }

    #[test]
    fn test_rating_out_of_range_is_rejected() {
        for rating in [0, 6] {
            let request = UpdateReviewRequest {
                rating,
                comment: None,
            };
            assert!(request.validate().is_err(), "{rating}");
        }
        let request = UpdateReviewRequest {
            rating: 5,
            comment: Some("Great food".to_string()),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_can_review_messages() {
        assert_eq!(
            CanReviewResponse::new(true).message,
            "You can review this booking"
        );
        assert!(CanReviewResponse::new(false).message.contains("cannot be reviewed"));
    }

    #[test]
    fn test_min_rating_defaults_to_four() {
        let query: MinRatingQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.min_rating, 4);
    }
}
