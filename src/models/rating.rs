//! Vendor rating aggregation.
//!
//! The aggregate is always recomputed from the full set of ratings a vendor
//! currently has, so the result does not depend on the order in which reviews
//! were created, edited or deleted.

use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::BigInt;

use super::review::{MAX_RATING, MIN_RATING};

/// Average rating (2 decimals, rounded half-up) and review count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingSummary {
    pub average_rating: BigDecimal,
    pub total_reviews: i32,
}

impl RatingSummary {
    pub fn empty() -> Self {
        Self {
            average_rating: BigDecimal::new(BigInt::from(0), 2),
            total_reviews: 0,
        }
    }

    /// Builds the summary for a complete set of ratings.
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self::empty();
        }
        let count = ratings.len() as i64;
        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        Self {
            average_rating: round_half_up_ratio(sum, count),
            total_reviews: ratings.len() as i32,
        }
    }
}

/// `sum / count` rounded half-up to 2 decimals, computed on integers.
///
/// Only valid for non-negative `sum` and positive `count`, which always holds
/// for ratings in `1..=5`.
pub fn round_half_up_ratio(sum: i64, count: i64) -> BigDecimal {
    debug_assert!(count > 0 && sum >= 0);
    let hundredths = (sum * 200 + count) / (2 * count);
    BigDecimal::new(BigInt::from(hundredths), 2)
}

/// Per-star breakdown of a vendor's reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingDistribution {
    /// Counts indexed by star value minus one.
    counts: [i64; 5],
}

impl RatingDistribution {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        let mut counts = [0i64; 5];
        for rating in ratings
            .iter()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(*r))
        {
            counts[(*rating - MIN_RATING) as usize] += 1;
        }
        Self { counts }
    }

    pub fn count(&self, stars: i32) -> i64 {
        if (MIN_RATING..=MAX_RATING).contains(&stars) {
            self.counts[(stars - MIN_RATING) as usize]
        } else {
            0
        }
    }

    pub fn total(&self) -> i64 {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_no_reviews_is_zero() {
        let summary = RatingSummary::from_ratings(&[]);
        assert_eq!(summary.average_rating, dec("0.00"));
        assert_eq!(summary.total_reviews, 0);
        assert_eq!(summary, RatingSummary::empty());
    }

    #[test]
    fn test_add_then_remove_review_restores_average() {
        let mut ratings = vec![5, 4, 3];
        let summary = RatingSummary::from_ratings(&ratings);
        assert_eq!(summary.average_rating, dec("4.00"));
        assert_eq!(summary.total_reviews, 3);

        ratings.push(2);
        let summary = RatingSummary::from_ratings(&ratings);
        assert_eq!(summary.average_rating, dec("3.50"));
        assert_eq!(summary.total_reviews, 4);

        ratings.retain(|r| *r != 2);
        let summary = RatingSummary::from_ratings(&ratings);
        assert_eq!(summary.average_rating, dec("4.00"));
        assert_eq!(summary.total_reviews, 3);
    }

    #[test]
    fn test_rounds_half_up() {
        // 4.666.. -> 4.67
        assert_eq!(round_half_up_ratio(14, 3), dec("4.67"));
        // 4.333.. -> 4.33
        assert_eq!(round_half_up_ratio(13, 3), dec("4.33"));
        // 4.125 -> 4.13 (half-up, not banker's rounding)
        assert_eq!(round_half_up_ratio(33, 8), dec("4.13"));
        // 4.375 -> 4.38
        assert_eq!(round_half_up_ratio(35, 8), dec("4.38"));
        assert_eq!(round_half_up_ratio(5, 1), dec("5.00"));
    }

    #[test]
    fn test_average_keeps_two_fraction_digits() {
        let summary = RatingSummary::from_ratings(&[5, 5]);
        assert_eq!(summary.average_rating.to_string(), "5.00");
    }

    #[test]
    fn test_distribution() {
        let dist = RatingDistribution::from_ratings(&[5, 5, 4, 1, 3, 5]);
        assert_eq!(dist.count(5), 3);
        assert_eq!(dist.count(4), 1);
        assert_eq!(dist.count(3), 1);
        assert_eq!(dist.count(2), 0);
        assert_eq!(dist.count(1), 1);
        assert_eq!(dist.count(6), 0);
        assert_eq!(dist.total(), 6);
    }

    proptest! {
        #[test]
        fn prop_summary_matches_mean(ratings in prop::collection::vec(1i32..=5, 1..200)) {
            let summary = RatingSummary::from_ratings(&ratings);
            prop_assert_eq!(summary.total_reviews as usize, ratings.len());

            let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
            let exact = BigDecimal::from(sum) / BigDecimal::from(ratings.len() as i64);
            let diff = (&summary.average_rating - &exact).abs();
            prop_assert!(diff <= dec("0.005"), "avg {} exact {}", summary.average_rating, exact);
            prop_assert!(summary.average_rating >= dec("1.00"));
            prop_assert!(summary.average_rating <= dec("5.00"));
        }

        #[test]
        fn prop_summary_ignores_order(mut ratings in prop::collection::vec(1i32..=5, 0..50)) {
            let before = RatingSummary::from_ratings(&ratings);
            ratings.reverse();
            prop_assert_eq!(before, RatingSummary::from_ratings(&ratings));
        }
    }
}
