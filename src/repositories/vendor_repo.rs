//! Vendor repository: profile CRUD, verified-listing queries and search.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use jiff_diesel::ToDiesel;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewVendor, UserRole, Vendor, VendorCategory, VendorProfileChangeset};
use crate::schema::{users, vendors};

/// Rating threshold for the "top rated" listing.
pub const TOP_RATED_THRESHOLD: i32 = 4;

/// Optional narrowing applied on top of "verified and available".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorSearchFilter {
    pub category: Option<VendorCategory>,
    /// Case-insensitive substring of `service_location`
    pub location: Option<String>,
    /// Lower bound on the vendor's own `min_price`
    pub min_price: Option<BigDecimal>,
    /// Upper bound on the vendor's own `max_price`
    pub max_price: Option<BigDecimal>,
    pub min_rating: Option<BigDecimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VendorSortField {
    #[default]
    AverageRating,
    BusinessName,
    MinPrice,
    MaxPrice,
    TotalReviews,
    YearsOfExperience,
    CreatedAt,
}

impl VendorSortField {
    pub const ALL: [VendorSortField; 7] = [
        VendorSortField::AverageRating,
        VendorSortField::BusinessName,
        VendorSortField::MinPrice,
        VendorSortField::MaxPrice,
        VendorSortField::TotalReviews,
        VendorSortField::YearsOfExperience,
        VendorSortField::CreatedAt,
    ];

    /// Name as accepted in the `sortBy` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorSortField::AverageRating => "averageRating",
            VendorSortField::BusinessName => "businessName",
            VendorSortField::MinPrice => "minPrice",
            VendorSortField::MaxPrice => "maxPrice",
            VendorSortField::TotalReviews => "totalReviews",
            VendorSortField::YearsOfExperience => "yearsOfExperience",
            VendorSortField::CreatedAt => "createdAt",
        }
    }
}

impl FromStr for VendorSortField {
    type Err = String;

    /// Accepts camelCase and snake_case spellings, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_lowercase();
        VendorSortField::ALL
            .into_iter()
            .find(|field| field.as_str().to_lowercase() == wanted)
            .ok_or_else(|| {
                let allowed: Vec<&str> = VendorSortField::ALL.iter().map(|f| f.as_str()).collect();
                format!(
                    "Invalid sort field '{}'. Allowed values: {}",
                    s,
                    allowed.join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// `desc` in any case means descending, anything else ascending.
    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VendorSort {
    pub field: VendorSortField,
    pub direction: SortDirection,
}

/// Wraps `term` for `ILIKE '%term%'`, escaping LIKE metacharacters.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn listed_vendors(filter: &VendorSearchFilter) -> vendors::BoxedQuery<'static, Pg> {
    let mut query = vendors::table
        .filter(vendors::is_verified.eq(true))
        .filter(vendors::is_available.eq(true))
        .into_boxed();

    if let Some(category) = filter.category {
        query = query.filter(vendors::category.eq(category));
    }
    if let Some(location) = filter.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        query = query.filter(vendors::service_location.ilike(contains_pattern(location)));
    }
    if let Some(min_price) = filter.min_price.clone() {
        query = query.filter(vendors::min_price.ge(min_price));
    }
    if let Some(max_price) = filter.max_price.clone() {
        query = query.filter(vendors::max_price.le(max_price));
    }
    if let Some(min_rating) = filter.min_rating.clone() {
        query = query.filter(vendors::average_rating.ge(min_rating));
    }
    query
}

fn apply_sort(
    query: vendors::BoxedQuery<'static, Pg>,
    sort: VendorSort,
) -> vendors::BoxedQuery<'static, Pg> {
    use SortDirection::{Asc, Desc};
    use VendorSortField::*;

    let query = match (sort.field, sort.direction) {
        (AverageRating, Asc) => query.order(vendors::average_rating.asc()),
        (AverageRating, Desc) => query.order(vendors::average_rating.desc()),
        (BusinessName, Asc) => query.order(vendors::business_name.asc()),
        (BusinessName, Desc) => query.order(vendors::business_name.desc()),
        (MinPrice, Asc) => query.order(vendors::min_price.asc().nulls_last()),
        (MinPrice, Desc) => query.order(vendors::min_price.desc().nulls_last()),
        (MaxPrice, Asc) => query.order(vendors::max_price.asc().nulls_last()),
        (MaxPrice, Desc) => query.order(vendors::max_price.desc().nulls_last()),
        (TotalReviews, Asc) => query.order(vendors::total_reviews.asc()),
        (TotalReviews, Desc) => query.order(vendors::total_reviews.desc()),
        (YearsOfExperience, Asc) => query.order(vendors::years_of_experience.asc().nulls_last()),
        (YearsOfExperience, Desc) => query.order(vendors::years_of_experience.desc().nulls_last()),
        (CreatedAt, Asc) => query.order(vendors::created_at.asc()),
        (CreatedAt, Desc) => query.order(vendors::created_at.desc()),
    };
    // Stable paging across equal sort keys.
    query.then_order_by(vendors::id.asc())
}

#[derive(Clone)]
pub struct VendorRepository {
    pool: AsyncDbPool,
}

impl VendorRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Inserts the profile and promotes its owner to `VENDOR` atomically.
    pub async fn create_for_user(&self, new_vendor: NewVendor) -> AppResult<Vendor> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let vendor = diesel::insert_into(vendors::table)
                    .values(&new_vendor)
                    .returning(Vendor::as_returning())
                    .get_result(conn)
                    .await?;

                let promoted = diesel::update(users::table.find(vendor.user_id))
                    .set((
                        users::role.eq(UserRole::Vendor),
                        users::updated_at.eq(jiff::Timestamp::now().to_diesel()),
                    ))
                    .execute(conn)
                    .await?;
                if promoted == 0 {
                    return Err(AppError::not_found("User", "id", vendor.user_id));
                }

                Ok(vendor)
            }
            .scope_boxed()
        })
        .await
    }

    pub async fn find_by_id(&self, vendor_id: i32) -> AppResult<Option<Vendor>> {
        let mut conn = self.pool.get().await?;

        Ok(vendors::table
            .find(vendor_id)
            .select(Vendor::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    pub async fn find_by_ids(&self, vendor_ids: &[i32]) -> AppResult<Vec<Vendor>> {
        if vendor_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        Ok(vendors::table
            .filter(vendors::id.eq_any(vendor_ids))
            .select(Vendor::as_select())
            .load(&mut conn)
            .await?)
    }

    pub async fn find_by_user_id(&self, owner_id: i32) -> AppResult<Option<Vendor>> {
        let mut conn = self.pool.get().await?;

        Ok(vendors::table
            .filter(vendors::user_id.eq(owner_id))
            .select(Vendor::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    pub async fn exists_for_user(&self, owner_id: i32) -> AppResult<bool> {
        let mut conn = self.pool.get().await?;

        Ok(
            diesel::select(diesel::dsl::exists(
                vendors::table.filter(vendors::user_id.eq(owner_id)),
            ))
            .get_result(&mut conn)
            .await?,
        )
    }

    pub async fn update_profile(
        &self,
        vendor_id: i32,
        changes: VendorProfileChangeset,
    ) -> AppResult<Vendor> {
        let mut conn = self.pool.get().await?;

        Ok(diesel::update(vendors::table.find(vendor_id))
            .set(&changes)
            .returning(Vendor::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    pub async fn set_verified(&self, vendor_id: i32, verified: bool) -> AppResult<Vendor> {
        let mut conn = self.pool.get().await?;

        Ok(diesel::update(vendors::table.find(vendor_id))
            .set((
                vendors::is_verified.eq(verified),
                vendors::updated_at.eq(jiff::Timestamp::now().to_diesel()),
            ))
            .returning(Vendor::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    /// Flips `is_available` in a single statement.
    pub async fn toggle_availability(&self, vendor_id: i32) -> AppResult<Vendor> {
        let mut conn = self.pool.get().await?;

        Ok(diesel::update(vendors::table.find(vendor_id))
            .set((
                vendors::is_available.eq(diesel::dsl::not(vendors::is_available)),
                vendors::updated_at.eq(jiff::Timestamp::now().to_diesel()),
            ))
            .returning(Vendor::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    /// Verified, available vendors matching `filter`, one page at a time.
    ///
    /// # Returns
    /// Tuple of (vendors on the page, total matching count)
    pub async fn search(
        &self,
        filter: &VendorSearchFilter,
        sort: VendorSort,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Vendor>, i64)> {
        let mut conn = self.pool.get().await?;

        let items = apply_sort(listed_vendors(filter), sort)
            .offset(offset)
            .limit(limit)
            .select(Vendor::as_select())
            .load(&mut conn)
            .await?;

        let total = listed_vendors(filter)
            .select(count_star())
            .get_result::<i64>(&mut conn)
            .await?;

        Ok((items, total))
    }

    pub async fn find_listed_by_category(&self, category: VendorCategory) -> AppResult<Vec<Vendor>> {
        let mut conn = self.pool.get().await?;
        let filter = VendorSearchFilter {
            category: Some(category),
            ..Default::default()
        };

        Ok(apply_sort(listed_vendors(&filter), VendorSort::default())
            .select(Vendor::as_select())
            .load(&mut conn)
            .await?)
    }

    pub async fn top_rated(&self, limit: i64) -> AppResult<Vec<Vendor>> {
        let mut conn = self.pool.get().await?;

        Ok(vendors::table
            .filter(vendors::average_rating.ge(BigDecimal::from(TOP_RATED_THRESHOLD)))
            .order((vendors::average_rating.desc(), vendors::total_reviews.desc()))
            .limit(limit)
            .select(Vendor::as_select())
            .load(&mut conn)
            .await?)
    }

    pub async fn recently_joined(&self, limit: i64) -> AppResult<Vec<Vendor>> {
        let mut conn = self.pool.get().await?;

        Ok(vendors::table
            .filter(vendors::is_verified.eq(true))
            .order(vendors::created_at.desc())
            .limit(limit)
            .select(Vendor::as_select())
            .load(&mut conn)
            .await?)
    }

    /// Case-insensitive match on business name, description or location.
    pub async fn search_by_term(&self, term: &str) -> AppResult<Vec<Vendor>> {
        let mut conn = self.pool.get().await?;
        let pattern = contains_pattern(term.trim());

        Ok(vendors::table
            .filter(
                vendors::business_name
                    .ilike(pattern.clone())
                    .or(vendors::description.ilike(pattern.clone()))
                    .or(vendors::service_location.ilike(pattern)),
            )
            .order(vendors::average_rating.desc())
            .then_order_by(vendors::id.asc())
            .select(Vendor::as_select())
            .load(&mut conn)
            .await?)
    }

    /// Verified vendor count per category; categories with none are absent.
    pub async fn count_verified_by_category(&self) -> AppResult<Vec<(VendorCategory, i64)>> {
        let mut conn = self.pool.get().await?;

        Ok(vendors::table
            .filter(vendors::is_verified.eq(true))
            .group_by(vendors::category)
            .select((vendors::category, count_star()))
            .load::<(VendorCategory, i64)>(&mut conn)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_accepts_both_spellings() {
        assert_eq!(
            "averageRating".parse::<VendorSortField>().unwrap(),
            VendorSortField::AverageRating
        );
        assert_eq!(
            "average_rating".parse::<VendorSortField>().unwrap(),
            VendorSortField::AverageRating
        );
        assert_eq!(
            "YEARS_OF_EXPERIENCE".parse::<VendorSortField>().unwrap(),
            VendorSortField::YearsOfExperience
        );
        assert_eq!(
            "createdat".parse::<VendorSortField>().unwrap(),
            VendorSortField::CreatedAt
        );
        for field in VendorSortField::ALL {
            assert_eq!(field.as_str().parse::<VendorSortField>().unwrap(), field);
        }
    }

    #[test]
    fn test_unknown_sort_field_lists_allowed_values() {
        let err = "password".parse::<VendorSortField>().unwrap_err();
        assert!(err.contains("Invalid sort field 'password'"));
        assert!(err.contains("businessName"));
    }

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortDirection::from_param("desc"), SortDirection::Desc);
        assert_eq!(SortDirection::from_param("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::from_param("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::from_param("sideways"), SortDirection::Asc);
        assert_eq!(VendorSort::default().direction, SortDirection::Desc);
        assert_eq!(VendorSort::default().field, VendorSortField::AverageRating);
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("cater"), "%cater%");
        assert_eq!(contains_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_listed_vendors_sql_applies_every_filter() {
        let filter = VendorSearchFilter {
            category: Some(VendorCategory::Catering),
            location: Some("  Lagos ".to_string()),
            min_price: Some(BigDecimal::from(100)),
            max_price: Some(BigDecimal::from(500)),
            min_rating: Some(BigDecimal::from(3)),
        };
        let sql = diesel::debug_query::<Pg, _>(&apply_sort(
            listed_vendors(&filter),
            VendorSort {
                field: VendorSortField::MinPrice,
                direction: SortDirection::Asc,
            },
        ))
        .to_string();

        assert!(sql.contains("\"vendors\".\"is_verified\" = $1"));
        assert!(sql.contains("\"vendors\".\"category\" = "));
        assert!(sql.contains("\"vendors\".\"service_location\" ILIKE "));
        assert!(sql.contains("\"vendors\".\"min_price\" >= "));
        assert!(sql.contains("\"vendors\".\"max_price\" <= "));
        assert!(sql.contains("\"vendors\".\"average_rating\" >= "));
        assert!(sql.contains("ORDER BY \"vendors\".\"min_price\" ASC NULLS LAST"));
        assert!(sql.contains("%Lagos%"));
    }

    #[test]
    fn test_blank_location_is_ignored() {
        let filter = VendorSearchFilter {
            location: Some("   ".to_string()),
            ..Default::default()
        };
        let sql = diesel::debug_query::<Pg, _>(&listed_vendors(&filter)).to_string();
        assert!(!sql.contains("ILIKE"));
    }
}
