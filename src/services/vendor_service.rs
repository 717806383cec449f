//! Vendor profile management, browsing and search.

use std::collections::HashMap;

use jiff_diesel::ToDiesel;

use crate::api::dto::{CategoryInfo, PagedResponse, VendorRequest, VendorSearchQuery};
use crate::error::{AppError, AppResult};
use crate::models::{NewVendor, User, Vendor, VendorCategory, VendorProfileChangeset};
use crate::repositories::{
    SortDirection, UserRepository, VendorRepository, VendorSearchFilter, VendorSort,
    VendorSortField,
};

/// A vendor together with the account that owns it.
#[derive(Debug, Clone)]
pub struct VendorProfile {
    pub vendor: Vendor,
    pub owner: Option<User>,
}

/// Editable fields shared by the create and update paths.
#[derive(Debug, Clone, PartialEq)]
struct VendorFields {
    business_name: String,
    description: Option<String>,
    category: VendorCategory,
    service_location: Option<String>,
    min_price: Option<bigdecimal::BigDecimal>,
    max_price: Option<bigdecimal::BigDecimal>,
    profile_image_url: Option<String>,
    gallery_images: Vec<String>,
    years_of_experience: Option<i32>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Cross-field rules that `validator` does not cover, plus trimming.
fn vendor_fields(request: VendorRequest) -> AppResult<VendorFields> {
    let business_name = request.business_name.trim().to_string();
    if business_name.is_empty() {
        return Err(AppError::bad_request("Business name is required"));
    }
    if let (Some(min), Some(max)) = (&request.min_price, &request.max_price) {
        if min > max {
            return Err(AppError::bad_request(
                "Minimum price cannot be greater than maximum price",
            ));
        }
    }

    Ok(VendorFields {
        business_name,
        description: trimmed(request.description),
        category: request.category,
        service_location: trimmed(request.service_location),
        min_price: request.min_price,
        max_price: request.max_price,
        profile_image_url: trimmed(request.profile_image_url),
        gallery_images: request
            .gallery_images
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect(),
        years_of_experience: request.years_of_experience,
    })
}

/// Turns the raw search query into repository filter and ordering.
fn search_criteria(query: &VendorSearchQuery) -> AppResult<(VendorSearchFilter, VendorSort)> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::parse::<VendorCategory>)
        .transpose()
        .map_err(AppError::bad_request)?;

    let field = match query.sort_by.as_deref().map(str::trim) {
        Some(sort_by) if !sort_by.is_empty() => sort_by
            .parse::<VendorSortField>()
            .map_err(AppError::bad_request)?,
        _ => VendorSortField::default(),
    };
    let direction = query
        .sort_dir
        .as_deref()
        .map(SortDirection::from_param)
        .unwrap_or_default();

    let filter = VendorSearchFilter {
        category,
        location: trimmed(query.location.clone()),
        min_price: query.min_price.clone(),
        max_price: query.max_price.clone(),
        min_rating: query.min_rating.clone(),
    };
    Ok((filter, VendorSort { field, direction }))
}

/// One entry per category, in declaration order, zero when absent.
fn category_listing(counts: &[(VendorCategory, i64)]) -> Vec<CategoryInfo> {
    let counts: HashMap<VendorCategory, i64> = counts.iter().copied().collect();
    VendorCategory::ALL
        .into_iter()
        .map(|category| CategoryInfo {
            name: category,
            display_name: category.display_name().to_string(),
            count: counts.get(&category).copied().unwrap_or(0),
        })
        .collect()
}

fn duplicate_profile(err: AppError) -> AppError {
    if err.is_duplicate_of("vendors", "user_id") {
        AppError::bad_request("User already has a vendor profile")
    } else {
        err
    }
}

#[derive(Clone)]
pub struct VendorService {
    users: UserRepository,
    vendors: VendorRepository,
}

impl VendorService {
    pub fn new(users: UserRepository, vendors: VendorRepository) -> Self {
        Self { users, vendors }
    }

    /// Creates the caller's profile and promotes them to `VENDOR` in one
    /// transaction.
    pub async fn create_vendor_profile(
        &self,
        user_id: i32,
        request: VendorRequest,
    ) -> AppResult<VendorProfile> {
        let fields = vendor_fields(request)?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", "id", user_id))?;
        if self.vendors.exists_for_user(user_id).await? {
            return Err(AppError::bad_request("User already has a vendor profile"));
        }

        let new_vendor = NewVendor {
            user_id,
            business_name: fields.business_name,
            description: fields.description,
            category: fields.category,
            service_location: fields.service_location,
            min_price: fields.min_price,
            max_price: fields.max_price,
            profile_image_url: fields.profile_image_url,
            gallery_images: fields.gallery_images,
            years_of_experience: fields.years_of_experience,
        };
        let vendor = self
            .vendors
            .create_for_user(new_vendor)
            .await
            .map_err(duplicate_profile)?;

        tracing::info!(
            vendor_id = vendor.id,
            user_id,
            category = %vendor.category,
            "Vendor profile created"
        );
        self.with_owner(vendor).await
    }

    /// Overwrites every editable field of the profile.
    pub async fn update_vendor_profile(
        &self,
        vendor_id: i32,
        request: VendorRequest,
    ) -> AppResult<VendorProfile> {
        let fields = vendor_fields(request)?;
        self.find_vendor(vendor_id).await?;

        let changes = VendorProfileChangeset {
            business_name: fields.business_name,
            description: fields.description,
            category: fields.category,
            service_location: fields.service_location,
            min_price: fields.min_price,
            max_price: fields.max_price,
            profile_image_url: fields.profile_image_url,
            gallery_images: fields.gallery_images,
            years_of_experience: fields.years_of_experience,
            updated_at: jiff::Timestamp::now().to_diesel(),
        };
        let vendor = self.vendors.update_profile(vendor_id, changes).await?;
        tracing::info!(vendor_id, "Vendor profile updated");
        self.with_owner(vendor).await
    }

    pub async fn get_vendor(&self, vendor_id: i32) -> AppResult<VendorProfile> {
        let vendor = self.find_vendor(vendor_id).await?;
        self.with_owner(vendor).await
    }

    pub async fn get_vendor_by_user(&self, user_id: i32) -> AppResult<VendorProfile> {
        let vendor = self.find_vendor_by_user(user_id).await?;
        self.with_owner(vendor).await
    }

    /// The caller's vendor row, or `NotFound` when they have no profile.
    pub async fn find_vendor_by_user(&self, user_id: i32) -> AppResult<Vendor> {
        self.vendors
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Vendor profile", "user_id", user_id))
    }

    /// Verified, available vendors matching the query, one page at a time.
    pub async fn search_vendors(
        &self,
        query: &VendorSearchQuery,
    ) -> AppResult<PagedResponse<VendorProfile>> {
        let (filter, sort) = search_criteria(query)?;
        let pagination = query.pagination();

        let (vendors, total) = self
            .vendors
            .search(&filter, sort, pagination.offset(), pagination.limit())
            .await?;
        tracing::debug!(
            ?filter,
            sort_by = sort.field.as_str(),
            total,
            "Vendor search"
        );

        let profiles = self.with_owners(vendors).await?;
        Ok(PagedResponse::new(
            profiles,
            &pagination,
            u64::try_from(total).unwrap_or(0),
        ))
    }

    pub async fn get_vendors_by_category(
        &self,
        category: VendorCategory,
    ) -> AppResult<Vec<VendorProfile>> {
        let vendors = self.vendors.find_listed_by_category(category).await?;
        self.with_owners(vendors).await
    }

    pub async fn get_top_rated_vendors(&self, limit: i64) -> AppResult<Vec<VendorProfile>> {
        let vendors = self.vendors.top_rated(limit).await?;
        self.with_owners(vendors).await
    }

    pub async fn get_recently_joined_vendors(&self, limit: i64) -> AppResult<Vec<VendorProfile>> {
        let vendors = self.vendors.recently_joined(limit).await?;
        self.with_owners(vendors).await
    }

    pub async fn search_vendors_by_term(&self, term: &str) -> AppResult<Vec<VendorProfile>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::bad_request("Search term is required"));
        }
        let vendors = self.vendors.search_by_term(term).await?;
        self.with_owners(vendors).await
    }

    pub async fn verify_vendor(&self, vendor_id: i32) -> AppResult<VendorProfile> {
        self.find_vendor(vendor_id).await?;
        let vendor = self.vendors.set_verified(vendor_id, true).await?;
        tracing::info!(vendor_id, "Vendor verified");
        self.with_owner(vendor).await
    }

    pub async fn toggle_availability(&self, vendor_id: i32) -> AppResult<VendorProfile> {
        self.find_vendor(vendor_id).await?;
        let vendor = self.vendors.toggle_availability(vendor_id).await?;
        tracing::info!(
            vendor_id,
            is_available = vendor.is_available,
            "Vendor availability changed"
        );
        self.with_owner(vendor).await
    }

    pub async fn list_categories(&self) -> AppResult<Vec<CategoryInfo>> {
        let counts = self.vendors.count_verified_by_category().await?;
        Ok(category_listing(&counts))
    }

    async fn find_vendor(&self, vendor_id: i32) -> AppResult<Vendor> {
        self.vendors
            .find_by_id(vendor_id)
            .await?
            .ok_or_else(|| AppError::not_found("Vendor", "id", vendor_id))
    }

    async fn with_owner(&self, vendor: Vendor) -> AppResult<VendorProfile> {
        let owner = self.users.find_by_id(vendor.user_id).await?;
        Ok(VendorProfile { vendor, owner })
    }

    /// Attaches owners with a single batch lookup, keeping the input order.
    async fn with_owners(&self, vendors: Vec<Vendor>) -> AppResult<Vec<VendorProfile>> {
        let owner_ids: Vec<i32> = vendors.iter().map(|v| v.user_id).collect();
        let owners: HashMap<i32, User> = self
            .users
            .find_by_ids(&owner_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(vendors
            .into_iter()
            .map(|vendor| VendorProfile {
                owner: owners.get(&vendor.user_id).cloned(),
                vendor,
            })
            .collect())
    }
}
