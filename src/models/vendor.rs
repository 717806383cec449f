//! Vendor profiles and the service categories they are listed under.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff_diesel::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Category
// ============================================================================

/// Kind of service a vendor offers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
    DbEnum,
)]
#[db_enum(existing_type_path = "crate::schema::sql_types::VendorCategory")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorCategory {
    Catering,
    Decoration,
    Photography,
    Videography,
    DjMusic,
    Venue,
    Lighting,
    Sound,
    Transport,
    Security,
    Planning,
    Flowers,
    Entertainment,
    EquipmentRental,
    Other,
}

impl VendorCategory {
    pub const ALL: [VendorCategory; 15] = [
        VendorCategory::Catering,
        VendorCategory::Decoration,
        VendorCategory::Photography,
        VendorCategory::Videography,
        VendorCategory::DjMusic,
        VendorCategory::Venue,
        VendorCategory::Lighting,
        VendorCategory::Sound,
        VendorCategory::Transport,
        VendorCategory::Security,
        VendorCategory::Planning,
        VendorCategory::Flowers,
        VendorCategory::Entertainment,
        VendorCategory::EquipmentRental,
        VendorCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VendorCategory::Catering => "CATERING",
            VendorCategory::Decoration => "DECORATION",
            VendorCategory::Photography => "PHOTOGRAPHY",
            VendorCategory::Videography => "VIDEOGRAPHY",
            VendorCategory::DjMusic => "DJ_MUSIC",
            VendorCategory::Venue => "VENUE",
            VendorCategory::Lighting => "LIGHTING",
            VendorCategory::Sound => "SOUND",
            VendorCategory::Transport => "TRANSPORT",
            VendorCategory::Security => "SECURITY",
            VendorCategory::Planning => "PLANNING",
            VendorCategory::Flowers => "FLOWERS",
            VendorCategory::Entertainment => "ENTERTAINMENT",
            VendorCategory::EquipmentRental => "EQUIPMENT_RENTAL",
            VendorCategory::Other => "OTHER",
        }
    }

    /// Human readable label shown in category listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            VendorCategory::Catering => "Catering",
            VendorCategory::Decoration => "Decoration",
            VendorCategory::Photography => "Photography",
            VendorCategory::Videography => "Videography",
            VendorCategory::DjMusic => "DJ & Music",
            VendorCategory::Venue => "Venue",
            VendorCategory::Lighting => "Lighting",
            VendorCategory::Sound => "Sound System",
            VendorCategory::Transport => "Transport",
            VendorCategory::Security => "Security",
            VendorCategory::Planning => "Event Planning",
            VendorCategory::Flowers => "Flowers",
            VendorCategory::Entertainment => "Entertainment",
            VendorCategory::EquipmentRental => "Equipment Rental",
            VendorCategory::Other => "Other",
        }
    }
}

impl fmt::Display for VendorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VendorCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        VendorCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown vendor category: {}", s))
    }
}

// ============================================================================
// Vendor Models (Query/Insert/Update)
// ============================================================================

/// Vendor row. `average_rating` and `total_reviews` are owned by the rating
/// aggregation and only written inside review transactions.
#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::schema::vendors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Vendor {
    pub id: i32,
    pub user_id: i32,
    pub business_name: String,
    pub description: Option<String>,
    pub category: VendorCategory,
    pub service_location: Option<String>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
    pub average_rating: BigDecimal,
    pub total_reviews: i32,
    pub profile_image_url: Option<String>,
    pub gallery_images: Vec<String>,
    pub years_of_experience: Option<i32>,
    pub is_verified: bool,
    pub is_available: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert model for a fresh profile: unverified, available, no reviews yet.
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::vendors)]
pub struct NewVendor {
    pub user_id: i32,
    pub business_name: String,
    pub description: Option<String>,
    pub category: VendorCategory,
    pub service_location: Option<String>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
    pub profile_image_url: Option<String>,
    pub gallery_images: Vec<String>,
    pub years_of_experience: Option<i32>,
}

/// Editable profile fields. Absent optional values clear the column.
#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::vendors)]
#[diesel(treat_none_as_null = true)]
pub struct VendorProfileChangeset {
    pub business_name: String,
    pub description: Option<String>,
    pub category: VendorCategory,
    pub service_location: Option<String>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
    pub profile_image_url: Option<String>,
    pub gallery_images: Vec<String>,
    pub years_of_experience: Option<i32>,
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_its_code() {
        for category in VendorCategory::ALL {
            assert_eq!(category.as_str().parse::<VendorCategory>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_parse_ignores_case() {
        assert_eq!(
            "dj_music".parse::<VendorCategory>().unwrap(),
            VendorCategory::DjMusic
        );
        assert_eq!(
            "Equipment_Rental".parse::<VendorCategory>().unwrap(),
            VendorCategory::EquipmentRental
        );
        assert!("DJ & Music".parse::<VendorCategory>().is_err());
    }

    #[test]
    fn test_category_json_matches_stored_code() {
        let json = serde_json::to_string(&VendorCategory::EquipmentRental).unwrap();
        assert_eq!(json, "\"EQUIPMENT_RENTAL\"");
        assert_eq!(VendorCategory::DjMusic.display_name(), "DJ & Music");
        assert_eq!(VendorCategory::Sound.display_name(), "Sound System");
    }

    #[test]
    fn test_category_groups_on_enum_column() {
        use crate::schema::vendors;
        use diesel::dsl::count_star;

        let query = vendors::table
            .filter(vendors::category.eq(VendorCategory::DjMusic))
            .group_by(vendors::category)
            .select((vendors::category, count_star()));
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&query).to_string();
        assert!(sql.contains("GROUP BY \"vendors\".\"category\""), "{sql}");
        assert!(sql.contains("DjMusic"), "{sql}");
    }
}
