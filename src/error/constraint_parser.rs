use regex::Regex;
use std::sync::LazyLock;

/// Pulls table, column and offending value out of PostgreSQL constraint
/// violation reports.
///
/// Constraint names follow the PostgreSQL defaults used by the migrations:
/// `<table>_<column>_<suffix>` where the suffix is one of `key`, `fkey`,
/// `check`, `idx` or `pkey`. Column names may themselves contain underscores.
pub struct ConstraintParser;

const CONSTRAINT_SUFFIXES: [&str; 5] = ["_fkey", "_pkey", "_key", "_check", "_idx"];

/// Matches "Key (field)=(value)" in the DETAIL line.
static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("valid key/value regex"));
static COLUMN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"column "([^"]+)""#).expect("valid column regex"));
static TABLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:table|relation) "([^"]+)""#).expect("valid table regex")
});

impl ConstraintParser {
    /// Parses a unique violation into `(entity, field, value)`.
    ///
    /// # Arguments
    /// * `message` - The database error message, including any DETAIL text
    /// * `constraint_name` - Constraint name reported by the server, if any
    ///
    /// # Returns
    /// `None` when neither the constraint name nor the message identify a column
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        if let Some((entity, field)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = Self::extract_key_value_from_message(message)
                .map(|(_, value)| value)
                .unwrap_or_else(|| "duplicate_value".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = Self::extract_key_value_from_message(message)?;
        let entity =
            Self::extract_table_from_message(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Parses a not-null violation into `(entity, field)`.
    pub fn parse_not_null_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        let field = Self::extract_column_from_message(message)?;
        let entity = Self::extract_table_from_message(message)
            .or_else(|| constraint_name.and_then(Self::parse_constraint_name).map(|(e, _)| e))
            .unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Parses a foreign key violation into `(entity, field, referenced_value)`.
    pub fn parse_foreign_key_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        if let Some((entity, field)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = Self::extract_key_value_from_message(message)
                .map(|(_, value)| value)
                .unwrap_or_else(|| "invalid_reference".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = Self::extract_key_value_from_message(message)?;
        let entity =
            Self::extract_table_from_message(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Parses a check violation into `(entity, field)`.
    pub fn parse_check_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        if let Some(parsed) = constraint_name.and_then(Self::parse_constraint_name) {
            return Some(parsed);
        }
        let field = Self::extract_column_from_message(message)?;
        let entity =
            Self::extract_table_from_message(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Splits a constraint name into table and column.
    ///
    /// - `users_email_key` -> (`users`, `email`)
    /// - `vendors_user_id_key` -> (`vendors`, `user_id`)
    /// - `bookings_guest_count_check` -> (`bookings`, `guest_count`)
    pub fn parse_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint_name.strip_suffix(suffix))?;
        let (entity, field) = stem.split_once('_')?;
        if entity.is_empty() || field.is_empty() {
            return None;
        }
        Some((entity.to_string(), field.to_string()))
    }

    pub fn extract_column_from_message(message: &str) -> Option<String> {
        COLUMN_NAME
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_table_from_message(message: &str) -> Option<String> {
        TABLE_NAME
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Extracts `(field, value)` from a `Key (field)=(value)` fragment.
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        KEY_VALUE.captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unique_violation_with_constraint_name() {
        let message = "duplicate key value violates unique constraint \"users_email_key\"\nDETAIL: Key (email)=(test@example.com) already exists.";
        let result = ConstraintParser::parse_unique_violation(message, Some("users_email_key"));
        assert_eq!(
            result,
            Some((
                "users".to_string(),
                "email".to_string(),
                "test@example.com".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_unique_violation_on_multi_word_column() {
        let message = "duplicate key value violates unique constraint \"reviews_booking_id_key\"\nDETAIL: Key (booking_id)=(42) already exists.";
        let result =
            ConstraintParser::parse_unique_violation(message, Some("reviews_booking_id_key"));
        assert_eq!(
            result,
            Some((
                "reviews".to_string(),
                "booking_id".to_string(),
                "42".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_unique_violation_without_constraint_name() {
        let message = "duplicate key value violates unique constraint\nDETAIL: Key (username)=(john_doe) already exists.";
        let result = ConstraintParser::parse_unique_violation(message, None);
        assert_eq!(
            result,
            Some((
                "resource".to_string(),
                "username".to_string(),
                "john_doe".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_not_null_violation_reads_relation() {
        let message =
            "null value in column \"email\" of relation \"users\" violates not-null constraint";
        let result = ConstraintParser::parse_not_null_violation(message, None);
        assert_eq!(result, Some(("users".to_string(), "email".to_string())));

        let message = "null value in column \"email\" violates not-null constraint";
        let result = ConstraintParser::parse_not_null_violation(message, None);
        assert_eq!(result, Some(("resource".to_string(), "email".to_string())));
    }

    #[test]
    fn test_parse_foreign_key_violation() {
        let message = "insert or update on table \"bookings\" violates foreign key constraint \"bookings_vendor_id_fkey\"\nDETAIL: Key (vendor_id)=(999) is not present in table \"vendors\".";
        let result =
            ConstraintParser::parse_foreign_key_violation(message, Some("bookings_vendor_id_fkey"));
        assert_eq!(
            result,
            Some((
                "bookings".to_string(),
                "vendor_id".to_string(),
                "999".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_check_violation() {
        let message =
            "new row for relation \"reviews\" violates check constraint \"reviews_rating_check\"";
        let result = ConstraintParser::parse_check_violation(message, Some("reviews_rating_check"));
        assert_eq!(result, Some(("reviews".to_string(), "rating".to_string())));
    }

    #[test]
    fn test_parse_constraint_name() {
        assert_eq!(
            ConstraintParser::parse_constraint_name("vendors_user_id_key"),
            Some(("vendors".to_string(), "user_id".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("bookings_guest_count_check"),
            Some(("bookings".to_string(), "guest_count".to_string()))
        );
        assert_eq!(ConstraintParser::parse_constraint_name("invalid"), None);
        assert_eq!(ConstraintParser::parse_constraint_name("users_key"), None);
    }

    #[test]
    fn test_graceful_parsing_failures() {
        let message = "completely unrelated error message";
        assert_eq!(ConstraintParser::parse_unique_violation(message, None), None);
        assert_eq!(ConstraintParser::parse_not_null_violation(message, None), None);
        assert_eq!(ConstraintParser::parse_foreign_key_violation(message, None), None);
        assert_eq!(ConstraintParser::parse_check_violation(message, None), None);
    }
}
