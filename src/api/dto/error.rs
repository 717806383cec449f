//! Error response DTOs.

use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::error::ValidationFieldError;

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "code": "BAD_REQUEST",
    "message": "Event date must be in the future"
}))]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
            request_id: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }

    pub fn not_found_error(entity: &str, field: &str, value: &str) -> Self {
        Self::new("NOT_FOUND", &format!("{} not found", entity)).with_details(json!({
            "entity": entity,
            "field": field,
            "value": value,
        }))
    }

    pub fn duplicate_error(entity: &str, field: &str, value: &str) -> Self {
        Self::new(
            "DUPLICATE_ENTRY",
            &format!("{} with this {} already exists", entity, field),
        )
        .with_details(json!({
            "entity": entity,
            "field": field,
            "value": value,
        }))
    }

    pub fn validation_error(field: &str, reason: &str) -> Self {
        Self::new("VALIDATION_ERROR", reason).with_details(json!({ "field": field }))
    }

    /// One entry per failed field; the first failure becomes the message.
    pub fn validation_errors(errors: &[ValidationFieldError]) -> Self {
        let message = errors
            .first()
            .map(|e| e.message.as_str())
            .unwrap_or("Validation failed");
        Self::new("VALIDATION_ERROR", message).with_details(json!({ "errors": errors }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let json = serde_json::to_value(ErrorResponse::new("FORBIDDEN", "Access denied")).unwrap();
        assert_eq!(json, json!({"code": "FORBIDDEN", "message": "Access denied"}));
    }

    #[test]
    fn test_validation_errors_lead_with_first_message() {
        let errors = vec![
            ValidationFieldError {
                field: "guest_count".to_string(),
                message: "Guest count must be at least 1".to_string(),
            },
            ValidationFieldError {
                field: "rating".to_string(),
                message: "Rating must be between 1 and 5".to_string(),
            },
        ];
        let body = ErrorResponse::validation_errors(&errors).with_request_id("req-1");
        let json = serde_json::to_value(body).unwrap();

        assert_eq!(json["message"], "Guest count must be at least 1");
        assert_eq!(json["details"]["errors"][1]["field"], "rating");
        assert_eq!(json["request_id"], "req-1");
    }

    #[test]
    fn test_not_found_names_entity() {
        let body = ErrorResponse::not_found_error("Booking", "id", "9");
        assert_eq!(body.message, "Booking not found");
        assert_eq!(body.details.unwrap()["value"], "9");
    }
}
