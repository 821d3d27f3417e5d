/// Response envelope for the request pipeline
///
/// Every pipeline operation reports back through [`ApiResponse`]: either a
/// success carrying a payload, or a failure carrying a machine-readable code,
/// a message, and zero or more field-level validation errors.
///
/// # Wire format
///
/// ```json
/// { "status": "success", "message": "Success", "data": { ... } }
/// { "status": "failure", "code": "validation_error",
///   "message": "Request validation failed",
///   "errors": [ { "field": "email", "message": "Email is required" } ] }
/// ```

use serde::{Deserialize, Serialize};

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Ordered collection of field-level validation failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for `field`
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// True when no failures were recorded
    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded failures
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Same as [`FieldErrors::is_valid`]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any failure was recorded for `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Appends failures for fields that have none yet
    pub fn merge_new_fields(&mut self, other: FieldErrors) {
        for error in other.0 {
            if !self.has_field(&error.field) {
                self.0.push(error);
            }
        }
    }

    /// Iterates over recorded failures
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        // field_errors() is a HashMap; keep output stable
        details.sort_by(|a, b| a.field.cmp(&b.field));

        Self(details)
    }
}

/// Tagged result returned to the request pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApiResponse<T> {
    /// Operation succeeded
    Success {
        /// Human-readable summary
        message: String,

        /// Operation payload
        data: T,
    },

    /// Operation failed
    Failure {
        /// Error code (e.g., "validation_error", "unauthorized")
        code: String,

        /// Human-readable error message
        message: String,

        /// Field-level validation errors, empty for non-validation failures
        #[serde(default, skip_serializing_if = "FieldErrors::is_empty")]
        errors: FieldErrors,
    },
}

impl<T> ApiResponse<T> {
    /// Success with the default message
    pub fn success(data: T) -> Self {
        ApiResponse::Success {
            message: "Success".to_string(),
            data,
        }
    }

    /// Failure without field errors
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiResponse::Failure {
            code: code.into(),
            message: message.into(),
            errors: FieldErrors::new(),
        }
    }

    /// True for the success variant
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    /// Payload of a success, if any
    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success { data, .. } => Some(data),
            ApiResponse::Failure { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Title is required"))]
        title: String,

        #[validate(range(min = 1, max = 5, message = "Priority must be 1-5"))]
        priority: u8,
    }

    #[test]
    fn test_field_errors_collect() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_valid());

        errors.add("email", "Email is required");
        errors.add("password", "Password is required");

        assert!(!errors.is_valid());
        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("email"));
        assert!(!errors.has_field("repeat_password"));
    }

    #[test]
    fn test_merge_skips_existing_fields() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Email is required");

        let mut other = FieldErrors::new();
        other.add("email", "Invalid email format");
        other.add("repeat_password", "mismatch");
        errors.merge_new_fields(other);

        let fields: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(fields, vec!["Email is required", "mismatch"]);
    }

    #[test]
    fn test_from_validator_errors() {
        let sample = Sample {
            title: String::new(),
            priority: 9,
        };
        let errors: FieldErrors = sample.validate().unwrap_err().into();

        let pairs: Vec<_> = errors
            .iter()
            .map(|e| (e.field.as_str(), e.message.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("priority", "Priority must be 1-5"),
                ("title", "Title is required"),
            ]
        );
    }

    #[test]
    fn test_success_wire_format() {
        let response = ApiResponse::success(json!({ "id": 1 }));

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "status": "success", "message": "Success", "data": { "id": 1 } })
        );
        assert!(response.is_success());
    }

    #[test]
    fn test_failure_wire_format() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Email is required");
        let response: ApiResponse<()> = ApiResponse::Failure {
            code: "validation_error".to_string(),
            message: "Request validation failed".to_string(),
            errors,
        };

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "failure",
                "code": "validation_error",
                "message": "Request validation failed",
                "errors": [{ "field": "email", "message": "Email is required" }]
            })
        );
        assert!(response.data().is_none());
    }

    #[test]
    fn test_failure_without_errors_omits_list() {
        let response: ApiResponse<()> = ApiResponse::failure("unauthorized", "Invalid email or password");
        let value = serde_json::to_value(&response).unwrap();

        assert!(value.get("errors").is_none());
    }
}
