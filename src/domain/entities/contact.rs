use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::FieldError;

/// Missing fields deserialize as empty and are then reported by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ContactForm {
    #[validate(length(min = 3, max = 100, message = "Name must be between 3 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    #[validate(length(min = 3, max = 150, message = "Subject must be between 3 and 150 characters"))]
    pub subject: String,

    #[validate(length(min = 10, max = 5000, message = "Message must be between 10 and 5000 characters"))]
    pub message: String,
}

/// Body of every contact endpoint response, success or not.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ContactResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        ContactResponse { success: true, message: message.into(), errors: Vec::new() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ContactResponse { success: false, message: message.into(), errors: Vec::new() }
    }

    pub fn invalid(errors: Vec<FieldError>) -> Self {
        ContactResponse {
            success: false,
            message: "Validation failed".to_string(),
            errors,
        }
    }
}

/// A rendered email ready for the transactional mail API.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
}
