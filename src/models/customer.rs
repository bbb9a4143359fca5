//! Customer model

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));

/// A library customer.
///
/// `has_book` is set while the customer has an open loan. Only the lending
/// lifecycle writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub has_book: bool,
}

impl Customer {
    pub fn new(input: CustomerInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            phone: input.phone,
            has_book: false,
        }
    }
}

/// Create/update customer request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CustomerInput {
    #[validate(length(min = 5, max = 50, message = "name must be 5 to 50 characters"))]
    pub name: String,
    #[validate(length(min = 9, max = 15, message = "phone must be 9 to 15 digits"))]
    #[validate(custom(function = "validate_digits"))]
    pub phone: String,
}

fn validate_digits(phone: &str) -> Result<(), ValidationError> {
    if !DIGITS.is_match(phone) {
        return Err(ValidationError::new("digits").with_message("phone must contain only digits".into()));
    }
    Ok(())
}
