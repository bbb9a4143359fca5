//! Author model and related types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
}

impl Author {
    pub fn new(input: AuthorInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: input.first_name,
            middle_name: input.middle_name,
            last_name: input.last_name,
        }
    }
}

/// Author fields embedded in a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSnapshot {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Author> for AuthorSnapshot {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
        }
    }
}

/// Create/update author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInput {
    #[validate(length(min = 2, max = 50, message = "firstName must be 2 to 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 50, message = "middleName must be 2 to 50 characters"))]
    pub middle_name: Option<String>,
    #[validate(length(min = 2, max = 50, message = "lastName must be 2 to 50 characters"))]
    pub last_name: String,
}
