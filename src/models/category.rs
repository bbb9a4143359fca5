//! Category model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A category; books embed a copy of it as a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryInput {
    #[validate(length(min = 3, max = 50, message = "name must be 3 to 50 characters"))]
    pub name: String,
}
