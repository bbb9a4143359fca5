//! Publisher model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A publisher; books embed a copy of it as a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Publisher {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PublisherInput {
    #[validate(length(min = 5, max = 50, message = "name must be 5 to 50 characters"))]
    pub name: String,
}
