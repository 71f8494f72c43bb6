// ============================================================================
// Activity Core - Category Entity
// File: crates/activity-core/src/domain/category.rs
// Description: Category an activity group is filed under
// ============================================================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Category {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Category name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description too long"))]
    pub description: Option<String>,
}

impl Category {
    pub fn new(name: &str, description: Option<&str>) -> Self {
        Self {
            id: activity_shared::new_id(),
            name: name.trim().to_string(),
            description: description.map(|d| d.trim().to_string()),
        }
    }
}
