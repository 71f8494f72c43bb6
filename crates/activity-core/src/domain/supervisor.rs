// ============================================================================
// Activity Core - Supervisor Assignment Entity
// File: crates/activity-core/src/domain/supervisor.rs
// Description: Staff-to-group assignment with the primary flag
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supervisor assignment, unique per (group_id, staff_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorAssignment {
    pub id: Uuid,
    pub group_id: Uuid,
    pub staff_id: Uuid,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl SupervisorAssignment {
    pub fn new(group_id: Uuid, staff_id: Uuid, is_primary: bool) -> Self {
        Self {
            id: activity_shared::new_id(),
            group_id,
            staff_id,
            is_primary,
            created_at: Utc::now(),
        }
    }
}
