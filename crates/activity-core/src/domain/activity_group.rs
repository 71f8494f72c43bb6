// ============================================================================
// Activity Core - Activity Group Entity
// File: crates/activity-core/src/domain/activity_group.rs
// Description: Activity group plus the aggregate view with its owned rows
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Enrollment, Schedule, SupervisorAssignment};

/// Activity Group entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ActivityGroup {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Group name must be between 1 and 100 characters"))]
    pub name: String,

    pub category_id: Uuid,

    #[validate(range(min = 1, message = "Max participants must be positive"))]
    pub max_participants: i32,

    /// Staff id of the creator; never changed by an update.
    pub created_by: Uuid,
    pub room_id: Option<Uuid>,
    pub is_open: bool,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl ActivityGroup {
    pub fn new(name: &str, category_id: Uuid, max_participants: i32, created_by: Uuid) -> Self {
        Self {
            id: activity_shared::new_id(),
            name: name.trim().to_string(),
            category_id,
            max_participants,
            created_by,
            room_id: None,
            is_open: true,
            created_at: Utc::now(),
            modified_at: None,
        }
    }

    pub fn with_room(mut self, room_id: Uuid) -> Self {
        self.room_id = Some(room_id);
        self
    }

    pub fn is_full(&self, enrolled: usize) -> bool {
        enrolled >= self.max_participants.max(0) as usize
    }
}

/// Group together with every row it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetails {
    pub group: ActivityGroup,
    pub supervisors: Vec<SupervisorAssignment>,
    pub schedules: Vec<Schedule>,
    pub enrollments: Vec<Enrollment>,
}

impl GroupDetails {
    pub fn primary_supervisor(&self) -> Option<&SupervisorAssignment> {
        self.supervisors.iter().find(|s| s.is_primary)
    }
}

/// List filter; unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupFilter {
    pub category_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub is_open: Option<bool>,
}

impl GroupFilter {
    pub fn matches(&self, group: &ActivityGroup) -> bool {
        self.category_id.map_or(true, |c| c == group.category_id)
            && self.created_by.map_or(true, |s| s == group.created_by)
            && self.is_open.map_or(true, |o| o == group.is_open)
    }
}
