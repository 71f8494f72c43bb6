// ============================================================================
// Activity Core - Schedule Entity
// File: crates/activity-core/src/domain/schedule.rs
// Description: Weekly time slot owned by one activity group
// ============================================================================

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Schedule entity. `activity_group_id` is fixed once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_time_range"))]
pub struct Schedule {
    pub id: Uuid,
    pub activity_group_id: Uuid,

    /// ISO weekday, Monday = 1.
    #[validate(range(min = 1, max = 7, message = "Day of week must be between 1 and 7"))]
    pub day_of_week: i16,

    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

fn validate_time_range(schedule: &Schedule) -> Result<(), ValidationError> {
    if schedule.start_time >= schedule.end_time {
        let mut err = ValidationError::new("time_range");
        err.message = Some("Start time must be before end time".into());
        return Err(err);
    }
    Ok(())
}

impl Schedule {
    pub fn new(activity_group_id: Uuid, day_of_week: i16, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id: activity_shared::new_id(),
            activity_group_id,
            day_of_week,
            start_time,
            end_time,
        }
    }
}
