// ============================================================================
// Activity Core - Enrollment Entity
// File: crates/activity-core/src/domain/enrollment.rs
// Description: Student membership in an activity group
// ============================================================================

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attendance status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Excused,
    Unknown,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Excused => "excused",
            AttendanceStatus::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            "excused" => Some(AttendanceStatus::Excused),
            "unknown" => Some(AttendanceStatus::Unknown),
            _ => None,
        }
    }
}

/// Enrollment entity, unique per (activity_group_id, student_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub activity_group_id: Uuid,
    pub enrollment_date: NaiveDate,
    pub attendance_status: Option<AttendanceStatus>,
}

impl Enrollment {
    pub fn new(activity_group_id: Uuid, student_id: Uuid) -> Self {
        Self {
            id: activity_shared::new_id(),
            student_id,
            activity_group_id,
            enrollment_date: Utc::now().date_naive(),
            attendance_status: None,
        }
    }
}
