//! Domain errors

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Entity named by a not-found error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Category,
    Group,
    Schedule,
    Supervisor,
    Enrollment,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Group => "activity group",
            EntityKind::Schedule => "schedule",
            EntityKind::Supervisor => "supervisor",
            EntityKind::Enrollment => "enrollment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification a boundary layer maps to its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Unauthorized,
    Conflict,
    Internal,
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("Staff member not found: {0}")]
    StaffNotFound(Uuid),

    #[error("Student {student_id} is not enrolled in activity group {group_id}")]
    NotEnrolled { group_id: Uuid, student_id: Uuid },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not allowed to modify this activity")]
    NotOwner,

    #[error("Staff {staff_id} already supervises activity group {group_id}")]
    DuplicateSupervisor { group_id: Uuid, staff_id: Uuid },

    #[error("Student {student_id} already enrolled in activity group {group_id}")]
    DuplicateEnrollment { group_id: Uuid, student_id: Uuid },

    #[error("Cannot remove all supervisors from an activity")]
    CannotRemoveAllSupervisors,

    #[error("Cannot delete the only supervisor for an activity")]
    LastSupervisor,

    #[error("Cannot demote the primary supervisor without promoting another")]
    PrimaryRequired,

    #[error("Schedule cannot be moved to a different activity group")]
    ScheduleGroupChange,

    #[error("Supervisor assignment cannot be moved to a different activity group")]
    SupervisorGroupChange,

    #[error("Category {0} is still referenced by activity groups")]
    CategoryInUse(Uuid),

    #[error("Activity group {group_id} is full ({max_participants} participants)")]
    GroupFull { group_id: Uuid, max_participants: i32 },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("{op}: {source}")]
    Operation {
        op: &'static str,
        #[source]
        source: Box<DomainError>,
    },
}

impl DomainError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        DomainError::NotFound { entity, id }
    }

    /// Wraps the error with the name of the operation that failed.
    pub fn during(self, op: &'static str) -> Self {
        DomainError::Operation {
            op,
            source: Box::new(self),
        }
    }

    /// Innermost error, past any operation wrappers.
    pub fn root(&self) -> &DomainError {
        match self {
            DomainError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            DomainError::NotFound { .. }
            | DomainError::StaffNotFound(_)
            | DomainError::NotEnrolled { .. } => ErrorKind::NotFound,
            DomainError::ValidationError(_) => ErrorKind::Validation,
            DomainError::NotOwner => ErrorKind::Unauthorized,
            DomainError::DuplicateSupervisor { .. }
            | DomainError::DuplicateEnrollment { .. }
            | DomainError::CannotRemoveAllSupervisors
            | DomainError::LastSupervisor
            | DomainError::PrimaryRequired
            | DomainError::ScheduleGroupChange
            | DomainError::SupervisorGroupChange
            | DomainError::CategoryInUse(_)
            | DomainError::GroupFull { .. } => ErrorKind::Conflict,
            DomainError::DatabaseError(_)
            | DomainError::InternalError(_)
            | DomainError::Operation { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(crate::domain::validation::first_violation(&errors))
    }
}
