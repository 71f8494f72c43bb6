use async_trait::async_trait;
use uuid::Uuid;

use activity_core::domain::{
    ActivityGroup, Category, Enrollment, GroupFilter, Schedule, SupervisorAssignment,
};
use activity_core::error::{DomainError, EntityKind};
use activity_core::repositories::{
    CategoryRepository, EnrollmentRepository, GroupRepository, Repositories, ScheduleRepository,
    SupervisorRepository,
};

use super::state::{constraint_violation, Handle};

#[derive(Clone)]
pub struct MemoryCategoryRepository {
    handle: Handle,
}

#[derive(Clone)]
pub struct MemoryGroupRepository {
    handle: Handle,
}

#[derive(Clone)]
pub struct MemoryScheduleRepository {
    handle: Handle,
}

#[derive(Clone)]
pub struct MemorySupervisorRepository {
    handle: Handle,
}

#[derive(Clone)]
pub struct MemoryEnrollmentRepository {
    handle: Handle,
}

/// One repository of each kind over the same table set.
#[derive(Clone)]
pub struct MemoryRepositories {
    categories: MemoryCategoryRepository,
    groups: MemoryGroupRepository,
    schedules: MemoryScheduleRepository,
    supervisors: MemorySupervisorRepository,
    enrollments: MemoryEnrollmentRepository,
}

impl MemoryRepositories {
    pub(crate) fn bound(handle: Handle) -> Self {
        Self {
            categories: MemoryCategoryRepository { handle: handle.clone() },
            groups: MemoryGroupRepository { handle: handle.clone() },
            schedules: MemoryScheduleRepository { handle: handle.clone() },
            supervisors: MemorySupervisorRepository { handle: handle.clone() },
            enrollments: MemoryEnrollmentRepository { handle },
        }
    }
}

impl Repositories for MemoryRepositories {
    type Categories = MemoryCategoryRepository;
    type Groups = MemoryGroupRepository;
    type Schedules = MemoryScheduleRepository;
    type Supervisors = MemorySupervisorRepository;
    type Enrollments = MemoryEnrollmentRepository;

    fn categories(&self) -> &MemoryCategoryRepository {
        &self.categories
    }
    fn groups(&self) -> &MemoryGroupRepository {
        &self.groups
    }
    fn schedules(&self) -> &MemoryScheduleRepository {
        &self.schedules
    }
    fn supervisors(&self) -> &MemorySupervisorRepository {
        &self.supervisors
    }
    fn enrollments(&self) -> &MemoryEnrollmentRepository {
        &self.enrollments
    }
}

/// Replaces the row whose id matches, or reports `NotFound`.
fn replace<T: Clone>(
    rows: &mut [T],
    id_of: impl Fn(&T) -> Uuid,
    row: &T,
    entity: EntityKind,
) -> Result<T, DomainError> {
    let id = id_of(row);
    let slot = rows
        .iter_mut()
        .find(|r| id_of(r) == id)
        .ok_or_else(|| DomainError::not_found(entity, id))?;
    *slot = row.clone();
    Ok(row.clone())
}

fn remove<T>(rows: &mut Vec<T>, id_of: impl Fn(&T) -> Uuid, id: &Uuid, entity: EntityKind) -> Result<(), DomainError> {
    let before = rows.len();
    rows.retain(|r| id_of(r) != *id);
    if rows.len() == before {
        return Err(DomainError::not_found(entity, *id));
    }
    Ok(())
}

fn remove_where<T>(rows: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> u64 {
    let before = rows.len();
    rows.retain(|r| !pred(r));
    (before - rows.len()) as u64
}

// ----------------------------------------------------------------------------
// Categories
// ----------------------------------------------------------------------------

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Category>, DomainError> {
        self.handle.read("categories.find_by_id", |s| {
            s.categories.iter().find(|c| c.id == *id).cloned()
        })
    }

    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        self.handle.read("categories.list", |s| {
            let mut categories = s.categories.clone();
            categories.sort_by(|a, b| a.name.cmp(&b.name));
            categories
        })
    }

    async fn create(&self, category: &Category) -> Result<Category, DomainError> {
        self.handle
            .write("categories.create", |s| {
                if s.categories.iter().any(|c| c.id == category.id) {
                    return Err(constraint_violation("activity_categories_pkey"));
                }
                s.categories.push(category.clone());
                Ok(category.clone())
            })
            .await
    }

    async fn update(&self, category: &Category) -> Result<Category, DomainError> {
        self.handle
            .write("categories.update", |s| {
                replace(&mut s.categories, |c| c.id, category, EntityKind::Category)
            })
            .await
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        self.handle
            .write("categories.delete", |s| {
                if s.groups.iter().any(|g| g.category_id == *id) {
                    return Err(constraint_violation("activity_groups_category_id_fkey"));
                }
                remove(&mut s.categories, |c| c.id, id, EntityKind::Category)
            })
            .await
    }
}

// ----------------------------------------------------------------------------
// Groups
// ----------------------------------------------------------------------------

fn by_name<'a>(groups: impl Iterator<Item = &'a ActivityGroup>) -> Vec<ActivityGroup> {
    let mut groups: Vec<ActivityGroup> = groups.cloned().collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name));
    groups
}

#[async_trait]
impl GroupRepository for MemoryGroupRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ActivityGroup>, DomainError> {
        self.handle.read("groups.find_by_id", |s| {
            s.groups.iter().find(|g| g.id == *id).cloned()
        })
    }

    // Writers already hold the store gate, so locking is a plain read.
    async fn lock_by_id(&self, id: &Uuid) -> Result<Option<ActivityGroup>, DomainError> {
        self.handle.read("groups.lock_by_id", |s| {
            s.groups.iter().find(|g| g.id == *id).cloned()
        })
    }

    async fn find_by_category(&self, category_id: &Uuid) -> Result<Vec<ActivityGroup>, DomainError> {
        self.handle.read("groups.find_by_category", |s| {
            by_name(s.groups.iter().filter(|g| g.category_id == *category_id))
        })
    }

    async fn list(&self, filter: &GroupFilter) -> Result<Vec<ActivityGroup>, DomainError> {
        self.handle.read("groups.list", |s| {
            by_name(s.groups.iter().filter(|g| filter.matches(g)))
        })
    }

    async fn create(&self, group: &ActivityGroup) -> Result<ActivityGroup, DomainError> {
        self.handle
            .write("groups.create", |s| {
                if !s.categories.iter().any(|c| c.id == group.category_id) {
                    return Err(constraint_violation("activity_groups_category_id_fkey"));
                }
                if s.has_group(&group.id) {
                    return Err(constraint_violation("activity_groups_pkey"));
                }
                s.groups.push(group.clone());
                Ok(group.clone())
            })
            .await
    }

    async fn update(&self, group: &ActivityGroup) -> Result<ActivityGroup, DomainError> {
        self.handle
            .write("groups.update", |s| {
                if !s.categories.iter().any(|c| c.id == group.category_id) {
                    return Err(constraint_violation("activity_groups_category_id_fkey"));
                }
                replace(&mut s.groups, |g| g.id, group, EntityKind::Group)
            })
            .await
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        self.handle
            .write("groups.delete", |s| {
                let referenced = s.schedules.iter().any(|r| r.activity_group_id == *id)
                    || s.supervisors.iter().any(|r| r.group_id == *id)
                    || s.enrollments.iter().any(|r| r.activity_group_id == *id);
                if referenced {
                    return Err(constraint_violation("activity group still referenced"));
                }
                remove(&mut s.groups, |g| g.id, id, EntityKind::Group)
            })
            .await
    }
}

// ----------------------------------------------------------------------------
// Schedules
// ----------------------------------------------------------------------------

#[async_trait]
impl ScheduleRepository for MemoryScheduleRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Schedule>, DomainError> {
        self.handle.read("schedules.find_by_id", |s| {
            s.schedules.iter().find(|r| r.id == *id).cloned()
        })
    }

    async fn find_by_group(&self, group_id: &Uuid) -> Result<Vec<Schedule>, DomainError> {
        self.handle.read("schedules.find_by_group", |s| {
            let mut rows: Vec<Schedule> = s
                .schedules
                .iter()
                .filter(|r| r.activity_group_id == *group_id)
                .cloned()
                .collect();
            rows.sort_by_key(|r| (r.day_of_week, r.start_time));
            rows
        })
    }

    async fn create(&self, schedule: &Schedule) -> Result<Schedule, DomainError> {
        self.handle
            .write("schedules.create", |s| {
                if !s.has_group(&schedule.activity_group_id) {
                    return Err(constraint_violation("activity_schedules_activity_group_id_fkey"));
                }
                s.schedules.push(schedule.clone());
                Ok(schedule.clone())
            })
            .await
    }

    async fn update(&self, schedule: &Schedule) -> Result<Schedule, DomainError> {
        self.handle
            .write("schedules.update", |s| {
                let slot = s
                    .schedules
                    .iter_mut()
                    .find(|r| r.id == schedule.id)
                    .ok_or_else(|| DomainError::not_found(EntityKind::Schedule, schedule.id))?;
                slot.day_of_week = schedule.day_of_week;
                slot.start_time = schedule.start_time;
                slot.end_time = schedule.end_time;
                Ok(slot.clone())
            })
            .await
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        self.handle
            .write("schedules.delete", |s| {
                remove(&mut s.schedules, |r| r.id, id, EntityKind::Schedule)
            })
            .await
    }

    async fn delete_by_group(&self, group_id: &Uuid) -> Result<u64, DomainError> {
        self.handle
            .write("schedules.delete_by_group", |s| {
                Ok(remove_where(&mut s.schedules, |r| r.activity_group_id == *group_id))
            })
            .await
    }
}

// ----------------------------------------------------------------------------
// Supervisors
// ----------------------------------------------------------------------------

#[async_trait]
impl SupervisorRepository for MemorySupervisorRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<SupervisorAssignment>, DomainError> {
        self.handle.read("supervisors.find_by_id", |s| {
            s.supervisors.iter().find(|r| r.id == *id).cloned()
        })
    }

    async fn find_by_group(&self, group_id: &Uuid) -> Result<Vec<SupervisorAssignment>, DomainError> {
        self.handle.read("supervisors.find_by_group", |s| {
            s.supervisors
                .iter()
                .filter(|r| r.group_id == *group_id)
                .cloned()
                .collect()
        })
    }

    async fn find_by_staff(&self, staff_id: &Uuid) -> Result<Vec<SupervisorAssignment>, DomainError> {
        self.handle.read("supervisors.find_by_staff", |s| {
            s.supervisors
                .iter()
                .filter(|r| r.staff_id == *staff_id)
                .cloned()
                .collect()
        })
    }

    async fn create(&self, assignment: &SupervisorAssignment) -> Result<SupervisorAssignment, DomainError> {
        self.handle
            .write("supervisors.create", |s| {
                if !s.has_group(&assignment.group_id) {
                    return Err(constraint_violation("activity_group_supervisors_group_id_fkey"));
                }
                let siblings = s.supervisors.iter().filter(|r| r.group_id == assignment.group_id);
                let mut primary_taken = false;
                for sibling in siblings {
                    if sibling.staff_id == assignment.staff_id {
                        return Err(DomainError::DuplicateSupervisor {
                            group_id: assignment.group_id,
                            staff_id: assignment.staff_id,
                        });
                    }
                    primary_taken |= sibling.is_primary;
                }
                if assignment.is_primary && primary_taken {
                    return Err(constraint_violation("uq_activity_group_primary_supervisor"));
                }
                s.supervisors.push(assignment.clone());
                Ok(assignment.clone())
            })
            .await
    }

    async fn update(&self, assignment: &SupervisorAssignment) -> Result<SupervisorAssignment, DomainError> {
        self.handle
            .write("supervisors.update", |s| {
                let others = s
                    .supervisors
                    .iter()
                    .filter(|r| r.group_id == assignment.group_id && r.id != assignment.id);
                for other in others {
                    if other.staff_id == assignment.staff_id {
                        return Err(DomainError::DuplicateSupervisor {
                            group_id: assignment.group_id,
                            staff_id: assignment.staff_id,
                        });
                    }
                    if other.is_primary && assignment.is_primary {
                        return Err(constraint_violation("uq_activity_group_primary_supervisor"));
                    }
                }

                let slot = s
                    .supervisors
                    .iter_mut()
                    .find(|r| r.id == assignment.id)
                    .ok_or_else(|| DomainError::not_found(EntityKind::Supervisor, assignment.id))?;
                slot.staff_id = assignment.staff_id;
                slot.is_primary = assignment.is_primary;
                Ok(slot.clone())
            })
            .await
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        self.handle
            .write("supervisors.delete", |s| {
                remove(&mut s.supervisors, |r| r.id, id, EntityKind::Supervisor)
            })
            .await
    }

    async fn delete_by_group(&self, group_id: &Uuid) -> Result<u64, DomainError> {
        self.handle
            .write("supervisors.delete_by_group", |s| {
                Ok(remove_where(&mut s.supervisors, |r| r.group_id == *group_id))
            })
            .await
    }
}

// ----------------------------------------------------------------------------
// Enrollments
// ----------------------------------------------------------------------------

#[async_trait]
impl EnrollmentRepository for MemoryEnrollmentRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Enrollment>, DomainError> {
        self.handle.read("enrollments.find_by_id", |s| {
            s.enrollments.iter().find(|r| r.id == *id).cloned()
        })
    }

    async fn find_by_group(&self, group_id: &Uuid) -> Result<Vec<Enrollment>, DomainError> {
        self.handle.read("enrollments.find_by_group", |s| {
            s.enrollments
                .iter()
                .filter(|r| r.activity_group_id == *group_id)
                .cloned()
                .collect()
        })
    }

    async fn find_by_student(&self, student_id: &Uuid) -> Result<Vec<Enrollment>, DomainError> {
        self.handle.read("enrollments.find_by_student", |s| {
            s.enrollments
                .iter()
                .filter(|r| r.student_id == *student_id)
                .cloned()
                .collect()
        })
    }

    async fn find_by_group_and_student(
        &self,
        group_id: &Uuid,
        student_id: &Uuid,
    ) -> Result<Option<Enrollment>, DomainError> {
        self.handle.read("enrollments.find_by_group_and_student", |s| {
            s.enrollments
                .iter()
                .find(|r| r.activity_group_id == *group_id && r.student_id == *student_id)
                .cloned()
        })
    }

    async fn create(&self, enrollment: &Enrollment) -> Result<Enrollment, DomainError> {
        self.handle
            .write("enrollments.create", |s| {
                if !s.has_group(&enrollment.activity_group_id) {
                    return Err(constraint_violation("activity_enrollments_activity_group_id_fkey"));
                }
                let duplicate = s.enrollments.iter().any(|r| {
                    r.activity_group_id == enrollment.activity_group_id
                        && r.student_id == enrollment.student_id
                });
                if duplicate {
                    return Err(DomainError::DuplicateEnrollment {
                        group_id: enrollment.activity_group_id,
                        student_id: enrollment.student_id,
                    });
                }
                s.enrollments.push(enrollment.clone());
                Ok(enrollment.clone())
            })
            .await
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<Enrollment, DomainError> {
        self.handle
            .write("enrollments.update", |s| {
                let slot = s
                    .enrollments
                    .iter_mut()
                    .find(|r| r.id == enrollment.id)
                    .ok_or_else(|| DomainError::not_found(EntityKind::Enrollment, enrollment.id))?;
                slot.enrollment_date = enrollment.enrollment_date;
                slot.attendance_status = enrollment.attendance_status;
                Ok(slot.clone())
            })
            .await
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        self.handle
            .write("enrollments.delete", |s| {
                remove(&mut s.enrollments, |r| r.id, id, EntityKind::Enrollment)
            })
            .await
    }

    async fn delete_by_group(&self, group_id: &Uuid) -> Result<u64, DomainError> {
        self.handle
            .write("enrollments.delete_by_group", |s| {
                Ok(remove_where(&mut s.enrollments, |r| r.activity_group_id == *group_id))
            })
            .await
    }
}
