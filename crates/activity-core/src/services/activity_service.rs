// ============================================================================
// Activity Core - Activity Service
// File: crates/activity-core/src/services/activity_service.rs
// ============================================================================
//! Activity consistency engine: categories, groups, and schedules.
//!
//! Supervisor and enrollment operations live in `activity_membership.rs` as a
//! second `impl` block on the same service.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    ActivityGroup, Category, GroupDetails, GroupFilter, Schedule, SupervisorAssignment, Validated,
};
use crate::error::{DomainError, EntityKind};
use crate::repositories::{
    CategoryRepository, EnrollmentRepository, GroupRepository, Repositories, ScheduleRepository,
    StaffDirectory, SupervisorRepository, Transaction, UnitOfWork,
};
use crate::services::ownership;

/// Operation names attached to every error the service returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    GetCategory,
    ListCategories,
    CreateGroup,
    UpdateGroup,
    DeleteGroup,
    GetGroup,
    GetGroupDetails,
    ListGroups,
    FindGroupsBySupervisor,
    CanModifyGroup,
    AddSchedule,
    UpdateSchedule,
    DeleteSchedule,
    GetSchedule,
    ListSchedules,
    UpdateGroupSupervisors,
    AddSupervisor,
    UpdateSupervisor,
    DeleteSupervisor,
    ListSupervisors,
    UpdateGroupEnrollments,
    EnrollStudent,
    UnenrollStudent,
    UpdateAttendance,
    ListEnrollments,
    ListStudentEnrollments,
}

impl Operation {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateCategory => "create category",
            Operation::UpdateCategory => "update category",
            Operation::DeleteCategory => "delete category",
            Operation::GetCategory => "get category",
            Operation::ListCategories => "list categories",
            Operation::CreateGroup => "create group",
            Operation::UpdateGroup => "update group",
            Operation::DeleteGroup => "delete group",
            Operation::GetGroup => "get group",
            Operation::GetGroupDetails => "get group details",
            Operation::ListGroups => "list groups",
            Operation::FindGroupsBySupervisor => "find groups by supervisor",
            Operation::CanModifyGroup => "can modify group",
            Operation::AddSchedule => "add schedule",
            Operation::UpdateSchedule => "update schedule",
            Operation::DeleteSchedule => "delete schedule",
            Operation::GetSchedule => "get schedule",
            Operation::ListSchedules => "list schedules",
            Operation::UpdateGroupSupervisors => "update group supervisors",
            Operation::AddSupervisor => "add supervisor",
            Operation::UpdateSupervisor => "update supervisor",
            Operation::DeleteSupervisor => "delete supervisor",
            Operation::ListSupervisors => "list supervisors",
            Operation::UpdateGroupEnrollments => "update group enrollments",
            Operation::EnrollStudent => "enroll student",
            Operation::UnenrollStudent => "unenroll student",
            Operation::UpdateAttendance => "update attendance",
            Operation::ListEnrollments => "list enrollments",
            Operation::ListStudentEnrollments => "list student enrollments",
        }
    }

    pub(crate) fn wrap(self) -> impl FnOnce(DomainError) -> DomainError {
        move |e| e.during(self.as_str())
    }
}

/// Commits on success, rolls back on failure. No retries.
pub(crate) async fn finish<T, X>(tx: X, result: Result<T, DomainError>) -> Result<T, DomainError>
where
    X: Transaction,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback failed after '{}': {}", e, rollback_err);
            }
            Err(e)
        }
    }
}

/// Activity consistency engine
pub struct ActivityService<U: UnitOfWork, D: StaffDirectory> {
    pub(crate) uow: Arc<U>,
    pub(crate) staff: Arc<D>,
    pub(crate) enforce_capacity: bool,
}

impl<U: UnitOfWork, D: StaffDirectory> ActivityService<U, D> {
    pub fn new(uow: Arc<U>, staff: Arc<D>) -> Self {
        Self {
            uow,
            staff,
            enforce_capacity: true,
        }
    }

    pub fn with_capacity_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_capacity = enforce;
        self
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub async fn create_category(&self, category: Category) -> Result<Category, DomainError> {
        async {
            category.check()?;
            let created = self.uow.categories().create(&category).await?;
            info!("Category created: {}", created.id);
            Ok::<_, DomainError>(created)
        }
        .await
        .map_err(Operation::CreateCategory.wrap())
    }

    pub async fn update_category(&self, category: Category) -> Result<Category, DomainError> {
        async {
            category.check()?;
            self.require_category(self.uow.as_ref(), &category.id).await?;
            self.uow.categories().update(&category).await
        }
        .await
        .map_err(Operation::UpdateCategory.wrap())
    }

    /// Rejected with `CategoryInUse` while any group still references it.
    pub async fn delete_category(&self, id: &Uuid) -> Result<(), DomainError> {
        async {
            let tx = self.uow.begin().await?;
            let result = async {
                self.require_category(&tx, id).await?;
                if !tx.groups().find_by_category(id).await?.is_empty() {
                    return Err(DomainError::CategoryInUse(*id));
                }
                tx.categories().delete(id).await
            }
            .await;
            finish(tx, result).await?;
            info!("Category deleted: {}", id);
            Ok::<_, DomainError>(())
        }
        .await
        .map_err(Operation::DeleteCategory.wrap())
    }

    pub async fn get_category(&self, id: &Uuid) -> Result<Category, DomainError> {
        self.require_category(self.uow.as_ref(), id)
            .await
            .map_err(Operation::GetCategory.wrap())
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.uow
            .categories()
            .list()
            .await
            .map_err(Operation::ListCategories.wrap())
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    /// Creates the group with its supervisors and schedules in one transaction.
    /// The first supervisor id becomes primary. Returns the re-read aggregate.
    pub async fn create_group(
        &self,
        group: ActivityGroup,
        supervisor_ids: &[Uuid],
        schedules: Vec<Schedule>,
    ) -> Result<GroupDetails, DomainError> {
        async {
            group.check()?;
            for schedule in &schedules {
                schedule.check()?;
            }
            let supervisor_ids = super::reconciliation::dedup_ordered(supervisor_ids);
            for staff_id in &supervisor_ids {
                self.require_staff(staff_id).await?;
            }

            let tx = self.uow.begin().await?;
            let result = async {
                self.require_category(&tx, &group.category_id).await?;
                let created = tx.groups().create(&group).await?;

                for (index, staff_id) in supervisor_ids.iter().enumerate() {
                    let assignment = SupervisorAssignment::new(created.id, *staff_id, index == 0);
                    tx.supervisors().create(&assignment).await?;
                }
                for mut schedule in schedules {
                    schedule.activity_group_id = created.id;
                    tx.schedules().create(&schedule).await?;
                }
                Ok(created)
            }
            .await;
            let created = finish(tx, result).await?;

            info!(
                "Activity group created: {} ({} supervisors)",
                created.id,
                supervisor_ids.len()
            );
            self.load_details(&created.id).await
        }
        .await
        .map_err(Operation::CreateGroup.wrap())
    }

    /// Validates, authorizes, then persists. `created_by` and `created_at`
    /// are kept from the stored row.
    pub async fn update_group(
        &self,
        group: ActivityGroup,
        requesting_staff_id: &Uuid,
        has_elevated_permission: bool,
    ) -> Result<ActivityGroup, DomainError> {
        async {
            group.check()?;
            self.authorize(&group.id, requesting_staff_id, has_elevated_permission)
                .await?;

            let tx = self.uow.begin().await?;
            let result = async {
                let existing = self.lock_group(&tx, &group.id).await?;
                self.require_category(&tx, &group.category_id).await?;

                let mut updated = group;
                updated.created_by = existing.created_by;
                updated.created_at = existing.created_at;
                updated.modified_at = Some(Utc::now());
                tx.groups().update(&updated).await
            }
            .await;
            let saved = finish(tx, result).await?;
            info!("Activity group updated: {}", saved.id);
            Ok::<_, DomainError>(saved)
        }
        .await
        .map_err(Operation::UpdateGroup.wrap())
    }

    /// Authorizes before opening the transaction, then removes enrollments,
    /// supervisors, schedules, and finally the group itself.
    pub async fn delete_group(
        &self,
        id: &Uuid,
        requesting_staff_id: &Uuid,
        has_elevated_permission: bool,
    ) -> Result<(), DomainError> {
        async {
            self.authorize(id, requesting_staff_id, has_elevated_permission)
                .await?;

            let tx = self.uow.begin().await?;
            let result = async {
                self.lock_group(&tx, id).await?;
                let enrollments = tx.enrollments().delete_by_group(id).await?;
                let supervisors = tx.supervisors().delete_by_group(id).await?;
                let schedules = tx.schedules().delete_by_group(id).await?;
                tx.groups().delete(id).await?;
                Ok((enrollments, supervisors, schedules))
            }
            .await;
            let (enrollments, supervisors, schedules) = finish(tx, result).await?;

            info!(
                "Activity group deleted: {} (enrollments: {}, supervisors: {}, schedules: {})",
                id, enrollments, supervisors, schedules
            );
            Ok::<_, DomainError>(())
        }
        .await
        .map_err(Operation::DeleteGroup.wrap())
    }

    pub async fn get_group(&self, id: &Uuid) -> Result<ActivityGroup, DomainError> {
        self.require_group(self.uow.as_ref(), id)
            .await
            .map_err(Operation::GetGroup.wrap())
    }

    pub async fn get_group_details(&self, id: &Uuid) -> Result<GroupDetails, DomainError> {
        self.load_details(id)
            .await
            .map_err(Operation::GetGroupDetails.wrap())
    }

    pub async fn list_groups(&self, filter: &GroupFilter) -> Result<Vec<ActivityGroup>, DomainError> {
        self.uow
            .groups()
            .list(filter)
            .await
            .map_err(Operation::ListGroups.wrap())
    }

    /// Groups the staff member currently supervises.
    pub async fn find_groups_by_supervisor(&self, staff_id: &Uuid) -> Result<Vec<ActivityGroup>, DomainError> {
        async {
            let assignments = self.uow.supervisors().find_by_staff(staff_id).await?;
            let mut groups = Vec::with_capacity(assignments.len());
            for assignment in assignments {
                match self.uow.groups().find_by_id(&assignment.group_id).await? {
                    Some(group) => groups.push(group),
                    None => warn!(
                        "Supervisor assignment {} points at missing group {}",
                        assignment.id, assignment.group_id
                    ),
                }
            }
            Ok::<_, DomainError>(groups)
        }
        .await
        .map_err(Operation::FindGroupsBySupervisor.wrap())
    }

    pub async fn can_modify_group(
        &self,
        group_id: &Uuid,
        staff_id: &Uuid,
        has_elevated_permission: bool,
    ) -> Result<bool, DomainError> {
        ownership::can_modify(
            self.uow.groups(),
            self.uow.supervisors(),
            group_id,
            staff_id,
            has_elevated_permission,
        )
        .await
        .map_err(Operation::CanModifyGroup.wrap())
    }

    // ------------------------------------------------------------------
    // Schedules
    // ------------------------------------------------------------------

    pub async fn add_schedule(&self, schedule: Schedule) -> Result<Schedule, DomainError> {
        async {
            schedule.check()?;
            self.require_group(self.uow.as_ref(), &schedule.activity_group_id)
                .await?;
            let created = self.uow.schedules().create(&schedule).await?;
            info!("Schedule {} added to group {}", created.id, created.activity_group_id);
            Ok::<_, DomainError>(created)
        }
        .await
        .map_err(Operation::AddSchedule.wrap())
    }

    /// A schedule never changes groups; such an update is a conflict.
    pub async fn update_schedule(&self, schedule: Schedule) -> Result<Schedule, DomainError> {
        async {
            schedule.check()?;
            let existing = self
                .uow
                .schedules()
                .find_by_id(&schedule.id)
                .await?
                .ok_or_else(|| DomainError::not_found(EntityKind::Schedule, schedule.id))?;

            if existing.activity_group_id != schedule.activity_group_id {
                return Err(DomainError::ScheduleGroupChange);
            }
            self.uow.schedules().update(&schedule).await
        }
        .await
        .map_err(Operation::UpdateSchedule.wrap())
    }

    pub async fn delete_schedule(&self, id: &Uuid) -> Result<(), DomainError> {
        async {
            self.uow
                .schedules()
                .find_by_id(id)
                .await?
                .ok_or_else(|| DomainError::not_found(EntityKind::Schedule, *id))?;
            self.uow.schedules().delete(id).await?;
            info!("Schedule deleted: {}", id);
            Ok::<_, DomainError>(())
        }
        .await
        .map_err(Operation::DeleteSchedule.wrap())
    }

    pub async fn get_schedule(&self, id: &Uuid) -> Result<Schedule, DomainError> {
        async {
            self.uow
                .schedules()
                .find_by_id(id)
                .await?
                .ok_or_else(|| DomainError::not_found(EntityKind::Schedule, *id))
        }
        .await
        .map_err(Operation::GetSchedule.wrap())
    }

    pub async fn list_schedules(&self, group_id: &Uuid) -> Result<Vec<Schedule>, DomainError> {
        async {
            self.require_group(self.uow.as_ref(), group_id).await?;
            self.uow.schedules().find_by_group(group_id).await
        }
        .await
        .map_err(Operation::ListSchedules.wrap())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    pub(crate) async fn authorize(
        &self,
        group_id: &Uuid,
        staff_id: &Uuid,
        has_elevated_permission: bool,
    ) -> Result<(), DomainError> {
        let allowed = ownership::can_modify(
            self.uow.groups(),
            self.uow.supervisors(),
            group_id,
            staff_id,
            has_elevated_permission,
        )
        .await?;

        if !allowed {
            warn!("Staff {} denied modification of group {}", staff_id, group_id);
            return Err(DomainError::NotOwner);
        }
        Ok(())
    }

    pub(crate) async fn require_staff(&self, staff_id: &Uuid) -> Result<(), DomainError> {
        if self.staff.exists(staff_id).await? {
            Ok(())
        } else {
            Err(DomainError::StaffNotFound(*staff_id))
        }
    }

    pub(crate) async fn require_group<R>(&self, repos: &R, id: &Uuid) -> Result<ActivityGroup, DomainError>
    where
        R: Repositories + ?Sized,
    {
        repos
            .groups()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Group, *id))
    }

    /// Like `require_group`, but holds the group's row lock until the
    /// transaction behind `repos` ends. Every mutating transaction on a group
    /// starts here so writers on the same group run one after another.
    pub(crate) async fn lock_group<R>(&self, repos: &R, id: &Uuid) -> Result<ActivityGroup, DomainError>
    where
        R: Repositories + ?Sized,
    {
        repos
            .groups()
            .lock_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Group, *id))
    }

    async fn require_category<R>(&self, repos: &R, id: &Uuid) -> Result<Category, DomainError>
    where
        R: Repositories + ?Sized,
    {
        repos
            .categories()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Category, *id))
    }

    async fn load_details(&self, id: &Uuid) -> Result<GroupDetails, DomainError> {
        let group = self.require_group(self.uow.as_ref(), id).await?;
        let supervisors = self.uow.supervisors().find_by_group(id).await?;
        let schedules = self.uow.schedules().find_by_group(id).await?;
        let enrollments = self.uow.enrollments().find_by_group(id).await?;

        Ok(GroupDetails {
            group,
            supervisors,
            schedules,
            enrollments,
        })
    }
}
