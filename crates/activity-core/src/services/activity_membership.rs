//! Supervisor and enrollment operations of the activity service.

use tracing::info;
use uuid::Uuid;

use super::activity_service::{finish, Operation};
use super::primary_supervisor;
use super::reconciliation::{dedup_ordered, reconcile};
use super::ActivityService;
use crate::domain::{AttendanceStatus, Enrollment, SupervisorAssignment};
use crate::error::{DomainError, EntityKind};
use crate::repositories::{
    EnrollmentRepository, Repositories, StaffDirectory, SupervisorRepository, UnitOfWork,
};

impl<U: UnitOfWork, D: StaffDirectory> ActivityService<U, D> {
    // ------------------------------------------------------------------
    // Supervisors
    // ------------------------------------------------------------------

    /// Replaces the group's supervisors with `staff_ids`. The first id ends up
    /// as the only primary. An empty list is rejected while supervisors exist.
    pub async fn update_group_supervisors(
        &self,
        group_id: &Uuid,
        staff_ids: &[Uuid],
    ) -> Result<Vec<SupervisorAssignment>, DomainError> {
        async {
            let desired = dedup_ordered(staff_ids);

            let tx = self.uow.begin().await?;
            let result = async {
                self.lock_group(&tx, group_id).await?;
                let current = tx.supervisors().find_by_group(group_id).await?;

                let Some(primary) = desired.first() else {
                    if current.is_empty() {
                        return Ok(current);
                    }
                    return Err(DomainError::CannotRemoveAllSupervisors);
                };

                let pairs: Vec<(Uuid, Uuid)> = current.iter().map(|s| (s.staff_id, s.id)).collect();
                let plan = reconcile(&pairs, &desired);

                for staff_id in &plan.to_add {
                    self.require_staff(staff_id).await?;
                }
                for assignment_id in &plan.to_remove {
                    tx.supervisors().delete(assignment_id).await?;
                }
                for staff_id in &plan.to_add {
                    let assignment = SupervisorAssignment::new(*group_id, *staff_id, false);
                    tx.supervisors().create(&assignment).await?;
                }

                let settled = primary_supervisor::enforce_primary(&tx, group_id, primary).await?;
                info!(
                    "Supervisors reconciled for group {} (removed: {}, added: {})",
                    group_id,
                    plan.to_remove.len(),
                    plan.to_add.len()
                );
                Ok(settled)
            }
            .await;
            finish(tx, result).await
        }
        .await
        .map_err(Operation::UpdateGroupSupervisors.wrap())
    }

    pub async fn add_supervisor(
        &self,
        group_id: &Uuid,
        staff_id: &Uuid,
        is_primary: bool,
    ) -> Result<SupervisorAssignment, DomainError> {
        async {
            self.require_staff(staff_id).await?;

            let tx = self.uow.begin().await?;
            let result = async {
                self.lock_group(&tx, group_id).await?;
                let assignment = SupervisorAssignment::new(*group_id, *staff_id, is_primary);
                primary_supervisor::add(&tx, assignment).await
            }
            .await;
            finish(tx, result).await
        }
        .await
        .map_err(Operation::AddSupervisor.wrap())
    }

    pub async fn update_supervisor(
        &self,
        assignment: SupervisorAssignment,
    ) -> Result<SupervisorAssignment, DomainError> {
        async {
            let tx = self.uow.begin().await?;
            let result = async {
                let existing = self.require_supervisor(&tx, &assignment.id).await?;
                self.lock_group(&tx, &existing.group_id).await?;
                self.require_staff(&assignment.staff_id).await?;
                primary_supervisor::update(&tx, assignment).await
            }
            .await;
            finish(tx, result).await
        }
        .await
        .map_err(Operation::UpdateSupervisor.wrap())
    }

    pub async fn delete_supervisor(&self, id: &Uuid) -> Result<(), DomainError> {
        async {
            let tx = self.uow.begin().await?;
            let result = async {
                let existing = self.require_supervisor(&tx, id).await?;
                self.lock_group(&tx, &existing.group_id).await?;
                primary_supervisor::remove(&tx, id).await
            }
            .await;
            let removed = finish(tx, result).await?;
            info!("Supervisor {} removed from group {}", removed.staff_id, removed.group_id);
            Ok::<_, DomainError>(())
        }
        .await
        .map_err(Operation::DeleteSupervisor.wrap())
    }

    pub async fn list_supervisors(&self, group_id: &Uuid) -> Result<Vec<SupervisorAssignment>, DomainError> {
        async {
            self.require_group(self.uow.as_ref(), group_id).await?;
            self.uow.supervisors().find_by_group(group_id).await
        }
        .await
        .map_err(Operation::ListSupervisors.wrap())
    }

    // ------------------------------------------------------------------
    // Enrollments
    // ------------------------------------------------------------------

    /// Replaces the group's enrollments with `student_ids`. An empty list is legal.
    pub async fn update_group_enrollments(
        &self,
        group_id: &Uuid,
        student_ids: &[Uuid],
    ) -> Result<Vec<Enrollment>, DomainError> {
        async {
            let desired = dedup_ordered(student_ids);

            let tx = self.uow.begin().await?;
            let result = async {
                let group = self.lock_group(&tx, group_id).await?;
                if self.enforce_capacity && desired.len() > group.max_participants.max(0) as usize {
                    return Err(DomainError::GroupFull {
                        group_id: group.id,
                        max_participants: group.max_participants,
                    });
                }

                let current = tx.enrollments().find_by_group(group_id).await?;
                let pairs: Vec<(Uuid, Uuid)> = current.iter().map(|e| (e.student_id, e.id)).collect();
                let plan = reconcile(&pairs, &desired);

                for enrollment_id in &plan.to_remove {
                    tx.enrollments().delete(enrollment_id).await?;
                }
                for student_id in &plan.to_add {
                    tx.enrollments().create(&Enrollment::new(*group_id, *student_id)).await?;
                }

                info!(
                    "Enrollments reconciled for group {} (removed: {}, added: {})",
                    group_id,
                    plan.to_remove.len(),
                    plan.to_add.len()
                );
                tx.enrollments().find_by_group(group_id).await
            }
            .await;
            finish(tx, result).await
        }
        .await
        .map_err(Operation::UpdateGroupEnrollments.wrap())
    }

    /// Enrolling twice is a `DuplicateEnrollment` conflict, never a silent success.
    pub async fn enroll_student(&self, group_id: &Uuid, student_id: &Uuid) -> Result<Enrollment, DomainError> {
        async {
            let tx = self.uow.begin().await?;
            let result = async {
                let group = self.lock_group(&tx, group_id).await?;

                if tx
                    .enrollments()
                    .find_by_group_and_student(group_id, student_id)
                    .await?
                    .is_some()
                {
                    return Err(DomainError::DuplicateEnrollment {
                        group_id: *group_id,
                        student_id: *student_id,
                    });
                }

                if self.enforce_capacity {
                    let enrolled = tx.enrollments().find_by_group(group_id).await?.len();
                    if group.is_full(enrolled) {
                        return Err(DomainError::GroupFull {
                            group_id: group.id,
                            max_participants: group.max_participants,
                        });
                    }
                }

                tx.enrollments().create(&Enrollment::new(*group_id, *student_id)).await
            }
            .await;
            let enrollment = finish(tx, result).await?;
            info!("Student {} enrolled in group {}", student_id, group_id);
            Ok::<_, DomainError>(enrollment)
        }
        .await
        .map_err(Operation::EnrollStudent.wrap())
    }

    pub async fn unenroll_student(&self, group_id: &Uuid, student_id: &Uuid) -> Result<(), DomainError> {
        async {
            self.require_group(self.uow.as_ref(), group_id).await?;
            let enrollment = self
                .uow
                .enrollments()
                .find_by_group_and_student(group_id, student_id)
                .await?
                .ok_or(DomainError::NotEnrolled {
                    group_id: *group_id,
                    student_id: *student_id,
                })?;

            self.uow.enrollments().delete(&enrollment.id).await?;
            info!("Student {} unenrolled from group {}", student_id, group_id);
            Ok::<_, DomainError>(())
        }
        .await
        .map_err(Operation::UnenrollStudent.wrap())
    }

    pub async fn update_attendance(
        &self,
        enrollment_id: &Uuid,
        status: AttendanceStatus,
    ) -> Result<Enrollment, DomainError> {
        async {
            let mut enrollment = self
                .uow
                .enrollments()
                .find_by_id(enrollment_id)
                .await?
                .ok_or_else(|| DomainError::not_found(EntityKind::Enrollment, *enrollment_id))?;

            enrollment.attendance_status = Some(status);
            self.uow.enrollments().update(&enrollment).await
        }
        .await
        .map_err(Operation::UpdateAttendance.wrap())
    }

    pub async fn list_enrollments(&self, group_id: &Uuid) -> Result<Vec<Enrollment>, DomainError> {
        async {
            self.require_group(self.uow.as_ref(), group_id).await?;
            self.uow.enrollments().find_by_group(group_id).await
        }
        .await
        .map_err(Operation::ListEnrollments.wrap())
    }

    async fn require_supervisor<R>(&self, repos: &R, id: &Uuid) -> Result<SupervisorAssignment, DomainError>
    where
        R: Repositories + ?Sized,
    {
        repos
            .supervisors()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Supervisor, *id))
    }

    pub async fn list_student_enrollments(&self, student_id: &Uuid) -> Result<Vec<Enrollment>, DomainError> {
        self.uow
            .enrollments()
            .find_by_student(student_id)
            .await
            .map_err(Operation::ListStudentEnrollments.wrap())
    }
}
