//! Engine behavior against the in-memory store.

use std::sync::Arc;

use chrono::NaiveTime;
use uuid::Uuid;

use activity_core::domain::{
    ActivityGroup, AttendanceStatus, Category, GroupFilter, Schedule, SupervisorAssignment,
};
use activity_core::error::{DomainError, EntityKind, ErrorKind};
use activity_core::repositories::{
    EnrollmentRepository, GroupRepository, Repositories, ScheduleRepository, SupervisorRepository,
};
use activity_core::services::primary_supervisor;
use activity_core::services::ActivityService;
use activity_infrastructure::{MemoryStaffDirectory, MemoryStore};

type Service = ActivityService<MemoryStore, MemoryStaffDirectory>;

struct Fixture {
    store: MemoryStore,
    service: Service,
    category: Category,
    creator: Uuid,
    s1: Uuid,
    s2: Uuid,
    s3: Uuid,
}

impl Fixture {
    async fn new() -> Self {
        let store = MemoryStore::new();
        let (creator, s1, s2, s3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let staff = MemoryStaffDirectory::new([creator, s1, s2, s3]);
        let service = ActivityService::new(Arc::new(store.clone()), Arc::new(staff));
        let category = service
            .create_category(Category::new("Sports", Some("Outdoor and indoor sports")))
            .await
            .unwrap();

        Self {
            store,
            service,
            category,
            creator,
            s1,
            s2,
            s3,
        }
    }

    fn group(&self, max_participants: i32) -> ActivityGroup {
        ActivityGroup::new("Football", self.category.id, max_participants, self.creator)
    }

    async fn create_group(&self, supervisors: &[Uuid]) -> ActivityGroup {
        self.service
            .create_group(self.group(20), supervisors, vec![monday_morning()])
            .await
            .unwrap()
            .group
    }

    /// (staff_id, is_primary) pairs in store order.
    async fn supervisors(&self, group_id: &Uuid) -> Vec<(Uuid, bool)> {
        self.store
            .supervisors()
            .find_by_group(group_id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.staff_id, s.is_primary))
            .collect()
    }

    async fn assert_primary_invariant(&self, group_id: &Uuid) {
        let rows = self.store.supervisors().find_by_group(group_id).await.unwrap();
        assert!(primary_supervisor::holds(&rows), "primary invariant broken: {:?}", rows);
    }
}

fn time(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

fn monday_morning() -> Schedule {
    Schedule::new(Uuid::nil(), 1, time(9), time(10))
}

fn primary_of(rows: &[(Uuid, bool)]) -> Vec<Uuid> {
    rows.iter().filter(|(_, p)| *p).map(|(s, _)| *s).collect()
}

// ----------------------------------------------------------------------------
// Lifecycle
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_reconcile_then_delete_leaves_no_rows() {
    let fx = Fixture::new().await;
    let details = fx
        .service
        .create_group(fx.group(20), &[fx.s1, fx.s2], vec![monday_morning()])
        .await
        .unwrap();
    let group_id = details.group.id;

    assert_eq!(details.primary_supervisor().map(|s| s.staff_id), Some(fx.s1));
    assert_eq!(details.schedules.len(), 1);
    assert_eq!(details.schedules[0].activity_group_id, group_id);
    fx.service.enroll_student(&group_id, &Uuid::new_v4()).await.unwrap();

    let settled = fx
        .service
        .update_group_supervisors(&group_id, &[fx.s2, fx.s3])
        .await
        .unwrap();
    let staff: Vec<Uuid> = settled.iter().map(|s| s.staff_id).collect();
    assert!(!staff.contains(&fx.s1));
    assert!(staff.contains(&fx.s2) && staff.contains(&fx.s3));
    assert_eq!(primary_of(&fx.supervisors(&group_id).await), vec![fx.s2]);

    fx.service.delete_group(&group_id, &fx.s2, false).await.unwrap();

    assert!(fx.store.groups().find_by_id(&group_id).await.unwrap().is_none());
    assert!(fx.store.schedules().find_by_group(&group_id).await.unwrap().is_empty());
    assert!(fx.store.supervisors().find_by_group(&group_id).await.unwrap().is_empty());
    assert!(fx.store.enrollments().find_by_group(&group_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_group_rejects_unknown_category() {
    let fx = Fixture::new().await;
    let group = ActivityGroup::new("Chess", Uuid::new_v4(), 10, fx.creator);

    let err = fx.service.create_group(group, &[fx.s1], vec![]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(err.root(), DomainError::NotFound { entity: EntityKind::Category, .. }));
    assert!(err.to_string().starts_with("create group: "));
}

#[tokio::test]
async fn test_create_group_rejects_unknown_staff() {
    let fx = Fixture::new().await;
    let stranger = Uuid::new_v4();

    let err = fx
        .service
        .create_group(fx.group(10), &[fx.s1, stranger], vec![])
        .await
        .unwrap_err();
    assert!(matches!(err.root(), DomainError::StaffNotFound(id) if *id == stranger));
    assert!(fx.service.list_groups(&GroupFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_group_validates_before_writing() {
    let fx = Fixture::new().await;

    let err = fx.service.create_group(fx.group(0), &[fx.s1], vec![]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let backwards = Schedule::new(Uuid::nil(), 2, time(11), time(10));
    let err = fx
        .service
        .create_group(fx.group(10), &[fx.s1], vec![backwards])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(fx.service.list_groups(&GroupFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_group_without_supervisors() {
    let fx = Fixture::new().await;
    let details = fx.service.create_group(fx.group(10), &[], vec![]).await.unwrap();

    assert!(details.supervisors.is_empty());
    assert!(details.primary_supervisor().is_none());
}

// ----------------------------------------------------------------------------
// Atomicity
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_create_group_failure_leaves_nothing_behind() {
    for step in ["groups.create", "supervisors.create", "schedules.create", "transaction.commit"] {
        let fx = Fixture::new().await;
        fx.store.fail_next(step);

        let err = fx
            .service
            .create_group(fx.group(10), &[fx.s1, fx.s2], vec![monday_morning()])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal, "step {}", step);

        assert!(fx.service.list_groups(&GroupFilter::default()).await.unwrap().is_empty());
        assert!(fx.store.supervisors().find_by_staff(&fx.s1).await.unwrap().is_empty());
        assert!(fx.store.supervisors().find_by_staff(&fx.s2).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_delete_group_failure_keeps_every_row() {
    for step in [
        "enrollments.delete_by_group",
        "supervisors.delete_by_group",
        "schedules.delete_by_group",
        "groups.delete",
    ] {
        let fx = Fixture::new().await;
        let group = fx.create_group(&[fx.s1, fx.s2]).await;
        fx.service.enroll_student(&group.id, &Uuid::new_v4()).await.unwrap();
        fx.store.fail_next(step);

        let err = fx.service.delete_group(&group.id, &fx.creator, false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal, "step {}", step);

        let details = fx.service.get_group_details(&group.id).await.unwrap();
        assert_eq!(details.supervisors.len(), 2, "step {}", step);
        assert_eq!(details.schedules.len(), 1, "step {}", step);
        assert_eq!(details.enrollments.len(), 1, "step {}", step);
    }
}

#[tokio::test]
async fn test_failed_reconciliation_keeps_old_membership() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1, fx.s2]).await;
    let before = fx.supervisors(&group.id).await;

    fx.store.fail_next("supervisors.update");
    fx.service
        .update_group_supervisors(&group.id, &[fx.s2, fx.s3])
        .await
        .unwrap_err();

    assert_eq!(fx.supervisors(&group.id).await, before);
}

// ----------------------------------------------------------------------------
// Supervisor reconciliation and the primary invariant
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_reconciliation_is_idempotent() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;

    fx.service
        .update_group_supervisors(&group.id, &[fx.s3, fx.s1, fx.s2])
        .await
        .unwrap();
    let once = fx.supervisors(&group.id).await;

    fx.service
        .update_group_supervisors(&group.id, &[fx.s3, fx.s1, fx.s2])
        .await
        .unwrap();
    assert_eq!(fx.supervisors(&group.id).await, once);
    assert_eq!(primary_of(&once), vec![fx.s3]);
}

#[tokio::test]
async fn test_reconciliation_matches_desired_set() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1, fx.s2]).await;

    let cases: Vec<Vec<Uuid>> = vec![
        vec![fx.s2, fx.s1],
        vec![fx.s3],
        vec![fx.s1, fx.s2, fx.s3],
        vec![fx.s3, fx.s3, fx.s2],
    ];
    for desired in cases {
        fx.service.update_group_supervisors(&group.id, &desired).await.unwrap();

        let rows = fx.supervisors(&group.id).await;
        let mut got: Vec<Uuid> = rows.iter().map(|(s, _)| *s).collect();
        let mut want = desired.clone();
        got.sort();
        want.sort();
        want.dedup();
        assert_eq!(got, want);
        assert_eq!(primary_of(&rows), vec![desired[0]]);
        fx.assert_primary_invariant(&group.id).await;
    }
}

#[tokio::test]
async fn test_cannot_remove_all_supervisors() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;

    let err = fx.service.update_group_supervisors(&group.id, &[]).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::CannotRemoveAllSupervisors));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(fx.supervisors(&group.id).await, vec![(fx.s1, true)]);

    let empty = fx.create_group(&[]).await;
    assert!(fx.service.update_group_supervisors(&empty.id, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reconciliation_checks_new_staff() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;

    let err = fx
        .service
        .update_group_supervisors(&group.id, &[fx.s1, Uuid::new_v4()])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(fx.supervisors(&group.id).await, vec![(fx.s1, true)]);
}

#[tokio::test]
async fn test_reconciliation_on_missing_group() {
    let fx = Fixture::new().await;
    let err = fx
        .service
        .update_group_supervisors(&Uuid::new_v4(), &[fx.s1])
        .await
        .unwrap_err();
    assert!(matches!(err.root(), DomainError::NotFound { entity: EntityKind::Group, .. }));
}

#[tokio::test]
async fn test_add_supervisor_transitions() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[]).await;

    let first = fx.service.add_supervisor(&group.id, &fx.s1, false).await.unwrap();
    assert!(first.is_primary);

    fx.service.add_supervisor(&group.id, &fx.s2, false).await.unwrap();
    fx.service.add_supervisor(&group.id, &fx.s3, true).await.unwrap();
    assert_eq!(primary_of(&fx.supervisors(&group.id).await), vec![fx.s3]);
    fx.assert_primary_invariant(&group.id).await;

    let err = fx.service.add_supervisor(&group.id, &fx.s2, false).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::DuplicateSupervisor { .. }));

    let err = fx
        .service
        .add_supervisor(&group.id, &Uuid::new_v4(), false)
        .await
        .unwrap_err();
    assert!(matches!(err.root(), DomainError::StaffNotFound(_)));
}

#[tokio::test]
async fn test_update_supervisor_transitions() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1, fx.s2]).await;
    let rows = fx.service.list_supervisors(&group.id).await.unwrap();
    let (primary, other) = (rows[0].clone(), rows[1].clone());

    let mut demoted = primary.clone();
    demoted.is_primary = false;
    let err = fx.service.update_supervisor(demoted).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::PrimaryRequired));

    let mut promoted = other.clone();
    promoted.is_primary = true;
    fx.service.update_supervisor(promoted).await.unwrap();
    assert_eq!(primary_of(&fx.supervisors(&group.id).await), vec![fx.s2]);

    let mut moved = primary.clone();
    moved.group_id = Uuid::new_v4();
    let err = fx.service.update_supervisor(moved).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::SupervisorGroupChange));

    let mut clash = primary;
    clash.staff_id = fx.s2;
    let err = fx.service.update_supervisor(clash).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::DuplicateSupervisor { .. }));
    fx.assert_primary_invariant(&group.id).await;
}

#[tokio::test]
async fn test_delete_primary_promotes_next() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1, fx.s2, fx.s3]).await;
    let rows = fx.service.list_supervisors(&group.id).await.unwrap();

    fx.service.delete_supervisor(&rows[0].id).await.unwrap();

    assert_eq!(fx.supervisors(&group.id).await, vec![(fx.s2, true), (fx.s3, false)]);
}

#[tokio::test]
async fn test_delete_non_primary_keeps_primary() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1, fx.s2]).await;
    let rows = fx.service.list_supervisors(&group.id).await.unwrap();

    fx.service.delete_supervisor(&rows[1].id).await.unwrap();
    assert_eq!(fx.supervisors(&group.id).await, vec![(fx.s1, true)]);
}

#[tokio::test]
async fn test_delete_last_supervisor_rejected() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;
    let rows = fx.service.list_supervisors(&group.id).await.unwrap();

    let err = fx.service.delete_supervisor(&rows[0].id).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::LastSupervisor));
    assert_eq!(err.to_string(), "delete supervisor: Cannot delete the only supervisor for an activity");
    assert_eq!(fx.supervisors(&group.id).await, vec![(fx.s1, true)]);
}

#[tokio::test]
async fn test_concurrent_reconciliations_serialize() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;

    let pair = [fx.s2, fx.s1];
    let single = [fx.s3];
    let (a, b) = futures::join!(
        fx.service.update_group_supervisors(&group.id, &pair),
        fx.service.update_group_supervisors(&group.id, &single),
    );
    a.unwrap();
    b.unwrap();

    let rows = fx.supervisors(&group.id).await;
    let staff: Vec<Uuid> = rows.iter().map(|(s, _)| *s).collect();
    assert!(staff == vec![fx.s3] || (staff.len() == 2 && primary_of(&rows) == vec![fx.s2]));
    fx.assert_primary_invariant(&group.id).await;
}

#[tokio::test]
async fn test_update_supervisor_reports_missing_assignment_first() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;

    let mut ghost = SupervisorAssignment::new(group.id, Uuid::new_v4(), false);
    ghost.id = Uuid::new_v4();
    let err = fx.service.update_supervisor(ghost.clone()).await.unwrap_err();
    assert!(matches!(
        err.root(),
        DomainError::NotFound { entity: EntityKind::Supervisor, id } if *id == ghost.id
    ));

    let err = fx.service.delete_supervisor(&ghost.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_group_writes_take_the_row_lock() {
    const LOCK: &str = "groups.lock_by_id";
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1, fx.s2]).await;
    let rows = fx.service.list_supervisors(&group.id).await.unwrap();
    let student = Uuid::new_v4();
    fx.service.enroll_student(&group.id, &student).await.unwrap();

    let mut renamed = group.clone();
    renamed.name = "Basketball".to_string();
    let mut promoted = rows[1].clone();
    promoted.is_primary = true;

    let mut errors = Vec::new();
    fx.store.fail_next(LOCK);
    errors.push(fx.service.update_group(renamed, &fx.creator, false).await.unwrap_err());
    fx.store.fail_next(LOCK);
    errors.push(fx.service.update_group_supervisors(&group.id, &[fx.s3]).await.unwrap_err());
    fx.store.fail_next(LOCK);
    errors.push(fx.service.add_supervisor(&group.id, &fx.s3, true).await.unwrap_err());
    fx.store.fail_next(LOCK);
    errors.push(fx.service.update_supervisor(promoted).await.unwrap_err());
    fx.store.fail_next(LOCK);
    errors.push(fx.service.delete_supervisor(&rows[0].id).await.unwrap_err());
    fx.store.fail_next(LOCK);
    errors.push(fx.service.update_group_enrollments(&group.id, &[]).await.unwrap_err());
    fx.store.fail_next(LOCK);
    errors.push(fx.service.enroll_student(&group.id, &Uuid::new_v4()).await.unwrap_err());
    fx.store.fail_next(LOCK);
    errors.push(fx.service.delete_group(&group.id, &fx.creator, false).await.unwrap_err());

    for (i, err) in errors.iter().enumerate() {
        assert_eq!(err.kind(), ErrorKind::Internal, "write {}: {}", i, err);
    }

    let details = fx.service.get_group_details(&group.id).await.unwrap();
    assert_eq!(details.group.name, "Football");
    assert_eq!(fx.supervisors(&group.id).await, vec![(fx.s1, true), (fx.s2, false)]);
    assert_eq!(details.enrollments.len(), 1);
    assert_eq!(details.enrollments[0].student_id, student);
}

// ----------------------------------------------------------------------------
// Ownership
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_ownership_gate() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;
    let stranger = Uuid::new_v4();

    assert!(fx.service.can_modify_group(&group.id, &fx.creator, false).await.unwrap());
    assert!(fx.service.can_modify_group(&group.id, &fx.s1, false).await.unwrap());
    assert!(fx.service.can_modify_group(&group.id, &stranger, true).await.unwrap());
    assert!(!fx.service.can_modify_group(&group.id, &stranger, false).await.unwrap());

    fx.store.fail_next("supervisors.find_by_group");
    assert!(!fx.service.can_modify_group(&group.id, &fx.s1, false).await.unwrap());
}

#[tokio::test]
async fn test_update_group_requires_ownership() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;

    let mut renamed = group.clone();
    renamed.name = "Futsal".into();
    let err = fx
        .service
        .update_group(renamed.clone(), &Uuid::new_v4(), false)
        .await
        .unwrap_err();
    assert!(matches!(err.root(), DomainError::NotOwner));
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    renamed.created_by = fx.s1;
    let saved = fx.service.update_group(renamed, &fx.s1, false).await.unwrap();
    assert_eq!(saved.name, "Futsal");
    assert_eq!(saved.created_by, fx.creator);
    assert!(saved.modified_at.is_some());
}

#[tokio::test]
async fn test_update_group_with_lookup_failure_is_denied() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;

    fx.store.fail_next("supervisors.find_by_group");
    let err = fx.service.update_group(group, &fx.s1, false).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::NotOwner));
}

#[tokio::test]
async fn test_delete_group_by_stranger_rejected() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;

    let err = fx.service.delete_group(&group.id, &Uuid::new_v4(), false).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::NotOwner));
    assert!(fx.service.get_group(&group.id).await.is_ok());

    fx.service.delete_group(&group.id, &Uuid::new_v4(), true).await.unwrap();
    assert!(fx.service.get_group(&group.id).await.unwrap_err().is_not_found());
}

// ----------------------------------------------------------------------------
// Schedules
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_schedule_management() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;

    let friday = fx
        .service
        .add_schedule(Schedule::new(group.id, 5, time(14), time(16)))
        .await
        .unwrap();
    let listed = fx.service.list_schedules(&group.id).await.unwrap();
    assert_eq!(listed.iter().map(|s| s.day_of_week).collect::<Vec<_>>(), vec![1, 5]);

    let mut later = friday.clone();
    later.start_time = time(15);
    let saved = fx.service.update_schedule(later).await.unwrap();
    assert_eq!(saved.start_time, time(15));

    let other = fx.create_group(&[fx.s2]).await;
    let mut moved = friday.clone();
    moved.activity_group_id = other.id;
    let err = fx.service.update_schedule(moved).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::ScheduleGroupChange));

    fx.service.delete_schedule(&friday.id).await.unwrap();
    let err = fx.service.get_schedule(&friday.id).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::NotFound { entity: EntityKind::Schedule, .. }));
}

#[tokio::test]
async fn test_add_schedule_to_missing_group() {
    let fx = Fixture::new().await;
    let err = fx
        .service
        .add_schedule(Schedule::new(Uuid::new_v4(), 3, time(8), time(9)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ----------------------------------------------------------------------------
// Enrollments
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_enrollment_lifecycle() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;
    let student = Uuid::new_v4();

    let enrollment = fx.service.enroll_student(&group.id, &student).await.unwrap();
    assert!(enrollment.attendance_status.is_none());

    let err = fx.service.enroll_student(&group.id, &student).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::DuplicateEnrollment { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let marked = fx
        .service
        .update_attendance(&enrollment.id, AttendanceStatus::Excused)
        .await
        .unwrap();
    assert_eq!(marked.attendance_status, Some(AttendanceStatus::Excused));
    assert_eq!(fx.service.list_student_enrollments(&student).await.unwrap().len(), 1);

    fx.service.unenroll_student(&group.id, &student).await.unwrap();
    let err = fx.service.unenroll_student(&group.id, &student).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::NotEnrolled { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_enrollment_reconciliation() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;
    let students: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

    fx.service
        .update_group_enrollments(&group.id, &students[..3])
        .await
        .unwrap();
    let kept = fx
        .service
        .update_group_enrollments(&group.id, &students[1..])
        .await
        .unwrap();

    let mut got: Vec<Uuid> = kept.iter().map(|e| e.student_id).collect();
    let mut want = students[1..].to_vec();
    got.sort();
    want.sort();
    assert_eq!(got, want);

    assert!(fx.service.update_group_enrollments(&group.id, &[]).await.unwrap().is_empty());
    assert!(fx.service.list_enrollments(&group.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_capacity_is_enforced() {
    let fx = Fixture::new().await;
    let group = fx
        .service
        .create_group(fx.group(2), &[fx.s1], vec![])
        .await
        .unwrap()
        .group;

    fx.service.enroll_student(&group.id, &Uuid::new_v4()).await.unwrap();
    fx.service.enroll_student(&group.id, &Uuid::new_v4()).await.unwrap();
    let err = fx.service.enroll_student(&group.id, &Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::GroupFull { max_participants: 2, .. }));

    let three: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let err = fx.service.update_group_enrollments(&group.id, &three).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::GroupFull { .. }));
    assert_eq!(fx.service.list_enrollments(&group.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_capacity_enforcement_can_be_disabled() {
    let store = MemoryStore::new();
    let staff_id = Uuid::new_v4();
    let service = ActivityService::new(
        Arc::new(store.clone()),
        Arc::new(MemoryStaffDirectory::new([staff_id])),
    )
    .with_capacity_enforcement(false);

    let category = service.create_category(Category::new("Music", None)).await.unwrap();
    let group = service
        .create_group(ActivityGroup::new("Choir", category.id, 1, staff_id), &[staff_id], vec![])
        .await
        .unwrap()
        .group;

    let students: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let enrolled = service.update_group_enrollments(&group.id, &students).await.unwrap();
    assert_eq!(enrolled.len(), 3);
}

// ----------------------------------------------------------------------------
// Categories and reads
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let fx = Fixture::new().await;
    let group = fx.create_group(&[fx.s1]).await;

    let err = fx.service.delete_category(&fx.category.id).await.unwrap_err();
    assert!(matches!(err.root(), DomainError::CategoryInUse(id) if *id == fx.category.id));

    fx.service.delete_group(&group.id, &fx.creator, false).await.unwrap();
    fx.service.delete_category(&fx.category.id).await.unwrap();
    assert!(fx.service.get_category(&fx.category.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_category_updates_and_listing() {
    let fx = Fixture::new().await;
    fx.service.create_category(Category::new("Arts", None)).await.unwrap();

    let mut renamed = fx.category.clone();
    renamed.name = "Athletics".into();
    fx.service.update_category(renamed).await.unwrap();

    let names: Vec<String> = fx
        .service
        .list_categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Arts".to_string(), "Athletics".to_string()]);

    let err = fx.service.create_category(Category::new("", None)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_group_queries() {
    let fx = Fixture::new().await;
    let football = fx.create_group(&[fx.s1]).await;
    let mut closed = fx.group(5);
    closed.name = "Basketball".into();
    closed.is_open = false;
    let basketball = fx
        .service
        .create_group(closed, &[fx.s2, fx.s1], vec![])
        .await
        .unwrap()
        .group;

    let open = fx
        .service
        .list_groups(&GroupFilter {
            is_open: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(open.iter().map(|g| g.id).collect::<Vec<_>>(), vec![football.id]);

    let supervised = fx.service.find_groups_by_supervisor(&fx.s1).await.unwrap();
    assert_eq!(supervised.len(), 2);
    let supervised = fx.service.find_groups_by_supervisor(&fx.s2).await.unwrap();
    assert_eq!(supervised.iter().map(|g| g.id).collect::<Vec<_>>(), vec![basketball.id]);

    let details = fx.service.get_group_details(&basketball.id).await.unwrap();
    assert_eq!(details.primary_supervisor().map(|s| s.staff_id), Some(fx.s2));
}
