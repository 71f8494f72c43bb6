//! Ownership gate for group mutations

use tracing::warn;
use uuid::Uuid;

use crate::error::{DomainError, EntityKind};
use crate::repositories::{GroupRepository, SupervisorRepository};

/// Decides whether `staff_id` may mutate the group.
///
/// First match wins: elevated permission, then creator, then current
/// supervisor. A failed supervisor lookup counts as "not a supervisor", so a
/// flaky read denies instead of erroring. A missing group is still `NotFound`.
pub async fn can_modify<G, S>(
    groups: &G,
    supervisors: &S,
    group_id: &Uuid,
    staff_id: &Uuid,
    has_elevated_permission: bool,
) -> Result<bool, DomainError>
where
    G: GroupRepository + ?Sized,
    S: SupervisorRepository + ?Sized,
{
    if has_elevated_permission {
        return Ok(true);
    }

    let group = groups
        .find_by_id(group_id)
        .await?
        .ok_or_else(|| DomainError::not_found(EntityKind::Group, *group_id))?;

    if group.created_by == *staff_id {
        return Ok(true);
    }

    match supervisors.find_by_group(group_id).await {
        Ok(assignments) => Ok(assignments.iter().any(|s| s.staff_id == *staff_id)),
        Err(e) => {
            warn!(
                "Supervisor lookup failed for group {} while checking staff {}: {}",
                group_id, staff_id, e
            );
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityGroup, SupervisorAssignment};
    use crate::error::ErrorKind;
    use crate::repositories::group_repository::MockGroupRepository;
    use crate::repositories::supervisor_repository::MockSupervisorRepository;

    fn groups_returning(group: ActivityGroup) -> MockGroupRepository {
        let mut groups = MockGroupRepository::new();
        groups
            .expect_find_by_id()
            .returning(move |_| Ok(Some(group.clone())));
        groups
    }

    #[tokio::test]
    async fn test_elevated_permission_skips_lookups() {
        let groups = MockGroupRepository::new();
        let supervisors = MockSupervisorRepository::new();

        let allowed = can_modify(&groups, &supervisors, &Uuid::new_v4(), &Uuid::new_v4(), true)
            .await
            .unwrap();
        assert!(allowed);
    }

    #[tokio::test]
    async fn test_creator_allowed() {
        let creator = Uuid::new_v4();
        let group = ActivityGroup::new("Drama", Uuid::new_v4(), 15, creator);
        let group_id = group.id;
        let groups = groups_returning(group);
        let mut supervisors = MockSupervisorRepository::new();
        supervisors.expect_find_by_group().never();

        assert!(can_modify(&groups, &supervisors, &group_id, &creator, false).await.unwrap());
    }

    #[tokio::test]
    async fn test_supervisor_allowed() {
        let staff = Uuid::new_v4();
        let group = ActivityGroup::new("Drama", Uuid::new_v4(), 15, Uuid::new_v4());
        let group_id = group.id;
        let groups = groups_returning(group);
        let mut supervisors = MockSupervisorRepository::new();
        supervisors
            .expect_find_by_group()
            .returning(move |g| Ok(vec![SupervisorAssignment::new(*g, staff, true)]));

        assert!(can_modify(&groups, &supervisors, &group_id, &staff, false).await.unwrap());
    }

    #[tokio::test]
    async fn test_stranger_denied() {
        let group = ActivityGroup::new("Drama", Uuid::new_v4(), 15, Uuid::new_v4());
        let group_id = group.id;
        let groups = groups_returning(group);
        let mut supervisors = MockSupervisorRepository::new();
        supervisors
            .expect_find_by_group()
            .returning(|g| Ok(vec![SupervisorAssignment::new(*g, Uuid::new_v4(), true)]));

        assert!(!can_modify(&groups, &supervisors, &group_id, &Uuid::new_v4(), false).await.unwrap());
    }

    #[tokio::test]
    async fn test_lookup_failure_denies() {
        let group = ActivityGroup::new("Drama", Uuid::new_v4(), 15, Uuid::new_v4());
        let group_id = group.id;
        let groups = groups_returning(group);
        let mut supervisors = MockSupervisorRepository::new();
        supervisors
            .expect_find_by_group()
            .returning(|_| Err(DomainError::DatabaseError("connection reset".into())));

        assert!(!can_modify(&groups, &supervisors, &group_id, &Uuid::new_v4(), false).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_group_is_not_found() {
        let mut groups = MockGroupRepository::new();
        groups.expect_find_by_id().returning(|_| Ok(None));
        let supervisors = MockSupervisorRepository::new();

        let err = can_modify(&groups, &supervisors, &Uuid::new_v4(), &Uuid::new_v4(), false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
