//! Primary-supervisor invariant
//!
//! A group's supervisor set holds at most one primary, and exactly one
//! whenever the set is non-empty. Every transition here is meant to run on
//! transaction-bound repositories so a half-applied repair is never visible.
//! Demotions are always written before promotions.

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::SupervisorAssignment;
use crate::error::{DomainError, EntityKind};
use crate::repositories::{Repositories, SupervisorRepository};

/// True when `supervisors` is empty or has exactly one primary.
pub fn holds(supervisors: &[SupervisorAssignment]) -> bool {
    let primaries = supervisors.iter().filter(|s| s.is_primary).count();
    if supervisors.is_empty() {
        primaries == 0
    } else {
        primaries == 1
    }
}

/// Inserts a new assignment. The first supervisor of a group is made primary
/// regardless of the requested flag; a primary insert demotes everyone else.
pub async fn add<R>(repos: &R, mut assignment: SupervisorAssignment) -> Result<SupervisorAssignment, DomainError>
where
    R: Repositories + ?Sized,
{
    let current = repos.supervisors().find_by_group(&assignment.group_id).await?;

    if current.iter().any(|s| s.staff_id == assignment.staff_id) {
        return Err(DomainError::DuplicateSupervisor {
            group_id: assignment.group_id,
            staff_id: assignment.staff_id,
        });
    }

    if current.is_empty() {
        assignment.is_primary = true;
    }
    if assignment.is_primary {
        demote_others(repos, &current, None).await?;
    }

    let created = repos.supervisors().create(&assignment).await?;
    info!(
        "Supervisor {} added to group {} (primary: {})",
        created.staff_id, created.group_id, created.is_primary
    );
    Ok(created)
}

/// Updates an assignment in place. Moving it to another group is rejected, and
/// so is demoting the current primary: primacy only moves by promoting someone else.
pub async fn update<R>(repos: &R, updated: SupervisorAssignment) -> Result<SupervisorAssignment, DomainError>
where
    R: Repositories + ?Sized,
{
    let existing = repos
        .supervisors()
        .find_by_id(&updated.id)
        .await?
        .ok_or_else(|| DomainError::not_found(EntityKind::Supervisor, updated.id))?;

    if existing.group_id != updated.group_id {
        return Err(DomainError::SupervisorGroupChange);
    }

    let siblings = repos.supervisors().find_by_group(&existing.group_id).await?;

    if updated.staff_id != existing.staff_id
        && siblings.iter().any(|s| s.staff_id == updated.staff_id)
    {
        return Err(DomainError::DuplicateSupervisor {
            group_id: updated.group_id,
            staff_id: updated.staff_id,
        });
    }

    if existing.is_primary && !updated.is_primary {
        return Err(DomainError::PrimaryRequired);
    }
    if !existing.is_primary && updated.is_primary {
        demote_others(repos, &siblings, Some(updated.id)).await?;
    }

    let mut row = updated;
    row.created_at = existing.created_at;
    repos.supervisors().update(&row).await
}

/// Deletes an assignment. Removing a primary promotes the first remaining
/// supervisor; removing the only supervisor is rejected.
pub async fn remove<R>(repos: &R, id: &Uuid) -> Result<SupervisorAssignment, DomainError>
where
    R: Repositories + ?Sized,
{
    let existing = repos
        .supervisors()
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found(EntityKind::Supervisor, *id))?;

    let siblings = repos.supervisors().find_by_group(&existing.group_id).await?;
    let successor = siblings.into_iter().find(|s| s.id != existing.id);

    let Some(mut successor) = successor else {
        return Err(DomainError::LastSupervisor);
    };

    repos.supervisors().delete(id).await?;

    if existing.is_primary {
        successor.is_primary = true;
        repos.supervisors().update(&successor).await?;
        info!(
            "Supervisor {} promoted to primary of group {}",
            successor.staff_id, successor.group_id
        );
    }

    Ok(existing)
}

/// Makes `primary_staff_id` the one and only primary of the group and returns
/// the settled membership.
pub async fn enforce_primary<R>(
    repos: &R,
    group_id: &Uuid,
    primary_staff_id: &Uuid,
) -> Result<Vec<SupervisorAssignment>, DomainError>
where
    R: Repositories + ?Sized,
{
    let members = repos.supervisors().find_by_group(group_id).await?;

    for member in members.iter().filter(|s| s.is_primary && s.staff_id != *primary_staff_id) {
        set_primary(repos.supervisors(), member, false).await?;
    }
    for member in members.iter().filter(|s| !s.is_primary && s.staff_id == *primary_staff_id) {
        set_primary(repos.supervisors(), member, true).await?;
    }

    let settled = repos.supervisors().find_by_group(group_id).await?;
    debug!("Group {} has {} supervisors after primary repair", group_id, settled.len());
    Ok(settled)
}

async fn demote_others<R>(
    repos: &R,
    supervisors: &[SupervisorAssignment],
    keep: Option<Uuid>,
) -> Result<(), DomainError>
where
    R: Repositories + ?Sized,
{
    for s in supervisors.iter().filter(|s| s.is_primary && Some(s.id) != keep) {
        set_primary(repos.supervisors(), s, false).await?;
    }
    Ok(())
}

async fn set_primary<S>(repo: &S, assignment: &SupervisorAssignment, is_primary: bool) -> Result<(), DomainError>
where
    S: SupervisorRepository + ?Sized,
{
    let mut row = assignment.clone();
    row.is_primary = is_primary;
    repo.update(&row).await?;
    Ok(())
}
