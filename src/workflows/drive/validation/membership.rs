use std::collections::HashSet;

use super::super::domain::{
    Actor, Candidate, CandidateSelection, Drive, DriveCandidate, DriveId, DriveMember, NewMember,
    RoleId, User, UserId, UserRole,
};
use super::super::repository::EntityStore;
use super::super::status;
use super::{
    assigned_elsewhere_on, is_admin_or_owner, load_drive, messages, role_id, Checked, Validation,
};

#[derive(Debug, Clone)]
pub(crate) struct MemberAddition {
    pub drive: Drive,
    pub user: User,
    pub role: UserRole,
    pub role_id: RoleId,
}

pub(crate) fn validate_add_member<S>(
    store: &S,
    actor: &Actor,
    drive_id: DriveId,
    request: &NewMember,
) -> Checked<MemberAddition>
where
    S: EntityStore + ?Sized,
{
    let (drive, validation) = load_drive(store, drive_id, Validation::new())?;
    if !is_admin_or_owner(actor, &drive) {
        return Err(validation.block(messages::ADMIN_OR_OWNER));
    }
    if !status::can_add_members_or_candidates(drive.status) {
        return Err(validation.block(messages::CANNOT_ADD_MEMBER_ON_CLOSED_DRIVE));
    }
    if !UserRole::MEMBERSHIP_ROLES.contains(&request.role) {
        return Err(validation.block(messages::INVALID_MEMBER_ROLE));
    }

    let user = match store.user(request.user_id)? {
        Some(user) => user,
        None => return Err(validation.block(messages::USER_NOT_FOUND)),
    };
    if !user.is_active {
        return Err(validation.block(messages::USER_INACTIVE));
    }

    let already_member = store
        .drive_members(drive.id)?
        .iter()
        .any(|member| member.user_id == user.id);
    if already_member {
        return Err(validation.block(messages::ALREADY_MEMBER));
    }

    if assigned_elsewhere_on(store, user.id, drive.date, Some(drive.id))? {
        return Err(validation.block(messages::USER_BUSY_SAME_DATE));
    }

    let role_id = role_id(store, request.role)?;
    if user.role_id != role_id {
        return Err(validation.block(messages::USER_ROLE_MISMATCH));
    }

    Ok(MemberAddition {
        drive,
        user,
        role: request.role,
        role_id,
    })
}

#[derive(Debug, Clone)]
pub(crate) struct MemberRemoval {
    pub drive: Drive,
    pub member: DriveMember,
}

pub(crate) fn validate_remove_member<S>(
    store: &S,
    actor: &Actor,
    drive_id: DriveId,
    user_id: UserId,
) -> Checked<MemberRemoval>
where
    S: EntityStore + ?Sized,
{
    let (drive, validation) = load_drive(store, drive_id, Validation::new())?;
    let validation = check_removal_window(actor, &drive, validation)?;

    let member = store
        .drive_members(drive.id)?
        .into_iter()
        .find(|member| member.user_id == user_id);

    match member {
        Some(member) => Ok(MemberRemoval { drive, member }),
        None => Err(validation.block(messages::DRIVE_MEMBER_NOT_FOUND)),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CandidateAddition {
    pub drive: Drive,
    pub candidates: Vec<Candidate>,
}

pub(crate) fn validate_add_candidates<S>(
    store: &S,
    actor: &Actor,
    drive_id: DriveId,
    request: &CandidateSelection,
) -> Checked<CandidateAddition>
where
    S: EntityStore + ?Sized,
{
    let mut validation = Validation::new();
    if request.candidate_ids.is_empty() {
        validation.fail("candidateIds", messages::NO_CANDIDATES_SUPPLIED);
    }

    let (drive, validation) = load_drive(store, drive_id, validation)?;
    if !is_admin_or_owner(actor, &drive) {
        return Err(validation.block(messages::ADMIN_OR_OWNER));
    }
    if !status::can_add_members_or_candidates(drive.status) {
        return Err(validation.block(messages::CANNOT_ADD_CANDIDATES_ON_CLOSED_DRIVE));
    }
    validation.finish()?;

    let mut candidates = Vec::with_capacity(request.candidate_ids.len());
    for candidate_id in &request.candidate_ids {
        match store.candidate(*candidate_id)? {
            Some(candidate) => candidates.push(candidate),
            None => return Err(Validation::new().block(messages::CANDIDATE_NOT_FOUND)),
        }
    }

    let existing: HashSet<_> = store
        .drive_candidates(drive.id)?
        .into_iter()
        .map(|linked| linked.candidate_id)
        .collect();
    let mut seen = HashSet::new();
    let repeated = candidates
        .iter()
        .any(|candidate| existing.contains(&candidate.id) || !seen.insert(candidate.id));
    if repeated {
        return Err(Validation::new().block(messages::CANDIDATE_ALREADY_ADDED));
    }

    Ok(CandidateAddition { drive, candidates })
}

#[derive(Debug, Clone)]
pub(crate) struct CandidateRemoval {
    pub drive: Drive,
    pub drive_candidates: Vec<DriveCandidate>,
}

pub(crate) fn validate_remove_candidates<S>(
    store: &S,
    actor: &Actor,
    drive_id: DriveId,
    request: &CandidateSelection,
) -> Checked<CandidateRemoval>
where
    S: EntityStore + ?Sized,
{
    let mut validation = Validation::new();
    if request.candidate_ids.is_empty() {
        validation.fail("candidateIds", messages::NO_CANDIDATES_SUPPLIED);
    }

    let (drive, validation) = load_drive(store, drive_id, validation)?;
    let validation = check_removal_window(actor, &drive, validation)?;
    validation.finish()?;

    let linked = store.drive_candidates(drive.id)?;
    let mut drive_candidates = Vec::with_capacity(request.candidate_ids.len());
    for candidate_id in &request.candidate_ids {
        match linked.iter().find(|link| link.candidate_id == *candidate_id) {
            Some(link) => {
                if !drive_candidates
                    .iter()
                    .any(|kept: &DriveCandidate| kept.id == link.id)
                {
                    drive_candidates.push(link.clone());
                }
            }
            None => return Err(Validation::new().block(messages::DRIVE_CANDIDATE_NOT_FOUND)),
        }
    }

    Ok(CandidateRemoval {
        drive,
        drive_candidates,
    })
}

fn check_removal_window(
    actor: &Actor,
    drive: &Drive,
    validation: Validation,
) -> Checked<Validation> {
    if !is_admin_or_owner(actor, drive) {
        return Err(validation.block(messages::ADMIN_OR_OWNER));
    }
    if drive.status.is_closed() {
        return Err(validation.block(messages::CLOSED_DRIVE));
    }
    if !status::can_remove_members_or_candidates(drive.status) {
        return Err(validation.block(messages::CANNOT_REMOVE_ON_STARTED_DRIVE));
    }
    Ok(validation)
}
