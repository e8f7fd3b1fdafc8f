use chrono::NaiveDate;

use super::super::assignment::AutoAssignPolicy;
use super::super::domain::{
    Actor, Drive, DriveCandidate, DriveConfiguration, DriveId, DriveMember, DriveMemberId,
    DriveStatus, InterviewerChange, Round, RoundId, RoundType, UserRole,
};
use super::super::repository::{EntityStore, RepositoryError};
use super::{is_admin_or_owner, load_drive, messages, role_id, Checked, Validation};

#[derive(Debug, Clone)]
pub(crate) struct AutoAssignInput {
    pub drive: Drive,
    pub candidates: Vec<DriveCandidate>,
    pub panel: Vec<DriveMember>,
}

pub(crate) fn validate_auto_assign<S>(
    store: &S,
    actor: &Actor,
    drive_id: DriveId,
    today: NaiveDate,
    policy: AutoAssignPolicy,
) -> Checked<AutoAssignInput>
where
    S: EntityStore + ?Sized,
{
    let (drive, validation) = load_drive(store, drive_id, Validation::new())?;
    if !is_admin_or_owner(actor, &drive) {
        return Err(validation.block(messages::ADMIN_OR_OWNER));
    }
    if drive.date <= today {
        return Err(validation.block(messages::AUTO_ASSIGN_FUTURE_ONLY));
    }
    if drive.status != DriveStatus::InProposal {
        return Err(validation.block(messages::AUTO_ASSIGN_IN_PROPOSAL_ONLY));
    }

    let candidates = store.drive_candidates(drive.id)?;
    if candidates.is_empty() {
        return Err(validation.block(messages::NO_CANDIDATES_FOUND));
    }

    let panel_role = role_id(store, UserRole::Panel)?;
    let panel: Vec<_> = store
        .drive_members(drive.id)?
        .into_iter()
        .filter(|member| member.role_id == panel_role)
        .collect();
    if panel.is_empty() {
        return Err(validation.block(messages::NO_INTERVIEWERS_FOUND));
    }

    if policy == AutoAssignPolicy::Once {
        for candidate in &candidates {
            let assigned = store
                .rounds_for_drive_candidate(candidate.id)?
                .iter()
                .any(|round| round.round_type == RoundType::Tech1);
            if assigned {
                return Err(validation.block(messages::PANEL_ALREADY_ASSIGNED));
            }
        }
    }

    Ok(AutoAssignInput {
        drive,
        candidates,
        panel,
    })
}

#[derive(Debug, Clone)]
pub(crate) struct ReassignmentInput {
    pub round: Round,
    pub drive_candidate: DriveCandidate,
    pub drive: Drive,
    pub new_member: DriveMember,
    pub configuration: DriveConfiguration,
}

pub(crate) fn validate_reassignment<S>(
    store: &S,
    actor: &Actor,
    round_id: RoundId,
    change: &InterviewerChange,
) -> Checked<ReassignmentInput>
where
    S: EntityStore + ?Sized,
{
    let mut validation = Validation::new();
    if round_id.0 <= 0 {
        validation.fail("roundId", messages::ROUND_ID_INVALID);
    }
    if change.old_interviewer_id <= 0 {
        validation.fail("oldInterviewerId", messages::OLD_INTERVIEWER_REQUIRED);
    }
    if change.new_interviewer_id <= 0 {
        validation.fail("newInterviewerId", messages::NEW_INTERVIEWER_REQUIRED);
    } else if change.new_interviewer_id == change.old_interviewer_id {
        validation.fail("newInterviewerId", messages::SAME_INTERVIEWER);
    }
    validation.finish()?;

    let validation = Validation::new();
    let round = match store.round(round_id)? {
        Some(round) => round,
        None => return Err(validation.block(messages::ROUND_NOT_FOUND)),
    };
    if round.interviewer_id != DriveMemberId(change.old_interviewer_id) {
        return Err(validation.block(messages::INTERVIEWER_NOT_ASSIGNED));
    }

    let drive_candidate = match store.drive_candidate(round.drive_candidate_id)? {
        Some(link) => link,
        None => return Err(validation.block(messages::ROUND_NOT_FOUND)),
    };
    let (drive, validation) = load_drive(store, drive_candidate.drive_id, validation)?;
    if !is_admin_or_owner(actor, &drive) {
        return Err(validation.block(messages::ADMIN_OR_OWNER));
    }
    if drive.status.is_closed() {
        return Err(validation.block(messages::CLOSED_DRIVE));
    }

    let panel_role = role_id(store, UserRole::Panel)?;
    let new_member = store
        .drive_member(DriveMemberId(change.new_interviewer_id))?
        .filter(|member| member.drive_id == drive.id && member.role_id == panel_role);
    let new_member = match new_member {
        Some(member) => member,
        None => return Err(validation.block(messages::INVALID_PANEL_INTERVIEWER)),
    };

    let configuration = store
        .drive_configuration(drive.id)?
        .ok_or(RepositoryError::NotFound)?;

    Ok(ReassignmentInput {
        round,
        drive_candidate,
        drive,
        new_member,
        configuration,
    })
}
