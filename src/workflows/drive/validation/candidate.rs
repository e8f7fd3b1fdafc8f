use chrono::NaiveDate;

use super::super::domain::{
    Actor, CandidateId, CandidateStatus, Drive, DriveCandidate, DriveId, DriveStatus, RoundType,
};
use super::super::patch::{FieldValue, Patch};
use super::super::repository::EntityStore;
use super::super::status;
use super::{
    is_admin_or_owner, load_drive, messages, reject_foreign_keys, Checked, Rejection, Validation,
};

pub(crate) const DRIVE_CANDIDATE_EDIT_KEYS: &[&str] = &["candidateStatus", "attendanceStatus"];

const PRESENT: &str = "Present";

#[derive(Debug, Clone)]
pub(crate) struct DriveCandidateEdit {
    pub drive: Drive,
    pub drive_candidate: DriveCandidate,
    pub status: Option<CandidateStatus>,
    pub attendance: Option<String>,
}

pub(crate) fn validate_drive_candidate_edit<S>(
    store: &S,
    actor: &Actor,
    drive_id: DriveId,
    candidate_id: CandidateId,
    patch: &Patch,
    today: NaiveDate,
) -> Checked<DriveCandidateEdit>
where
    S: EntityStore + ?Sized,
{
    let mut validation = Validation::new();
    reject_foreign_keys(patch, DRIVE_CANDIDATE_EDIT_KEYS, &mut validation);

    let (drive, mut validation) = load_drive(store, drive_id, validation)?;
    let drive_candidate = match find_link(store, drive.id, candidate_id)? {
        Some(link) => link,
        None => return Err(validation.block(messages::DRIVE_CANDIDATE_NOT_FOUND)),
    };

    if !is_admin_or_owner(actor, &drive) && !is_hr_interviewer(store, actor, &drive_candidate)? {
        return Err(validation.block(messages::ADMIN_OWNER_OR_HR_INTERVIEWER));
    }
    if drive.status.is_closed() {
        return Err(validation.block(messages::CLOSED_DRIVE));
    }
    if drive.status == DriveStatus::Halted {
        return Err(validation.block(messages::PAUSED_DRIVE));
    }

    let mut edit = DriveCandidateEdit {
        drive,
        drive_candidate,
        status: None,
        attendance: None,
    };

    if patch.contains("candidateStatus") {
        match patch.field::<CandidateStatus>("candidateStatus") {
            Ok(FieldValue::Present(target)) => {
                match status::CANDIDATE_STATUS.check(
                    edit.drive_candidate.status,
                    target,
                    &edit.drive.status,
                ) {
                    Ok(()) => edit.status = Some(target),
                    Err(message) => validation.fail("candidateStatus", message),
                }
            }
            _ => validation.fail("candidateStatus", messages::INVALID_CANDIDATE_STATUS),
        }
    }

    if patch.contains("attendanceStatus") {
        match patch.field::<String>("attendanceStatus") {
            Ok(FieldValue::Present(value)) => {
                match check_attendance(&edit.drive, &edit.drive_candidate, &value, today) {
                    Ok(()) => edit.attendance = Some(value.trim().to_string()),
                    Err(message) => validation.fail("attendanceStatus", message),
                }
            }
            _ => validation.fail("attendanceStatus", messages::INVALID_ATTENDANCE_STATUS),
        }
    }

    validation.finish()?;
    Ok(edit)
}

#[derive(Debug, Clone)]
pub(crate) struct AttendanceInput {
    pub drive: Drive,
    pub drive_candidate: DriveCandidate,
    pub status: String,
}

/// Attendance can be taken by anyone staffing the drive, on the drive's own day.
pub(crate) fn validate_attendance<S>(
    store: &S,
    actor: &Actor,
    drive_id: DriveId,
    candidate_id: CandidateId,
    attendance: &str,
    today: NaiveDate,
) -> Checked<AttendanceInput>
where
    S: EntityStore + ?Sized,
{
    let validation = Validation::new();
    let drive = match store.drive(drive_id)? {
        Some(drive) => drive,
        None => return Err(validation.block(messages::ATTENDANCE_NOT_ALLOWED)),
    };
    let drive_candidate = match find_link(store, drive.id, candidate_id)? {
        Some(link) => link,
        None => return Err(validation.block(messages::ATTENDANCE_NOT_ALLOWED)),
    };

    let staffed = store
        .drive_members(drive.id)?
        .iter()
        .any(|member| member.user_id == actor.user_id);
    if !is_admin_or_owner(actor, &drive) && !staffed {
        return Err(validation.block(messages::ATTENDANCE_NOT_ALLOWED));
    }

    if let Err(message) = check_attendance(&drive, &drive_candidate, attendance, today) {
        return Err(Rejection::on("attendanceStatus", message).into());
    }

    Ok(AttendanceInput {
        drive,
        drive_candidate,
        status: attendance.trim().to_string(),
    })
}

fn check_attendance(
    drive: &Drive,
    drive_candidate: &DriveCandidate,
    attendance: &str,
    today: NaiveDate,
) -> Result<(), &'static str> {
    if drive.status != DriveStatus::Started || drive.date != today {
        return Err(messages::ATTENDANCE_NOT_ALLOWED);
    }
    if drive_candidate.attendance_status.as_deref() == Some(PRESENT) {
        return Err(messages::ATTENDANCE_ALREADY_MARKED);
    }
    if attendance.trim().is_empty() {
        return Err(messages::INVALID_ATTENDANCE_STATUS);
    }
    Ok(())
}

fn find_link<S>(
    store: &S,
    drive_id: DriveId,
    candidate_id: CandidateId,
) -> Checked<Option<DriveCandidate>>
where
    S: EntityStore + ?Sized,
{
    Ok(store
        .drive_candidates(drive_id)?
        .into_iter()
        .find(|link| link.candidate_id == candidate_id))
}

/// True when the actor conducts this candidate's HR round.
fn is_hr_interviewer<S>(store: &S, actor: &Actor, drive_candidate: &DriveCandidate) -> Checked<bool>
where
    S: EntityStore + ?Sized,
{
    for round in store.rounds_for_drive_candidate(drive_candidate.id)? {
        if round.round_type != RoundType::Hr {
            continue;
        }
        let interviewer = store.drive_member(round.interviewer_id)?;
        if interviewer.is_some_and(|member| member.user_id == actor.user_id) {
            return Ok(true);
        }
    }
    Ok(false)
}
