use super::domain::{DriveCandidate, Round, UserId};
use super::status::derive_candidate_status;

/// Carries an HR round's result onto the candidate it belongs to.
///
/// Returns `true` when the candidate changed. Technical rounds never touch the candidate.
pub fn propagate_round_result(
    round: &Round,
    candidate: &mut DriveCandidate,
    acted_by: UserId,
) -> bool {
    let Some(status) = derive_candidate_status(round.round_type, round.result) else {
        return false;
    };

    if candidate.status == status && candidate.status_set_by == Some(acted_by) {
        return false;
    }

    candidate.status = status;
    candidate.status_set_by = Some(acted_by);
    true
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::workflows::drive::domain::{
        CandidateId, CandidateStatus, DriveCandidateId, DriveId, DriveMemberId, RoundId,
        RoundResult, RoundStatus, RoundType,
    };

    fn candidate() -> DriveCandidate {
        DriveCandidate {
            id: DriveCandidateId(3),
            drive_id: DriveId(1),
            candidate_id: CandidateId(9),
            status: CandidateStatus::Pending,
            status_set_by: None,
            attendance_status: None,
            created_date: NaiveDate::from_ymd_opt(2026, 3, 1)
                .and_then(|date| date.and_hms_opt(8, 0, 0))
                .expect("valid timestamp"),
        }
    }

    fn round(round_type: RoundType, result: RoundResult) -> Round {
        Round {
            id: RoundId(4),
            interviewer_id: DriveMemberId(2),
            drive_candidate_id: DriveCandidateId(3),
            round_type,
            status: RoundStatus::OnProcess,
            result,
            feedback_id: None,
        }
    }

    #[test]
    fn hr_round_result_becomes_candidate_status() {
        let mut linked = candidate();
        let changed = propagate_round_result(
            &round(RoundType::Hr, RoundResult::Selected),
            &mut linked,
            UserId(12),
        );

        assert!(changed);
        assert_eq!(linked.status, CandidateStatus::Selected);
        assert_eq!(linked.status_set_by, Some(UserId(12)));
    }

    #[test]
    fn technical_rounds_leave_candidate_untouched() {
        let mut linked = candidate();
        let changed = propagate_round_result(
            &round(RoundType::Tech2, RoundResult::Rejected),
            &mut linked,
            UserId(12),
        );

        assert!(!changed);
        assert_eq!(linked, candidate());
    }
}
