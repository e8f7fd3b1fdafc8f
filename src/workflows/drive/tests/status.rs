use super::common::*;
use crate::workflows::drive::status::{
    self, DriveCalendar, DriveField, RoundOutcome, RoundProgress, CANDIDATE_STATUS, DRIVE_STATUS,
    ROUND_RESULT, ROUND_STATUS,
};
use crate::workflows::drive::validation::messages;
use crate::workflows::drive::{
    CandidateStatus, DriveStatus, Recommendation, RoundResult, RoundStatus, RoundType,
};

fn calendar(offset_days: i64) -> DriveCalendar {
    DriveCalendar {
        drive_date: days_from_today(offset_days),
        today: today(),
    }
}

#[test]
fn drive_cannot_start_before_its_date() {
    let err = DRIVE_STATUS
        .check(DriveStatus::InProposal, DriveStatus::Started, &calendar(3))
        .expect_err("future drive cannot start");
    assert_eq!(err, messages::DRIVE_NOT_STARTABLE_YET);

    DRIVE_STATUS
        .check(DriveStatus::InProposal, DriveStatus::Started, &calendar(0))
        .expect("drive starts on its date");
    DRIVE_STATUS
        .check(DriveStatus::Halted, DriveStatus::Started, &calendar(-1))
        .expect("halted drive resumes");
}

#[test]
fn drive_never_returns_to_proposal() {
    for from in [DriveStatus::InProposal, DriveStatus::Started, DriveStatus::Halted] {
        let err = DRIVE_STATUS
            .check(from, DriveStatus::InProposal, &calendar(0))
            .expect_err("InProposal is not a target");
        assert_eq!(err, messages::DRIVE_STATUS_TO_IN_PROPOSAL);
    }
}

#[test]
fn halting_requires_a_running_drive() {
    let err = DRIVE_STATUS
        .check(DriveStatus::InProposal, DriveStatus::Halted, &calendar(0))
        .expect_err("proposal cannot halt");
    assert_eq!(err, messages::DRIVE_NEEDS_START);

    assert!(DRIVE_STATUS.is_legal(DriveStatus::Started, DriveStatus::Halted, &calendar(0)));
    assert!(DRIVE_STATUS.is_legal(DriveStatus::Halted, DriveStatus::Halted, &calendar(0)));
}

#[test]
fn closed_drives_are_terminal() {
    for from in [DriveStatus::Completed, DriveStatus::Cancelled] {
        for to in [DriveStatus::Started, DriveStatus::Halted, DriveStatus::Completed] {
            let err = DRIVE_STATUS
                .check(from, to, &calendar(-2))
                .expect_err("closed drive is terminal");
            assert_eq!(err, messages::INVALID_DRIVE_STATUS);
        }
    }
    assert!(DRIVE_STATUS.is_legal(DriveStatus::InProposal, DriveStatus::Cancelled, &calendar(9)));
    assert!(DRIVE_STATUS.is_legal(DriveStatus::Started, DriveStatus::Completed, &calendar(0)));
}

#[test]
fn round_completion_needs_a_result() {
    let pending = RoundOutcome {
        result: RoundResult::Pending,
    };
    let err = ROUND_STATUS
        .check(RoundStatus::OnProcess, RoundStatus::Completed, &pending)
        .expect_err("pending result blocks completion");
    assert_eq!(err, messages::ROUND_RESULT_REQUIRED);

    let selected = RoundOutcome {
        result: RoundResult::Selected,
    };
    assert!(ROUND_STATUS.is_legal(RoundStatus::OnProcess, RoundStatus::Completed, &selected));
    assert!(ROUND_STATUS.is_legal(RoundStatus::Scheduled, RoundStatus::Skipped, &pending));
}

#[test]
fn rounds_do_not_move_backwards() {
    let outcome = RoundOutcome {
        result: RoundResult::Pending,
    };
    let err = ROUND_STATUS
        .check(RoundStatus::OnProcess, RoundStatus::Scheduled, &outcome)
        .expect_err("no return to Scheduled");
    assert_eq!(err, messages::INVALID_ROUND_STATUS_TRANSITION);
    assert!(!ROUND_STATUS.is_legal(RoundStatus::Completed, RoundStatus::OnProcess, &outcome));
}

#[test]
fn round_result_needs_a_started_round() {
    let scheduled = RoundProgress {
        status: RoundStatus::Scheduled,
    };
    let err = ROUND_RESULT
        .check(RoundResult::Pending, RoundResult::Selected, &scheduled)
        .expect_err("scheduled round has no result");
    assert_eq!(err, messages::ROUND_NOT_STARTED);

    let running = RoundProgress {
        status: RoundStatus::OnProcess,
    };
    assert!(ROUND_RESULT.is_legal(RoundResult::Pending, RoundResult::Rejected, &running));
    assert!(ROUND_RESULT.is_legal(RoundResult::Rejected, RoundResult::Selected, &running));

    let err = ROUND_RESULT
        .check(RoundResult::Selected, RoundResult::Pending, &running)
        .expect_err("decided result cannot reset");
    assert_eq!(err, messages::ROUND_RESULT_TO_PENDING);
}

#[test]
fn candidate_status_edits_follow_the_drive() {
    let err = CANDIDATE_STATUS
        .check(
            CandidateStatus::Pending,
            CandidateStatus::Selected,
            &DriveStatus::InProposal,
        )
        .expect_err("drive not underway");
    assert_eq!(err, messages::DRIVE_NEEDS_START);

    let err = CANDIDATE_STATUS
        .check(
            CandidateStatus::Selected,
            CandidateStatus::Pending,
            &DriveStatus::Started,
        )
        .expect_err("Pending is never a target");
    assert_eq!(err, messages::CANDIDATE_STATUS_TO_PENDING);

    assert!(CANDIDATE_STATUS.is_legal(
        CandidateStatus::Selected,
        CandidateStatus::Rejected,
        &DriveStatus::Started,
    ));
    assert!(status::candidate_status_transition_legal(
        CandidateStatus::Selected,
        DriveStatus::Halted,
    ));
    assert!(!status::candidate_status_transition_legal(
        CandidateStatus::Pending,
        DriveStatus::Started,
    ));
}

#[test]
fn drive_fields_freeze_after_proposal() {
    for field in [DriveField::Name, DriveField::Date, DriveField::TechnicalRounds] {
        assert!(status::can_edit_drive_field(field, DriveStatus::InProposal));
        assert!(!status::can_edit_drive_field(field, DriveStatus::Started));
    }
    assert!(status::can_edit_drive_field(DriveField::Status, DriveStatus::Halted));
    assert!(!status::can_edit_drive_field(DriveField::Status, DriveStatus::Completed));
}

#[test]
fn membership_windows() {
    assert!(status::can_add_members_or_candidates(DriveStatus::Started));
    assert!(!status::can_add_members_or_candidates(DriveStatus::Cancelled));
    assert!(status::can_remove_members_or_candidates(DriveStatus::InProposal));
    assert!(!status::can_remove_members_or_candidates(DriveStatus::Halted));
}

#[test]
fn round_edit_window_reports_the_blocking_state() {
    let cases = [
        (DriveStatus::Completed, RoundStatus::OnProcess, messages::CLOSED_DRIVE),
        (DriveStatus::Cancelled, RoundStatus::Scheduled, messages::CLOSED_DRIVE),
        (DriveStatus::Halted, RoundStatus::OnProcess, messages::PAUSED_DRIVE),
        (DriveStatus::InProposal, RoundStatus::Scheduled, messages::DRIVE_NEEDS_START),
        (DriveStatus::Started, RoundStatus::Skipped, messages::ROUND_CLOSED),
    ];
    for (drive, round, expected) in cases {
        assert_eq!(status::round_edit_window(drive, round), Err(expected));
    }
    assert!(status::can_edit_round(DriveStatus::Started, RoundStatus::OnProcess));
}

#[test]
fn recommendations_map_to_round_results() {
    assert_eq!(status::derive_round_result(Recommendation::Hire), RoundResult::Selected);
    assert_eq!(status::derive_round_result(Recommendation::Maybe), RoundResult::Selected);
    assert_eq!(status::derive_round_result(Recommendation::NoHire), RoundResult::Rejected);
    assert_eq!(status::derive_round_result(Recommendation::NA), RoundResult::Pending);
}

#[test]
fn only_hr_rounds_decide_candidates() {
    assert_eq!(
        status::derive_candidate_status(RoundType::Hr, RoundResult::Rejected),
        Some(CandidateStatus::Rejected)
    );
    assert_eq!(
        status::derive_candidate_status(RoundType::Tech1, RoundResult::Selected),
        None
    );
    assert!(status::round_status_transition_legal(
        RoundStatus::Completed,
        RoundResult::Selected
    ));
    assert!(!status::round_result_transition_legal(
        RoundResult::Selected,
        RoundStatus::Scheduled
    ));
}
