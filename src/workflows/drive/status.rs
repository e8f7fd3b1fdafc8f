//! Legality tables for drive, round and drive-candidate state.
//!
//! Each entity's transitions are listed as data: an edge names the states it may leave,
//! the state it reaches and an optional guard over the surrounding context. The same
//! [`TransitionTable::check`] evaluates every table, so validators and tests share one
//! source of truth. Nothing in this module performs I/O.

use chrono::NaiveDate;

use super::domain::{
    CandidateStatus, DriveStatus, Recommendation, RoundResult, RoundStatus, RoundType,
};
use super::validation::messages;

/// Guard evaluated against the context of a transition; `Err` carries the rejection text.
pub type Guard<C> = fn(&C) -> Result<(), &'static str>;

/// One permitted edge of a state machine.
pub struct Transition<S: 'static, C> {
    pub from: &'static [S],
    pub to: S,
    pub guard: Option<Guard<C>>,
}

/// A state machine expressed as a list of edges.
pub struct TransitionTable<S: 'static, C: 'static> {
    pub edges: &'static [Transition<S, C>],
    pub rejection: fn(S, S) -> &'static str,
}

impl<S, C> TransitionTable<S, C>
where
    S: Copy + PartialEq,
{
    /// Accepts when any matching edge has no guard or a passing guard. When only guarded
    /// edges match and all fail, the first guard's message is returned.
    pub fn check(&self, from: S, to: S, context: &C) -> Result<(), &'static str> {
        let mut guard_failure = None;

        for edge in self
            .edges
            .iter()
            .filter(|edge| edge.to == to && edge.from.contains(&from))
        {
            match edge.guard {
                None => return Ok(()),
                Some(guard) => match guard(context) {
                    Ok(()) => return Ok(()),
                    Err(message) => {
                        guard_failure.get_or_insert(message);
                    }
                },
            }
        }

        Err(guard_failure.unwrap_or_else(|| (self.rejection)(from, to)))
    }

    pub fn is_legal(&self, from: S, to: S, context: &C) -> bool {
        self.check(from, to, context).is_ok()
    }
}

/// Calendar facts a drive status change is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveCalendar {
    pub drive_date: NaiveDate,
    pub today: NaiveDate,
}

fn drive_date_reached(calendar: &DriveCalendar) -> Result<(), &'static str> {
    if calendar.drive_date > calendar.today {
        Err(messages::DRIVE_NOT_STARTABLE_YET)
    } else {
        Ok(())
    }
}

fn drive_rejection(from: DriveStatus, to: DriveStatus) -> &'static str {
    match (from, to) {
        (_, DriveStatus::InProposal) => messages::DRIVE_STATUS_TO_IN_PROPOSAL,
        (DriveStatus::InProposal, DriveStatus::Halted) => messages::DRIVE_NEEDS_START,
        _ => messages::INVALID_DRIVE_STATUS,
    }
}

const OPEN_DRIVE: &[DriveStatus] = &[
    DriveStatus::InProposal,
    DriveStatus::Started,
    DriveStatus::Halted,
];

pub const DRIVE_STATUS: TransitionTable<DriveStatus, DriveCalendar> = TransitionTable {
    edges: &[
        Transition {
            from: OPEN_DRIVE,
            to: DriveStatus::Started,
            guard: Some(drive_date_reached),
        },
        Transition {
            from: &[DriveStatus::Started, DriveStatus::Halted],
            to: DriveStatus::Halted,
            guard: None,
        },
        Transition {
            from: OPEN_DRIVE,
            to: DriveStatus::Completed,
            guard: None,
        },
        Transition {
            from: OPEN_DRIVE,
            to: DriveStatus::Cancelled,
            guard: None,
        },
    ],
    rejection: drive_rejection,
};

/// Round state a status change is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    pub result: RoundResult,
}

fn result_recorded(outcome: &RoundOutcome) -> Result<(), &'static str> {
    if round_status_transition_legal(RoundStatus::Completed, outcome.result) {
        Ok(())
    } else {
        Err(messages::ROUND_RESULT_REQUIRED)
    }
}

fn round_status_rejection(_: RoundStatus, _: RoundStatus) -> &'static str {
    messages::INVALID_ROUND_STATUS_TRANSITION
}

const LIVE_ROUND: &[RoundStatus] = &[RoundStatus::Scheduled, RoundStatus::OnProcess];

pub const ROUND_STATUS: TransitionTable<RoundStatus, RoundOutcome> = TransitionTable {
    edges: &[
        Transition {
            from: &[RoundStatus::Scheduled],
            to: RoundStatus::Scheduled,
            guard: None,
        },
        Transition {
            from: LIVE_ROUND,
            to: RoundStatus::OnProcess,
            guard: None,
        },
        Transition {
            from: LIVE_ROUND,
            to: RoundStatus::Skipped,
            guard: None,
        },
        Transition {
            from: LIVE_ROUND,
            to: RoundStatus::Completed,
            guard: Some(result_recorded),
        },
    ],
    rejection: round_status_rejection,
};

/// Round progress a result change is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundProgress {
    pub status: RoundStatus,
}

fn round_started(progress: &RoundProgress) -> Result<(), &'static str> {
    if progress.status == RoundStatus::Scheduled {
        Err(messages::ROUND_NOT_STARTED)
    } else {
        Ok(())
    }
}

fn round_result_rejection(_: RoundResult, _: RoundResult) -> &'static str {
    messages::ROUND_RESULT_TO_PENDING
}

const ANY_RESULT: &[RoundResult] = &[
    RoundResult::Pending,
    RoundResult::Selected,
    RoundResult::Rejected,
];

pub const ROUND_RESULT: TransitionTable<RoundResult, RoundProgress> = TransitionTable {
    edges: &[
        Transition {
            from: &[RoundResult::Pending],
            to: RoundResult::Pending,
            guard: Some(round_started),
        },
        Transition {
            from: ANY_RESULT,
            to: RoundResult::Selected,
            guard: Some(round_started),
        },
        Transition {
            from: ANY_RESULT,
            to: RoundResult::Rejected,
            guard: Some(round_started),
        },
    ],
    rejection: round_result_rejection,
};

fn drive_underway(status: &DriveStatus) -> Result<(), &'static str> {
    if *status == DriveStatus::InProposal {
        Err(messages::DRIVE_NEEDS_START)
    } else {
        Ok(())
    }
}

fn candidate_rejection(_: CandidateStatus, _: CandidateStatus) -> &'static str {
    messages::CANDIDATE_STATUS_TO_PENDING
}

const ANY_CANDIDATE: &[CandidateStatus] = &[
    CandidateStatus::Pending,
    CandidateStatus::Selected,
    CandidateStatus::Rejected,
];

/// Direct edits of a drive-candidate's status; the context is the owning drive's status.
pub const CANDIDATE_STATUS: TransitionTable<CandidateStatus, DriveStatus> = TransitionTable {
    edges: &[
        Transition {
            from: ANY_CANDIDATE,
            to: CandidateStatus::Selected,
            guard: Some(drive_underway),
        },
        Transition {
            from: ANY_CANDIDATE,
            to: CandidateStatus::Rejected,
            guard: Some(drive_underway),
        },
    ],
    rejection: candidate_rejection,
};

/// Drive attributes that can appear in an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveField {
    Name,
    Date,
    TechnicalRounds,
    Status,
}

pub fn can_edit_drive(status: DriveStatus) -> bool {
    !status.is_closed()
}

/// Name, date and round count are fixed once a drive leaves InProposal. Status targets
/// are judged separately by [`DRIVE_STATUS`].
pub fn can_edit_drive_field(field: DriveField, status: DriveStatus) -> bool {
    if !can_edit_drive(status) {
        return false;
    }

    match field {
        DriveField::Name | DriveField::Date | DriveField::TechnicalRounds => {
            status == DriveStatus::InProposal
        }
        DriveField::Status => true,
    }
}

pub fn can_add_members_or_candidates(status: DriveStatus) -> bool {
    !status.is_closed()
}

/// Staff and candidates are frozen once a drive starts.
pub fn can_remove_members_or_candidates(status: DriveStatus) -> bool {
    status == DriveStatus::InProposal
}

/// Window in which rounds and their feedback may change.
pub fn round_edit_window(
    drive_status: DriveStatus,
    round_status: RoundStatus,
) -> Result<(), &'static str> {
    match drive_status {
        DriveStatus::Completed | DriveStatus::Cancelled => Err(messages::CLOSED_DRIVE),
        DriveStatus::Halted => Err(messages::PAUSED_DRIVE),
        DriveStatus::InProposal => Err(messages::DRIVE_NEEDS_START),
        DriveStatus::Started if round_status.is_closed() => Err(messages::ROUND_CLOSED),
        DriveStatus::Started => Ok(()),
    }
}

pub fn can_edit_round(drive_status: DriveStatus, round_status: RoundStatus) -> bool {
    round_edit_window(drive_status, round_status).is_ok()
}

pub fn round_status_transition_legal(new_status: RoundStatus, current_result: RoundResult) -> bool {
    new_status != RoundStatus::Completed || current_result != RoundResult::Pending
}

pub fn round_result_transition_legal(_new_result: RoundResult, round_status: RoundStatus) -> bool {
    round_status != RoundStatus::Scheduled
}

pub fn derive_round_result(recommendation: Recommendation) -> RoundResult {
    match recommendation {
        Recommendation::Hire | Recommendation::Maybe => RoundResult::Selected,
        Recommendation::NoHire => RoundResult::Rejected,
        Recommendation::NA => RoundResult::Pending,
    }
}

/// Only HR rounds decide a candidate's disposition.
pub fn derive_candidate_status(
    round_type: RoundType,
    result: RoundResult,
) -> Option<CandidateStatus> {
    if round_type != RoundType::Hr {
        return None;
    }

    Some(match result {
        RoundResult::Selected => CandidateStatus::Selected,
        RoundResult::Rejected => CandidateStatus::Rejected,
        RoundResult::Pending => CandidateStatus::Pending,
    })
}

pub fn candidate_status_transition_legal(
    new_status: CandidateStatus,
    drive_status: DriveStatus,
) -> bool {
    new_status != CandidateStatus::Pending && drive_status != DriveStatus::InProposal
}
