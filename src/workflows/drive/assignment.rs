//! Panel allocation for drives that have not started yet.

use serde::{Deserialize, Serialize};

use super::domain::{DriveCandidate, DriveCandidateId, DriveMember, DriveMemberId, Round};

/// Whether auto-assignment may run again once Tech1 rounds exist for a drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoAssignPolicy {
    /// Refuse a second pass.
    #[default]
    Once,
    /// Every call walks all candidates again and adds fresh rounds.
    Repeat,
}

impl AutoAssignPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "once" => Some(AutoAssignPolicy::Once),
            "repeat" => Some(AutoAssignPolicy::Repeat),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AutoAssignPolicy::Once => "once",
            AutoAssignPolicy::Repeat => "repeat",
        }
    }
}

/// One Tech1 round to be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedRound {
    pub drive_candidate_id: DriveCandidateId,
    pub interviewer_id: DriveMemberId,
}

/// Candidate `i` goes to `panel[i % panel.len()]`, in the order both lists were loaded.
pub fn plan_round_robin(candidates: &[DriveCandidate], panel: &[DriveMember]) -> Vec<PlannedRound> {
    if panel.is_empty() {
        return Vec::new();
    }

    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| PlannedRound {
            drive_candidate_id: candidate.id,
            interviewer_id: panel[index % panel.len()].id,
        })
        .collect()
}

pub fn reassign(round: &Round, new_interviewer: DriveMemberId) -> Round {
    Round {
        interviewer_id: new_interviewer,
        ..round.clone()
    }
}
