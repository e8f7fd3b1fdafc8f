use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    Candidate, CandidateId, CandidateReassignment, Drive, DriveCandidate, DriveCandidateId,
    DriveConfiguration, DriveId, DriveMember, DriveMemberId, Feedback, FeedbackId,
    ReassignmentId, Role, RoleId, Round, RoundId, User, UserId, UserRole,
};
use super::repository::{Constraint, EntityStore, RepositoryError, Sequence, UnitOfWork, Write};

/// Process-local [`EntityStore`] used by the HTTP service, the CLI demo and tests.
///
/// A commit is applied to a copy of the current state and swapped in only when every write
/// succeeded, so a failed unit of work leaves nothing behind.
#[derive(Debug, Default, Clone)]
pub struct MemoryEntityStore {
    state: Arc<Mutex<StoreState>>,
}

#[derive(Debug, Default, Clone)]
struct StoreState {
    sequences: BTreeMap<Sequence, i64>,
    roles: BTreeMap<RoleId, Role>,
    users: BTreeMap<UserId, User>,
    candidates: BTreeMap<CandidateId, Candidate>,
    drives: BTreeMap<DriveId, Drive>,
    configurations: BTreeMap<DriveId, DriveConfiguration>,
    members: BTreeMap<DriveMemberId, DriveMember>,
    drive_candidates: BTreeMap<DriveCandidateId, DriveCandidate>,
    rounds: BTreeMap<RoundId, Round>,
    feedback: BTreeMap<FeedbackId, Feedback>,
    reassignments: BTreeMap<ReassignmentId, CandidateReassignment>,
}

impl MemoryEntityStore {
    /// Store preloaded with the Admin, HR, Panel and Mentor roles (ids 1 to 4).
    pub fn with_standard_roles() -> Self {
        let store = Self::default();
        for (index, name) in [UserRole::Admin, UserRole::Hr, UserRole::Panel, UserRole::Mentor]
            .into_iter()
            .enumerate()
        {
            store.seed_role(Role {
                id: RoleId(index as i64 + 1),
                name,
            });
        }
        store
    }

    pub fn seed_role(&self, role: Role) {
        if let Ok(mut state) = self.lock() {
            state.roles.insert(role.id, role);
        }
    }

    pub fn seed_user(&self, user: User) {
        if let Ok(mut state) = self.lock() {
            state.users.insert(user.id, user);
        }
    }

    pub fn seed_candidate(&self, candidate: Candidate) {
        if let Ok(mut state) = self.lock() {
            state.candidates.insert(candidate.id, candidate);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, RepositoryError> {
        let state = self.lock()?;
        Ok(f(&state))
    }
}

impl StoreState {
    fn bump(&mut self, sequence: Sequence, id: i64) {
        let current = self.sequences.entry(sequence).or_insert(0);
        if id > *current {
            *current = id;
        }
    }

    fn apply(&mut self, write: Write) -> Result<(), RepositoryError> {
        match write {
            Write::InsertDrive(drive) => {
                self.ensure_unique_name(&drive)?;
                self.bump(Sequence::Drive, drive.id.0);
                self.drives.insert(drive.id, drive);
            }
            Write::UpdateDrive(drive) => {
                if !self.drives.contains_key(&drive.id) {
                    return Err(RepositoryError::NotFound);
                }
                self.ensure_unique_name(&drive)?;
                self.drives.insert(drive.id, drive);
            }
            Write::PutConfiguration(configuration) => {
                self.configurations
                    .insert(configuration.drive_id, configuration);
            }
            Write::InsertMember(member) => {
                let taken = self.members.values().any(|existing| {
                    existing.drive_id == member.drive_id && existing.user_id == member.user_id
                });
                if taken {
                    return Err(RepositoryError::Conflict {
                        constraint: Constraint::DriveMember,
                    });
                }
                self.bump(Sequence::DriveMember, member.id.0);
                self.members.insert(member.id, member);
            }
            Write::RemoveMember(id) => {
                self.members.remove(&id).ok_or(RepositoryError::NotFound)?;
            }
            Write::InsertDriveCandidate(link) => {
                let taken = self.drive_candidates.values().any(|existing| {
                    existing.drive_id == link.drive_id && existing.candidate_id == link.candidate_id
                });
                if taken {
                    return Err(RepositoryError::Conflict {
                        constraint: Constraint::DriveCandidate,
                    });
                }
                self.bump(Sequence::DriveCandidate, link.id.0);
                self.drive_candidates.insert(link.id, link);
            }
            Write::UpdateDriveCandidate(link) => {
                if !self.drive_candidates.contains_key(&link.id) {
                    return Err(RepositoryError::NotFound);
                }
                self.drive_candidates.insert(link.id, link);
            }
            Write::RemoveDriveCandidate(id) => {
                self.drive_candidates
                    .remove(&id)
                    .ok_or(RepositoryError::NotFound)?;
            }
            Write::InsertRound(round) => {
                self.bump(Sequence::Round, round.id.0);
                self.rounds.insert(round.id, round);
            }
            Write::UpdateRound(round) => {
                let stored = self.rounds.get(&round.id).ok_or(RepositoryError::NotFound)?;
                if stored.feedback_id.is_some() && stored.feedback_id != round.feedback_id {
                    return Err(RepositoryError::Conflict {
                        constraint: Constraint::RoundFeedback,
                    });
                }
                self.rounds.insert(round.id, round);
            }
            Write::RemoveRound(id) => {
                self.rounds.remove(&id).ok_or(RepositoryError::NotFound)?;
            }
            Write::InsertFeedback(feedback) => {
                self.bump(Sequence::Feedback, feedback.id.0);
                self.feedback.insert(feedback.id, feedback);
            }
            Write::UpdateFeedback(feedback) => {
                if !self.feedback.contains_key(&feedback.id) {
                    return Err(RepositoryError::NotFound);
                }
                self.feedback.insert(feedback.id, feedback);
            }
            Write::RemoveFeedback(id) => {
                self.feedback.remove(&id).ok_or(RepositoryError::NotFound)?;
            }
            Write::InsertReassignment(record) => {
                self.bump(Sequence::Reassignment, record.id.0);
                self.reassignments.insert(record.id, record);
            }
        }

        Ok(())
    }

    fn ensure_unique_name(&self, drive: &Drive) -> Result<(), RepositoryError> {
        let taken = self
            .drives
            .values()
            .any(|existing| existing.id != drive.id && existing.name == drive.name);
        if taken {
            Err(RepositoryError::Conflict {
                constraint: Constraint::DriveName,
            })
        } else {
            Ok(())
        }
    }
}

impl EntityStore for MemoryEntityStore {
    fn next_id(&self, sequence: Sequence) -> Result<i64, RepositoryError> {
        let mut state = self.lock()?;
        let current = state.sequences.entry(sequence).or_insert(0);
        *current += 1;
        Ok(*current)
    }

    fn role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError> {
        self.read(|state| state.roles.get(&id).cloned())
    }

    fn role_by_name(&self, name: UserRole) -> Result<Option<Role>, RepositoryError> {
        self.read(|state| state.roles.values().find(|role| role.name == name).cloned())
    }

    fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.read(|state| state.users.get(&id).cloned())
    }

    fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        self.read(|state| state.candidates.get(&id).cloned())
    }

    fn drive(&self, id: DriveId) -> Result<Option<Drive>, RepositoryError> {
        self.read(|state| state.drives.get(&id).cloned())
    }

    fn drive_by_name(&self, name: &str) -> Result<Option<Drive>, RepositoryError> {
        self.read(|state| state.drives.values().find(|drive| drive.name == name).cloned())
    }

    fn drives(&self) -> Result<Vec<Drive>, RepositoryError> {
        self.read(|state| state.drives.values().cloned().collect())
    }

    fn drive_configuration(
        &self,
        drive_id: DriveId,
    ) -> Result<Option<DriveConfiguration>, RepositoryError> {
        self.read(|state| state.configurations.get(&drive_id).cloned())
    }

    fn drive_members(&self, drive_id: DriveId) -> Result<Vec<DriveMember>, RepositoryError> {
        self.read(|state| {
            state
                .members
                .values()
                .filter(|member| member.drive_id == drive_id)
                .cloned()
                .collect()
        })
    }

    fn drive_member(&self, id: DriveMemberId) -> Result<Option<DriveMember>, RepositoryError> {
        self.read(|state| state.members.get(&id).cloned())
    }

    fn memberships_for_user(&self, user_id: UserId) -> Result<Vec<DriveMember>, RepositoryError> {
        self.read(|state| {
            state
                .members
                .values()
                .filter(|member| member.user_id == user_id)
                .cloned()
                .collect()
        })
    }

    fn drive_candidates(
        &self,
        drive_id: DriveId,
    ) -> Result<Vec<DriveCandidate>, RepositoryError> {
        self.read(|state| {
            state
                .drive_candidates
                .values()
                .filter(|link| link.drive_id == drive_id)
                .cloned()
                .collect()
        })
    }

    fn drive_candidate(
        &self,
        id: DriveCandidateId,
    ) -> Result<Option<DriveCandidate>, RepositoryError> {
        self.read(|state| state.drive_candidates.get(&id).cloned())
    }

    fn rounds(&self) -> Result<Vec<Round>, RepositoryError> {
        self.read(|state| state.rounds.values().cloned().collect())
    }

    fn round(&self, id: RoundId) -> Result<Option<Round>, RepositoryError> {
        self.read(|state| state.rounds.get(&id).cloned())
    }

    fn rounds_for_drive_candidate(
        &self,
        drive_candidate_id: DriveCandidateId,
    ) -> Result<Vec<Round>, RepositoryError> {
        self.read(|state| {
            state
                .rounds
                .values()
                .filter(|round| round.drive_candidate_id == drive_candidate_id)
                .cloned()
                .collect()
        })
    }

    fn feedback(&self, id: FeedbackId) -> Result<Option<Feedback>, RepositoryError> {
        self.read(|state| state.feedback.get(&id).cloned())
    }

    fn reassignments(
        &self,
        drive_candidate_id: DriveCandidateId,
    ) -> Result<Vec<CandidateReassignment>, RepositoryError> {
        self.read(|state| {
            state
                .reassignments
                .values()
                .filter(|record| record.drive_candidate_id == drive_candidate_id)
                .cloned()
                .collect()
        })
    }

    fn commit(&self, unit: UnitOfWork) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let mut staged = state.clone();
        for write in unit.into_writes() {
            staged.apply(write)?;
        }
        *state = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::drive::domain::{CandidateStatus, DriveStatus};
    use chrono::NaiveDate;

    fn drive(id: i64, name: &str) -> Drive {
        let date = NaiveDate::from_ymd_opt(2030, 5, 4).expect("valid date");
        Drive {
            id: DriveId(id),
            name: name.to_string(),
            date,
            technical_rounds: 1,
            status: DriveStatus::InProposal,
            created_by: UserId(1),
            created_date: date.and_hms_opt(8, 0, 0).expect("valid time"),
            updated_date: None,
        }
    }

    fn link(id: i64, drive_id: i64, candidate_id: i64) -> DriveCandidate {
        DriveCandidate {
            id: DriveCandidateId(id),
            drive_id: DriveId(drive_id),
            candidate_id: CandidateId(candidate_id),
            status: CandidateStatus::Pending,
            status_set_by: None,
            attendance_status: None,
            created_date: drive(drive_id, "x").created_date,
        }
    }

    #[test]
    fn failed_commit_leaves_state_untouched() {
        let store = MemoryEntityStore::default();
        let mut unit = UnitOfWork::new();
        unit.push(Write::InsertDrive(drive(1, "Campus")));
        unit.push(Write::InsertDriveCandidate(link(1, 1, 9)));
        unit.push(Write::InsertDriveCandidate(link(2, 1, 9)));

        let err = store.commit(unit).expect_err("duplicate pair rejected");
        assert!(matches!(
            err,
            RepositoryError::Conflict {
                constraint: Constraint::DriveCandidate
            }
        ));
        assert!(store.drives().expect("drives load").is_empty());
    }

    #[test]
    fn drive_names_are_unique() {
        let store = MemoryEntityStore::default();
        let mut unit = UnitOfWork::new();
        unit.push(Write::InsertDrive(drive(1, "Campus")));
        store.commit(unit).expect("first drive stored");

        let mut unit = UnitOfWork::new();
        unit.push(Write::InsertDrive(drive(2, "Campus")));
        let err = store.commit(unit).expect_err("name taken");
        assert!(matches!(
            err,
            RepositoryError::Conflict {
                constraint: Constraint::DriveName
            }
        ));
    }

    #[test]
    fn sequences_skip_past_seeded_ids() {
        let store = MemoryEntityStore::default();
        let mut unit = UnitOfWork::new();
        unit.push(Write::InsertDrive(drive(7, "Campus")));
        store.commit(unit).expect("drive stored");

        assert_eq!(store.next_id(Sequence::Drive).expect("id issued"), 8);
        assert_eq!(store.next_id(Sequence::Round).expect("id issued"), 1);
    }
}
